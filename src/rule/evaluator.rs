//! Rule evaluator

use crate::config::{EngineConfig, MissingFieldPolicy};
use crate::error::{Result, RuleError};
use crate::rule::ast::{Comparator, Comparison, Literal, LogicalOp, Node, Operand};
use crate::rule::value::{FieldValue, Record};
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Evaluate a tree against a record with the default configuration
pub fn evaluate(node: &Node, record: &Record) -> Result<bool> {
    evaluate_with(node, record, &EngineConfig::default())
}

/// Evaluate a tree against a record
pub fn evaluate_with(node: &Node, record: &Record, config: &EngineConfig) -> Result<bool> {
    debug!(rule = %node, "evaluating rule");
    check(node, record, config.missing_field)
}

fn check(node: &Node, record: &Record, policy: MissingFieldPolicy) -> Result<bool> {
    match node {
        Node::Operand(Operand::Comparison(cmp)) => check_comparison(cmp, record, policy),
        Node::Operand(Operand::Malformed(raw)) => Err(RuleError::Evaluation(format!(
            "Operand '{}' must have exactly three parts: field, operator, value",
            raw
        ))),
        Node::Operator { op, left, right } => {
            // Both sides are always evaluated
            let left = check(left, record, policy)?;
            let right = check(right, record, policy)?;
            match op {
                LogicalOp::And => Ok(left && right),
                LogicalOp::Or => Ok(left || right),
                LogicalOp::Other(symbol) => Err(RuleError::Evaluation(format!(
                    "Invalid operator type: {}",
                    symbol
                ))),
            }
        }
    }
}

fn check_comparison(cmp: &Comparison, record: &Record, policy: MissingFieldPolicy) -> Result<bool> {
    // Unknown comparators are a defect of the tree, reported before the record is consulted
    if let Comparator::Other(symbol) = &cmp.comparator {
        return Err(RuleError::Evaluation(format!("Invalid operator: {}", symbol)));
    }

    let Some(field_value) = record.get(&cmp.field) else {
        return match policy {
            MissingFieldPolicy::Reject => Err(RuleError::Evaluation(format!(
                "Field '{}' not present in record",
                cmp.field
            ))),
            MissingFieldPolicy::NoMatch => Ok(cmp.comparator == Comparator::NotEqual),
        };
    };

    let left = Coerced::from_field(field_value);
    let right = Coerced::from_literal(cmp.literal_value());

    let result = match (&left, &right) {
        (Coerced::Integer(a), Coerced::Integer(b)) => apply(&cmp.comparator, a.partial_cmp(b)),
        (Coerced::Integer(a), Coerced::Float(b)) => apply(&cmp.comparator, compare_int_float(*a, *b)),
        (Coerced::Float(a), Coerced::Integer(b)) => {
            apply(&cmp.comparator, compare_int_float(*b, *a).map(Ordering::reverse))
        }
        (Coerced::Float(a), Coerced::Float(b)) => apply(&cmp.comparator, a.partial_cmp(b)),
        (Coerced::String(a), Coerced::String(b)) => apply(&cmp.comparator, a.partial_cmp(b)),
        _ => {
            return Err(RuleError::ComparisonType {
                field: cmp.field.clone(),
                left: left.kind(),
                right: right.kind(),
            })
        }
    };

    trace!(comparison = %cmp, value = ?field_value, result, "compared operand");
    Ok(result)
}

/// Unordered operands (NaN) satisfy only `!=`
fn apply(comparator: &Comparator, ordering: Option<Ordering>) -> bool {
    let Some(ordering) = ordering else {
        return *comparator == Comparator::NotEqual;
    };
    match comparator {
        Comparator::Equal => ordering.is_eq(),
        Comparator::NotEqual => ordering.is_ne(),
        Comparator::Greater => ordering.is_gt(),
        Comparator::Less => ordering.is_lt(),
        Comparator::GreaterEqual => ordering.is_ge(),
        Comparator::LessEqual => ordering.is_le(),
        Comparator::Other(_) => false,
    }
}

/// Exact ordering of an integer against a float, without rounding the
/// integer to the nearest representable float
fn compare_int_float(int: i64, float: f64) -> Option<Ordering> {
    // 2^63: the first float above every i64
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return None;
    }
    if float >= LIMIT {
        return Some(Ordering::Less);
    }
    if float < -LIMIT {
        return Some(Ordering::Greater);
    }

    // Exact for every float in [-2^63, 2^63)
    let whole = float.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - whole)),
        unequal => Some(unequal),
    }
}

/// Value after numeric coercion, ready for comparison
#[derive(Debug)]
enum Coerced<'a> {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(std::borrow::Cow<'a, str>),
}

impl<'a> Coerced<'a> {
    /// Numeric-looking text in the record is compared as a number
    fn from_field(value: &'a FieldValue) -> Self {
        match value {
            FieldValue::Bool(b) => Coerced::Bool(*b),
            FieldValue::Integer(i) => Coerced::Integer(*i),
            FieldValue::Float(f) => Coerced::Float(*f),
            FieldValue::String(s) => match Literal::from_text(s) {
                Literal::Integer(i) => Coerced::Integer(i),
                Literal::Float(f) => Coerced::Float(f),
                Literal::String(_) => Coerced::String(s.as_str().into()),
            },
        }
    }

    fn from_literal(literal: Literal) -> Self {
        match literal {
            Literal::Integer(i) => Coerced::Integer(i),
            Literal::Float(f) => Coerced::Float(f),
            Literal::String(s) => Coerced::String(s.into()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Coerced::Bool(_) => "bool",
            Coerced::Integer(_) => "integer",
            Coerced::Float(_) => "float",
            Coerced::String(_) => "string",
        }
    }
}
