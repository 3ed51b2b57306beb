//! Property tests for the rule module
//!
//! Covers document round-trips, parse determinism, text round-trips and
//! the semantics of combination and comparison.

use proptest::prelude::*;

use crate::config::EngineConfig;
use crate::rule::ast::{Comparator, LogicalOp, Node, Operand};
use crate::rule::cache::check_rule;
use crate::rule::combiner::combine;
use crate::rule::evaluator::evaluate;
use crate::rule::parser::parse;
use crate::rule::value::{FieldValue, Record};

// ═══════════════════════════════════════════════════════════════════════════
// Strategy generators for property tests
// ═══════════════════════════════════════════════════════════════════════════

/// Field names used by the numeric evaluation properties
const NUMERIC_FIELDS: [&str; 3] = ["x", "y", "z"];

fn comparator_strategy() -> impl Strategy<Value = Comparator> {
    prop_oneof![
        Just(Comparator::Equal),
        Just(Comparator::NotEqual),
        Just(Comparator::Greater),
        Just(Comparator::Less),
        Just(Comparator::GreaterEqual),
        Just(Comparator::LessEqual),
    ]
}

fn logical_op_strategy() -> impl Strategy<Value = LogicalOp> {
    prop_oneof![Just(LogicalOp::And), Just(LogicalOp::Or)]
}

/// Literal text in the canonical form the parser produces
fn literal_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (0..=100_000i64).prop_map(|i| i.to_string()),
        (0..=1000u32, 1..=99u32).prop_map(|(w, f)| format!("{}.{}", w, f))
            .prop_map(|text| crate::rule::ast::Literal::from_text(&text).to_string()),
        "[a-z][a-zA-Z_]{0,7}",
    ]
}

fn comparison_strategy() -> impl Strategy<Value = Node> {
    ("[a-z][a-z_]{0,7}", comparator_strategy(), literal_strategy())
        .prop_map(|(field, comparator, literal)| Node::comparison(field, comparator, literal))
}

/// Trees built from well-formed comparisons
fn tree_strategy() -> impl Strategy<Value = Node> {
    comparison_strategy().prop_recursive(4, 16, 2, |inner| {
        (logical_op_strategy(), inner.clone(), inner)
            .prop_map(|(op, left, right)| Node::operator(op, left, right))
    })
}

/// Trees that may also hold unvalidated symbols, as stored documents can
fn stored_tree_strategy() -> impl Strategy<Value = Node> {
    let leaf = prop_oneof![
        comparison_strategy(),
        ("[a-z]{1,5}", "[<>=!]{1,3}", "[a-z0-9]{0,5}").prop_map(|(f, c, l)| {
            Node::comparison(f, Comparator::from_symbol(&c), l)
        }),
        "[a-z]{1,5}( [a-z]{1,5})?".prop_map(|raw| Node::Operand(Operand::Malformed(raw))),
    ];

    leaf.prop_recursive(4, 16, 2, |inner| {
        (
            prop_oneof![Just("AND".to_string()), Just("OR".to_string()), "[A-Z]{1,4}"],
            inner.clone(),
            inner,
        )
            .prop_map(|(op, left, right)| Node::operator(LogicalOp::from_symbol(&op), left, right))
    })
}

/// Trees over the numeric fields with integer literals; never fail to evaluate
fn numeric_tree_strategy() -> impl Strategy<Value = Node> {
    let leaf = (0..NUMERIC_FIELDS.len(), comparator_strategy(), 0..=20i64).prop_map(
        |(field, comparator, literal)| {
            Node::comparison(NUMERIC_FIELDS[field], comparator, literal.to_string())
        },
    );

    leaf.prop_recursive(3, 8, 2, |inner| {
        (logical_op_strategy(), inner.clone(), inner)
            .prop_map(|(op, left, right)| Node::operator(op, left, right))
    })
}

fn numeric_record_strategy() -> impl Strategy<Value = Record> {
    (0..=20i64, 0..=20i64, 0..=20i64).prop_map(|(x, y, z)| {
        NUMERIC_FIELDS
            .iter()
            .zip([x, y, z])
            .map(|(name, value)| (name.to_string(), FieldValue::Integer(value)))
            .collect()
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Property Tests
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    /// Serializing then deserializing yields the same tree
    #[test]
    fn prop_document_round_trip(tree in stored_tree_strategy()) {
        let rebuilt = Node::from_document(Some(&tree.to_document())).unwrap();
        prop_assert_eq!(rebuilt, Some(tree));
    }

    /// The same round trip through JSON text
    #[test]
    fn prop_json_round_trip(tree in tree_strategy()) {
        let text = serde_json::to_string(&tree).unwrap();
        let parsed: Node = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(parsed, tree);
    }

    /// Rendering a tree as rule text and parsing it back is lossless
    #[test]
    fn prop_text_round_trip(tree in tree_strategy()) {
        let text = tree.to_string();
        let parsed = parse(&text).unwrap();
        prop_assert_eq!(parsed, tree, "Rule: {}", text);
    }

    /// Parsing is a pure function of its input
    #[test]
    fn prop_parse_deterministic(tree in tree_strategy()) {
        let text = tree.to_string();
        prop_assert_eq!(parse(&text).unwrap(), parse(&text).unwrap());
    }

    /// Combined rules evaluate to the conjunction of their parts
    #[test]
    fn prop_combine_is_conjunction(
        rules in prop::collection::vec(numeric_tree_strategy(), 1..=4),
        record in numeric_record_strategy()
    ) {
        let expected = rules
            .iter()
            .map(|rule| evaluate(rule, &record).unwrap())
            .fold(true, |acc, result| acc && result);

        let combined = combine(rules.clone()).unwrap();
        prop_assert_eq!(evaluate(&combined, &record).unwrap(), expected);
        prop_assert_eq!(combined.operand_count(), rules.iter().map(Node::operand_count).sum::<usize>());
    }

    /// Singleton combination is the identity
    #[test]
    fn prop_combine_singleton(tree in tree_strategy()) {
        prop_assert_eq!(combine(vec![tree.clone()]).unwrap(), tree);
    }

    /// Integer comparisons agree with Rust's ordering, for integers and numeric text
    #[test]
    fn prop_comparison_operators(value in 0..=50i64, threshold in 0..=50i64) {
        let cases: [(&str, bool); 6] = [
            (">", value > threshold),
            ("<", value < threshold),
            (">=", value >= threshold),
            ("<=", value <= threshold),
            ("==", value == threshold),
            ("!=", value != threshold),
        ];

        let as_int: Record = [("v".to_string(), FieldValue::Integer(value))].into_iter().collect();
        let as_text: Record = [("v".to_string(), FieldValue::String(value.to_string()))].into_iter().collect();

        for (symbol, expected) in cases {
            let rule = format!("v {} {}", symbol, threshold);
            let ast = parse(&rule).unwrap();
            prop_assert_eq!(evaluate(&ast, &as_int).unwrap(), expected, "Rule: {}", rule);
            prop_assert_eq!(evaluate(&ast, &as_text).unwrap(), expected, "Rule: {}", rule);
        }
    }

    /// Top-level AND/OR follow boolean logic
    #[test]
    fn prop_top_level_join(x in 0..=20i64, y in 0..=20i64, a in 0..=20i64, b in 0..=20i64) {
        let record: Record = [
            ("x".to_string(), FieldValue::Integer(x)),
            ("y".to_string(), FieldValue::Integer(y)),
        ]
        .into_iter()
        .collect();

        let ast = parse(&format!("x >= {} AND y >= {}", a, b)).unwrap();
        prop_assert_eq!(evaluate(&ast, &record).unwrap(), x >= a && y >= b);

        let ast = parse(&format!("x >= {} OR y >= {}", a, b)).unwrap();
        prop_assert_eq!(evaluate(&ast, &record).unwrap(), x >= a || y >= b);
    }

    /// Cached evaluation matches direct evaluation
    #[test]
    fn prop_cache_consistency(tree in numeric_tree_strategy(), record in numeric_record_strategy()) {
        let text = tree.to_string();
        let direct = evaluate(&parse(&text).unwrap(), &record).unwrap();

        prop_assert_eq!(check_rule(&text, &record, &EngineConfig::default()).unwrap(), direct);
        prop_assert_eq!(check_rule(&text, &record, &EngineConfig::default()).unwrap(), direct);
    }
}
