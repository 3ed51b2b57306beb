//! Abstract Syntax Tree for rule expressions

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static INTEGER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static DECIMAL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+$").unwrap());

/// AST node for rule expressions
///
/// Trees are strictly binary: an operator always owns exactly two subtrees.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Leaf comparison like `age > 30`
    Operand(Operand),
    /// Logical combination of two subtrees
    Operator {
        op: LogicalOp,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn comparison(field: impl Into<String>, comparator: Comparator, literal: impl Into<String>) -> Self {
        Node::Operand(Operand::Comparison(Comparison {
            field: field.into(),
            comparator,
            literal: literal.into(),
        }))
    }

    pub fn operator(op: LogicalOp, left: Node, right: Node) -> Self {
        Node::Operator {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Node, right: Node) -> Self {
        Self::operator(LogicalOp::And, left, right)
    }

    pub fn or(left: Node, right: Node) -> Self {
        Self::operator(LogicalOp::Or, left, right)
    }

    pub fn is_operand(&self) -> bool {
        matches!(self, Node::Operand(_))
    }

    /// Number of leaf comparisons in the tree
    pub fn operand_count(&self) -> usize {
        match self {
            Node::Operand(_) => 1,
            Node::Operator { left, right, .. } => left.operand_count() + right.operand_count(),
        }
    }

    /// Height of the tree; a single operand has depth 1
    pub fn depth(&self) -> usize {
        match self {
            Node::Operand(_) => 1,
            Node::Operator { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Renders the tree back into rule text, parenthesizing every operator
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Operand(operand) => write!(f, "{}", operand),
            Node::Operator { op, left, right } => write!(f, "({} {} {})", left, op, right),
        }
    }
}

/// Payload of a leaf node
///
/// Stored documents are not validated on load, so an operand whose packed
/// value does not split into three fields is kept verbatim and rejected
/// only when evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Comparison(Comparison),
    Malformed(String),
}

impl Operand {
    /// Split a packed `"<field> <comparator> <literal>"` value.
    ///
    /// Splits on the first two single spaces; the literal keeps any
    /// remaining spaces.
    pub fn unpack(packed: &str) -> Self {
        let mut parts = packed.splitn(3, ' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(field), Some(comparator), Some(literal)) => Operand::Comparison(Comparison {
                field: field.to_string(),
                comparator: Comparator::from_symbol(comparator),
                literal: literal.to_string(),
            }),
            _ => Operand::Malformed(packed.to_string()),
        }
    }

    /// Packed single-string form used by stored documents
    pub fn pack(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Comparison(cmp) => write!(f, "{}", cmp),
            Operand::Malformed(raw) => f.write_str(raw),
        }
    }
}

/// Single comparison: field, comparator and literal text
///
/// The literal is kept as text; its type is recovered with
/// [`Literal::from_text`] when the comparison is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub field: String,
    pub comparator: Comparator,
    pub literal: String,
}

impl Comparison {
    pub fn literal_value(&self) -> Literal {
        Literal::from_text(&self.literal)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.comparator, self.literal)
    }
}

/// Comparison operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparator {
    /// Equal (==)
    Equal,
    /// Not equal (!=)
    NotEqual,
    /// Greater than (>)
    Greater,
    /// Less than (<)
    Less,
    /// Greater than or equal (>=)
    GreaterEqual,
    /// Less than or equal (<=)
    LessEqual,
    /// Anything else; rejected at evaluation
    Other(String),
}

impl Comparator {
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "==" => Comparator::Equal,
            "!=" => Comparator::NotEqual,
            ">" => Comparator::Greater,
            "<" => Comparator::Less,
            ">=" => Comparator::GreaterEqual,
            "<=" => Comparator::LessEqual,
            other => Comparator::Other(other.to_string()),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
            Comparator::Greater => ">",
            Comparator::Less => "<",
            Comparator::GreaterEqual => ">=",
            Comparator::LessEqual => "<=",
            Comparator::Other(symbol) => symbol,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Logical operators joining two subtrees
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    /// Any other token accepted by the parenthesized grammar rule
    Other(String),
}

impl LogicalOp {
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "AND" => LogicalOp::And,
            "OR" => LogicalOp::Or,
            other => LogicalOp::Other(other.to_string()),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
            LogicalOp::Other(symbol) => symbol,
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Typed literal recovered from text
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
}

impl Literal {
    /// Coerce text: digits become an integer, `digits.digits` a float,
    /// anything else (including digit runs too large for `i64`) a string.
    pub fn from_text(text: &str) -> Self {
        if INTEGER_PATTERN.is_match(text) {
            if let Ok(i) = text.parse::<i64>() {
                return Literal::Integer(i);
            }
        } else if DECIMAL_PATTERN.is_match(text) {
            if let Ok(f) = text.parse::<f64>() {
                return Literal::Float(f);
            }
        }
        Literal::String(text.to_string())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => f.write_str(&format_float(*x)),
            Literal::String(s) => f.write_str(s),
        }
    }
}

/// Shortest round-trip text for a float, in the same shape as Python's
/// `repr`: positional with a `.0` suffix for exponents in `-4..16`,
/// scientific with a signed two-digit exponent otherwise.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..16).contains(&exponent) {
        let text = value.to_string();
        if text.contains('.') {
            text
        } else {
            format!("{}.0", text)
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}
