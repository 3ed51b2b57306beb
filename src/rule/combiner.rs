//! Rule combination

use crate::error::{Result, RuleError};
use crate::rule::ast::Node;

/// Merge rules into a left-deep `AND` chain: `((r1 AND r2) AND r3) ...`
///
/// A single rule is returned unchanged.
pub fn combine<I>(rules: I) -> Result<Node>
where
    I: IntoIterator<Item = Node>,
{
    let mut rules = rules.into_iter();
    let first = rules.next().ok_or_else(|| {
        RuleError::InvalidArgument("No rule ASTs provided for combination".to_string())
    })?;

    Ok(rules.fold(first, Node::and))
}
