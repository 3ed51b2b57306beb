//! Boundary normalization of user-entered rule text
//!
//! Users write equality as a single `=`. Before parsing, every `=` is
//! rewritten to `==`. The rewrite is purely textual, so text that already
//! uses `==` or `!=` comes out as `====` or `!==`; both parse, and both are
//! rejected as unknown comparators at evaluation.

/// Rewrite every `=` to `==`
pub fn normalize_rule_text(rule: &str) -> String {
    rule.replace('=', "==")
}
