//! Rule Engine Core - rule expression parsing and evaluation
//!
//! Parses rule strings such as `"(age > 30 AND department == 'Sales')"`
//! into a binary AST, converts trees to and from the plain-data document
//! form used for storage, combines trees, and evaluates them against a
//! record of field values. Python bindings are available behind the
//! `python` feature.

pub mod config;
pub mod engine;
pub mod error;
pub mod rule;

#[cfg(feature = "python")]
mod python;

pub use config::{EngineConfig, MissingFieldPolicy};
pub use engine::RuleEngine;
pub use error::{Result, RuleError};
pub use rule::{
    combine, evaluate, evaluate_with, normalize_rule_text, parse, AstDocument, Comparator,
    Comparison, FieldValue, Literal, LogicalOp, Node, NodeKind, Operand, Record,
};
