//! Rule parsing, combination and evaluation
//!
//! This module handles rule strings like
//! `"(age > 30 AND department == 'Sales') OR salary >= 50000"`:
//! parsing them into a binary AST, converting that AST to and from the
//! plain-data document form, merging trees, and evaluating them against
//! a record of field values.

mod ast;
pub mod cache;
mod combiner;
mod document;
mod evaluator;
pub mod normalize;
pub mod parser;
mod value;

#[cfg(test)]
mod property_tests;

pub use ast::*;
pub use cache::*;
pub use combiner::*;
pub use document::*;
pub use evaluator::*;
pub use normalize::*;
pub use parser::*;
pub use value::*;
