//! Python bindings
//!
//! Rule documents cross the boundary as plain dicts with the stored
//! `{type, value, left, right}` shape; records are flat dicts of
//! bool/int/float/str values.

use crate::engine::RuleEngine;
use crate::rule::{self, AstDocument, FieldValue, NodeKind, Record};
use pyo3::exceptions::{PyKeyError, PyTypeError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict};

// ============================================================================
// Helper Functions
// ============================================================================

fn document_to_dict<'py>(py: Python<'py>, document: &AstDocument) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("type", document.kind.as_str())?;
    dict.set_item("value", &document.value)?;

    let left = document
        .left
        .as_deref()
        .map(|child| document_to_dict(py, child))
        .transpose()?;
    let right = document
        .right
        .as_deref()
        .map(|child| document_to_dict(py, child))
        .transpose()?;

    dict.set_item("left", left)?;
    dict.set_item("right", right)?;
    Ok(dict)
}

/// Read an optional key; missing keys and `None` are both absent
fn get_opt<'py>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<Option<Bound<'py, PyAny>>> {
    Ok(dict.get_item(key)?.filter(|value| !value.is_none()))
}

fn dict_to_document(obj: &Bound<'_, PyAny>) -> PyResult<Option<AstDocument>> {
    if obj.is_none() {
        return Ok(None);
    }

    let dict: Bound<'_, PyDict> = obj.extract()?;
    let tag: String = get_opt(&dict, "type")?
        .ok_or_else(|| PyKeyError::new_err("type"))?
        .extract()?;
    let value: String = get_opt(&dict, "value")?
        .ok_or_else(|| PyKeyError::new_err("value"))?
        .extract()?;

    let left = match get_opt(&dict, "left")? {
        Some(child) => dict_to_document(&child)?.map(Box::new),
        None => None,
    };
    let right = match get_opt(&dict, "right")? {
        Some(child) => dict_to_document(&child)?.map(Box::new),
        None => None,
    };

    Ok(Some(AstDocument {
        kind: NodeKind::from_tag(&tag)?,
        value,
        left,
        right,
    }))
}

fn require_document(obj: &Bound<'_, PyAny>) -> PyResult<AstDocument> {
    dict_to_document(obj)?.ok_or_else(|| PyTypeError::new_err("Rule AST must not be None"))
}

fn dict_to_record(data: &Bound<'_, PyDict>) -> PyResult<Record> {
    let mut record = Record::with_capacity(data.len());
    for (key, value) in data.iter() {
        let name: String = key.extract()?;
        // bool first: Python bools are also ints
        let field = if value.is_instance_of::<PyBool>() {
            FieldValue::Bool(value.extract()?)
        } else if let Ok(i) = value.extract::<i64>() {
            FieldValue::Integer(i)
        } else if let Ok(f) = value.extract::<f64>() {
            FieldValue::Float(f)
        } else if let Ok(s) = value.extract::<String>() {
            FieldValue::String(s)
        } else {
            return Err(PyTypeError::new_err(format!(
                "Unsupported value for field '{}'",
                name
            )));
        };
        record.insert(name, field);
    }
    Ok(record)
}

// ============================================================================
// Python Functions
// ============================================================================

/// Create a rule from user text and return its AST dict
///
/// Every `=` is rewritten to `==` before parsing.
#[pyfunction]
fn create_rule<'py>(py: Python<'py>, rule_string: &str) -> PyResult<Bound<'py, PyDict>> {
    let ast = RuleEngine::default().create_rule(rule_string)?;
    document_to_dict(py, &ast.to_document())
}

/// Combine AST dicts into one left-deep AND chain
#[pyfunction]
fn combine_rules<'py>(py: Python<'py>, rule_asts: Vec<Bound<'py, PyAny>>) -> PyResult<Bound<'py, PyDict>> {
    let documents = rule_asts
        .iter()
        .map(require_document)
        .collect::<PyResult<Vec<_>>>()?;
    let combined = RuleEngine::default().combine_documents(&documents)?;
    document_to_dict(py, &combined)
}

/// Evaluate an AST dict against a dict of field values
#[pyfunction]
fn evaluate_rule(ast: &Bound<'_, PyAny>, data: &Bound<'_, PyDict>) -> PyResult<bool> {
    let document = require_document(ast)?;
    let record = dict_to_record(data)?;
    Ok(RuleEngine::default().evaluate_document(&document, &record)?)
}

/// Apply the `=` to `==` rewrite used by `create_rule`
#[pyfunction]
fn normalize_rule_text(rule_string: &str) -> String {
    rule::normalize_rule_text(rule_string)
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[pymodule]
fn rule_engine_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(create_rule, m)?)?;
    m.add_function(wrap_pyfunction!(combine_rules, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_rule, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_rule_text, m)?)?;
    Ok(())
}
