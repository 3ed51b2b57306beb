//! Rule engine facade
//!
//! Bundles the configuration with the operations external collaborators
//! call: create a rule from user text, rebuild a stored rule, evaluate it,
//! and combine several rules.

use crate::config::EngineConfig;
use crate::error::{Result, RuleError};
use crate::rule::{self, AstDocument, Node, Record};
use tracing::debug;

/// Rule engine
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    config: EngineConfig,
}

impl RuleEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build a rule from user-entered text: normalize `=` to `==`, then parse
    pub fn create_rule(&self, rule_string: &str) -> Result<Node> {
        if rule_string.trim().is_empty() {
            return Err(RuleError::Syntax("No rule_string provided".to_string()));
        }

        let normalized = rule::normalize_rule_text(rule_string);
        debug!(rule = %normalized, "creating rule");
        rule::get_or_parse(&normalized)
    }

    /// Parse already-normalized rule text, reusing cached trees
    pub fn parse(&self, rule_string: &str) -> Result<Node> {
        rule::get_or_parse(rule_string)
    }

    /// Parse (cached) and evaluate rule text with this engine's configuration
    pub fn check(&self, rule_string: &str, record: &Record) -> Result<bool> {
        rule::check_rule(rule_string, record, &self.config)
    }

    pub fn evaluate(&self, ast: &Node, record: &Record) -> Result<bool> {
        rule::evaluate_with(ast, record, &self.config)
    }

    /// Rebuild a stored document and evaluate it
    pub fn evaluate_document(&self, document: &AstDocument, record: &Record) -> Result<bool> {
        let ast = Node::try_from(document.clone())?;
        self.evaluate(&ast, record)
    }

    pub fn combine(&self, rules: Vec<Node>) -> Result<Node> {
        rule::combine(rules)
    }

    /// Combine stored documents and return the merged document
    pub fn combine_documents(&self, documents: &[AstDocument]) -> Result<AstDocument> {
        let rules = documents
            .iter()
            .cloned()
            .map(Node::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(self.combine(rules)?.to_document())
    }

    pub fn to_json(&self, ast: &Node) -> serde_json::Value {
        ast.to_json()
    }

    /// Rebuild a tree from JSON; a `null` document is an error here
    pub fn from_json(&self, value: serde_json::Value) -> Result<Node> {
        Node::from_json(value)?
            .ok_or_else(|| RuleError::Document("Rule document is null".to_string()))
    }
}
