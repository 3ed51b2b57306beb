//! Engine configuration
//!
//! Loaded from JSON or built in code; every field has a default.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// What an operand does when its field is absent from the record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Fail evaluation with an evaluation error
    #[default]
    Reject,
    /// `!=` holds, every other comparator fails
    NoMatch,
}

/// Rule engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub missing_field: MissingFieldPolicy,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_missing_field(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_field = policy;
        self
    }
}
