//! Plain-data form of the AST
//!
//! This is the shape external collaborators persist:
//! `{"type": "operator"|"operand", "value": ..., "left": ..., "right": ...}`.
//! Operands carry their comparison packed into `value`; `left` and `right`
//! are always present and `null` for operands.

use crate::error::{Result, RuleError};
use crate::rule::ast::{LogicalOp, Node, Operand};
use serde::{Deserialize, Serialize};

/// Node tag in the plain-data form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Operator,
    Operand,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Operator => "operator",
            NodeKind::Operand => "operand",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "operator" => Ok(NodeKind::Operator),
            "operand" => Ok(NodeKind::Operand),
            other => Err(RuleError::Document(format!("Unknown node type: {}", other))),
        }
    }
}

/// Serialized AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstDocument {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub value: String,
    #[serde(default)]
    pub left: Option<Box<AstDocument>>,
    #[serde(default)]
    pub right: Option<Box<AstDocument>>,
}

impl AstDocument {
    pub fn operand(packed: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Operand,
            value: packed.into(),
            left: None,
            right: None,
        }
    }

    pub fn operator(value: impl Into<String>, left: AstDocument, right: AstDocument) -> Self {
        Self {
            kind: NodeKind::Operator,
            value: value.into(),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }
}

impl Node {
    /// Serialize into the plain-data form
    pub fn to_document(&self) -> AstDocument {
        match self {
            Node::Operand(operand) => AstDocument::operand(operand.pack()),
            Node::Operator { op, left, right } => {
                AstDocument::operator(op.symbol(), left.to_document(), right.to_document())
            }
        }
    }

    /// Rebuild a tree from its plain-data form; `None` maps to `None`.
    ///
    /// Operator and comparator symbols are not checked here. Children on an
    /// operand are ignored. An operator missing a child cannot form a
    /// binary tree and is rejected.
    pub fn from_document(document: Option<&AstDocument>) -> Result<Option<Node>> {
        let Some(document) = document else {
            return Ok(None);
        };

        let node = match document.kind {
            NodeKind::Operand => Node::Operand(Operand::unpack(&document.value)),
            NodeKind::Operator => {
                let left = Self::required_child(document.left.as_deref(), "left", &document.value)?;
                let right = Self::required_child(document.right.as_deref(), "right", &document.value)?;
                Node::Operator {
                    op: LogicalOp::from_symbol(&document.value),
                    left: Box::new(left),
                    right: Box::new(right),
                }
            }
        };

        Ok(Some(node))
    }

    fn required_child(child: Option<&AstDocument>, side: &str, value: &str) -> Result<Node> {
        Node::from_document(child)?.ok_or_else(|| {
            RuleError::Document(format!("Operator '{}' is missing its {} child", value, side))
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        // AstDocument holds only strings, options and a unit enum
        serde_json::to_value(self.to_document()).unwrap_or(serde_json::Value::Null)
    }

    /// Rebuild a tree from a JSON document; `null` maps to `None`.
    pub fn from_json(value: serde_json::Value) -> Result<Option<Node>> {
        let document: Option<AstDocument> = serde_json::from_value(value)?;
        Node::from_document(document.as_ref())
    }

    /// Rebuild a tree from JSON text; `null` maps to `None`.
    ///
    /// Combined rules nest one level per fold step, so the parser's
    /// recursion limit is lifted and the stack grows on demand instead.
    pub fn from_json_str(text: &str) -> Result<Option<Node>> {
        let mut de = serde_json::Deserializer::from_str(text);
        de.disable_recursion_limit();
        let document = Option::<AstDocument>::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Node::from_document(document.as_ref())
    }
}

impl From<&Node> for AstDocument {
    fn from(node: &Node) -> Self {
        node.to_document()
    }
}

impl From<Node> for AstDocument {
    fn from(node: Node) -> Self {
        node.to_document()
    }
}

impl TryFrom<AstDocument> for Node {
    type Error = RuleError;

    fn try_from(document: AstDocument) -> Result<Self> {
        // Some(document) always yields Some(node)
        Node::from_document(Some(&document))?
            .ok_or_else(|| RuleError::Document("Empty document".to_string()))
    }
}

impl Serialize for Node {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let document = AstDocument::deserialize(deserializer)?;
        Node::try_from(document).map_err(serde::de::Error::custom)
    }
}
