//! Template AST
//!
//! The parsed shape of a template. Serializes to the JSON layout other
//! tooling expects: every node carries a `type` tag.

use serde::{Deserialize, Serialize};

/// Runtime helpers a compiled template needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Helper {
    /// Converts an interpolated value to text.
    #[serde(rename = "toDisplayString")]
    ToDisplayString,
}

impl Helper {
    pub fn name(&self) -> &'static str {
        match self {
            Helper::ToDisplayString => "toDisplayString",
        }
    }
}

/// A node of the template tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TemplateNode {
    Element {
        tag: String,
        children: Vec<TemplateNode>,
    },
    Text {
        content: String,
    },
    /// A `{{ expression }}` span. `content` is the trimmed expression.
    Interpolation {
        content: String,
    },
}

impl TemplateNode {
    pub fn element(tag: impl Into<String>, children: Vec<TemplateNode>) -> Self {
        TemplateNode::Element {
            tag: tag.into(),
            children,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        TemplateNode::Text {
            content: content.into(),
        }
    }

    pub fn interpolation(content: impl Into<String>) -> Self {
        TemplateNode::Interpolation {
            content: content.into(),
        }
    }

    pub fn children(&self) -> &[TemplateNode] {
        match self {
            TemplateNode::Element { children, .. } => children,
            _ => &[],
        }
    }
}

/// Top of a parsed template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRoot {
    pub children: Vec<TemplateNode>,
    /// Filled in by [`transform`](super::transform).
    #[serde(default)]
    pub helpers: Vec<Helper>,
}

impl TemplateRoot {
    /// The node code generation starts from: the first top-level child.
    pub fn codegen_node(&self) -> Option<&TemplateNode> {
        self.children.first()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Value {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
