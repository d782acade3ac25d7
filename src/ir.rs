//! Tree IR for the VNode Compiler
//!
//! The parsed form of one embedded JSX literal. Produced by the parser (or
//! built directly by library callers) and consumed read-only by the
//! classifier.

use serde::{Deserialize, Serialize};

use crate::validate::SourceLocation;

// ═══════════════════════════════════════════════════════════════════════════════
// VALUES
// ═══════════════════════════════════════════════════════════════════════════════

/// A compile-time literal. Numbers keep their source spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Literal {
    Str(String),
    Num(String),
    Bool(bool),
    Null,
    Undefined,
}

/// Lexical position of a JSX site: top level of the module, or inside a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    Module,
    Function,
}

/// One piece of an embedded expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ExprPart {
    Source { code: String },
    Tree { node: Box<TreeNode>, scope: Scope },
}

/// Source text of an embedded expression. JSX nested inside the expression
/// is kept as trees so it can be compiled in traversal order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Expr {
    pub parts: Vec<ExprPart>,
}

impl Expr {
    pub fn source(code: impl Into<String>) -> Self {
        Self {
            parts: vec![ExprPart::Source { code: code.into() }],
        }
    }

    /// The source text when the expression holds no nested trees.
    pub fn as_plain_source(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [ExprPart::Source { code }] => Some(code.as_str()),
            _ => None,
        }
    }

    pub fn has_nested_trees(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, ExprPart::Tree { .. }))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Value {
    Literal { literal: Literal },
    Expr { expr: Expr },
}

impl Value {
    pub fn literal(literal: Literal) -> Self {
        Value::Literal { literal }
    }

    pub fn expr(code: impl Into<String>) -> Self {
        Value::Expr {
            expr: Expr::source(code),
        }
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::literal(Literal::Str(s.into()))
    }

    /// Builds a value from expression source text, recognizing literals.
    pub fn from_source(code: &str) -> Self {
        match crate::static_eval::eval_literal(code) {
            Some(literal) => Value::literal(literal),
            None => Value::expr(code.trim()),
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Value::Literal { literal } => Some(literal),
            Value::Expr { .. } => None,
        }
    }

    pub fn is_null_literal(&self) -> bool {
        matches!(
            self,
            Value::Literal {
                literal: Literal::Null | Literal::Undefined
            }
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ATTRIBUTES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AttrName {
    Plain { name: String },
    Namespaced { namespace: String, name: String },
}

impl AttrName {
    pub fn plain(name: impl Into<String>) -> Self {
        AttrName::Plain { name: name.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Attribute {
    Named {
        name: AttrName,
        value: Value,
        #[serde(default)]
        location: SourceLocation,
    },
    Spread {
        argument: Expr,
        #[serde(default)]
        location: SourceLocation,
    },
}

impl Attribute {
    pub fn named(name: &str, value: Value) -> Self {
        Attribute::Named {
            name: AttrName::plain(name),
            value,
            location: SourceLocation::default(),
        }
    }

    pub fn spread(code: &str) -> Self {
        Attribute::Spread {
            argument: Expr::source(code),
            location: SourceLocation::default(),
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            Attribute::Named { location, .. } | Attribute::Spread { location, .. } => location,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE NODES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub tag: String,
    pub is_component: bool,
    pub attrs: Vec<Attribute>,
    pub children: Vec<TreeNode>,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentNode {
    pub key: Option<Value>,
    pub children: Vec<TreeNode>,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TreeNode {
    Element(ElementNode),
    Text { value: String },
    ExpressionSlot { value: Value },
    Fragment(FragmentNode),
}

impl TreeNode {
    /// Element whose kind is decided from the tag spelling.
    pub fn element(tag: &str, attrs: Vec<Attribute>, children: Vec<TreeNode>) -> Self {
        TreeNode::Element(ElementNode {
            tag: tag.to_string(),
            is_component: is_component_tag(tag),
            attrs,
            children,
            location: SourceLocation::default(),
        })
    }

    pub fn fragment(children: Vec<TreeNode>) -> Self {
        TreeNode::Fragment(FragmentNode {
            key: None,
            children,
            location: SourceLocation::default(),
        })
    }

    pub fn text(value: &str) -> Self {
        TreeNode::Text {
            value: value.to_string(),
        }
    }

    pub fn slot(code: &str) -> Self {
        TreeNode::ExpressionSlot {
            value: Value::from_source(code),
        }
    }
}

/// Component tags start with an upper-case letter or are member/compound names.
pub fn is_component_tag(tag: &str) -> bool {
    if tag.contains('.') {
        return true;
    }
    tag.chars().next().is_some_and(|c| c.is_uppercase())
}

/// Tag names that denote a fragment rather than a component.
pub fn is_fragment_tag(tag: &str) -> bool {
    tag == "Fragment" || tag.ends_with(".Fragment")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_component_tag() {
        assert!(is_component_tag("Button"));
        assert!(is_component_tag("ui.button"));
        assert!(!is_component_tag("div"));
        assert!(!is_component_tag("svg:rect"));
    }

    #[test]
    fn test_value_from_source() {
        assert!(Value::from_source("\"x\"").as_literal().is_some());
        assert!(Value::from_source("undefined").as_literal().is_some());
        assert!(Value::from_source("null").is_null_literal());
        assert!(Value::from_source("a + b").as_literal().is_none());
    }

    #[test]
    fn test_fragment_tags() {
        assert!(is_fragment_tag("Fragment"));
        assert!(is_fragment_tag("Inferno.Fragment"));
        assert!(!is_fragment_tag("Frag"));
    }
}
