//! Children Resolver for the VNode Compiler
//!
//! Cleans up a raw child list (whitespace-only text, empty expressions) and
//! decides the child flags the construction call carries.

use crate::attributes::ChildDirectives;
use crate::classify::{classify_node, VNode};
use crate::flags::ChildFlags;
use crate::ir::{ExprPart, Literal, TreeNode, Value};
use crate::validate::CompilerError;
use crate::whitespace::{decode_entities, normalize_text};

/// The childFlags argument: a known bit value or a run-time expression.
#[derive(Debug, Clone)]
pub enum ChildFlagValue {
    Known(u32),
    Dynamic(Value),
}

#[derive(Debug, Clone)]
pub struct ResolvedChildren {
    pub nodes: Vec<VNode>,
    pub child_flags: ChildFlagValue,
    /// Children must go through the runtime's normalization.
    pub requires_normalization: bool,
    /// A single text child is passed as a raw string (`$HasTextChildren`).
    pub collapse_text: bool,
}

impl ResolvedChildren {
    pub fn empty() -> Self {
        Self {
            nodes: vec![],
            child_flags: ChildFlagValue::Known(ChildFlags::HAS_INVALID_CHILDREN),
            requires_normalization: false,
            collapse_text: false,
        }
    }

    /// Known child flags, or None when decided at run time.
    pub fn known_flags(&self) -> Option<u32> {
        match self.child_flags {
            ChildFlagValue::Known(flags) => Some(flags),
            ChildFlagValue::Dynamic(_) => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHILD LIST CLEANUP
// ═══════════════════════════════════════════════════════════════════════════════

fn is_empty_expression(value: &Value) -> bool {
    match value {
        Value::Expr { expr } => match expr.as_plain_source() {
            Some(code) => {
                let code = code.trim();
                code.is_empty() || is_empty_array_literal(code)
            }
            None => false,
        },
        Value::Literal { .. } => false,
    }
}

fn is_empty_array_literal(code: &str) -> bool {
    code.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .is_some_and(|inner| inner.trim().is_empty())
}

/// Classifies the children that carry content, left to right.
pub fn classify_children(children: &[TreeNode]) -> Result<Vec<VNode>, CompilerError> {
    let mut nodes = Vec::with_capacity(children.len());

    for child in children {
        match child {
            TreeNode::Text { value } => {
                let text = normalize_text(&decode_entities(value));
                if !text.is_empty() {
                    nodes.push(VNode::Text(text));
                }
            }
            TreeNode::ExpressionSlot { value } => {
                if let Some(tree) = sole_tree(value) {
                    nodes.push(classify_node(tree)?);
                    continue;
                }
                match value {
                    Value::Literal {
                        literal: Literal::Str(s),
                    } => {
                        if !s.is_empty() {
                            nodes.push(VNode::Text(s.clone()));
                        }
                    }
                    _ if is_empty_expression(value) => {}
                    _ => nodes.push(VNode::Slot(value.clone())),
                }
            }
            TreeNode::Element(_) | TreeNode::Fragment(_) => {
                nodes.push(classify_node(child)?);
            }
        }
    }

    Ok(nodes)
}

/// The tree when an expression is nothing but one JSX literal.
fn sole_tree(value: &Value) -> Option<&TreeNode> {
    match value {
        Value::Expr { expr } => match expr.parts.as_slice() {
            [ExprPart::Tree { node, .. }] => Some(node),
            _ => None,
        },
        Value::Literal { .. } => None,
    }
}

/// Children taken from a `children` attribute when no JSX children exist.
pub fn children_from_prop(value: &Value) -> Result<Vec<VNode>, CompilerError> {
    if let Some(tree) = sole_tree(value) {
        return Ok(vec![classify_node(tree)?]);
    }
    Ok(match value {
        Value::Literal {
            literal: Literal::Null | Literal::Undefined,
        } => vec![],
        Value::Literal {
            literal: Literal::Str(s),
        } => vec![VNode::Text(s.clone())],
        _ => vec![VNode::Slot(value.clone())],
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHILD FLAG DECISION
// ═══════════════════════════════════════════════════════════════════════════════

pub fn resolve_children(nodes: Vec<VNode>, directives: &ChildDirectives) -> ResolvedChildren {
    if let Some(value) = &directives.child_flag {
        return ResolvedChildren {
            nodes,
            child_flags: ChildFlagValue::Dynamic(value.clone()),
            requires_normalization: false,
            collapse_text: false,
        };
    }

    if let Some(flags) = directives.explicit {
        let collapse_text = flags == ChildFlags::HAS_TEXT_CHILDREN
            && matches!(nodes.as_slice(), [VNode::Text(_)]);
        return ResolvedChildren {
            nodes,
            child_flags: ChildFlagValue::Known(flags),
            requires_normalization: false,
            collapse_text,
        };
    }

    if nodes.is_empty() {
        return ResolvedChildren::empty();
    }

    let has_slot = nodes.iter().any(|n| matches!(n, VNode::Slot(_)));
    let keyed = nodes.iter().filter(|n| n.key().is_some()).count();

    let decided = if has_slot {
        None
    } else if nodes.len() > 1 && keyed == nodes.len() {
        Some(ChildFlags::HAS_KEYED_CHILDREN)
    } else if nodes.len() > 1 && keyed == 0 {
        Some(ChildFlags::HAS_NON_KEYED_CHILDREN)
    } else if nodes.len() == 1 {
        Some(ChildFlags::HAS_VNODE_CHILDREN)
    } else {
        None
    };

    match decided {
        Some(flags) => ResolvedChildren {
            nodes,
            child_flags: ChildFlagValue::Known(flags),
            requires_normalization: false,
            collapse_text: false,
        },
        None => ResolvedChildren {
            nodes,
            child_flags: ChildFlagValue::Known(ChildFlags::UNKNOWN_CHILDREN),
            requires_normalization: true,
            collapse_text: false,
        },
    }
}
