//! Codegen module for the VNode Compiler
//!
//! Emits construction calls for classified nodes. Positional layouts:
//!
//! - element:   `createVNode(flags, "tag", className, children, childFlags, props, key, ref)`
//! - component: `createComponentVNode(flags, Type, props, key, ref)`
//! - fragment:  `createFragment(children, childFlags, key)`
//! - text:      `createTextVNode("value")`
//!
//! Trailing arguments equal to the runtime default are dropped; absent
//! arguments before the last present one are written out as their default.

use crate::attributes::{AttributeDescriptor, Category};
use crate::children::{ChildFlagValue, ResolvedChildren};
use crate::classify::{classify_node, ComponentVNode, ElementVNode, FragmentVNode, VNode};
use crate::context::CompilationContext;
use crate::flags::ChildFlags;
use crate::hoist::{cached_site, should_cache, template_site, wrap_root, Nesting};
use crate::ir::{Expr, ExprPart, Literal, Scope, TreeNode, Value};
use crate::options::Helper;
use crate::signature::Signature;
use crate::validate::CompilerError;

// ═══════════════════════════════════════════════════════════════════════════════
// LITERALS
// ═══════════════════════════════════════════════════════════════════════════════

fn escape_js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Double-quoted JS string literal.
pub fn js_string(s: &str) -> String {
    format!("\"{}\"", escape_js_string(s))
}

pub fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Str(s) => js_string(s),
        Literal::Num(n) => n.clone(),
        Literal::Bool(b) => b.to_string(),
        Literal::Null => "null".to_string(),
        Literal::Undefined => "undefined".to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINT
// ═══════════════════════════════════════════════════════════════════════════════

/// Compiles one embedded tree literal rooted at `tree` into an expression.
pub fn compile_tree(
    tree: &TreeNode,
    scope: Scope,
    ctx: &mut CompilationContext,
) -> Result<String, CompilerError> {
    let node = classify_node(tree)?;
    let cached = node.is_static() && is_hoistable(&node) && should_cache(ctx, scope);
    let code = emit_node(&node, scope, ctx, Nesting::Site)?;
    Ok(wrap_root(code, cached))
}

fn is_hoistable(node: &VNode) -> bool {
    matches!(node, VNode::Element(_) | VNode::Fragment(_))
}

/// Source text of an embedded expression with nested trees compiled in place.
pub fn emit_expr(expr: &Expr, ctx: &mut CompilationContext) -> Result<String, CompilerError> {
    let mut out = String::new();
    for part in &expr.parts {
        match part {
            ExprPart::Source { code } => out.push_str(code),
            ExprPart::Tree { node, scope } => out.push_str(&compile_tree(node, *scope, ctx)?),
        }
    }
    Ok(out)
}

/// Literals are written in place. Expressions become template arguments
/// when a template is being built; trees nested in them compile on their own.
fn emit_value(value: &Value, ctx: &mut CompilationContext) -> Result<String, CompilerError> {
    match value {
        Value::Literal { literal } => Ok(render_literal(literal)),
        Value::Expr { expr } => {
            let saved = ctx.suspend_params();
            let code = emit_expr(expr, ctx);
            ctx.resume_params(saved);
            Ok(ctx.bind_param(code?))
        }
    }
}

/// Like `emit_value`, but literals are template arguments too. Used where
/// the signature only records a placeholder.
fn emit_param(value: &Value, ctx: &mut CompilationContext) -> Result<String, CompilerError> {
    match value {
        Value::Literal { literal } => Ok(ctx.bind_param(render_literal(literal))),
        Value::Expr { .. } => emit_value(value, ctx),
    }
}

/// A positional slot that defaults to `null` when absent.
fn optional_value(
    value: &Option<Value>,
    ctx: &mut CompilationContext,
) -> Result<Option<String>, CompilerError> {
    match value {
        Some(v) if !v.is_null_literal() => Ok(Some(emit_value(v, ctx)?)),
        _ => Ok(None),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ARGUMENT ELISION
// ═══════════════════════════════════════════════════════════════════════════════

/// Joins positional arguments. Everything after the last present argument
/// is omitted unless `define_all` asks for every slot.
fn finish_call(callee: &str, args: Vec<Option<String>>, defaults: &[&str], define_all: bool) -> String {
    let last = if define_all {
        args.len()
    } else {
        args.iter().rposition(Option::is_some).map_or(0, |i| i + 1)
    };

    let rendered: Vec<String> = args
        .into_iter()
        .take(last)
        .enumerate()
        .map(|(i, arg)| arg.unwrap_or_else(|| defaults[i].to_string()))
        .collect();

    format!("{}({})", callee, rendered.join(", "))
}

const ELEMENT_DEFAULTS: [&str; 8] = ["", "", "null", "null", "1", "null", "null", "null"];
const COMPONENT_DEFAULTS: [&str; 5] = ["", "", "null", "null", "null"];
const FRAGMENT_DEFAULTS: [&str; 3] = ["null", "1", "null"];

fn child_flags_arg(
    flags: &ChildFlagValue,
    ctx: &mut CompilationContext,
) -> Result<Option<String>, CompilerError> {
    match flags {
        ChildFlagValue::Known(ChildFlags::HAS_INVALID_CHILDREN) => Ok(None),
        ChildFlagValue::Known(n) => Ok(Some(n.to_string())),
        ChildFlagValue::Dynamic(value) => Ok(Some(emit_param(value, ctx)?)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODES
// ═══════════════════════════════════════════════════════════════════════════════

fn emit_node(
    node: &VNode,
    scope: Scope,
    ctx: &mut CompilationContext,
    nesting: Nesting,
) -> Result<String, CompilerError> {
    if let Some(signature) = hoistable_signature(node) {
        if nesting != Nesting::Skeleton && should_cache(ctx, scope) {
            if signature.is_static() {
                return cached_site(ctx, signature, |ctx| {
                    emit_direct(node, scope, ctx, Nesting::Skeleton)
                });
            }
            if nesting == Nesting::Site && signature.slot_count() > 0 {
                return template_site(ctx, signature, |ctx| {
                    emit_direct(node, scope, ctx, Nesting::Template)
                });
            }
        }
    }
    emit_direct(node, scope, ctx, nesting)
}

fn hoistable_signature(node: &VNode) -> Option<Signature> {
    match node {
        VNode::Element(el) => el.signature.clone(),
        VNode::Fragment(frag) => frag.signature.clone(),
        _ => None,
    }
}

fn emit_direct(
    node: &VNode,
    scope: Scope,
    ctx: &mut CompilationContext,
    nesting: Nesting,
) -> Result<String, CompilerError> {
    match node {
        VNode::Element(el) => emit_element(el, scope, ctx, nesting),
        VNode::Component(c) => emit_component(c, scope, ctx),
        VNode::Fragment(frag) => emit_fragment(frag, scope, ctx, nesting),
        VNode::Text(text) => {
            let callee = ctx.helper(Helper::CreateTextVNode);
            Ok(format!("{}({})", callee, js_string(text)))
        }
        VNode::Slot(value) => emit_param(value, ctx),
    }
}

fn emit_element(
    el: &ElementVNode,
    scope: Scope,
    ctx: &mut CompilationContext,
    nesting: Nesting,
) -> Result<String, CompilerError> {
    let callee = ctx.helper(Helper::CreateVNode);
    let normalize_children = el.children.requires_normalization;

    let class_name = optional_value(&el.class_name, ctx)?;
    let (children, child_flags) = if normalize_children {
        (None, None)
    } else {
        (
            emit_children(&el.children, scope, ctx, nesting)?,
            child_flags_arg(&el.children.child_flags, ctx)?,
        )
    };
    let props = emit_props_object(&el.props, vec![], ctx)?;
    let key = optional_value(&el.key, ctx)?;
    let ref_value = optional_value(&el.ref_value, ctx)?;

    let args = vec![
        Some(el.flags.to_string()),
        Some(js_string(&el.tag)),
        class_name,
        children,
        child_flags,
        props,
        key,
        ref_value,
    ];
    let mut call = finish_call(&callee, args, &ELEMENT_DEFAULTS, ctx.options.define_all_arguments);

    if normalize_children {
        let children = emit_child_list(&el.children.nodes, scope, ctx, nesting)?;
        let normalize = ctx.helper(Helper::NormalizeChildren);
        call = format!("{}({}, {})", normalize, call, children);
    }
    if el.normalize_props {
        let normalize = ctx.helper(Helper::NormalizeProps);
        call = format!("{}({})", normalize, call);
    }
    Ok(call)
}

fn emit_component(
    c: &ComponentVNode,
    scope: Scope,
    ctx: &mut CompilationContext,
) -> Result<String, CompilerError> {
    let callee = ctx.helper(Helper::CreateComponentVNode);

    let extra = match c.children.as_slice() {
        [] => vec![],
        [single] => vec![("children".to_string(), emit_component_child(single, scope, ctx)?)],
        many => {
            let mut items = Vec::with_capacity(many.len());
            for child in many {
                items.push(emit_component_child(child, scope, ctx)?);
            }
            vec![("children".to_string(), format!("[{}]", items.join(", ")))]
        }
    };
    let props = emit_props_object(&c.props, extra, ctx)?;
    let key = optional_value(&c.key, ctx)?;
    let ref_value = if c.hooks.is_empty() {
        optional_value(&c.ref_value, ctx)?
    } else {
        emit_props_object(&c.hooks, vec![], ctx)?
    };

    let args = vec![
        Some(c.flags.to_string()),
        Some(c.tag.clone()),
        props,
        key,
        ref_value,
    ];
    let mut call = finish_call(&callee, args, &COMPONENT_DEFAULTS, ctx.options.define_all_arguments);

    if c.normalize_props {
        let normalize = ctx.helper(Helper::NormalizeProps);
        call = format!("{}({})", normalize, call);
    }
    Ok(call)
}

/// Component children are props: text stays a plain string.
fn emit_component_child(
    node: &VNode,
    scope: Scope,
    ctx: &mut CompilationContext,
) -> Result<String, CompilerError> {
    match node {
        VNode::Text(text) => Ok(js_string(text)),
        _ => emit_node(node, scope, ctx, Nesting::Site),
    }
}

fn emit_fragment(
    frag: &FragmentVNode,
    scope: Scope,
    ctx: &mut CompilationContext,
    nesting: Nesting,
) -> Result<String, CompilerError> {
    let callee = ctx.helper(Helper::CreateFragment);

    let children = emit_children(&frag.children, scope, ctx, nesting)?;
    let child_flags = if children.is_none() {
        None
    } else {
        child_flags_arg(&frag.children.child_flags, ctx)?
    };
    let key = optional_value(&frag.key, ctx)?;

    Ok(finish_call(
        &callee,
        vec![children, child_flags, key],
        &FRAGMENT_DEFAULTS,
        ctx.options.define_all_arguments,
    ))
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHILDREN
// ═══════════════════════════════════════════════════════════════════════════════

/// The children argument, or None when there are no children.
fn emit_children(
    children: &ResolvedChildren,
    scope: Scope,
    ctx: &mut CompilationContext,
    nesting: Nesting,
) -> Result<Option<String>, CompilerError> {
    if children.nodes.is_empty() {
        return Ok(None);
    }
    if children.collapse_text {
        if let [VNode::Text(text)] = children.nodes.as_slice() {
            return Ok(Some(js_string(text)));
        }
    }

    // Explicit multi-child flags expect an array around a lone vnode.
    let wants_array = matches!(
        children.child_flags,
        ChildFlagValue::Known(flags) if flags & ChildFlags::MULTIPLE_CHILDREN != 0
    );
    match children.nodes.as_slice() {
        [single @ VNode::Slot(_)] => emit_node(single, scope, ctx, nesting).map(Some),
        [single] if !wants_array => emit_node(single, scope, ctx, nesting).map(Some),
        nodes => {
            let mut items = Vec::with_capacity(nodes.len());
            for node in nodes {
                items.push(emit_node(node, scope, ctx, nesting)?);
            }
            Ok(Some(format!("[{}]", items.join(", "))))
        }
    }
}

/// Children handed to `normalizeChildren`: one child as-is, several as an array.
fn emit_child_list(
    nodes: &[VNode],
    scope: Scope,
    ctx: &mut CompilationContext,
    nesting: Nesting,
) -> Result<String, CompilerError> {
    match nodes {
        [single] => emit_node(single, scope, ctx, nesting),
        _ => {
            let mut items = Vec::with_capacity(nodes.len());
            for node in nodes {
                items.push(emit_node(node, scope, ctx, nesting)?);
            }
            Ok(format!("[{}]", items.join(", ")))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPS
// ═══════════════════════════════════════════════════════════════════════════════

/// Object literal for the props slot in declaration order, with `extra`
/// entries appended. None when there is nothing to put in it.
fn emit_props_object(
    props: &[AttributeDescriptor],
    extra: Vec<(String, String)>,
    ctx: &mut CompilationContext,
) -> Result<Option<String>, CompilerError> {
    if props.is_empty() && extra.is_empty() {
        return Ok(None);
    }

    let mut entries = Vec::with_capacity(props.len() + extra.len());
    for prop in props {
        let value = emit_value(&prop.value, ctx)?;
        if prop.category == Category::Spread {
            entries.push(format!("...{}", value));
        } else {
            entries.push(format!("{}: {}", js_string(&prop.name), value));
        }
    }
    for (name, value) in extra {
        entries.push(format!("{}: {}", name, value));
    }

    Ok(Some(format!("{{{}}}", entries.join(", "))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_js_string() {
        assert_eq!(js_string("hello\"world"), "\"hello\\\"world\"");
        assert_eq!(js_string("line1\nline2"), "\"line1\\nline2\"");
        assert_eq!(js_string("a\\b"), "\"a\\\\b\"");
    }

    #[test]
    fn test_render_literal() {
        assert_eq!(render_literal(&Literal::Num("0x10".into())), "0x10");
        assert_eq!(render_literal(&Literal::Bool(false)), "false");
        assert_eq!(render_literal(&Literal::Undefined), "undefined");
    }

    #[test]
    fn test_finish_call_elision() {
        let args = vec![
            Some("1".to_string()),
            Some("\"div\"".to_string()),
            None,
            None,
            None,
            Some("{}".to_string()),
            None,
            None,
        ];
        assert_eq!(
            finish_call("createVNode", args.clone(), &ELEMENT_DEFAULTS, false),
            "createVNode(1, \"div\", null, null, 1, {})"
        );
        assert_eq!(
            finish_call("createVNode", args, &ELEMENT_DEFAULTS, true),
            "createVNode(1, \"div\", null, null, 1, {}, null, null)"
        );
        assert_eq!(
            finish_call("createFragment", vec![None, None, None], &FRAGMENT_DEFAULTS, false),
            "createFragment()"
        );
    }
}
