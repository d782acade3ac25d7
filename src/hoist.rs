//! Hoist / Cache Inserter for the VNode Compiler
//!
//! A maximal static subtree inside a function body is built once into a
//! module-scope slot. Every site of the same signature reads that slot:
//!
//! ```text
//! _bp0 || (_bp0 = createVNode(1, "div", null, createTextVNode("hi"), 2))
//! ```
//!
//! A maximal subtree whose only run-time parts are attribute values and
//! expression children becomes a module-scope template. Sites of the same
//! shape call it with their own values, in the order the inline code would
//! have evaluated them:
//!
//! ```text
//! function _tpl1(v0) { return createVNode(1, "li", null, v0, 2); }
//! _tpl1(item.label)
//! ```
//!
//! At module top level the construction runs once anyway, so the call is
//! emitted directly.

use log::debug;

use crate::context::CompilationContext;
use crate::ir::Scope;
use crate::signature::Signature;
use crate::validate::CompilerError;

const SLOT_PREFIX: &str = "_bp";
const TEMPLATE_PREFIX: &str = "_tpl";

pub fn slot_name(id: u32) -> String {
    format!("{}{}", SLOT_PREFIX, id)
}

pub fn template_name(id: u32) -> String {
    format!("{}{}", TEMPLATE_PREFIX, id)
}

/// Name of a template's `index`th parameter.
pub fn param_name(index: usize) -> String {
    format!("v{}", index)
}

/// Where a node is emitted relative to blueprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    /// A tree root or a component child.
    Site,
    /// Inside a template body: static parts may still use slots.
    Template,
    /// Inside a static skeleton: nothing is cached again.
    Skeleton,
}

/// Whether subtrees reached at `scope` are shared through blueprints.
pub fn should_cache(ctx: &CompilationContext, scope: Scope) -> bool {
    ctx.options.optimize_static_vnodes && scope == Scope::Function
}

/// Returns the read-or-initialize expression for `signature`, building the
/// skeleton only the first time the signature is seen in this file.
pub fn cached_site<F>(
    ctx: &mut CompilationContext,
    signature: Signature,
    build: F,
) -> Result<String, CompilerError>
where
    F: FnOnce(&mut CompilationContext) -> Result<String, CompilerError>,
{
    let (id, skeleton) = match ctx.blueprints.get(&signature) {
        Some(entry) => {
            debug!("reusing blueprint {} for {}", slot_name(entry.id), entry.signature);
            (entry.id, entry.skeleton.clone())
        }
        None => {
            let skeleton = build(ctx)?;
            let id = ctx.blueprints.insert(signature, skeleton.clone(), 0);
            debug!("allocated blueprint {}", slot_name(id));
            (id, skeleton)
        }
    };

    let slot = slot_name(id);
    Ok(format!("{0} || ({0} = {1})", slot, skeleton))
}

/// Returns the template call for `signature`. `build` runs at every site:
/// it yields this site's arguments, and the first time also the body.
pub fn template_site<F>(
    ctx: &mut CompilationContext,
    signature: Signature,
    build: F,
) -> Result<String, CompilerError>
where
    F: FnOnce(&mut CompilationContext) -> Result<String, CompilerError>,
{
    let outer = ctx.begin_params();
    let built = build(ctx);
    let args = ctx.end_params(outer);
    let body = built?;

    let id = match ctx.blueprints.get(&signature) {
        Some(entry) => {
            debug!("reusing template {} for {}", template_name(entry.id), entry.signature);
            entry.id
        }
        None => {
            let id = ctx.blueprints.insert(signature, body, args.len());
            debug!("allocated template {} with {} argument(s)", template_name(id), args.len());
            id
        }
    };

    Ok(format!("{}({})", template_name(id), args.join(", ")))
}

/// Cached sites at a JSX root are parenthesized so they stay one operand in
/// any surrounding expression.
pub fn wrap_root(code: String, cached: bool) -> String {
    if cached {
        format!("({})", code)
    } else {
        code
    }
}
