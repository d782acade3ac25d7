//! File transform driver.
//!
//! Parses a module, compiles every outermost JSX literal in source order
//! with one `CompilationContext`, splices the generated expressions back by
//! span and inserts the module-scope declarations once at the top.

use log::{debug, info};
#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};

use crate::codegen::compile_tree;
use crate::context::CompilationContext;
use crate::ir::{Scope, TreeNode};
use crate::options::CompileOptions;
use crate::parse::parse_source;
use crate::signature::BlueprintEntry;
use crate::validate::CompilerError;

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOutput {
    pub code: String,
    /// Number of JSX literals compiled.
    pub sites: usize,
    pub blueprints: Vec<BlueprintEntry>,
    /// Callees the generated code references.
    pub helpers: Vec<String>,
}

/// Result of compiling one standalone tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeOutput {
    pub expression: String,
    pub preamble: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSFORM
// ═══════════════════════════════════════════════════════════════════════════════

pub fn transform_source(
    source: &str,
    file_path: &str,
    options: &CompileOptions,
) -> Result<TransformOutput, CompilerError> {
    let parsed = parse_source(source, file_path)?;

    if parsed.sites.is_empty() {
        debug!("{}: no JSX found", file_path);
        return Ok(TransformOutput {
            code: source.to_string(),
            sites: 0,
            blueprints: vec![],
            helpers: vec![],
        });
    }

    let mut ctx = CompilationContext::new(options.clone());
    ctx.bind_existing(parsed.imported_names);

    let mut code = String::with_capacity(source.len() + source.len() / 2);
    let mut cursor = 0;
    for site in &parsed.sites {
        code.push_str(&source[cursor..site.start]);
        let compiled = compile_tree(&site.tree, site.scope, &mut ctx)
            .map_err(|e| e.in_file(file_path))?;
        debug!("{}: compiled site at byte {}", file_path, site.start);
        code.push_str(&compiled);
        cursor = site.end;
    }
    code.push_str(&source[cursor..]);

    let sites = parsed.sites.len();
    let declarations = ctx.finish();
    let code = insert_preamble(&code, &declarations.preamble(), parsed.declaration_offset);

    info!(
        "{}: {} JSX literal(s), {} blueprint(s)",
        file_path,
        sites,
        declarations.blueprints.len()
    );

    Ok(TransformOutput {
        code,
        sites,
        blueprints: declarations.blueprints,
        helpers: declarations.used_helpers,
    })
}

/// Inserts declarations after the directive prologue. The offset precedes
/// every JSX site, so it is valid in the rewritten text too.
fn insert_preamble(code: &str, preamble: &str, offset: usize) -> String {
    if preamble.is_empty() {
        return code.to_string();
    }
    if offset == 0 {
        format!("{}\n{}", preamble, code)
    } else {
        format!("{}\n{}{}", &code[..offset], preamble, &code[offset..])
    }
}

/// Compiles a single tree with a fresh context, for hosts that do their own
/// parsing.
pub fn compile_standalone(
    tree: &TreeNode,
    scope: Scope,
    options: &CompileOptions,
) -> Result<TreeOutput, CompilerError> {
    let mut ctx = CompilationContext::new(options.clone());
    let expression = compile_tree(tree, scope, &mut ctx)?;
    Ok(TreeOutput {
        expression,
        preamble: ctx.finish().preamble(),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI BRIDGE
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
fn parse_options(options_json: Option<String>) -> napi::Result<CompileOptions> {
    match options_json {
        Some(json) => CompileOptions::from_json(&json)
            .map_err(|e| napi::Error::from_reason(format!("Options parse error: {}", e))),
        None => Ok(CompileOptions::default()),
    }
}

/// Transforms one module and returns the serialized `TransformOutput`.
#[cfg(feature = "napi")]
#[napi]
pub fn transform_native(
    code: String,
    file_path: String,
    options_json: Option<String>,
) -> napi::Result<String> {
    let options = parse_options(options_json)?;
    let output = transform_source(&code, &file_path, &options)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    serde_json::to_string(&output)
        .map_err(|e| napi::Error::from_reason(format!("Serialization error: {}", e)))
}

/// Compiles a JSON-encoded `TreeNode` and returns the serialized `TreeOutput`.
#[cfg(feature = "napi")]
#[napi]
pub fn compile_tree_native(
    tree_json: String,
    in_function: bool,
    options_json: Option<String>,
) -> napi::Result<String> {
    let tree: TreeNode = serde_json::from_str(&tree_json)
        .map_err(|e| napi::Error::from_reason(format!("Tree parse error: {}", e)))?;
    let options = parse_options(options_json)?;
    let scope = if in_function {
        Scope::Function
    } else {
        Scope::Module
    };
    let output = compile_standalone(&tree, scope, &options)
        .map_err(|e| napi::Error::from_reason(e.to_string()))?;
    serde_json::to_string(&output)
        .map_err(|e| napi::Error::from_reason(format!("Serialization error: {}", e)))
}
