//! # VNode Compiler
//!
//! Compiles JSX element-tree literals embedded in JS/TS modules into calls
//! against an Inferno-compatible virtual-node construction API.
//!
//! ## Pipeline
//!
//! 1. **Parse**: `parse` finds every outermost JSX literal with oxc and turns
//!    it into a `TreeNode`.
//! 2. **Classify**: `classify` partitions attributes, resolves children and
//!    computes kind flags, child flags and static status bottom-up.
//! 3. **Hash / dedupe**: element and fragment subtrees carry a structural
//!    `Signature` in which dynamic values are slots; the per-file
//!    `BlueprintCache` maps equal signatures to one blueprint id.
//! 4. **Emit**: `codegen` writes construction calls with trailing default
//!    arguments elided; `hoist` routes static subtrees inside functions
//!    through module-scope slots and dynamic shells through template
//!    functions.
//!
//! ## Invariants
//!
//! - Flag values are wire-compatible with the runtime and defined once in `flags`.
//! - Components are never static.
//! - Blueprint ids follow first-occurrence emission order within a file.
//! - All state for one file lives in its `CompilationContext`.

pub mod attributes;
pub mod cache;
pub mod children;
pub mod classify;
pub mod codegen;
pub mod context;
pub mod discovery;
pub mod flags;
pub mod hoist;
pub mod ir;
pub mod options;
pub mod parse;
pub mod signature;
mod static_eval;
pub mod transform;
pub mod validate;
pub mod whitespace;


pub use codegen::compile_tree;
pub use context::{CompilationContext, Declarations};
pub use flags::{ChildFlags, VNodeFlags};
pub use ir::{Attribute, Expr, Literal, Scope, TreeNode, Value};
pub use options::{CompileOptions, Helper, ImportsOption};
pub use signature::{BlueprintEntry, Signature};
pub use transform::{compile_standalone, transform_source, TransformOutput, TreeOutput};
pub use validate::*;

#[cfg(feature = "napi")]
pub use transform::{compile_tree_native, transform_native};
