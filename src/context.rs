//! Per-file compilation state.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::hoist::{param_name, slot_name, template_name};
use crate::options::{CompileOptions, Helper};
use crate::signature::{BlueprintCache, BlueprintEntry};

/// Everything one file's compilation accumulates. Created per file, threaded
/// by `&mut` through every call, consumed by `finish`.
#[derive(Debug)]
pub struct CompilationContext {
    pub options: CompileOptions,
    pub blueprints: BlueprintCache,
    used_helpers: BTreeSet<Helper>,
    /// Local names already bound by the program's own imports.
    bound_names: HashSet<String>,
    /// Arguments of the template being built, if any.
    params: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Declarations {
    /// Helper imports or global aliases, if any helper needs declaring.
    pub helpers: Option<String>,
    /// `var _bp0, _bp1;` when static blueprints were allocated.
    pub slots: Option<String>,
    /// One `function _tplN(v0, ...) { return ...; }` line per template.
    pub templates: Option<String>,
    pub blueprints: Vec<BlueprintEntry>,
    /// Callees referenced by the generated code, in canonical order.
    pub used_helpers: Vec<String>,
}

impl Declarations {
    /// Text inserted at the top of the program.
    pub fn preamble(&self) -> String {
        let lines: Vec<&str> = [
            self.helpers.as_deref(),
            self.slots.as_deref(),
            self.templates.as_deref(),
        ]
            .into_iter()
            .flatten()
            .collect();
        lines.join("\n")
    }
}

impl CompilationContext {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            blueprints: BlueprintCache::new(),
            used_helpers: BTreeSet::new(),
            bound_names: HashSet::new(),
            params: None,
        }
    }

    pub fn bind_existing<I>(&mut self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.bound_names.extend(names);
    }

    /// Records a helper use and returns its callee expression.
    pub fn helper(&mut self, helper: Helper) -> String {
        self.used_helpers.insert(helper);
        self.options.callee(helper).to_string()
    }

    /// Starts collecting template arguments. Returns the collection it
    /// replaces, to be handed back to `end_params`.
    pub fn begin_params(&mut self) -> Option<Vec<String>> {
        self.params.replace(Vec::new())
    }

    /// Restores `outer` and returns the arguments collected since the
    /// matching `begin_params`.
    pub fn end_params(&mut self, outer: Option<Vec<String>>) -> Vec<String> {
        std::mem::replace(&mut self.params, outer).unwrap_or_default()
    }

    /// Stops collecting while an embedded expression compiles on its own.
    pub fn suspend_params(&mut self) -> Option<Vec<String>> {
        self.params.take()
    }

    pub fn resume_params(&mut self, saved: Option<Vec<String>>) {
        self.params = saved;
    }

    /// Inside a template, records `code` as the next argument and returns
    /// the parameter that stands for it. Elsewhere `code` is returned as is.
    pub fn bind_param(&mut self, code: String) -> String {
        match &mut self.params {
            Some(params) => {
                let name = param_name(params.len());
                params.push(code);
                name
            }
            None => code,
        }
    }

    pub fn finish(self) -> Declarations {
        let declared: Vec<Helper> = self
            .used_helpers
            .iter()
            .copied()
            .filter(|h| self.options.declares(*h) && !self.bound_names.contains(h.export_name()))
            .collect();

        let helpers = if declared.is_empty() {
            None
        } else {
            Some(match self.options.import_source() {
                Some(module) => format!(
                    "import {{ {} }} from {};",
                    declared
                        .iter()
                        .map(|h| h.export_name())
                        .collect::<Vec<_>>()
                        .join(", "),
                    crate::codegen::js_string(module)
                ),
                None => format!(
                    "var {};",
                    declared
                        .iter()
                        .map(|h| format!(
                            "{0} = {1}.{0}",
                            h.export_name(),
                            self.options.global_namespace()
                        ))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            })
        };

        let blueprints: Vec<BlueprintEntry> =
            self.blueprints.entries().into_iter().cloned().collect();
        let (statics, templates): (Vec<&BlueprintEntry>, Vec<&BlueprintEntry>) =
            blueprints.iter().partition(|b| b.slot_count == 0);

        let slots = if statics.is_empty() {
            None
        } else {
            Some(format!(
                "var {};",
                statics
                    .iter()
                    .map(|b| slot_name(b.id))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        };

        let templates = if templates.is_empty() {
            None
        } else {
            Some(
                templates
                    .iter()
                    .map(|b| {
                        let params: Vec<String> = (0..b.slot_count).map(param_name).collect();
                        format!(
                            "function {}({}) {{ return {}; }}",
                            template_name(b.id),
                            params.join(", "),
                            b.skeleton
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
        };

        let used_helpers = self
            .used_helpers
            .iter()
            .map(|h| self.options.callee(*h).to_string())
            .collect();

        Declarations {
            helpers,
            slots,
            templates,
            blueprints,
            used_helpers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ImportsOption;
    use crate::signature::Signature;

    #[test]
    fn test_imports_in_canonical_order() {
        let mut ctx = CompilationContext::new(CompileOptions::default());
        ctx.helper(Helper::CreateTextVNode);
        ctx.helper(Helper::CreateVNode);
        ctx.helper(Helper::CreateVNode);
        let decl = ctx.finish();
        assert_eq!(
            decl.preamble(),
            "import { createVNode, createTextVNode } from \"inferno\";"
        );
    }

    #[test]
    fn test_global_aliases() {
        let options = CompileOptions {
            imports: ImportsOption::Enabled(false),
            ..Default::default()
        };
        let mut ctx = CompilationContext::new(options);
        ctx.helper(Helper::CreateVNode);
        ctx.helper(Helper::NormalizeProps);
        assert_eq!(
            ctx.finish().preamble(),
            "var createVNode = Inferno.createVNode, normalizeProps = Inferno.normalizeProps;"
        );
    }

    #[test]
    fn test_bound_and_pragma_helpers_skipped() {
        let options = CompileOptions {
            pragma: Some("Inferno.createVNode".into()),
            ..Default::default()
        };
        let mut ctx = CompilationContext::new(options);
        ctx.bind_existing(vec!["createTextVNode".to_string()]);
        assert_eq!(ctx.helper(Helper::CreateVNode), "Inferno.createVNode");
        ctx.helper(Helper::CreateTextVNode);
        let decl = ctx.finish();
        assert_eq!(decl.preamble(), "");
        assert_eq!(decl.used_helpers, vec!["Inferno.createVNode", "createTextVNode"]);
    }

    #[test]
    fn test_slot_declarations() {
        let mut ctx = CompilationContext::new(CompileOptions::default());
        ctx.blueprints.insert(Signature::Text("a".into()), "x".into(), 0);
        ctx.blueprints.insert(Signature::Text("b".into()), "y".into(), 0);
        let decl = ctx.finish();
        assert_eq!(decl.slots.as_deref(), Some("var _bp0, _bp1;"));
        assert!(decl.templates.is_none());
    }

    #[test]
    fn test_template_declarations_follow_slots() {
        let mut ctx = CompilationContext::new(CompileOptions::default());
        ctx.blueprints.insert(Signature::Text("a".into()), "x".into(), 0);
        ctx.blueprints.insert(Signature::Slot, "f(v0, v1)".into(), 2);
        let decl = ctx.finish();
        assert_eq!(
            decl.preamble(),
            "var _bp0;\nfunction _tpl1(v0, v1) { return f(v0, v1); }"
        );
    }

    #[test]
    fn test_params_bind_only_while_collecting() {
        let mut ctx = CompilationContext::new(CompileOptions::default());
        assert_eq!(ctx.bind_param("a".into()), "a");

        let outer = ctx.begin_params();
        assert_eq!(ctx.bind_param("a".into()), "v0");
        let saved = ctx.suspend_params();
        assert_eq!(ctx.bind_param("inner".into()), "inner");
        ctx.resume_params(saved);
        assert_eq!(ctx.bind_param("b".into()), "v1");
        assert_eq!(ctx.end_params(outer), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(ctx.bind_param("c".into()), "c");
    }
}
