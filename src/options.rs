//! Compile options and runtime helper resolution.

use serde::{Deserialize, Serialize};

/// Default runtime module the helpers are imported from.
pub const DEFAULT_IMPORT_SOURCE: &str = "inferno";

/// Global object the helpers are read from when imports are disabled.
const GLOBAL_NAMESPACE: &str = "Inferno";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImportsOption {
    Enabled(bool),
    Module(String),
}

impl Default for ImportsOption {
    fn default() -> Self {
        ImportsOption::Enabled(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    pub pragma: Option<String>,
    #[serde(rename = "pragmaCreateComponentVNode")]
    pub pragma_create_component_vnode: Option<String>,
    pub pragma_fragment: Option<String>,
    #[serde(rename = "pragmaTextVNode")]
    pub pragma_text_vnode: Option<String>,
    pub pragma_normalize_props: Option<String>,
    pub imports: ImportsOption,
    pub define_all_arguments: bool,
    #[serde(rename = "optimizeStaticVNodes")]
    pub optimize_static_vnodes: bool,
}

impl CompileOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The expression used as callee for `helper`.
    pub fn callee(&self, helper: Helper) -> &str {
        let pragma = match helper {
            Helper::CreateVNode => &self.pragma,
            Helper::CreateComponentVNode => &self.pragma_create_component_vnode,
            Helper::CreateFragment => &self.pragma_fragment,
            Helper::CreateTextVNode => &self.pragma_text_vnode,
            Helper::NormalizeProps => &self.pragma_normalize_props,
            Helper::NormalizeChildren => &None,
        };
        pragma.as_deref().unwrap_or(helper.export_name())
    }

    /// Whether `helper` is brought into scope by the compiler. User supplied
    /// pragmas are the caller's responsibility.
    pub fn declares(&self, helper: Helper) -> bool {
        self.callee(helper) == helper.export_name()
    }

    /// Module to import helpers from, or None for global aliases.
    pub fn import_source(&self) -> Option<&str> {
        match &self.imports {
            ImportsOption::Enabled(true) => Some(DEFAULT_IMPORT_SOURCE),
            ImportsOption::Enabled(false) => None,
            ImportsOption::Module(module) => Some(module.as_str()),
        }
    }

    pub fn global_namespace(&self) -> &'static str {
        GLOBAL_NAMESPACE
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Runtime helpers. Declarations follow variant order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Helper {
    CreateVNode,
    CreateComponentVNode,
    CreateFragment,
    CreateTextVNode,
    NormalizeProps,
    NormalizeChildren,
}

impl Helper {
    pub fn export_name(self) -> &'static str {
        match self {
            Helper::CreateVNode => "createVNode",
            Helper::CreateComponentVNode => "createComponentVNode",
            Helper::CreateFragment => "createFragment",
            Helper::CreateTextVNode => "createTextVNode",
            Helper::NormalizeProps => "normalizeProps",
            Helper::NormalizeChildren => "normalizeChildren",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = CompileOptions::default();
        assert_eq!(options.callee(Helper::CreateVNode), "createVNode");
        assert_eq!(options.import_source(), Some("inferno"));
        assert!(!options.define_all_arguments);
        assert!(!options.optimize_static_vnodes);
    }

    #[test]
    fn test_json_options() {
        let raw = json!({
            "pragma": "h",
            "pragmaCreateComponentVNode": "Inferno.createComponentVNode",
            "imports": "inferno-compat",
            "defineAllArguments": true,
            "optimizeStaticVNodes": true
        })
        .to_string();
        let options = CompileOptions::from_json(&raw).unwrap();
        assert_eq!(options.callee(Helper::CreateVNode), "h");
        assert!(!options.declares(Helper::CreateVNode));
        assert!(options.declares(Helper::CreateTextVNode));
        assert_eq!(options.import_source(), Some("inferno-compat"));
        assert!(options.define_all_arguments);
        assert!(options.optimize_static_vnodes);
    }

    #[test]
    fn test_imports_disabled() {
        let options = CompileOptions::from_json(r#"{"imports": false}"#).unwrap();
        assert_eq!(options.import_source(), None);
    }
}
