#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ir::AttrName;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_STRUCTURAL_CONFLICT: &str = "VNC-STRUCTURAL-CONFLICT";
pub const ERR_DEPRECATED_ATTRIBUTE: &str = "VNC-DEPRECATED-ATTRIBUTE";
pub const ERR_MALFORMED_ATTRIBUTE_NAME: &str = "VNC-MALFORMED-ATTRIBUTE-NAME";
pub const ERR_PARSE: &str = "VNC-PARSE-ERROR";

// ═══════════════════════════════════════════════════════════════════════════════
// GUARANTEES
// ═══════════════════════════════════════════════════════════════════════════════

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_STRUCTURAL_CONFLICT => {
            "Lifecycle hooks are declared either as one aggregated ref object or as individual attributes, never both."
        }
        ERR_DEPRECATED_ATTRIBUTE => "Retired attribute names fail loudly instead of degrading.",
        ERR_MALFORMED_ATTRIBUTE_NAME => "Every attribute name is an identifier or a namespace:name pair.",
        ERR_PARSE => "Only syntactically valid sources are transformed.",
        _ => "Unknown invariant.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    /// 1-based line and column of a byte offset.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() as u32 + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() as u32 + 1;
        Self { line, column }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct CompilerError {
    pub code: String,
    pub error_type: String,
    pub message: String,
    pub guarantee: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub context: Option<String>,
    pub hints: Vec<String>,
}

impl CompilerError {
    pub fn new(code: &str, message: &str, file: &str, line: u32, column: u32) -> Self {
        Self::with_details(code, message, file, line, column, None, vec![])
    }

    pub fn with_details(
        code: &str,
        message: &str,
        file: &str,
        line: u32,
        column: u32,
        context: Option<String>,
        hints: Vec<String>,
    ) -> Self {
        CompilerError {
            code: code.to_string(),
            error_type: "COMPILE_ERROR".to_string(),
            message: message.to_string(),
            guarantee: get_guarantee(code).to_string(),
            file: file.to_string(),
            line,
            column,
            context,
            hints,
        }
    }

    pub fn at(code: &str, message: &str, location: &SourceLocation) -> Self {
        Self::new(code, message, "", location.line, location.column)
    }

    /// Errors raised inside the core carry no file name; the driver fills it in.
    pub fn in_file(mut self, file: &str) -> Self {
        if self.file.is_empty() {
            self.file = file.to_string();
        }
        self
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}:{}:{})",
            self.code, self.message, self.file, self.line, self.column
        )?;
        for hint in &self.hints {
            write!(f, "\n  hint: {}", hint)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompilerError {}

// ═══════════════════════════════════════════════════════════════════════════════
// ATTRIBUTE VALIDATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Retired attribute names and the spelling that replaced them.
const DEPRECATED_ATTRIBUTES: &[(&str, &str)] = &[
    ("noNormalize", "$HasVNodeChildren"),
    ("$NoNormalize", "$HasVNodeChildren"),
    ("hasKeyedChildren", "$HasKeyedChildren"),
    ("hasNonKeyedChildren", "$HasNonKeyedChildren"),
];

pub fn deprecated_replacement(name: &str) -> Option<&'static str> {
    DEPRECATED_ATTRIBUTES
        .iter()
        .find(|(old, _)| *old == name)
        .map(|(_, new)| *new)
}

pub fn check_deprecated(name: &str, location: &SourceLocation) -> Result<(), CompilerError> {
    match deprecated_replacement(name) {
        Some(replacement) => Err(CompilerError::with_details(
            ERR_DEPRECATED_ATTRIBUTE,
            &format!("`{}` is deprecated, use `{}` instead", name, replacement),
            "",
            location.line,
            location.column,
            Some(name.to_string()),
            vec![format!("Rename the attribute to `{}`.", replacement)],
        )),
        None => Ok(()),
    }
}

fn is_attribute_name_part(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '-')
}

/// Resolves an attribute name to its flat spelling, rejecting shapes the
/// runtime cannot address.
pub fn resolve_attribute_name(
    name: &AttrName,
    location: &SourceLocation,
) -> Result<String, CompilerError> {
    let (resolved, valid) = match name {
        AttrName::Plain { name } => (name.clone(), is_attribute_name_part(name)),
        AttrName::Namespaced { namespace, name } => (
            format!("{}:{}", namespace, name),
            is_attribute_name_part(namespace) && is_attribute_name_part(name),
        ),
    };

    if valid {
        Ok(resolved)
    } else {
        Err(CompilerError::with_details(
            ERR_MALFORMED_ATTRIBUTE_NAME,
            &format!("Unrecognized attribute name `{}`", resolved),
            "",
            location.line,
            location.column,
            Some(resolved.clone()),
            vec!["Use an identifier or a `namespace:name` pair.".to_string()],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_offset() {
        let src = "let a;\nlet b = <div/>;";
        assert_eq!(
            SourceLocation::from_offset(src, 15),
            SourceLocation { line: 2, column: 9 }
        );
        assert_eq!(
            SourceLocation::from_offset(src, 0),
            SourceLocation { line: 1, column: 1 }
        );
    }

    #[test]
    fn test_deprecated_names() {
        let loc = SourceLocation::default();
        let err = check_deprecated("noNormalize", &loc).unwrap_err();
        assert_eq!(err.code, ERR_DEPRECATED_ATTRIBUTE);
        assert!(err.message.contains("$HasVNodeChildren"));
        assert!(check_deprecated("className", &loc).is_ok());
    }

    #[test]
    fn test_resolve_attribute_name() {
        let loc = SourceLocation::default();
        let ns = AttrName::Namespaced {
            namespace: "xlink".into(),
            name: "href".into(),
        };
        assert_eq!(resolve_attribute_name(&ns, &loc).unwrap(), "xlink:href");
        assert_eq!(
            resolve_attribute_name(&AttrName::plain("data-id"), &loc).unwrap(),
            "data-id"
        );

        let broken = AttrName::Namespaced {
            namespace: "".into(),
            name: "href".into(),
        };
        let err = resolve_attribute_name(&broken, &loc).unwrap_err();
        assert_eq!(err.code, ERR_MALFORMED_ATTRIBUTE_NAME);
    }

    #[test]
    fn test_display_includes_code_and_position() {
        let err = CompilerError::new(ERR_PARSE, "Unexpected token", "app.jsx", 3, 7);
        assert_eq!(
            err.to_string(),
            "[VNC-PARSE-ERROR] Unexpected token (app.jsx:3:7)"
        );
    }
}
