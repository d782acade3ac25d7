//! Attribute Partitioner for the VNode Compiler
//!
//! Splits an element's raw attribute list into the slots the construction
//! call addresses positionally (className, key, ref), the lifecycle hooks of
//! components, child-flag directives, and the ordered props object.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::flags::child_flag_directive;
use crate::ir::{Attribute, ElementNode, Value};
use crate::validate::{
    check_deprecated, resolve_attribute_name, CompilerError, SourceLocation,
    ERR_STRUCTURAL_CONFLICT,
};

// ═══════════════════════════════════════════════════════════════════════════════
// ATTRIBUTE NAME TABLES
// ═══════════════════════════════════════════════════════════════════════════════

/// React-style SVG attribute names whose DOM spelling is dashed.
const SVG_DASHED_ATTRIBUTES: &[&str] = &[
    "accentHeight",
    "alignmentBaseline",
    "arabicForm",
    "baselineShift",
    "capHeight",
    "clipPath",
    "clipRule",
    "colorInterpolation",
    "colorInterpolationFilters",
    "colorProfile",
    "colorRendering",
    "dominantBaseline",
    "enableBackground",
    "fillOpacity",
    "fillRule",
    "floodColor",
    "floodOpacity",
    "fontFamily",
    "fontSize",
    "fontSizeAdjust",
    "fontStretch",
    "fontStyle",
    "fontVariant",
    "fontWeight",
    "glyphName",
    "glyphOrientationHorizontal",
    "glyphOrientationVertical",
    "horizAdvX",
    "horizOriginX",
    "imageRendering",
    "letterSpacing",
    "lightingColor",
    "markerEnd",
    "markerMid",
    "markerStart",
    "overlinePosition",
    "overlineThickness",
    "paintOrder",
    "pointerEvents",
    "renderingIntent",
    "shapeRendering",
    "stopColor",
    "stopOpacity",
    "strikethroughPosition",
    "strikethroughThickness",
    "strokeDasharray",
    "strokeDashoffset",
    "strokeLinecap",
    "strokeLinejoin",
    "strokeMiterlimit",
    "strokeOpacity",
    "strokeWidth",
    "textDecoration",
    "textRendering",
    "underlinePosition",
    "underlineThickness",
    "unicodeBidi",
    "unicodeRange",
    "unitsPerEm",
    "vAlphabetic",
    "vHanging",
    "vIdeographic",
    "vMathematical",
    "vectorEffect",
    "vertAdvY",
    "vertOriginX",
    "vertOriginY",
    "wordSpacing",
    "writingMode",
    "xHeight",
];

/// Camel-cased attributes the DOM only knows in lower case.
const LOWERCASE_ATTRIBUTES: &[&str] = &[
    "accessKey",
    "autoComplete",
    "autoCorrect",
    "autoPictureInPicture",
    "autoPlay",
    "autoCapitalize",
    "autoFocus",
    "autoSave",
    "cellPadding",
    "cellSpacing",
    "charSet",
    "classID",
    "codeBase",
    "colSpan",
    "contextMenu",
    "controlsList",
    "crossOrigin",
    "dateTime",
    "encType",
    "enterKeyHint",
    "exportParts",
    "fetchPriority",
    "formAction",
    "formEncType",
    "formMethod",
    "formNoValidate",
    "formTarget",
    "frameBorder",
    "hrefLang",
    "imageSizes",
    "imageSrcSet",
    "inputMode",
    "isMap",
    "itemID",
    "itemProp",
    "itemRef",
    "itemScope",
    "itemType",
    "keyParams",
    "keyType",
    "lengthAdjust",
    "marginHeight",
    "maxLength",
    "mediaGroup",
    "minLength",
    "noModule",
    "noValidate",
    "popoverTarget",
    "popoverTargetAction",
    "radioGroup",
    "readOnly",
    "referrerPolicy",
    "rowSpan",
    "spellCheck",
    "srcDoc",
    "srcLang",
    "srcSet",
    "tabIndex",
    "useMap",
    "xChannelSelector",
    "yChannelSelector",
];

lazy_static! {
    static ref UPPERCASE_RE: Regex = Regex::new(r"([A-Z])").unwrap();

    /// JSX spelling → DOM spelling for plain elements.
    static ref ATTRIBUTE_RENAMES: HashMap<&'static str, String> = {
        let mut m = HashMap::new();
        m.insert("htmlFor", "for".to_string());
        m.insert("acceptCharset", "accept-charset".to_string());
        m.insert("httpEquiv", "http-equiv".to_string());
        m.insert("textAnchor", "text-anchor".to_string());
        m.insert("transformOrigin", "transform-origin".to_string());
        m.insert("panose1", "panose-1".to_string());
        m.insert("xlinkActuate", "xlink:actuate".to_string());
        m.insert("xlinkArcrole", "xlink:arcrole".to_string());
        m.insert("xlinkHref", "xlink:href".to_string());
        m.insert("xlinkRole", "xlink:role".to_string());
        m.insert("xlinkShow", "xlink:show".to_string());
        m.insert("xlinkTitle", "xlink:title".to_string());
        m.insert("xlinkType", "xlink:type".to_string());
        m.insert("xmlBase", "xml:base".to_string());
        m.insert("xmlLang", "xml:lang".to_string());
        m.insert("xmlSpace", "xml:space".to_string());
        m.insert("xmlnsXlink", "xmlns:xlink".to_string());
        for name in SVG_DASHED_ATTRIBUTES {
            m.insert(*name, to_kebab_case(name));
        }
        m
    };

    static ref LOWERCASE_SET: HashSet<&'static str> =
        LOWERCASE_ATTRIBUTES.iter().copied().collect();

    /// Event prop spellings the runtime knows under another name.
    static ref EVENT_ALIASES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("onDoubleClick", "onDblClick");
        m
    };
}

fn to_kebab_case(name: &str) -> String {
    UPPERCASE_RE
        .replace_all(name, |caps: &regex::Captures| {
            format!("-{}", caps[1].to_lowercase())
        })
        .to_string()
}

/// DOM spelling of an ordinary attribute on a plain element.
pub fn element_attribute_name(name: &str) -> String {
    if let Some(renamed) = ATTRIBUTE_RENAMES.get(name) {
        return renamed.clone();
    }
    if LOWERCASE_SET.contains(name) {
        return name.to_lowercase();
    }
    name.to_string()
}

// ═══════════════════════════════════════════════════════════════════════════════
// DESCRIPTORS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Prop,
    Event,
    Hook,
    Style,
    Spread,
}

#[derive(Debug, Clone)]
pub struct AttributeDescriptor {
    /// Emitted name. Empty for spreads.
    pub name: String,
    pub value: Value,
    pub category: Category,
}

/// `$`-prefixed attributes steering child arrangement.
#[derive(Debug, Clone, Default)]
pub struct ChildDirectives {
    /// `$HasKeyedChildren` and friends.
    pub explicit: Option<u32>,
    /// `$ChildFlag={expr}`.
    pub child_flag: Option<Value>,
    pub re_create: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AttributePartition {
    pub class_name: Option<Value>,
    pub key: Option<Value>,
    pub ref_value: Option<Value>,
    pub hooks: Vec<AttributeDescriptor>,
    /// Props, events, style and spreads in declaration order.
    pub props: Vec<AttributeDescriptor>,
    /// `children` attribute of a plain element. Components keep it as a prop.
    pub children_prop: Option<Value>,
    pub directives: ChildDirectives,
    pub needs_normalize_props: bool,
    pub content_editable: bool,
}

fn is_hook_name(name: &str) -> bool {
    name.starts_with("onComponent") && name.len() > 11
}

fn is_event_name(name: &str) -> bool {
    name.starts_with("on") && name.len() > 3
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARTITIONING
// ═══════════════════════════════════════════════════════════════════════════════

pub fn partition_attributes(element: &ElementNode) -> Result<AttributePartition, CompilerError> {
    let is_component = element.is_component;
    let mut partition = AttributePartition::default();

    for attr in &element.attrs {
        let (raw_name, value, location) = match attr {
            Attribute::Spread { argument, .. } => {
                partition.needs_normalize_props = true;
                partition.props.push(AttributeDescriptor {
                    name: String::new(),
                    value: Value::Expr {
                        expr: argument.clone(),
                    },
                    category: Category::Spread,
                });
                continue;
            }
            Attribute::Named {
                name,
                value,
                location,
            } => (name, value, location),
        };

        let name = resolve_attribute_name(raw_name, location)?;
        check_deprecated(&name, location)?;

        if name.starts_with('$') && route_directive(&name, value, &mut partition.directives) {
            continue;
        }

        match name.as_str() {
            "key" => partition.key = Some(value.clone()),
            "ref" => partition.ref_value = Some(value.clone()),
            "children" if !is_component => partition.children_prop = Some(value.clone()),
            _ if is_component && is_hook_name(&name) => {
                partition.hooks.push(AttributeDescriptor {
                    name,
                    value: value.clone(),
                    category: Category::Hook,
                });
            }
            _ if is_component => {
                partition.props.push(AttributeDescriptor {
                    name,
                    value: value.clone(),
                    category: Category::Prop,
                });
            }
            "className" | "class" => partition.class_name = Some(value.clone()),
            "style" => partition.props.push(AttributeDescriptor {
                name,
                value: value.clone(),
                category: Category::Style,
            }),
            _ if is_event_name(&name) => {
                let emitted = EVENT_ALIASES
                    .get(name.as_str())
                    .map(|alias| alias.to_string())
                    .unwrap_or(name);
                partition.props.push(AttributeDescriptor {
                    name: emitted,
                    value: value.clone(),
                    category: Category::Event,
                });
            }
            _ => {
                if name.eq_ignore_ascii_case("contentEditable") {
                    partition.content_editable = true;
                }
                partition.props.push(AttributeDescriptor {
                    name: element_attribute_name(&name),
                    value: value.clone(),
                    category: Category::Prop,
                });
            }
        }
    }

    if is_component && partition.ref_value.is_some() && !partition.hooks.is_empty() {
        return Err(structural_conflict(element, &partition));
    }

    Ok(partition)
}

/// Returns false for `$` names that are not directives; those stay ordinary props.
pub fn route_directive(name: &str, value: &Value, directives: &mut ChildDirectives) -> bool {
    if let Some(flag) = child_flag_directive(name) {
        directives.explicit = Some(flag);
        return true;
    }
    match name {
        "$ChildFlag" => {
            directives.child_flag = Some(value.clone());
            true
        }
        "$ReCreate" => {
            directives.re_create = true;
            true
        }
        _ => false,
    }
}

fn structural_conflict(element: &ElementNode, partition: &AttributePartition) -> CompilerError {
    let hook_names: Vec<&str> = partition.hooks.iter().map(|h| h.name.as_str()).collect();
    let location: &SourceLocation = &element.location;
    CompilerError::with_details(
        ERR_STRUCTURAL_CONFLICT,
        &format!(
            "<{}> combines an aggregated `ref` hooks object with individual hooks ({})",
            element.tag,
            hook_names.join(", ")
        ),
        "",
        location.line,
        location.column,
        Some(element.tag.clone()),
        vec!["Move the hooks into the `ref` object or drop the `ref` attribute.".to_string()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Literal, TreeNode};
    use crate::validate::{ERR_DEPRECATED_ATTRIBUTE, ERR_STRUCTURAL_CONFLICT};

    fn element(tag: &str, attrs: Vec<Attribute>) -> ElementNode {
        match TreeNode::element(tag, attrs, vec![]) {
            TreeNode::Element(el) => el,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_routes_slots_out_of_props() {
        let el = element(
            "div",
            vec![
                Attribute::named("id", Value::string("main")),
                Attribute::named("className", Value::expr("cls")),
                Attribute::named("key", Value::string("k")),
                Attribute::named("ref", Value::expr("r")),
                Attribute::named("onClick", Value::expr("handler")),
            ],
        );
        let p = partition_attributes(&el).unwrap();
        assert!(p.class_name.is_some());
        assert!(p.key.is_some());
        assert!(p.ref_value.is_some());
        assert_eq!(p.props.len(), 2);
        assert_eq!(p.props[0].category, Category::Prop);
        assert_eq!(p.props[1].category, Category::Event);
        assert_eq!(p.props[1].name, "onClick");
    }

    #[test]
    fn test_spread_marks_normalization() {
        let el = element(
            "div",
            vec![
                Attribute::named("foo", Value::string("bar")),
                Attribute::spread("props"),
            ],
        );
        let p = partition_attributes(&el).unwrap();
        assert!(p.needs_normalize_props);
        assert_eq!(p.props[1].category, Category::Spread);
    }

    #[test]
    fn test_component_hooks_and_class() {
        let el = element(
            "Widget",
            vec![
                Attribute::named("className", Value::string("x")),
                Attribute::named("onComponentDidMount", Value::expr("mounted")),
                Attribute::named("onClick", Value::expr("f")),
            ],
        );
        let p = partition_attributes(&el).unwrap();
        assert!(p.class_name.is_none());
        assert_eq!(p.hooks.len(), 1);
        assert_eq!(p.props.len(), 2);
        assert!(p.props.iter().all(|d| d.category == Category::Prop));
    }

    #[test]
    fn test_ref_with_hooks_is_a_conflict() {
        let el = element(
            "Widget",
            vec![
                Attribute::named("ref", Value::expr("hooks")),
                Attribute::named("onComponentWillUnmount", Value::expr("bye")),
            ],
        );
        let err = partition_attributes(&el).unwrap_err();
        assert_eq!(err.code, ERR_STRUCTURAL_CONFLICT);
    }

    #[test]
    fn test_deprecated_attribute_fails() {
        let el = element(
            "div",
            vec![Attribute::named("noNormalize", Value::literal(Literal::Bool(true)))],
        );
        let err = partition_attributes(&el).unwrap_err();
        assert_eq!(err.code, ERR_DEPRECATED_ATTRIBUTE);
    }

    #[test]
    fn test_directives() {
        let el = element(
            "div",
            vec![
                Attribute::named("$HasKeyedChildren", Value::literal(Literal::Bool(true))),
                Attribute::named("$ReCreate", Value::literal(Literal::Bool(true))),
                Attribute::named("$Custom", Value::string("kept")),
            ],
        );
        let p = partition_attributes(&el).unwrap();
        assert_eq!(p.directives.explicit, Some(8));
        assert!(p.directives.re_create);
        assert_eq!(p.props.len(), 1);
        assert_eq!(p.props[0].name, "$Custom");
    }

    #[test]
    fn test_element_attribute_names() {
        assert_eq!(element_attribute_name("htmlFor"), "for");
        assert_eq!(element_attribute_name("strokeWidth"), "stroke-width");
        assert_eq!(element_attribute_name("fillOpacity"), "fill-opacity");
        assert_eq!(element_attribute_name("xlinkHref"), "xlink:href");
        assert_eq!(element_attribute_name("tabIndex"), "tabindex");
        assert_eq!(element_attribute_name("viewBox"), "viewBox");
        assert_eq!(element_attribute_name("onDoubleClick"), "onDoubleClick");
    }

    #[test]
    fn test_double_click_alias() {
        let el = element("div", vec![Attribute::named("onDoubleClick", Value::expr("f"))]);
        let p = partition_attributes(&el).unwrap();
        assert_eq!(p.props[0].name, "onDblClick");
    }
}
