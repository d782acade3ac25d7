//! Node Classifier for the VNode Compiler
//!
//! Turns a `TreeNode` into a classified `VNode`: kind flags, partitioned
//! attributes, resolved children and, for subtrees made only of elements,
//! fragments, text and expression children, the structural signature used
//! by the blueprint cache.

use crate::attributes::{
    partition_attributes, route_directive, AttributeDescriptor, Category, ChildDirectives,
};
use crate::children::{children_from_prop, classify_children, resolve_children, ResolvedChildren};
use crate::flags::{element_kind_flags, ChildFlags, VNodeFlags};
use crate::ir::{is_fragment_tag, AttrName, Attribute, ElementNode, Literal, TreeNode, Value};
use crate::signature::{PropSignature, SigValue, Signature};
use crate::validate::CompilerError;
use crate::whitespace::{decode_entities, normalize_text};

#[derive(Debug, Clone)]
pub struct ElementVNode {
    pub tag: String,
    pub flags: u32,
    pub class_name: Option<Value>,
    pub props: Vec<AttributeDescriptor>,
    pub key: Option<Value>,
    pub ref_value: Option<Value>,
    pub children: ResolvedChildren,
    pub normalize_props: bool,
    /// Absent when the subtree holds a component or a spread.
    pub signature: Option<Signature>,
}

#[derive(Debug, Clone)]
pub struct ComponentVNode {
    pub tag: String,
    pub flags: u32,
    pub props: Vec<AttributeDescriptor>,
    pub key: Option<Value>,
    pub ref_value: Option<Value>,
    pub hooks: Vec<AttributeDescriptor>,
    /// Delivered through `props.children`.
    pub children: Vec<VNode>,
    pub normalize_props: bool,
}

#[derive(Debug, Clone)]
pub struct FragmentVNode {
    pub key: Option<Value>,
    pub children: ResolvedChildren,
    pub signature: Option<Signature>,
}

#[derive(Debug, Clone)]
pub enum VNode {
    Element(ElementVNode),
    Component(ComponentVNode),
    Fragment(FragmentVNode),
    Text(String),
    Slot(Value),
}

impl VNode {
    pub fn signature(&self) -> Option<Signature> {
        match self {
            VNode::Element(el) => el.signature.clone(),
            VNode::Fragment(frag) => frag.signature.clone(),
            VNode::Text(text) => Some(Signature::Text(text.clone())),
            VNode::Slot(_) => Some(Signature::Slot),
            VNode::Component(_) => None,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            VNode::Element(ElementVNode { signature, .. })
            | VNode::Fragment(FragmentVNode { signature, .. }) => {
                signature.as_ref().is_some_and(Signature::is_static)
            }
            VNode::Text(_) => true,
            VNode::Component(_) | VNode::Slot(_) => false,
        }
    }

    pub fn key(&self) -> Option<&Value> {
        match self {
            VNode::Element(el) => el.key.as_ref(),
            VNode::Component(c) => c.key.as_ref(),
            VNode::Fragment(frag) => frag.key.as_ref(),
            VNode::Text(_) | VNode::Slot(_) => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

pub fn classify_node(node: &TreeNode) -> Result<VNode, CompilerError> {
    match node {
        TreeNode::Element(el) if el.is_component && is_fragment_tag(&el.tag) => {
            let (key, directives) = fragment_attributes(el);
            classify_fragment(key, &el.children, &directives)
        }
        TreeNode::Element(el) if el.is_component => classify_component(el),
        TreeNode::Element(el) => classify_element(el),
        TreeNode::Fragment(frag) => {
            classify_fragment(frag.key.clone(), &frag.children, &ChildDirectives::default())
        }
        TreeNode::Text { value } => {
            let text = normalize_text(&decode_entities(value));
            if text.is_empty() {
                // Nothing to render, as for an empty child
                Ok(VNode::Slot(Value::literal(Literal::Null)))
            } else {
                Ok(VNode::Text(text))
            }
        }
        TreeNode::ExpressionSlot { value } => Ok(VNode::Slot(value.clone())),
    }
}

/// `<Fragment>` keeps its key and child-flag directives; other attributes
/// are ignored.
fn fragment_attributes(el: &ElementNode) -> (Option<Value>, ChildDirectives) {
    let mut key = None;
    let mut directives = ChildDirectives::default();
    for attr in &el.attrs {
        let routed = match attr {
            Attribute::Named {
                name: AttrName::Plain { name },
                value,
                ..
            } if name == "key" => {
                key = Some(value.clone());
                true
            }
            Attribute::Named {
                name: AttrName::Plain { name },
                value,
                ..
            } if name.starts_with('$') && name != "$ReCreate" => {
                route_directive(name, value, &mut directives)
            }
            _ => false,
        };
        if !routed {
            log::warn!(
                "ignoring attribute on <{}> at {}:{}: fragments only accept `key` and child flags",
                el.tag,
                attr.location().line,
                attr.location().column
            );
        }
    }
    (key, directives)
}

fn sig_value(value: &Option<Value>) -> Option<SigValue> {
    value.as_ref().map(SigValue::of)
}

fn child_signatures(children: &ResolvedChildren) -> Option<Vec<Signature>> {
    children.nodes.iter().map(VNode::signature).collect()
}

fn classify_element(el: &ElementNode) -> Result<VNode, CompilerError> {
    let partition = partition_attributes(el)?;

    let mut nodes = classify_children(&el.children)?;
    if nodes.is_empty() {
        if let Some(value) = &partition.children_prop {
            nodes = children_from_prop(value)?;
        }
    }
    let children = resolve_children(nodes, &partition.directives);

    let mut flags = element_kind_flags(&el.tag);
    if partition.directives.re_create {
        flags |= VNodeFlags::RE_CREATE;
    }
    if partition.content_editable {
        flags |= VNodeFlags::CONTENT_EDITABLE;
    }

    // Spread props have no fixed shape
    let signature = if partition.needs_normalize_props {
        None
    } else {
        child_signatures(&children).map(|child_sigs| Signature::Element {
            tag: el.tag.clone(),
            flags,
            class_name: sig_value(&partition.class_name),
            props: partition
                .props
                .iter()
                .map(|d| PropSignature {
                    name: d.name.clone(),
                    category: d.category,
                    value: SigValue::of(&d.value),
                })
                .collect(),
            key: sig_value(&partition.key),
            ref_value: sig_value(&partition.ref_value),
            child_flags: children.known_flags(),
            children: child_sigs,
        })
    };

    Ok(VNode::Element(ElementVNode {
        tag: el.tag.clone(),
        flags,
        class_name: partition.class_name,
        props: partition.props,
        key: partition.key,
        ref_value: partition.ref_value,
        children,
        normalize_props: partition.needs_normalize_props,
        signature,
    }))
}

fn classify_component(el: &ElementNode) -> Result<VNode, CompilerError> {
    let mut partition = partition_attributes(el)?;

    let children = classify_children(&el.children)?;
    if !children.is_empty() {
        // JSX children replace a `children` attribute
        partition
            .props
            .retain(|d| !(d.category == Category::Prop && d.name == "children"));
    }

    let mut flags = VNodeFlags::COMPONENT_UNKNOWN;
    if partition.directives.re_create {
        flags |= VNodeFlags::RE_CREATE;
    }

    Ok(VNode::Component(ComponentVNode {
        tag: el.tag.clone(),
        flags,
        props: partition.props,
        key: partition.key,
        ref_value: partition.ref_value,
        hooks: partition.hooks,
        children,
        normalize_props: partition.needs_normalize_props,
    }))
}

fn classify_fragment(
    key: Option<Value>,
    children: &[TreeNode],
    directives: &ChildDirectives,
) -> Result<VNode, CompilerError> {
    let nodes = classify_children(children)?;
    let children = resolve_children(nodes, directives);

    let signature = child_signatures(&children).map(|child_sigs| Signature::Fragment {
        key: sig_value(&key),
        // Without children no childFlags argument is written
        child_flags: if child_sigs.is_empty() {
            Some(ChildFlags::HAS_INVALID_CHILDREN)
        } else {
            children.known_flags()
        },
        children: child_sigs,
    });

    Ok(VNode::Fragment(FragmentVNode {
        key,
        children,
        signature,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::ChildFlags;

    #[test]
    fn test_static_element_has_signature() {
        let tree = TreeNode::element(
            "div",
            vec![Attribute::named("id", Value::string("a"))],
            vec![TreeNode::element("span", vec![], vec![TreeNode::text("hi")])],
        );
        let node = classify_node(&tree).unwrap();
        assert!(node.is_static());
        let sig = node.signature().unwrap().to_string();
        assert!(sig.starts_with("element:'div'|flags:1|prop:id=\"a\""));
        assert!(sig.contains("element:'span'"));
    }

    #[test]
    fn test_dynamic_attribute_blocks_static() {
        let tree = TreeNode::element("div", vec![Attribute::named("id", Value::expr("x"))], vec![]);
        assert!(!classify_node(&tree).unwrap().is_static());
    }

    #[test]
    fn test_dynamic_child_makes_parent_dynamic() {
        let tree = TreeNode::element(
            "div",
            vec![],
            vec![TreeNode::element("b", vec![], vec![TreeNode::slot("x")])],
        );
        let node = classify_node(&tree).unwrap();
        assert!(!node.is_static());
        match node {
            VNode::Element(el) => {
                assert_eq!(el.children.known_flags(), Some(ChildFlags::HAS_VNODE_CHILDREN));
            }
            _ => panic!("expected element"),
        }
    }

    #[test]
    fn test_components_never_static() {
        let tree = TreeNode::element("Com", vec![], vec![]);
        let node = classify_node(&tree).unwrap();
        assert!(matches!(node, VNode::Component(ref c) if c.flags == VNodeFlags::COMPONENT_UNKNOWN));
        assert!(!node.is_static());
    }

    #[test]
    fn test_named_fragment() {
        let tree = TreeNode::element(
            "Inferno.Fragment",
            vec![Attribute::named("key", Value::string("k"))],
            vec![TreeNode::text("x")],
        );
        let node = classify_node(&tree).unwrap();
        assert!(matches!(node, VNode::Fragment(_)));
        assert!(node.is_static());
        assert!(node.key().is_some());
    }

    #[test]
    fn test_dynamic_values_become_signature_slots() {
        let tree = TreeNode::element(
            "li",
            vec![
                Attribute::named("key", Value::expr("item.id")),
                Attribute::named("className", Value::string("row")),
            ],
            vec![TreeNode::slot("item.label")],
        );
        let node = classify_node(&tree).unwrap();
        assert!(!node.is_static());
        let sig = node.signature().unwrap();
        assert_eq!(sig.slot_count(), 2);
        assert_eq!(
            sig.to_string(),
            "element:'li'|flags:1|class=\"row\"|key=$|childFlags:0|children(slot:0=0)|/children"
        );
    }

    #[test]
    fn test_spread_and_components_have_no_signature() {
        let spread = TreeNode::element("div", vec![Attribute::spread("props")], vec![]);
        assert!(classify_node(&spread).unwrap().signature().is_none());

        let holder = TreeNode::element("div", vec![], vec![TreeNode::element("Com", vec![], vec![])]);
        assert!(classify_node(&holder).unwrap().signature().is_none());
    }

    #[test]
    fn test_named_fragment_child_flag_directives() {
        let tree = TreeNode::element(
            "Fragment",
            vec![Attribute::named("$HasKeyedChildren", Value::literal(Literal::Bool(true)))],
            vec![TreeNode::slot("rows")],
        );
        match classify_node(&tree).unwrap() {
            VNode::Fragment(frag) => {
                assert_eq!(frag.children.known_flags(), Some(ChildFlags::HAS_KEYED_CHILDREN));
                assert!(!frag.children.requires_normalization);
            }
            _ => panic!("expected fragment"),
        }

        let tree = TreeNode::element(
            "Fragment",
            vec![
                Attribute::named("$ChildFlag", Value::expr("flags")),
                Attribute::named("id", Value::string("ignored")),
            ],
            vec![TreeNode::slot("rows")],
        );
        match classify_node(&tree).unwrap() {
            VNode::Fragment(frag) => assert_eq!(frag.children.known_flags(), None),
            _ => panic!("expected fragment"),
        }
    }

    #[test]
    fn test_root_text_is_decoded() {
        let node = classify_node(&TreeNode::text("\n  a &amp; b\n")).unwrap();
        assert!(matches!(node, VNode::Text(ref t) if t == "a & b"));

        let empty = classify_node(&TreeNode::text("\n   \n")).unwrap();
        assert!(matches!(empty, VNode::Slot(ref v) if v.is_null_literal()));
    }

    #[test]
    fn test_modifier_flags() {
        let tree = TreeNode::element(
            "div",
            vec![
                Attribute::named("$ReCreate", Value::literal(Literal::Bool(true))),
                Attribute::named("contentEditable", Value::literal(Literal::Bool(true))),
            ],
            vec![],
        );
        match classify_node(&tree).unwrap() {
            VNode::Element(el) => {
                assert_eq!(
                    el.flags,
                    VNodeFlags::HTML_ELEMENT | VNodeFlags::RE_CREATE | VNodeFlags::CONTENT_EDITABLE
                );
                assert!(VNodeFlags::is_well_formed(el.flags));
            }
            _ => panic!("expected element"),
        }
    }

    #[test]
    fn test_children_attribute_on_element() {
        let tree = TreeNode::element("div", vec![Attribute::named("children", Value::string("t"))], vec![]);
        match classify_node(&tree).unwrap() {
            VNode::Element(el) => {
                assert_eq!(el.children.nodes.len(), 1);
                assert!(el.props.is_empty());
            }
            _ => panic!("expected element"),
        }
    }
}
