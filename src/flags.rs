//! Flag Tables for the VNode Compiler
//!
//! Bit values shared with the runtime's construction API. These numbers are
//! part of the emitted code and must never be renumbered.

/// Version of the flag layout below. Bumped only when the runtime changes its bit layout.
pub const FLAGS_LAYOUT_VERSION: u32 = 1;

// ═══════════════════════════════════════════════════════════════════════════════
// VNODE FLAGS
// ═══════════════════════════════════════════════════════════════════════════════

pub struct VNodeFlags;

impl VNodeFlags {
    pub const HTML_ELEMENT: u32 = 1;
    pub const COMPONENT_UNKNOWN: u32 = 1 << 1;
    pub const COMPONENT_CLASS: u32 = 1 << 2;
    pub const COMPONENT_FUNCTION: u32 = 1 << 3;
    pub const TEXT: u32 = 1 << 4;
    pub const SVG_ELEMENT: u32 = 1 << 5;
    pub const INPUT_ELEMENT: u32 = 1 << 6;
    pub const TEXTAREA_ELEMENT: u32 = 1 << 7;
    pub const SELECT_ELEMENT: u32 = 1 << 8;
    pub const VOID: u32 = 1 << 9;
    pub const PORTAL: u32 = 1 << 10;
    pub const RE_CREATE: u32 = 1 << 11;
    pub const CONTENT_EDITABLE: u32 = 1 << 12;
    pub const FRAGMENT: u32 = 1 << 13;

    pub const FORM_ELEMENT: u32 =
        Self::INPUT_ELEMENT | Self::TEXTAREA_ELEMENT | Self::SELECT_ELEMENT;
    pub const ELEMENT: u32 = Self::HTML_ELEMENT | Self::SVG_ELEMENT | Self::FORM_ELEMENT;
    pub const COMPONENT: u32 =
        Self::COMPONENT_FUNCTION | Self::COMPONENT_CLASS | Self::COMPONENT_UNKNOWN;

    /// Every bit that identifies what a node is. Exactly one of these is set per node.
    pub const KIND_MASK: u32 =
        Self::ELEMENT | Self::COMPONENT | Self::TEXT | Self::VOID | Self::PORTAL | Self::FRAGMENT;
    /// Bits that may be combined with any kind bit.
    pub const MODIFIER_MASK: u32 = Self::RE_CREATE | Self::CONTENT_EDITABLE;

    /// Returns true when `flags` holds exactly one kind bit and nothing unknown.
    pub fn is_well_formed(flags: u32) -> bool {
        let kind = flags & Self::KIND_MASK;
        kind.count_ones() == 1 && flags & !(Self::KIND_MASK | Self::MODIFIER_MASK) == 0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CHILD FLAGS
// ═══════════════════════════════════════════════════════════════════════════════

pub struct ChildFlags;

impl ChildFlags {
    pub const UNKNOWN_CHILDREN: u32 = 0;
    pub const HAS_INVALID_CHILDREN: u32 = 1;
    pub const HAS_VNODE_CHILDREN: u32 = 1 << 1;
    pub const HAS_NON_KEYED_CHILDREN: u32 = 1 << 2;
    pub const HAS_KEYED_CHILDREN: u32 = 1 << 3;
    pub const HAS_TEXT_CHILDREN: u32 = 1 << 4;

    pub const MULTIPLE_CHILDREN: u32 = Self::HAS_NON_KEYED_CHILDREN | Self::HAS_KEYED_CHILDREN;

    /// Value the runtime assumes when the childFlags argument is omitted.
    pub const RUNTIME_DEFAULT: u32 = Self::HAS_INVALID_CHILDREN;
}

// ═══════════════════════════════════════════════════════════════════════════════
// ELEMENT KIND LOOKUP
// ═══════════════════════════════════════════════════════════════════════════════

/// Kind flag for a plain element tag. Media tags have no dedicated bit in the
/// current runtime and resolve to `HTML_ELEMENT` like every other tag.
pub fn element_kind_flags(tag: &str) -> u32 {
    match tag {
        "svg" => VNodeFlags::SVG_ELEMENT,
        "input" => VNodeFlags::INPUT_ELEMENT,
        "textarea" => VNodeFlags::TEXTAREA_ELEMENT,
        "select" => VNodeFlags::SELECT_ELEMENT,
        _ => VNodeFlags::HTML_ELEMENT,
    }
}

/// Maps a `$Has…Children` directive name to its child flag.
pub fn child_flag_directive(name: &str) -> Option<u32> {
    match name {
        "$HasKeyedChildren" => Some(ChildFlags::HAS_KEYED_CHILDREN),
        "$HasNonKeyedChildren" => Some(ChildFlags::HAS_NON_KEYED_CHILDREN),
        "$HasVNodeChildren" => Some(ChildFlags::HAS_VNODE_CHILDREN),
        "$HasTextChildren" => Some(ChildFlags::HAS_TEXT_CHILDREN),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_values() {
        assert_eq!(VNodeFlags::HTML_ELEMENT, 1);
        assert_eq!(VNodeFlags::COMPONENT_UNKNOWN, 2);
        assert_eq!(VNodeFlags::SVG_ELEMENT, 32);
        assert_eq!(VNodeFlags::INPUT_ELEMENT, 64);
        assert_eq!(VNodeFlags::TEXTAREA_ELEMENT, 128);
        assert_eq!(VNodeFlags::SELECT_ELEMENT, 256);
        assert_eq!(VNodeFlags::RE_CREATE, 2048);
        assert_eq!(VNodeFlags::CONTENT_EDITABLE, 4096);
        assert_eq!(VNodeFlags::FRAGMENT, 8192);
        assert_eq!(ChildFlags::HAS_KEYED_CHILDREN, 8);
        assert_eq!(ChildFlags::HAS_TEXT_CHILDREN, 16);
    }

    #[test]
    fn test_element_kind_table() {
        assert_eq!(element_kind_flags("div"), VNodeFlags::HTML_ELEMENT);
        assert_eq!(element_kind_flags("video"), VNodeFlags::HTML_ELEMENT);
        assert_eq!(element_kind_flags("svg"), VNodeFlags::SVG_ELEMENT);
        assert_eq!(element_kind_flags("textarea"), VNodeFlags::TEXTAREA_ELEMENT);
        assert_eq!(element_kind_flags("select"), VNodeFlags::SELECT_ELEMENT);
    }

    #[test]
    fn test_well_formed() {
        assert!(VNodeFlags::is_well_formed(VNodeFlags::HTML_ELEMENT | VNodeFlags::RE_CREATE));
        assert!(!VNodeFlags::is_well_formed(
            VNodeFlags::HTML_ELEMENT | VNodeFlags::SVG_ELEMENT
        ));
        assert!(!VNodeFlags::is_well_formed(VNodeFlags::RE_CREATE));
    }
}
