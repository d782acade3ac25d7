//! Canonical Hasher & Blueprint Cache for the VNode Compiler
//!
//! A `Signature` is the structural identity of a subtree made of elements,
//! fragments and text. Run-time values in it are placeholders: an attribute
//! expression renders as `$`, an expression child as `slot:N=<childFlags>`.
//! A signature without placeholders describes a fully static subtree that is
//! built once; one with placeholders describes a template that is called
//! with the values in order. The cache is keyed by the whole structure: a
//! lookup only hits on full equality, never on a digest.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::attributes::Category;
use crate::codegen::render_literal;
use crate::flags::ChildFlags;
use crate::ir::{Literal, Value};

/// An attribute value as far as structure is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SigValue {
    Literal(Literal),
    /// Supplied per call.
    Slot,
}

impl SigValue {
    pub fn of(value: &Value) -> Self {
        match value.as_literal() {
            Some(literal) => SigValue::Literal(literal.clone()),
            None => SigValue::Slot,
        }
    }

    fn is_slot(&self) -> bool {
        matches!(self, SigValue::Slot)
    }
}

impl fmt::Display for SigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigValue::Literal(literal) => write!(f, "{}", render_literal(literal)),
            SigValue::Slot => write!(f, "$"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropSignature {
    pub name: String,
    pub category: Category,
    pub value: SigValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Signature {
    Element {
        tag: String,
        flags: u32,
        class_name: Option<SigValue>,
        props: Vec<PropSignature>,
        key: Option<SigValue>,
        ref_value: Option<SigValue>,
        /// None when a `$ChildFlag` expression decides at run time.
        child_flags: Option<u32>,
        children: Vec<Signature>,
    },
    Fragment {
        key: Option<SigValue>,
        child_flags: Option<u32>,
        children: Vec<Signature>,
    },
    Text(String),
    /// Expression child.
    Slot,
}

impl Signature {
    /// Values a template of this shape takes per call.
    pub fn slot_count(&self) -> usize {
        match self {
            Signature::Element {
                class_name,
                props,
                key,
                ref_value,
                child_flags,
                children,
                ..
            } => {
                let values = class_name
                    .iter()
                    .chain(key)
                    .chain(ref_value)
                    .chain(props.iter().map(|p| &p.value))
                    .filter(|v| v.is_slot())
                    .count();
                values + usize::from(child_flags.is_none()) + children_slot_count(children)
            }
            Signature::Fragment {
                key,
                child_flags,
                children,
            } => {
                let key_slots = usize::from(key.as_ref().is_some_and(SigValue::is_slot));
                key_slots + usize::from(child_flags.is_none()) + children_slot_count(children)
            }
            Signature::Text(_) => 0,
            Signature::Slot => 1,
        }
    }

    /// No per-call values and no run-time child normalization anywhere.
    pub fn is_static(&self) -> bool {
        self.slot_count() == 0 && !self.normalizes_children()
    }

    fn normalizes_children(&self) -> bool {
        match self {
            Signature::Element {
                child_flags,
                children,
                ..
            }
            | Signature::Fragment {
                child_flags,
                children,
                ..
            } => {
                *child_flags == Some(ChildFlags::UNKNOWN_CHILDREN)
                    || children.iter().any(Signature::normalizes_children)
            }
            Signature::Text(_) | Signature::Slot => false,
        }
    }
}

fn children_slot_count(children: &[Signature]) -> usize {
    children.iter().map(Signature::slot_count).sum()
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signature::Element {
                tag,
                flags,
                class_name,
                props,
                key,
                ref_value,
                child_flags,
                children,
            } => {
                write!(f, "element:'{}'|flags:{}", tag, flags)?;
                if let Some(class_name) = class_name {
                    write!(f, "|class={}", class_name)?;
                }
                for prop in props {
                    let label = match prop.category {
                        Category::Style => "style",
                        Category::Event => "event",
                        _ => "prop",
                    };
                    write!(f, "|{}:{}={}", label, prop.name, prop.value)?;
                }
                write_slots(f, key, ref_value)?;
                write_children(f, *child_flags, children)
            }
            Signature::Fragment {
                key,
                child_flags,
                children,
            } => {
                write!(f, "fragment")?;
                write_slots(f, key, &None)?;
                write_children(f, *child_flags, children)
            }
            Signature::Text(value) => write!(f, "text:{}", render_literal(&Literal::Str(value.clone()))),
            Signature::Slot => write!(f, "slot"),
        }
    }
}

fn write_slots(
    f: &mut fmt::Formatter<'_>,
    key: &Option<SigValue>,
    ref_value: &Option<SigValue>,
) -> fmt::Result {
    if let Some(key) = key {
        write!(f, "|key={}", key)?;
    }
    if let Some(ref_value) = ref_value {
        write!(f, "|ref={}", ref_value)?;
    }
    Ok(())
}

fn write_children(
    f: &mut fmt::Formatter<'_>,
    child_flags: Option<u32>,
    children: &[Signature],
) -> fmt::Result {
    let flags = match child_flags {
        Some(flags) => flags.to_string(),
        None => "$".to_string(),
    };
    write!(f, "|childFlags:{}|children(", flags)?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        match child {
            Signature::Slot => write!(f, "slot:{}={}", i, flags)?,
            _ => write!(f, "{}", child)?,
        }
    }
    write!(f, ")|/children")
}

// ═══════════════════════════════════════════════════════════════════════════════
// BLUEPRINT CACHE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintEntry {
    /// Canonical text form of the signature.
    pub signature: String,
    pub id: u32,
    /// Construction expression. Templates refer to their arguments as
    /// `v0`, `v1`, ...
    pub skeleton: String,
    /// Per-call arguments; zero for a static blueprint.
    pub slot_count: usize,
}

/// Per-file map from signature to blueprint. Ids are handed out in first
/// occurrence order.
#[derive(Debug, Default)]
pub struct BlueprintCache {
    entries: HashMap<Signature, BlueprintEntry>,
    next_id: u32,
}

impl BlueprintCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, signature: &Signature) -> Option<&BlueprintEntry> {
        self.entries.get(signature)
    }

    /// Records a new blueprint and returns its id. Static blueprints and
    /// templates share one id sequence.
    pub fn insert(&mut self, signature: Signature, skeleton: String, slot_count: usize) -> u32 {
        if let Some(entry) = self.entries.get(&signature) {
            return entry.id;
        }
        let id = self.next_id;
        self.next_id += 1;
        let entry = BlueprintEntry {
            signature: signature.to_string(),
            id,
            skeleton,
            slot_count,
        };
        self.entries.insert(signature, entry);
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries ordered by id.
    pub fn entries(&self) -> Vec<&BlueprintEntry> {
        let mut entries: Vec<&BlueprintEntry> = self.entries.values().collect();
        entries.sort_by_key(|e| e.id);
        entries
    }
}
