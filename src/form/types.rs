//! Compiled form state types.

use crate::relationship::RelationOption;
use crate::schema::Attribute;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

use super::policy::PolicySchemaEditor;

/// Group name for attributes without an explicit `group`. Always rendered
/// first.
pub const DEFAULT_GROUP: &str = "Details";

/// Per-type dispatch result: which control renders the field, plus the
/// data that control needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldKind {
    Text,
    Password,
    Date,
    Checkbox,
    Textarea,
    Json,
    Tag,
    MultivalueString,
    Groups,
    List {
        options: Vec<RelationOption>,
        multi: bool,
    },
    Relationship {
        options: Vec<RelationOption>,
        multi: bool,
    },
    Policies {
        options: Vec<RelationOption>,
    },
    PolicyEditor {
        editors: Vec<PolicySchemaEditor>,
    },
    /// Recursively compiled embedded schema bound to the same record
    Embedded {
        fields: Vec<Field>,
    },
}

/// One visible, compiled form field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Record key path (prefixed for embedded fields)
    pub name: String,
    /// Pre-prefix name of a synthesized embedded field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orig_name: Option<String>,
    pub kind: FieldKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_desc: Option<String>,
    /// Current record value, `Null` when unset
    pub value: Value,
    pub required: bool,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,
}

/// An ordered group of fields under one heading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldGroup {
    pub name: String,
    pub fields: Vec<Field>,
}

/// The compiled form: ordered groups plus aggregate validity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormState {
    pub groups: Vec<FieldGroup>,
    /// De-duplicated names of visible fields currently in error, in render
    /// order; drives submit gating
    pub errors: Vec<String>,
    /// True iff no visible field reports a validation error
    pub is_valid: bool,
}

impl FormState {
    /// Iterate all visible fields across groups, including fields nested
    /// in embedded sub-forms.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        fn walk<'a>(fields: &'a [Field], out: &mut Vec<&'a Field>) {
            for field in fields {
                out.push(field);
                if let FieldKind::Embedded { fields: nested } = &field.kind {
                    walk(nested, out);
                }
            }
        }
        let mut all = Vec::new();
        for group in &self.groups {
            walk(&group.fields, &mut all);
        }
        all.into_iter()
    }

    /// Find a visible field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().find(|field| field.name == name)
    }
}

/// One change delta handed back to the owning form container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub field: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,
}

/// Attribute ordering: explicit numeric `group_order` ascending, attributes
/// without one after those with it, ties falling back to case-insensitive
/// description comparison. Used with a stable sort.
pub(crate) fn compare_attributes(a: &Attribute, b: &Attribute) -> Ordering {
    match (a.group_order_value(), b.group_order_value()) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| compare_labels(a, b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_labels(a, b),
    }
}

fn compare_labels(a: &Attribute, b: &Attribute) -> Ordering {
    a.display_label()
        .to_lowercase()
        .cmp(&b.display_label().to_lowercase())
}
