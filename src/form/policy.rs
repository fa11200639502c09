//! Policy-type field expansion.
//!
//! A `policy` attribute holds a nested access-control list: one entry per
//! target schema with create/read/update/delete flags. The field expands
//! into one sub-editor per registered schema, ordered user schemas first,
//! then automation, with `system` schemas marked for the advanced toggle.
//! Checkbox edits mutate the nested list in the record rather than a
//! scalar value.

use crate::entity::EntityCollections;
use crate::path;
use crate::relationship::{self, RelationOption};
use crate::schema::{Attribute, AttributeType, SchemaRegistry, SchemaType};
use serde::Serialize;
use serde_json::{Value, json};

/// The four access flags of one policy entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Create,
    Read,
    Update,
    Delete,
}

impl Permission {
    /// Key of this flag inside a policy entry object.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// One per-schema sub-editor of a policy field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicySchemaEditor {
    pub schema_name: String,
    pub display_name: String,
    pub schema_type: SchemaType,
    /// System schemas render behind the advanced toggle
    pub advanced: bool,
    pub create: bool,
    pub read: bool,
    pub update: bool,
    pub delete: bool,
}

/// Expand a `policy` attribute into its per-schema sub-editors, reading
/// the current flags from the record's nested access-control list.
pub fn expand(
    registry: &SchemaRegistry,
    attribute: &Attribute,
    record: &Value,
) -> Vec<PolicySchemaEditor> {
    let acl = path::get(record, &attribute.name).and_then(Value::as_array);
    let mut editors: Vec<PolicySchemaEditor> = registry
        .schemas()
        .into_iter()
        .map(|schema| {
            let entry = acl.and_then(|entries| {
                entries.iter().find(|entry| {
                    entry.get("schema_name").map(path::value_text).as_deref()
                        == Some(&schema.schema_name)
                })
            });
            let flag = |permission: Permission| {
                entry
                    .and_then(|entry| entry.get(permission.key()))
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
            };
            PolicySchemaEditor {
                schema_name: schema.schema_name.clone(),
                display_name: schema.display_name().to_string(),
                schema_type: schema.schema_type,
                advanced: schema.schema_type == SchemaType::System,
                create: flag(Permission::Create),
                read: flag(Permission::Read),
                update: flag(Permission::Update),
                delete: flag(Permission::Delete),
            }
        })
        .collect();
    editors.sort_by_key(|editor| (type_rank(editor.schema_type), editor.schema_name.clone()));
    editors
}

/// Set one access flag inside the record's nested policy list, creating
/// the list and the schema's entry as needed.
pub fn set_permission(
    record: &mut Value,
    attribute_name: &str,
    schema_name: &str,
    permission: Permission,
    enabled: bool,
) {
    if !matches!(path::get(record, attribute_name), Some(Value::Array(_))) {
        path::set(record, attribute_name, Value::Array(Vec::new()));
    }
    let Some(Value::Array(entries)) = path::get_mut(record, attribute_name) else {
        return;
    };
    let index = entries
        .iter()
        .position(|entry| {
            entry.get("schema_name").map(path::value_text).as_deref() == Some(schema_name)
        })
        .unwrap_or_else(|| {
            entries.push(json!({"schema_name": schema_name}));
            entries.len() - 1
        });
    if let Some(entry) = entries[index].as_object_mut() {
        entry.insert(permission.key().to_string(), Value::Bool(enabled));
    }
}

/// Options for a `policies` field: the policy collection keyed by
/// `policy_id`, labeled by `policy_name`.
pub(crate) fn policy_options(entities: &EntityCollections) -> Vec<RelationOption> {
    let attribute = Attribute {
        name: "policies".to_string(),
        attr_type: AttributeType::Policies,
        rel_entity: Some("policy".to_string()),
        rel_key: Some("policy_id".to_string()),
        rel_display_attribute: Some("policy_name".to_string()),
        ..Default::default()
    };
    relationship::resolve_options(&attribute, &Value::Null, entities)
}

fn type_rank(schema_type: SchemaType) -> u8 {
    match schema_type {
        SchemaType::User => 0,
        SchemaType::Automation => 1,
        SchemaType::System => 2,
    }
}
