//! Core schema type definitions.
//!
//! These structures mirror the schema JSON served to the administration UI:
//! a schema names its entity type and lists attribute definitions; each
//! attribute carries its field type, static flags, an optional condition
//! rule deriving required/hidden state from other fields, and the
//! relationship constraints used for option resolution.

use serde::{Deserialize, Deserializer, Serialize};

/// A schema definition: one entity type's complete field description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    /// Unique schema name (e.g. "server", "wave")
    pub schema_name: String,
    /// Governs grouping in the policy editor and admin screens
    #[serde(default)]
    pub schema_type: SchemaType,
    /// Human-readable name shown in place of `schema_name` where present
    #[serde(default)]
    pub friendly_name: Option<String>,
    /// List of attribute definitions
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Schema {
    /// Find an attribute definition by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    /// Display name for UI surfaces: friendly name when set, else the
    /// schema name.
    pub fn display_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.schema_name)
    }
}

/// Schema classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// User-facing entity schemas (server, application, wave, ...)
    #[default]
    User,
    /// Internal schemas, shown only behind the advanced toggle
    System,
    /// Automation schemas (scripts, pipelines)
    Automation,
}

/// Definition of a single form field.
///
/// `name` doubles as the dotted key path of the value inside the record.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Attribute {
    /// Attribute name and record key path, unique within the schema
    pub name: String,
    /// Field type driving dispatch, validation, and option resolution
    #[serde(rename = "type", default)]
    pub attr_type: AttributeType,
    /// Short label shown next to the control
    #[serde(default)]
    pub description: Option<String>,
    /// Longer help text
    #[serde(default)]
    pub long_desc: Option<String>,
    /// Static required flag; conditions may add to it
    #[serde(default)]
    pub required: bool,
    /// Statically hidden on every form
    #[serde(default)]
    pub hidden: bool,
    /// Hidden on create forms only
    #[serde(rename = "hiddenCreate", default)]
    pub hidden_create: bool,
    /// Optional rule deriving required/hidden state from other fields
    #[serde(default)]
    pub conditions: Option<Conditions>,
    /// Validation pattern for string-like values
    #[serde(default)]
    pub validation_regex: Option<String>,
    /// Message shown when `validation_regex` does not match
    #[serde(default)]
    pub validation_regex_msg: Option<String>,
    /// Comma-delimited fixed options for `list`/`relationship` fields
    #[serde(default)]
    pub listvalue: Option<String>,
    /// Multi-selection instead of single selection
    #[serde(rename = "listMultiSelect", default)]
    pub list_multi_select: bool,
    /// Relationship target entity collection name
    #[serde(default)]
    pub rel_entity: Option<String>,
    /// Key attribute inside the target records
    #[serde(default)]
    pub rel_key: Option<String>,
    /// Attribute of the target record used as the option label
    #[serde(default)]
    pub rel_display_attribute: Option<String>,
    /// Extra target attributes surfaced as option tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rel_additional_attributes: Vec<String>,
    /// Target-side attribute the option set is filtered on
    #[serde(default)]
    pub rel_filter_attribute_name: Option<String>,
    /// Record-side attribute supplying the filter value
    #[serde(default)]
    pub source_filter_attribute_name: Option<String>,
    /// For `embedded_entity`: the attribute whose value selects the
    /// related record the embedded schema is read from
    #[serde(default)]
    pub lookup: Option<String>,
    /// UI group name; ungrouped attributes land in the default group
    #[serde(default)]
    pub group: Option<String>,
    /// Numeric ordering hint within the form, serialized as a string
    #[serde(default, deserialize_with = "de_opt_string_or_number")]
    pub group_order: Option<String>,
    /// System-defined attributes restrict edits to `name`/`type`
    #[serde(default)]
    pub system: bool,
    /// Original name of a synthesized embedded attribute, preserved so
    /// re-compiling an already-prefixed sub-schema is idempotent
    #[serde(rename = "__orig_name", default, skip_serializing_if = "Option::is_none")]
    pub orig_name: Option<String>,
}

impl Attribute {
    /// Parsed numeric value of `group_order`; non-numeric strings sort as
    /// if absent.
    pub fn group_order_value(&self) -> Option<i64> {
        self.group_order.as_deref()?.trim().parse().ok()
    }

    /// Split `listvalue` into its fixed options. Empty entries are kept
    /// out; whitespace around commas is not trimmed (option strings are
    /// authored verbatim).
    pub fn list_values(&self) -> Vec<&str> {
        self.listvalue
            .as_deref()
            .map(|raw| raw.split(',').filter(|v| !v.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Label shown for this field: description when present, else name.
    pub fn display_label(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.name)
    }
}

/// Field types, with wire names matching the schema JSON.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum AttributeType {
    #[default]
    #[serde(rename = "string")]
    String,
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "checkbox")]
    Checkbox,
    #[serde(rename = "textarea")]
    Textarea,
    #[serde(rename = "tag")]
    Tag,
    #[serde(rename = "list")]
    List,
    #[serde(rename = "multivalue-string")]
    MultivalueString,
    #[serde(rename = "relationship")]
    Relationship,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "embedded_entity")]
    EmbeddedEntity,
    #[serde(rename = "groups")]
    Groups,
    #[serde(rename = "policies")]
    Policies,
    #[serde(rename = "policy")]
    Policy,
}

/// A condition rule: AND-ed queries selecting one of two outcome branches.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Conditions {
    /// All queries must hold for the `true` branch to apply
    #[serde(default)]
    pub queries: Vec<ConditionQuery>,
    /// Outcome keywords per branch
    #[serde(default)]
    pub outcomes: ConditionOutcomes,
}

/// One comparison against another attribute's current value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionQuery {
    /// Key path of the attribute being inspected
    pub attribute: String,
    pub comparator: Comparator,
    /// Comparison operand for `=`/`!=`
    #[serde(default)]
    pub value: Option<String>,
}

/// Condition comparators. `=`/`!=` are exact string comparisons.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Comparator {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "empty")]
    Empty,
    #[serde(rename = "!empty")]
    NotEmpty,
}

/// Outcome keyword lists for the taken and not-taken branch.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConditionOutcomes {
    #[serde(rename = "true", default)]
    pub when_true: Vec<OutcomeKeyword>,
    #[serde(rename = "false", default)]
    pub when_false: Vec<OutcomeKeyword>,
}

/// Effects a condition branch may apply to a field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKeyword {
    Required,
    NotRequired,
    Hidden,
    NotHidden,
}

/// Accept `group_order` as either a JSON string or a bare number; admin
/// tooling has historically written both.
fn de_opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
