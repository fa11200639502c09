//! Per-type value validation.
//!
//! Validation produces a human-readable message or nothing; it never
//! raises. A malformed validation pattern in the schema is itself surfaced
//! as a field message rather than a crash, since schemas are authored by
//! administrators at runtime.

use crate::condition::{self, is_empty_value};
use crate::entity::{EntityCollections, EntityType};
use crate::path;
use crate::relationship;
use crate::schema::{Attribute, AttributeType};
use chrono::{DateTime, FixedOffset, NaiveDate};
use regex::Regex;
use serde_json::Value;

/// Message for a required attribute with no usable value.
pub const MSG_REQUIRED: &str = "You must specify a valid value.";
/// Message for an unresolved single-select relationship value.
pub const MSG_RELATED_NOT_FOUND: &str =
    "Related record not found based on value provided, please check your selection.";
/// Message for unresolved multi-select relationship values.
pub const MSG_RELATED_NOT_FOUND_MULTI: &str =
    "Related record not found based on value provided, please check your selections.";

/// Inputs the validator reads besides the value itself.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// The record the value lives in, for conditional required-ness
    pub record: &'a Value,
    /// Entity snapshots for relationship lookup
    pub entities: &'a EntityCollections,
}

/// Validate one attribute's current value. `None` means valid.
pub fn validate_value(
    attribute: &Attribute,
    value: Option<&Value>,
    ctx: &ValidationContext<'_>,
) -> Option<String> {
    if is_empty_value(value) {
        if condition::effective_required(attribute, ctx.record) {
            return Some(MSG_REQUIRED.to_string());
        }
        return None;
    }
    let Some(value) = value else {
        return None;
    };

    match attribute.attr_type {
        AttributeType::MultivalueString => validate_elements(attribute, value),
        AttributeType::Relationship => validate_relationship(attribute, value, ctx),
        AttributeType::Json => validate_json(value),
        AttributeType::List => {
            if attribute.list_multi_select {
                // Every selected element is validated, not just the first
                validate_elements(attribute, value)
            } else {
                check_regex(attribute, &path::value_text(value))
            }
        }
        AttributeType::Tag => validate_tags(attribute, value),
        AttributeType::Date => validate_date(attribute, value),
        AttributeType::Checkbox
        | AttributeType::EmbeddedEntity
        | AttributeType::Groups
        | AttributeType::Policies
        | AttributeType::Policy => None,
        AttributeType::String | AttributeType::Password | AttributeType::Textarea => {
            check_regex(attribute, &path::value_text(value))
        }
    }
}

/// Validate each element of a multi-valued string field; the first failing
/// element's message wins.
fn validate_elements(attribute: &Attribute, value: &Value) -> Option<String> {
    let texts: Vec<String> = match value {
        Value::Array(items) => items.iter().map(path::value_text).collect(),
        other => vec![path::value_text(other)],
    };
    texts
        .iter()
        .find_map(|text| check_regex(attribute, text))
}

fn validate_relationship(
    attribute: &Attribute,
    value: &Value,
    ctx: &ValidationContext<'_>,
) -> Option<String> {
    // While the target collection is still loading, an empty snapshot must
    // not read as "record missing"; validation re-runs on the next snapshot.
    if let Some(entity) = attribute.rel_entity.as_deref().and_then(EntityType::parse) {
        if ctx.entities.is_loading(entity) {
            return None;
        }
    }

    let fixed = attribute.list_values();
    let selected: Vec<String> = match value {
        Value::Array(items) => items.iter().map(path::value_text).collect(),
        other => vec![path::value_text(other)],
    };
    let all_resolve = selected.iter().all(|candidate| {
        candidate == relationship::ALL_OPTION_VALUE
            || fixed.contains(&candidate.as_str())
            || relationship::resolve_record(attribute, candidate, ctx.entities).is_some()
    });
    if all_resolve {
        None
    } else if attribute.list_multi_select {
        Some(MSG_RELATED_NOT_FOUND_MULTI.to_string())
    } else {
        Some(MSG_RELATED_NOT_FOUND.to_string())
    }
}

fn validate_json(value: &Value) -> Option<String> {
    // Stored JSON may arrive pre-parsed (object/array) or as user-typed
    // text still awaiting a parse.
    let Value::String(text) = value else {
        return None;
    };
    match serde_json::from_str::<Value>(text) {
        Ok(_) => None,
        Err(err) => Some(format!("Invalid JSON: {err}")),
    }
}

fn validate_tags(attribute: &Attribute, value: &Value) -> Option<String> {
    let Value::Array(tags) = value else {
        return None;
    };
    tags.iter()
        .filter_map(|tag| path::get(tag, "value"))
        .find_map(|tag_value| check_regex(attribute, &path::value_text(tag_value)))
}

fn validate_date(attribute: &Attribute, value: &Value) -> Option<String> {
    if attribute.validation_regex.is_some() {
        return check_regex(attribute, &path::value_text(value));
    }
    let text = path::value_text(value);
    let parses = NaiveDate::parse_from_str(&text, "%Y-%m-%d").is_ok()
        || DateTime::<FixedOffset>::parse_from_rfc3339(&text).is_ok();
    if parses {
        None
    } else {
        Some("Invalid date format, expected YYYY-MM-DD or an RFC 3339 timestamp.".to_string())
    }
}

/// Match `text` against the attribute's validation pattern. A pattern that
/// fails to compile yields an explicit configuration message instead of a
/// panic.
fn check_regex(attribute: &Attribute, text: &str) -> Option<String> {
    let pattern = attribute.validation_regex.as_deref()?;
    if pattern.is_empty() {
        return None;
    }
    match Regex::new(pattern) {
        Ok(re) => {
            if re.is_match(text) {
                None
            } else {
                Some(
                    attribute
                        .validation_regex_msg
                        .clone()
                        .unwrap_or_else(|| "Value does not match the required format.".to_string()),
                )
            }
        }
        Err(err) => Some(format!(
            "Error in validation regular expression format: {err}"
        )),
    }
}
