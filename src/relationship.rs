//! Relationship resolution: option sets and record lookup.
//!
//! A relationship field references records in another entity collection by
//! key. Option resolution merges the attribute's fixed `listvalue` options
//! with records mapped from the target collection, optionally filtered by a
//! sibling attribute's current value. Lookup resolves a stored key back to
//! its record for inline display and validation; a missing record is a
//! field-level error, raised by the validator, not a fault.

use crate::entity::{EntityCollections, EntityType};
use crate::path;
use crate::schema::{Attribute, AttributeType, Schema};
use log::warn;
use serde_json::Value;
use std::collections::HashSet;

/// Sentinel value of the synthetic "All" option prepended to multi-select
/// relationship fields.
pub const ALL_OPTION_VALUE: &str = "__system_all";

/// One selectable option of a `list`/`relationship` field.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RelationOption {
    pub label: String,
    pub value: String,
    /// Values of `rel_additional_attributes`, shown alongside the label
    pub tags: Vec<String>,
}

impl RelationOption {
    /// A fixed option whose label and value coincide.
    fn fixed(value: &str) -> Self {
        Self {
            label: value.to_string(),
            value: value.to_string(),
            tags: Vec::new(),
        }
    }
}

/// Resolve the selectable options for a relationship attribute.
///
/// Fixed `listvalue` options come first (preceded by the "All" sentinel for
/// multi-select fields), then records mapped from the target collection.
/// Options are de-duplicated by value, keeping the first occurrence;
/// records without a key value are dropped.
pub fn resolve_options(
    attribute: &Attribute,
    record: &Value,
    entities: &EntityCollections,
) -> Vec<RelationOption> {
    let mut options: Vec<RelationOption> = Vec::new();
    if attribute.list_multi_select {
        options.push(RelationOption {
            label: "All".to_string(),
            value: ALL_OPTION_VALUE.to_string(),
            tags: Vec::new(),
        });
    }
    options.extend(attribute.list_values().into_iter().map(RelationOption::fixed));

    if let Some(targets) = target_records(attribute, entities) {
        let display = attribute.rel_display_attribute.as_deref();
        let key = attribute.rel_key.as_deref();
        for item in filtered(attribute, record, targets) {
            let Some(key_attr) = key else { break };
            let Some(value) = path::get(item, key_attr).map(path::value_text) else {
                continue;
            };
            let label = display
                .and_then(|attr| path::get(item, attr))
                .map(path::value_text)
                .unwrap_or_else(|| value.clone());
            let tags = attribute
                .rel_additional_attributes
                .iter()
                .filter_map(|attr| path::get(item, attr).map(path::value_text))
                .collect();
            options.push(RelationOption { label, value, tags });
        }
    }

    let mut seen = HashSet::new();
    options.retain(|option| seen.insert(option.value.clone()));
    options
}

/// Look up the record a stored key refers to. `None` when the target
/// collection is absent or holds no record with that key.
pub fn resolve_record<'a>(
    attribute: &Attribute,
    value: &str,
    entities: &'a EntityCollections,
) -> Option<&'a Value> {
    let key = attribute.rel_key.as_deref()?;
    target_records(attribute, entities)?
        .iter()
        .find(|item| path::get(item, key).map(path::value_text).as_deref() == Some(value))
}

/// Multi-select variant of [`resolve_record`]: one slot per selected
/// value, `None` marking the values with no matching record.
pub fn resolve_records<'a>(
    attribute: &Attribute,
    values: &[String],
    entities: &'a EntityCollections,
) -> Vec<Option<&'a Value>> {
    values
        .iter()
        .map(|value| resolve_record(attribute, value, entities))
        .collect()
}

/// Attribute names whose stored values become stale when `changed`
/// changes, in discovery order.
///
/// Covers direct `source_filter_attribute_name` dependents, the
/// `embedded_entity` attributes whose `lookup` references the changed
/// attribute, and the transitive closure of both (a cleared dependent is
/// itself a change).
pub fn dependent_attributes(schema: &Schema, changed: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut queue: Vec<&str> = vec![changed];
    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(changed);

    while let Some(current) = queue.pop() {
        for attr in &schema.attributes {
            let depends = attr.source_filter_attribute_name.as_deref() == Some(current)
                || (attr.attr_type == AttributeType::EmbeddedEntity
                    && attr.lookup.as_deref() == Some(current));
            if depends && visited.insert(&attr.name) {
                out.push(attr.name.clone());
                queue.push(&attr.name);
            }
        }
    }
    out
}

fn target_records<'a>(
    attribute: &Attribute,
    entities: &'a EntityCollections,
) -> Option<&'a [Value]> {
    let entity_name = attribute.rel_entity.as_deref()?;
    let Some(entity) = EntityType::parse(entity_name) else {
        warn!(
            "attribute '{}' references unsupported entity '{}'",
            attribute.name, entity_name
        );
        return None;
    };
    Some(entities.records(entity))
}

/// Apply the dependent filter: keep records whose
/// `rel_filter_attribute_name` value equals the record's
/// `source_filter_attribute_name` value, or is contained in it when the
/// source value is an array. With either name unset, all records pass.
fn filtered<'a>(
    attribute: &Attribute,
    record: &Value,
    targets: &'a [Value],
) -> Vec<&'a Value> {
    let (Some(target_attr), Some(source_attr)) = (
        attribute.rel_filter_attribute_name.as_deref(),
        attribute.source_filter_attribute_name.as_deref(),
    ) else {
        return targets.iter().collect();
    };

    let source_value = path::get(record, source_attr);
    targets
        .iter()
        .filter(|item| {
            let Some(candidate) = path::get(item, target_attr).map(path::value_text) else {
                return false;
            };
            match source_value {
                Some(Value::Array(values)) => values
                    .iter()
                    .any(|value| path::value_text(value) == candidate),
                Some(value) => path::value_text(value) == candidate,
                None => false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntitySnapshot;
    use serde_json::json;

    fn wave_attribute() -> Attribute {
        Attribute {
            name: "wave_id".to_string(),
            attr_type: AttributeType::Relationship,
            rel_entity: Some("wave".to_string()),
            rel_key: Some("wave_id".to_string()),
            rel_display_attribute: Some("wave_name".to_string()),
            ..Default::default()
        }
    }

    fn waves(records: Vec<Value>) -> EntityCollections {
        let mut entities = EntityCollections::new();
        entities.insert(EntityType::Wave, EntitySnapshot::ready(records));
        entities
    }

    #[test]
    fn test_options_map_label_value_tags() {
        let mut attr = wave_attribute();
        attr.rel_additional_attributes = vec!["wave_status".to_string()];
        let entities = waves(vec![
            json!({"wave_id": "w-1", "wave_name": "Wave 1", "wave_status": "open"}),
        ]);
        let options = resolve_options(&attr, &json!({}), &entities);
        assert_eq!(
            options,
            vec![RelationOption {
                label: "Wave 1".to_string(),
                value: "w-1".to_string(),
                tags: vec!["open".to_string()],
            }]
        );
    }

    #[test]
    fn test_options_deduplicate_by_value_keeping_first() {
        let attr = wave_attribute();
        let entities = waves(vec![
            json!({"wave_id": "w-1", "wave_name": "First"}),
            json!({"wave_id": "w-1", "wave_name": "Second"}),
        ]);
        let options = resolve_options(&attr, &json!({}), &entities);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, "First");
    }

    #[test]
    fn test_records_without_key_value_are_dropped() {
        let attr = wave_attribute();
        let entities = waves(vec![
            json!({"wave_name": "No key"}),
            json!({"wave_id": "w-2", "wave_name": "Has key"}),
        ]);
        let options = resolve_options(&attr, &json!({}), &entities);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].value, "w-2");
    }

    #[test]
    fn test_multi_select_prepends_all_sentinel() {
        let mut attr = wave_attribute();
        attr.list_multi_select = true;
        attr.listvalue = Some("none".to_string());
        let entities = waves(vec![json!({"wave_id": "w-1", "wave_name": "Wave 1"})]);
        let options = resolve_options(&attr, &json!({}), &entities);
        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec![ALL_OPTION_VALUE, "none", "w-1"]);
        assert_eq!(options[0].label, "All");
    }

    #[test]
    fn test_unsupported_entity_returns_fixed_options_only() {
        let mut attr = wave_attribute();
        attr.rel_entity = Some("no_such_entity".to_string());
        attr.listvalue = Some("a,b".to_string());
        let options = resolve_options(&attr, &json!({}), &EntityCollections::new());
        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn test_dependent_filter_scalar_and_array_source() {
        let mut attr = Attribute {
            name: "task_id".to_string(),
            attr_type: AttributeType::Relationship,
            rel_entity: Some("wave".to_string()),
            rel_key: Some("wave_id".to_string()),
            rel_display_attribute: Some("wave_name".to_string()),
            rel_filter_attribute_name: Some("region".to_string()),
            source_filter_attribute_name: Some("target_region".to_string()),
            ..Default::default()
        };
        let entities = waves(vec![
            json!({"wave_id": "w-1", "wave_name": "EU", "region": "eu-west-1"}),
            json!({"wave_id": "w-2", "wave_name": "US", "region": "us-east-1"}),
        ]);

        let options = resolve_options(&attr, &json!({"target_region": "eu-west-1"}), &entities);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].value, "w-1");

        // Array source value: membership check
        let options = resolve_options(
            &attr,
            &json!({"target_region": ["eu-west-1", "us-east-1"]}),
            &entities,
        );
        assert_eq!(options.len(), 2);

        // No source value set: nothing passes the filter
        let options = resolve_options(&attr, &json!({}), &entities);
        assert!(options.is_empty());

        // With only one of the two filter names set, no filtering applies
        attr.rel_filter_attribute_name = None;
        let options = resolve_options(&attr, &json!({}), &entities);
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn test_resolve_record_by_key() {
        let attr = wave_attribute();
        let entities = waves(vec![json!({"wave_id": "w-1", "wave_name": "Wave 1"})]);
        assert!(resolve_record(&attr, "w-1", &entities).is_some());
        assert!(resolve_record(&attr, "w-9", &entities).is_none());

        let resolved = resolve_records(
            &attr,
            &["w-1".to_string(), "w-9".to_string()],
            &entities,
        );
        assert!(resolved[0].is_some());
        assert!(resolved[1].is_none());
    }

    #[test]
    fn test_dependent_attributes_transitive() {
        let schema = Schema {
            schema_name: "pipeline".to_string(),
            schema_type: Default::default(),
            friendly_name: None,
            attributes: vec![
                Attribute {
                    name: "template_id".to_string(),
                    ..Default::default()
                },
                Attribute {
                    name: "task_id".to_string(),
                    source_filter_attribute_name: Some("template_id".to_string()),
                    ..Default::default()
                },
                Attribute {
                    name: "task_arguments".to_string(),
                    attr_type: AttributeType::EmbeddedEntity,
                    lookup: Some("task_id".to_string()),
                    ..Default::default()
                },
                Attribute {
                    name: "unrelated".to_string(),
                    ..Default::default()
                },
            ],
        };
        let dependents = dependent_attributes(&schema, "template_id");
        assert_eq!(dependents, vec!["task_id", "task_arguments"]);
        assert_eq!(
            dependent_attributes(&schema, "task_id"),
            vec!["task_arguments"]
        );
        assert!(dependent_attributes(&schema, "unrelated").is_empty());
    }
}
