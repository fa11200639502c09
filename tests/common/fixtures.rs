//! A representative server schema and entity snapshots, shaped like the
//! data an admin session would load.

use schema_forms::{EntityCollections, EntitySnapshot, EntityType, SchemaRegistry};
use serde_json::json;

pub const SERVER_SCHEMA: &str = r#"{
    "schema_name": "server",
    "schema_type": "user",
    "attributes": [
        {
            "name": "server_name",
            "type": "string",
            "description": "Server Name",
            "required": true,
            "validation_regex": "^[a-zA-Z0-9][a-zA-Z0-9._-]*$",
            "validation_regex_msg": "Server name must start with a letter or digit.",
            "group_order": "1",
            "system": true
        },
        {
            "name": "server_os_family",
            "type": "list",
            "description": "Server OS Family",
            "listvalue": "windows,linux",
            "group_order": "2"
        },
        {
            "name": "network_interface_id",
            "type": "string",
            "description": "Network Interface Id",
            "group": "Networking"
        },
        {
            "name": "subnet_IDs",
            "type": "multivalue-string",
            "description": "Subnet Ids",
            "validation_regex": "^subnet-([a-z0-9]{8}|[a-z0-9]{17})$",
            "validation_regex_msg": "Subnets must start with subnet-, followed by 8 or 17 alphanumeric characters.",
            "conditions": {
                "queries": [
                    {"comparator": "!empty", "attribute": "network_interface_id"}
                ],
                "outcomes": {
                    "true": ["hidden"],
                    "false": ["not_hidden"]
                }
            },
            "group": "Networking"
        },
        {
            "name": "wave_id",
            "type": "relationship",
            "description": "Wave Id",
            "rel_entity": "wave",
            "rel_key": "wave_id",
            "rel_display_attribute": "wave_name"
        },
        {
            "name": "app_ids",
            "type": "relationship",
            "description": "Application Ids",
            "listMultiSelect": true,
            "rel_entity": "application",
            "rel_key": "app_id",
            "rel_display_attribute": "app_name",
            "rel_filter_attribute_name": "wave_id",
            "source_filter_attribute_name": "wave_id"
        },
        {
            "name": "launch_template",
            "type": "json",
            "description": "Launch Template Overrides"
        }
    ]
}"#;

pub fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry
        .load_schema_from_str(SERVER_SCHEMA)
        .expect("server schema fixture parses");
    registry
}

pub fn entities() -> EntityCollections {
    let mut entities = EntityCollections::new();
    entities.insert(
        EntityType::Wave,
        EntitySnapshot::ready(vec![
            json!({"wave_id": "w-1", "wave_name": "Wave 1"}),
            json!({"wave_id": "w-2", "wave_name": "Wave 2"}),
        ]),
    );
    entities.insert(
        EntityType::Application,
        EntitySnapshot::ready(vec![
            json!({"app_id": "a-1", "app_name": "CRM", "wave_id": "w-1"}),
            json!({"app_id": "a-2", "app_name": "Billing", "wave_id": "w-2"}),
        ]),
    );
    entities
}
