//! Schema registry: loading, lookup, and admin mutation of the schema set.
//!
//! The registry is loaded once per admin session from JSON (strings, files,
//! or a directory of schema files) and afterwards serves read access to the
//! form compiler. Admin mutation entry points enforce the set invariants:
//! schema names are unique across the set, attribute names are unique
//! within a schema, and system-defined attributes keep their name and type.

use super::types::{Attribute, Schema};
use crate::error::{SchemaError, SchemaResult};
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Registry for the session's schema set.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from an already-parsed schema list.
    pub fn from_schemas(schemas: impl IntoIterator<Item = Schema>) -> SchemaResult<Self> {
        let mut registry = Self::new();
        for schema in schemas {
            registry.add_schema(schema)?;
        }
        Ok(registry)
    }

    /// Load every `*.json` schema file in a directory.
    pub fn from_schema_dir<P: AsRef<Path>>(schema_dir: P) -> SchemaResult<Self> {
        let mut registry = Self::new();
        let mut entries: Vec<_> = fs::read_dir(schema_dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        entries.sort();
        for path in entries {
            registry.load_schema_from_file(&path)?;
        }
        Ok(registry)
    }

    /// Load one schema from a JSON file and register it.
    pub fn load_schema_from_file<P: AsRef<Path>>(&mut self, path: P) -> SchemaResult<&Schema> {
        let content = fs::read_to_string(&path)?;
        self.load_schema_from_str(&content)
    }

    /// Load one schema from a JSON string and register it.
    pub fn load_schema_from_str(&mut self, content: &str) -> SchemaResult<&Schema> {
        let schema: Schema = serde_json::from_str(content)?;
        let name = schema.schema_name.clone();
        self.add_schema(schema)?;
        Ok(&self.schemas[&name])
    }

    /// Register a schema, enforcing set invariants.
    pub fn add_schema(&mut self, schema: Schema) -> SchemaResult<()> {
        if self.schemas.contains_key(&schema.schema_name) {
            return Err(SchemaError::DuplicateSchema {
                schema_name: schema.schema_name,
            });
        }
        Self::check_attribute_names(&schema)?;
        debug!(
            "registered schema '{}' with {} attributes",
            schema.schema_name,
            schema.attributes.len()
        );
        self.schemas.insert(schema.schema_name.clone(), schema);
        Ok(())
    }

    /// Get a schema by name.
    pub fn get_schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// All registered schemas, ordered by name for deterministic iteration.
    pub fn schemas(&self) -> Vec<&Schema> {
        let mut all: Vec<&Schema> = self.schemas.values().collect();
        all.sort_by(|a, b| a.schema_name.cmp(&b.schema_name));
        all
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry holds no schemas.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Add an attribute to a schema.
    pub fn add_attribute(&mut self, schema_name: &str, attribute: Attribute) -> SchemaResult<()> {
        let schema = self
            .schemas
            .get_mut(schema_name)
            .ok_or_else(|| SchemaError::schema_not_found(schema_name))?;
        if schema.attribute(&attribute.name).is_some() {
            return Err(SchemaError::DuplicateAttribute {
                schema_name: schema_name.to_string(),
                attribute: attribute.name,
            });
        }
        schema.attributes.push(attribute);
        Ok(())
    }

    /// Replace the attribute named `name`.
    ///
    /// System-defined attributes keep their name and type; any other field
    /// may change. Renames are also checked against the uniqueness
    /// invariant.
    pub fn update_attribute(
        &mut self,
        schema_name: &str,
        name: &str,
        replacement: Attribute,
    ) -> SchemaResult<()> {
        let schema = self
            .schemas
            .get_mut(schema_name)
            .ok_or_else(|| SchemaError::schema_not_found(schema_name))?;
        let index = schema
            .attributes
            .iter()
            .position(|attr| attr.name == name)
            .ok_or_else(|| SchemaError::attribute_not_found(schema_name, name))?;

        let existing = &schema.attributes[index];
        if existing.system
            && (replacement.name != existing.name || replacement.attr_type != existing.attr_type)
        {
            return Err(SchemaError::SystemAttributeRestricted {
                attribute: name.to_string(),
            });
        }
        if replacement.name != name && schema.attribute(&replacement.name).is_some() {
            return Err(SchemaError::DuplicateAttribute {
                schema_name: schema_name.to_string(),
                attribute: replacement.name,
            });
        }
        schema.attributes[index] = replacement;
        Ok(())
    }

    /// Delete the attribute named `name`. System-defined attributes cannot
    /// be deleted.
    pub fn delete_attribute(&mut self, schema_name: &str, name: &str) -> SchemaResult<Attribute> {
        let schema = self
            .schemas
            .get_mut(schema_name)
            .ok_or_else(|| SchemaError::schema_not_found(schema_name))?;
        let index = schema
            .attributes
            .iter()
            .position(|attr| attr.name == name)
            .ok_or_else(|| SchemaError::attribute_not_found(schema_name, name))?;
        if schema.attributes[index].system {
            return Err(SchemaError::SystemAttributeRestricted {
                attribute: name.to_string(),
            });
        }
        Ok(schema.attributes.remove(index))
    }

    fn check_attribute_names(schema: &Schema) -> SchemaResult<()> {
        let mut seen = std::collections::HashSet::new();
        for attr in &schema.attributes {
            if !seen.insert(attr.name.as_str()) {
                return Err(SchemaError::DuplicateAttribute {
                    schema_name: schema.schema_name.clone(),
                    attribute: attr.name.clone(),
                });
            }
        }
        Ok(())
    }
}
