//! Schema-driven form state engine.
//!
//! Interprets a declarative attribute schema (field types, conditional
//! visibility, relationship constraints) and derives validated, interactive
//! form state from a JSON record plus a set of read-only entity collections.
//!
//! # Core Components
//!
//! - [`SchemaRegistry`] - Loads and manages the schema set, enforcing name
//!   uniqueness and system-attribute edit restrictions
//! - [`FormCompiler`] - Turns a schema and a record into ordered, grouped,
//!   validated form state
//! - [`EntityCollections`] - Immutable snapshots of related entity data used
//!   for relationship option resolution and lookup validation
//!
//! # Quick Start
//!
//! ```rust
//! use schema_forms::{EntityCollections, FormCompiler, SchemaRegistry};
//! use serde_json::json;
//!
//! # fn example() -> Result<(), schema_forms::SchemaError> {
//! let mut registry = SchemaRegistry::new();
//! registry.load_schema_from_str(r#"{
//!     "schema_name": "server",
//!     "attributes": [
//!         {"name": "server_name", "type": "string", "required": true}
//!     ]
//! }"#)?;
//!
//! let entities = EntityCollections::new();
//! let schema = registry.get_schema("server").unwrap();
//! let compiler = FormCompiler::new(schema, &entities);
//! let state = compiler.compile(&json!({"server_name": "web-01"}));
//! assert!(state.is_valid);
//! # Ok(())
//! # }
//! ```
//!
//! The engine performs no I/O of its own and owns no mutable global state:
//! given the same (schema, record, entity-collection snapshot) triple, the
//! compiled field set, option lists, and validation messages are identical.

pub mod condition;
pub mod entity;
pub mod error;
pub mod form;
pub mod path;
pub mod relationship;
pub mod schema;
pub mod validation;

// Re-export commonly used types for convenience
pub use condition::{ConditionOverride, Mode};
pub use entity::{EntityCollections, EntitySnapshot, EntityType};
pub use error::{SchemaError, SchemaResult};
pub use form::{
    AccessPolicy, AllowAll, EmbeddedSchemaSource, Field, FieldChange, FieldGroup, FieldKind,
    FormCompiler, FormState, LookupEmbeddedSource,
};
pub use relationship::{ALL_OPTION_VALUE, RelationOption};
pub use schema::{
    Attribute, AttributeType, Comparator, Conditions, Schema, SchemaRegistry, SchemaType,
};
