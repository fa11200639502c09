//! Schema definitions and the schema registry.
//!
//! A schema is a named collection of attribute definitions plus a schema
//! type. The registry owns the schema set for a session, enforcing the two
//! set-level invariants (schema names globally unique, attribute names
//! unique within a schema) and the system-attribute edit restriction.
//!
//! # Key Types
//!
//! - [`Schema`] - One entity type's declarative field descriptions
//! - [`Attribute`] - A single field definition with type, conditions, and
//!   relationship constraints
//! - [`SchemaRegistry`] - Loading, lookup, and admin mutation of the set

pub mod registry;
pub mod types;


// Re-export the main types for convenience
pub use registry::SchemaRegistry;
pub use types::{
    Attribute, AttributeType, Comparator, ConditionOutcomes, ConditionQuery, Conditions,
    OutcomeKeyword, Schema, SchemaType,
};
