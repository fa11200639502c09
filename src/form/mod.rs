//! Schema-to-form compilation.
//!
//! The compiler walks a schema's attribute list, resolves each attribute's
//! visibility and required state against the record, resolves relationship
//! options, computes validation, and emits ordered, grouped field state.
//! Collaborators (access control, embedded-schema lookup) are injected
//! explicitly; the compiler itself holds no ambient state.
//!
//! # Key Types
//!
//! - [`FormCompiler`] - Pure recomputation of [`FormState`] from
//!   (schema, record, entity snapshots)
//! - [`FieldKind`] - Per-type dispatch result, one variant per field type
//! - [`FieldChange`] - Batched change deltas handed back to the owning
//!   form container, including cascade clears of stale dependent values

pub mod compiler;
pub mod policy;
pub mod types;


// Re-export the main types for convenience
pub use compiler::{
    AccessPolicy, AllowAll, EmbeddedSchemaSource, FormCompiler, LookupEmbeddedSource, NoEmbedded,
};
pub use policy::{Permission, PolicySchemaEditor};
pub use types::{DEFAULT_GROUP, Field, FieldChange, FieldGroup, FieldKind, FormState};
