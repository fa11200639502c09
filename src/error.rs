//! Error types for schema loading and administration.
//!
//! Only configuration-level failures surface as `Err` values: malformed
//! schema JSON, invariant violations in the schema set, and restricted
//! edits to system-defined attributes. Field-level validation failures are
//! user-correctable state, carried as per-field messages on the compiled
//! form rather than as errors, and never bubble out of this crate.

/// Errors raised while loading or mutating the schema set.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A schema with this name is already registered
    #[error("Schema '{schema_name}' is already registered")]
    DuplicateSchema { schema_name: String },

    /// Two attributes in one schema share a name
    #[error("Schema '{schema_name}' defines attribute '{attribute}' more than once")]
    DuplicateAttribute {
        schema_name: String,
        attribute: String,
    },

    /// Lookup of an unregistered schema
    #[error("Schema not found: {schema_name}")]
    SchemaNotFound { schema_name: String },

    /// Lookup of an attribute the schema does not define
    #[error("Attribute '{attribute}' not found in schema '{schema_name}'")]
    AttributeNotFound {
        schema_name: String,
        attribute: String,
    },

    /// Attempted edit of a restricted field on a system-defined attribute
    #[error(
        "Attribute '{attribute}' is system-defined; its name and type cannot be changed"
    )]
    SystemAttributeRestricted { attribute: String },

    /// Schema JSON could not be parsed
    #[error("Invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema file could not be read
    #[error("Failed to read schema file: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience constructors for the common lookup failures
impl SchemaError {
    /// Create a schema not found error
    pub fn schema_not_found(schema_name: impl Into<String>) -> Self {
        Self::SchemaNotFound {
            schema_name: schema_name.into(),
        }
    }

    /// Create an attribute not found error
    pub fn attribute_not_found(
        schema_name: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self::AttributeNotFound {
            schema_name: schema_name.into(),
            attribute: attribute.into(),
        }
    }
}

/// Result type alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
