//! The schema-to-form compiler.
//!
//! Compilation is a pure, synchronous recomputation: every record, schema,
//! or snapshot change re-runs `compile` and yields a fresh [`FormState`].
//! There is no transition history; aggregate validity falls out of the
//! visible fields' validation results on each pass.

use crate::condition::{self, Mode};
use crate::entity::EntityCollections;
use crate::path;
use crate::relationship;
use crate::schema::{Attribute, AttributeType, Schema, SchemaRegistry};
use crate::validation::{self, ValidationContext};
use log::{debug, trace, warn};
use serde_json::{Map, Value};

use super::policy;
use super::types::{
    DEFAULT_GROUP, Field, FieldChange, FieldGroup, FieldKind, FormState, compare_attributes,
};

/// Embedded sub-schemas deeper than this stop expanding; a cyclic lookup
/// chain must not recurse forever.
const MAX_EMBED_DEPTH: usize = 4;

/// Caller-supplied edit-permission predicate.
pub trait AccessPolicy {
    fn is_read_only(&self, schema: &Schema, attribute: &Attribute) -> bool;
}

/// Access policy granting edit everywhere. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn is_read_only(&self, _schema: &Schema, _attribute: &Attribute) -> bool {
        false
    }
}

/// Supplies the attribute list embedded under an `embedded_entity` field.
///
/// Implementations typically look up the related record selected by the
/// attribute's `lookup` value and read the schema stored on it. Names are
/// returned un-prefixed; the compiler prefixes them.
pub trait EmbeddedSchemaSource {
    fn embedded_attributes(
        &self,
        attribute: &Attribute,
        record: &Value,
    ) -> Option<Vec<Attribute>>;
}

/// Source that never embeds anything. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEmbedded;

impl EmbeddedSchemaSource for NoEmbedded {
    fn embedded_attributes(&self, _attribute: &Attribute, _record: &Value) -> Option<Vec<Attribute>> {
        None
    }
}

/// Standard embedded-schema source: resolves the related record via the
/// attribute's relationship fields, using the record's `lookup` value as
/// the key, and deserializes the attribute list stored under the related
/// record's `attributes` key.
#[derive(Debug, Clone, Copy)]
pub struct LookupEmbeddedSource<'a> {
    entities: &'a EntityCollections,
}

impl<'a> LookupEmbeddedSource<'a> {
    pub fn new(entities: &'a EntityCollections) -> Self {
        Self { entities }
    }
}

impl EmbeddedSchemaSource for LookupEmbeddedSource<'_> {
    fn embedded_attributes(
        &self,
        attribute: &Attribute,
        record: &Value,
    ) -> Option<Vec<Attribute>> {
        let lookup_attr = attribute.lookup.as_deref()?;
        let key = path::get(record, lookup_attr).map(path::value_text)?;
        let related = relationship::resolve_record(attribute, &key, self.entities)?;
        let raw = related.get("attributes")?.clone();
        match serde_json::from_value::<Vec<Attribute>>(raw) {
            Ok(attributes) => Some(attributes),
            Err(err) => {
                warn!(
                    "embedded schema on '{}' has malformed attributes: {err}",
                    attribute.name
                );
                None
            }
        }
    }
}

static ALLOW_ALL: AllowAll = AllowAll;
static NO_EMBEDDED: NoEmbedded = NoEmbedded;

/// Compiles a schema plus a record into renderable, validated form state.
pub struct FormCompiler<'a> {
    schema: &'a Schema,
    entities: &'a EntityCollections,
    registry: Option<&'a SchemaRegistry>,
    access: &'a dyn AccessPolicy,
    embedded: &'a dyn EmbeddedSchemaSource,
    mode: Mode,
}

impl<'a> FormCompiler<'a> {
    pub fn new(schema: &'a Schema, entities: &'a EntityCollections) -> Self {
        Self {
            schema,
            entities,
            registry: None,
            access: &ALLOW_ALL,
            embedded: &NO_EMBEDDED,
            mode: Mode::Edit,
        }
    }

    /// Create-mode compilation (`hiddenCreate` applies).
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Inject the edit-permission predicate.
    pub fn with_access(mut self, access: &'a dyn AccessPolicy) -> Self {
        self.access = access;
        self
    }

    /// Registry access, needed only for `policy` field expansion.
    pub fn with_registry(mut self, registry: &'a SchemaRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Inject the embedded-schema source for `embedded_entity` fields.
    pub fn with_embedded_source(mut self, embedded: &'a dyn EmbeddedSchemaSource) -> Self {
        self.embedded = embedded;
        self
    }

    /// Compile the full form state for `record`.
    ///
    /// Hidden fields are excluded entirely: they render nothing and any
    /// previously recorded validation error is dropped with them, so a
    /// hidden control never blocks submission.
    pub fn compile(&self, record: &Value) -> FormState {
        let mut sorted: Vec<&Attribute> = self.schema.attributes.iter().collect();
        sorted.sort_by(|a, b| compare_attributes(a, b));

        let mut groups: Vec<FieldGroup> = Vec::new();
        for attribute in sorted {
            if condition::effective_hidden(attribute, record, self.mode) {
                trace!("attribute '{}' hidden, skipped", attribute.name);
                continue;
            }
            let field = self.build_field(attribute, record, 0);
            let group_name = attribute.group.as_deref().unwrap_or(DEFAULT_GROUP);
            match groups.iter_mut().find(|group| group.name == group_name) {
                Some(group) => group.fields.push(field),
                None => groups.push(FieldGroup {
                    name: group_name.to_string(),
                    fields: vec![field],
                }),
            }
        }
        groups.sort_by(|a, b| {
            let a_default = a.name == DEFAULT_GROUP;
            let b_default = b.name == DEFAULT_GROUP;
            b_default.cmp(&a_default).then_with(|| a.name.cmp(&b.name))
        });

        let state = FormState {
            errors: Vec::new(),
            is_valid: true,
            groups,
        };
        let mut errors: Vec<String> = Vec::new();
        for field in state.fields() {
            if field.validation_error.is_some() && !errors.contains(&field.name) {
                errors.push(field.name.clone());
            }
        }
        debug!(
            "compiled '{}': {} groups, {} errors",
            self.schema.schema_name,
            state.groups.len(),
            errors.len()
        );
        FormState {
            is_valid: errors.is_empty(),
            errors,
            ..state
        }
    }

    /// Apply one user edit to the record and return the batched change
    /// deltas: the edited field plus cascade clears for every attribute
    /// whose option set the edit made stale.
    pub fn apply_change(
        &self,
        record: &mut Value,
        field: &str,
        value: Value,
    ) -> Vec<FieldChange> {
        path::set(record, field, value.clone());
        let mut changes = vec![FieldChange {
            field: field.to_string(),
            validation_error: self.validate_path(record, field),
            value,
        }];

        for dependent in relationship::dependent_attributes(self.schema, field) {
            let cleared = self
                .schema
                .attribute(&dependent)
                .map(cleared_value)
                .unwrap_or(Value::String(String::new()));
            path::set(record, &dependent, cleared.clone());
            changes.push(FieldChange {
                validation_error: self.validate_path(record, &dependent),
                field: dependent,
                value: cleared,
            });
        }
        changes
    }

    fn validate_path(&self, record: &Value, field: &str) -> Option<String> {
        let attribute = self.schema.attribute(field)?;
        let ctx = ValidationContext {
            record,
            entities: self.entities,
        };
        validation::validate_value(attribute, path::get(record, field), &ctx)
    }

    fn build_field(&self, attribute: &Attribute, record: &Value, depth: usize) -> Field {
        let current = path::get(record, &attribute.name);
        let ctx = ValidationContext {
            record,
            entities: self.entities,
        };
        Field {
            name: attribute.name.clone(),
            orig_name: attribute.orig_name.clone(),
            kind: self.field_kind(attribute, record, depth),
            label: attribute.display_label().to_string(),
            long_desc: attribute.long_desc.clone(),
            value: current.cloned().unwrap_or(Value::Null),
            required: condition::effective_required(attribute, record),
            read_only: self.access.is_read_only(self.schema, attribute),
            validation_error: validation::validate_value(attribute, current, &ctx),
        }
    }

    fn field_kind(&self, attribute: &Attribute, record: &Value, depth: usize) -> FieldKind {
        match attribute.attr_type {
            AttributeType::String => FieldKind::Text,
            AttributeType::Password => FieldKind::Password,
            AttributeType::Date => FieldKind::Date,
            AttributeType::Checkbox => FieldKind::Checkbox,
            AttributeType::Textarea => FieldKind::Textarea,
            AttributeType::Json => FieldKind::Json,
            AttributeType::Tag => FieldKind::Tag,
            AttributeType::MultivalueString => FieldKind::MultivalueString,
            AttributeType::Groups => FieldKind::Groups,
            AttributeType::List => FieldKind::List {
                options: relationship::resolve_options(attribute, record, self.entities),
                multi: attribute.list_multi_select,
            },
            AttributeType::Relationship => FieldKind::Relationship {
                options: relationship::resolve_options(attribute, record, self.entities),
                multi: attribute.list_multi_select,
            },
            AttributeType::Policies => FieldKind::Policies {
                options: policy::policy_options(self.entities),
            },
            AttributeType::Policy => {
                let editors = match self.registry {
                    Some(registry) => policy::expand(registry, attribute, record),
                    None => {
                        warn!(
                            "policy attribute '{}' compiled without a registry",
                            attribute.name
                        );
                        Vec::new()
                    }
                };
                FieldKind::PolicyEditor { editors }
            }
            AttributeType::EmbeddedEntity => FieldKind::Embedded {
                fields: self.compile_embedded(attribute, record, depth),
            },
        }
    }

    /// Compile the sub-fields of an `embedded_entity` attribute.
    ///
    /// Synthesized attributes are renamed under the parent's prefix with
    /// their original name preserved, so re-compiling an already-prefixed
    /// attribute list is idempotent.
    fn compile_embedded(&self, attribute: &Attribute, record: &Value, depth: usize) -> Vec<Field> {
        if depth >= MAX_EMBED_DEPTH {
            warn!(
                "embedded schema on '{}' exceeds depth {MAX_EMBED_DEPTH}, not expanded",
                attribute.name
            );
            return Vec::new();
        }
        let Some(raw) = self.embedded.embedded_attributes(attribute, record) else {
            return Vec::new();
        };
        let sub_attributes: Vec<Attribute> = raw
            .into_iter()
            .map(|mut sub| {
                if sub.orig_name.is_none() {
                    let orig = std::mem::take(&mut sub.name);
                    sub.name = format!("{}.{}", attribute.name, orig);
                    sub.orig_name = Some(orig);
                }
                sub
            })
            .collect();

        let mut sorted: Vec<&Attribute> = sub_attributes.iter().collect();
        sorted.sort_by(|a, b| compare_attributes(a, b));
        sorted
            .into_iter()
            .filter(|sub| !condition::effective_hidden(sub, record, self.mode))
            .map(|sub| self.build_field(sub, record, depth + 1))
            .collect()
    }
}

/// The stale value a dependent attribute resets to when its option set
/// changes.
fn cleared_value(attribute: &Attribute) -> Value {
    if attribute.attr_type == AttributeType::EmbeddedEntity {
        return Value::Object(Map::new());
    }
    let multi = attribute.list_multi_select
        || matches!(
            attribute.attr_type,
            AttributeType::MultivalueString
                | AttributeType::Tag
                | AttributeType::Groups
                | AttributeType::Policies
        );
    if multi {
        Value::Array(Vec::new())
    } else {
        Value::String(String::new())
    }
}
