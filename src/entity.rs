//! Read-only entity collection snapshots.
//!
//! Relationship fields resolve their options and validate their values
//! against these collections. The data is owned and fetched by external
//! collaborators; this crate only reads immutable snapshots, each carrying
//! a loading flag and an optional fetch error, and re-derives form state
//! whenever a new snapshot arrives.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The entity collections a relationship may target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Application,
    Server,
    Wave,
    Database,
    Script,
    Secret,
    Policy,
    Pipeline,
    PipelineTemplate,
    PipelineTemplateTask,
}

impl EntityType {
    /// Parse a `rel_entity` value. Unknown names yield `None`; the
    /// resolver then falls back to fixed options only.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "application" => Self::Application,
            "server" => Self::Server,
            "wave" => Self::Wave,
            "database" => Self::Database,
            "script" => Self::Script,
            "secret" => Self::Secret,
            "policy" => Self::Policy,
            "pipeline" => Self::Pipeline,
            "pipeline_template" => Self::PipelineTemplate,
            "pipeline_template_task" => Self::PipelineTemplateTask,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Server => "server",
            Self::Wave => "wave",
            Self::Database => "database",
            Self::Script => "script",
            Self::Secret => "secret",
            Self::Policy => "policy",
            Self::Pipeline => "pipeline",
            Self::PipelineTemplate => "pipeline_template",
            Self::PipelineTemplateTask => "pipeline_template_task",
        }
    }
}

/// One collection's immutable snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Records in the collection
    #[serde(default)]
    pub data: Vec<Value>,
    /// The external fetch has not completed yet
    #[serde(default)]
    pub is_loading: bool,
    /// Fetch failure reported by the external collaborator
    #[serde(default)]
    pub error: Option<String>,
}

impl EntitySnapshot {
    /// A completed snapshot holding `data`.
    pub fn ready(data: Vec<Value>) -> Self {
        Self {
            data,
            is_loading: false,
            error: None,
        }
    }

    /// A snapshot still being fetched.
    pub fn loading() -> Self {
        Self {
            data: Vec::new(),
            is_loading: true,
            error: None,
        }
    }
}

/// The set of entity snapshots available to one form instance.
#[derive(Debug, Clone, Default)]
pub struct EntityCollections {
    collections: HashMap<EntityType, EntitySnapshot>,
}

impl EntityCollections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace a collection's snapshot.
    pub fn insert(&mut self, entity: EntityType, snapshot: EntitySnapshot) {
        self.collections.insert(entity, snapshot);
    }

    pub fn get(&self, entity: EntityType) -> Option<&EntitySnapshot> {
        self.collections.get(&entity)
    }

    /// Records of a collection; empty when absent or still loading.
    pub fn records(&self, entity: EntityType) -> &[Value] {
        self.collections
            .get(&entity)
            .map(|snapshot| snapshot.data.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_loading(&self, entity: EntityType) -> bool {
        self.collections
            .get(&entity)
            .is_some_and(|snapshot| snapshot.is_loading)
    }
}
