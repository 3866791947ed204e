//! Entity: a named node with a type classification and observations.

use serde::{Deserialize, Serialize};

use super::{Observation, RawObservation};

/// A node in the knowledge graph. `name` is unique across the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "entityType")]
    pub entity_type: String,
    #[serde(default)]
    pub observations: Vec<Observation>,
}

impl Entity {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            observations: Vec::new(),
        }
    }

    pub fn with_observation(mut self, obs: Observation) -> Self {
        self.observations.push(obs);
        self
    }

    /// Case-insensitive substring match on name, type, or any observation.
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.entity_type.to_lowercase().contains(needle)
            || self
                .observations
                .iter()
                .any(|o| o.content.to_lowercase().contains(needle))
    }
}

/// An entity as it arrives at a boundary: from a request payload or a
/// persisted line, with observations in any accepted form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntity {
    pub name: String,
    #[serde(rename = "entityType")]
    pub entity_type: String,
    #[serde(default)]
    pub observations: Vec<RawObservation>,
}

impl NewEntity {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            observations: Vec::new(),
        }
    }

    pub fn with_observation(mut self, obs: impl Into<RawObservation>) -> Self {
        self.observations.push(obs.into());
        self
    }
}
