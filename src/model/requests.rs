//! Request and result payloads for the manager's operations.

use serde::{Deserialize, Serialize};

use super::{Durability, Observation, ObservationInput};

/// Observations to attach to one existing entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationAddition {
    pub entity_name: String,
    pub contents: Vec<ObservationInput>,
}

impl ObservationAddition {
    pub fn new<I, O>(entity_name: impl Into<String>, contents: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<ObservationInput>,
    {
        Self {
            entity_name: entity_name.into(),
            contents: contents.into_iter().map(Into::into).collect(),
        }
    }
}

/// What one [`ObservationAddition`] actually added, duplicates excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationsAdded {
    pub entity_name: String,
    pub added_observations: Vec<Observation>,
}

/// Observation contents to remove from one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservationDeletion {
    pub entity_name: String,
    pub observations: Vec<String>,
}

impl ObservationDeletion {
    pub fn new<I, S>(entity_name: impl Into<String>, observations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_name: entity_name.into(),
            observations: observations.into_iter().map(Into::into).collect(),
        }
    }
}

/// One observation dropped by a cleanup pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedObservation {
    pub entity_name: String,
    pub content: String,
    pub age_days: i64,
}

/// Outcome of a cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub entities_processed: usize,
    pub observations_removed: usize,
    pub removed_observations: Vec<RemovedObservation>,
}

/// An entity's observations partitioned by durability. Observations with
/// an unrecognized durability land in none of the buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurabilityBuckets {
    pub permanent: Vec<Observation>,
    pub long_term: Vec<Observation>,
    pub short_term: Vec<Observation>,
    pub temporary: Vec<Observation>,
}

impl DurabilityBuckets {
    /// Route `obs` into its bucket. Returns false when it has no bucket.
    pub fn push(&mut self, obs: Observation) -> bool {
        let bucket = match obs.durability {
            Durability::Permanent => &mut self.permanent,
            Durability::LongTerm => &mut self.long_term,
            Durability::ShortTerm => &mut self.short_term,
            Durability::Temporary => &mut self.temporary,
            Durability::Other(_) => return false,
        };
        bucket.push(obs);
        true
    }

    pub fn len(&self) -> usize {
        self.permanent.len() + self.long_term.len() + self.short_term.len() + self.temporary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
