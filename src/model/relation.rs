//! Relation: a directed, typed edge between two entity names.

use serde::{Deserialize, Serialize};

/// A directed edge. Endpoints are names and need not exist in the graph.
/// The `(from, to, relation_type)` triple is unique across the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub from: String,
    pub to: String,
    /// Active-voice verb phrase, e.g. `works_at`.
    #[serde(rename = "relationType")]
    pub relation_type: String,
}

impl Relation {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        relation_type: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation_type: relation_type.into(),
        }
    }

    /// True when either endpoint is `name`.
    pub fn touches(&self, name: &str) -> bool {
        self.from == name || self.to == name
    }
}
