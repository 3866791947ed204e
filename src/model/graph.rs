//! The whole graph as held in memory for one operation.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use super::{Entity, Relation};

/// Entities plus relations. Order is insertion order and is preserved
/// through save and load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relations.is_empty()
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn entity_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.name == name)
    }

    pub fn observation_count(&self) -> usize {
        self.entities.iter().map(|e| e.observations.len()).sum()
    }

    /// Keep the selected entities and every relation whose endpoints are
    /// both among them.
    pub fn subgraph<F>(self, mut keep: F) -> KnowledgeGraph
    where
        F: FnMut(&Entity) -> bool,
    {
        let entities: Vec<Entity> = self.entities.into_iter().filter(|e| keep(e)).collect();
        let relations = {
            let names: HashSet<&str> = entities.iter().map(|e| e.name.as_str()).collect();
            self.relations
                .into_iter()
                .filter(|r| names.contains(r.from.as_str()) && names.contains(r.to.as_str()))
                .collect()
        };
        KnowledgeGraph { entities, relations }
    }
}
