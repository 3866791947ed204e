//! In-memory store.
//!
//! Holds one graph behind a `RwLock` and counts saves, so tests can check
//! that read-only or no-op operations never persist.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::model::KnowledgeGraph;
use crate::Result;
use super::GraphStore;

/// In-process graph storage.
#[derive(Default)]
pub struct MemoryStore {
    graph: RwLock<KnowledgeGraph>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing graph. Observations must already be
    /// canonical.
    pub fn with_graph(graph: KnowledgeGraph) -> Self {
        Self {
            graph: RwLock::new(graph),
            saves: AtomicUsize::new(0),
        }
    }

    /// Copy of the currently stored graph.
    pub fn snapshot(&self) -> KnowledgeGraph {
        self.graph.read().clone()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl GraphStore for MemoryStore {
    async fn load(&self) -> Result<KnowledgeGraph> {
        Ok(self.graph.read().clone())
    }

    async fn save(&self, graph: &KnowledgeGraph) -> Result<()> {
        *self.graph.write() = graph.clone();
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
