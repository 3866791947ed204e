//! # Graph Store
//!
//! The contract between the manager and persistence: load the whole
//! graph, save the whole graph. Nothing else touches storage.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `JsonlStore` | `jsonl` | One JSON record per line in a single file |
//! | `MemoryStore` | `memory` | In-process graph for tests and embedding |

pub mod codec;
pub mod jsonl;
pub mod memory;

use async_trait::async_trait;

use crate::model::KnowledgeGraph;
use crate::Result;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;

/// Whole-graph persistence.
///
/// `load` returns an empty graph when nothing has been persisted yet, and
/// every returned observation is already canonical. `save` replaces the
/// persisted graph in full; a later `load` never observes a partial write.
#[async_trait]
pub trait GraphStore: Send + Sync + 'static {
    /// Read the full graph.
    async fn load(&self) -> Result<KnowledgeGraph>;

    /// Replace the persisted graph with `graph`.
    async fn save(&self, graph: &KnowledgeGraph) -> Result<()>;

    /// Human-readable location, used in log events.
    fn location(&self) -> String;
}
