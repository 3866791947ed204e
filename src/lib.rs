//! # kg-memory — Persistent Knowledge-Graph Memory
//!
//! Long-term memory for a conversational agent: a small labeled graph of
//! entities, typed relations, and free-text observations that age out
//! according to their durability.
//!
//! ## Design Principles
//!
//! 1. **Store-first**: `GraphStore` (load/save the whole graph) is the only I/O seam
//! 2. **Canonical inside**: legacy and partial observations are normalized at the boundary
//! 3. **Policy is pure**: canonicalization and ageing take "now" as an argument
//! 4. **One cycle per call**: every operation is load → mutate → save, serialized per manager
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kg_memory::{GraphManager, JsonlStore, NewEntity};
//!
//! # async fn example() -> kg_memory::Result<()> {
//! let manager = GraphManager::new(JsonlStore::open("memory.jsonl"));
//!
//! manager
//!     .create_entities(vec![
//!         NewEntity::new("Ada", "person").with_observation("Speaks fluent Spanish"),
//!     ])
//!     .await?;
//!
//! let hits = manager.search_nodes("spanish").await?;
//! assert_eq!(hits.entities[0].name, "Ada");
//! # Ok(())
//! # }
//! ```
//!
//! ## Stores
//!
//! | Store | Description |
//! |-------|-------------|
//! | `JsonlStore` | One JSON record per line in a single file |
//! | `MemoryStore` | In-process graph for tests and embedding |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod policy;
pub mod storage;
pub mod manager;
pub mod tools;
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{
    CleanupReport, Durability, DurabilityBuckets, Entity, KnowledgeGraph, NewEntity,
    Observation, ObservationAddition, ObservationDeletion, ObservationInput,
    ObservationsAdded, RawObservation, Relation, RemovedObservation,
};
pub use policy::{Clock, FixedClock, SystemClock};
pub use storage::{GraphStore, JsonlStore, MemoryStore};
pub use manager::GraphManager;
pub use tools::Tool;
pub use config::MemoryPathConfig;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Malformed record at line {line}: {source}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures reading or writing the persisted graph.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(
            self,
            Error::StorageUnavailable(_) | Error::MalformedRecord { .. } | Error::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
