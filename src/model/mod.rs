//! # Knowledge Graph Model
//!
//! Plain data that crosses every boundary: store ↔ manager ↔ tools.
//!
//! Design rule: no I/O, no clock, no async here. Boundary-only forms
//! (`RawObservation`, `NewEntity`) are normalized before the manager's
//! logic ever sees them.

pub mod entity;
pub mod relation;
pub mod observation;
pub mod graph;
pub mod requests;

pub use entity::{Entity, NewEntity};
pub use relation::Relation;
pub use observation::{Durability, Observation, ObservationInput, RawObservation};
pub use graph::KnowledgeGraph;
pub use requests::{
    CleanupReport, DurabilityBuckets, ObservationAddition, ObservationDeletion,
    ObservationsAdded, RemovedObservation,
};
