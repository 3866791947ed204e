//! # Graph Manager
//!
//! The public operation surface. Every operation runs the same cycle:
//!
//! ```text
//! lock → store.load() → compute on the in-memory copy → store.save() if changed → unlock
//! ```
//!
//! The lock serializes operations issued through one manager, so two
//! concurrent calls cannot interleave their load/save cycles and lose an
//! update. Nothing is cached between operations.
//!
//! ## Failure policy
//!
//! `add_observations` and `get_observations_by_durability` fail with
//! [`Error::EntityNotFound`] when the named entity is absent; the whole call
//! aborts and nothing is saved. Deletions and queries ignore names and
//! triples that do not exist.
//!
//! `create_entities` and `add_observations` reject a durability outside the
//! four known categories with [`Error::InvalidRequest`], again before
//! anything is saved. Records already on disk keep whatever string they
//! carry.

use std::sync::Arc;

use hashbrown::HashSet;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::model::*;
use crate::policy::{self, Clock, SystemClock};
use crate::storage::GraphStore;
use crate::{Error, Result};

/// Operations on one persisted knowledge graph.
pub struct GraphManager<S: GraphStore> {
    store: S,
    clock: Arc<dyn Clock>,
    serial: Mutex<()>,
}

impl<S: GraphStore> GraphManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Use `clock` for timestamps and ageing. It is read once per operation.
    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            serial: Mutex::new(()),
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Add entities whose names are not taken yet. Returns only those added,
    /// with their observations normalized and deduplicated by content.
    pub async fn create_entities(&self, entities: Vec<NewEntity>) -> Result<Vec<Entity>> {
        let _serial = self.serial.lock().await;
        let now = self.clock.now();
        let mut graph = self.store.load().await?;

        let mut names: HashSet<String> = graph.entities.iter().map(|e| e.name.clone()).collect();
        let mut added = Vec::new();
        for raw in entities {
            if !names.insert(raw.name.clone()) {
                continue;
            }
            let mut entity = policy::normalize_entity(raw, now);
            for obs in &entity.observations {
                ensure_known_durability(&entity.name, obs)?;
            }
            dedup_by_content(&mut entity.observations);
            added.push(entity);
        }

        if !added.is_empty() {
            graph.entities.extend(added.iter().cloned());
            self.store.save(&graph).await?;
        }
        Ok(added)
    }

    /// Add relations whose `(from, to, relationType)` triple is new.
    /// Endpoints are not checked. Returns only those added.
    pub async fn create_relations(&self, relations: Vec<Relation>) -> Result<Vec<Relation>> {
        let _serial = self.serial.lock().await;
        let mut graph = self.store.load().await?;

        let mut existing: HashSet<Relation> = graph.relations.iter().cloned().collect();
        let added: Vec<Relation> = relations
            .into_iter()
            .filter(|r| existing.insert(r.clone()))
            .collect();

        if !added.is_empty() {
            graph.relations.extend(added.iter().cloned());
            self.store.save(&graph).await?;
        }
        Ok(added)
    }

    /// Attach observations to existing entities, skipping contents the
    /// entity already has. Fails on the first unknown entity name.
    pub async fn add_observations(
        &self,
        additions: Vec<ObservationAddition>,
    ) -> Result<Vec<ObservationsAdded>> {
        let _serial = self.serial.lock().await;
        let now = self.clock.now();
        let mut graph = self.store.load().await?;

        let mut results = Vec::with_capacity(additions.len());
        for addition in additions {
            let entity = graph
                .entity_mut(&addition.entity_name)
                .ok_or_else(|| Error::EntityNotFound(addition.entity_name.clone()))?;

            let mut seen: HashSet<String> =
                entity.observations.iter().map(|o| o.content.clone()).collect();
            let mut added = Vec::with_capacity(addition.contents.len());
            for input in addition.contents {
                let obs = policy::canonicalize(input, now);
                ensure_known_durability(&addition.entity_name, &obs)?;
                if seen.insert(obs.content.clone()) {
                    added.push(obs);
                }
            }

            entity.observations.extend(added.iter().cloned());
            results.push(ObservationsAdded {
                entity_name: addition.entity_name,
                added_observations: added,
            });
        }

        if results.iter().any(|r| !r.added_observations.is_empty()) {
            self.store.save(&graph).await?;
        }
        Ok(results)
    }

    // ========================================================================
    // Temporal maintenance
    // ========================================================================

    /// Drop every observation that has outlived its durability, measured
    /// against a single "now" taken at the start of the pass.
    pub async fn cleanup_outdated_observations(&self) -> Result<CleanupReport> {
        let _serial = self.serial.lock().await;
        let now = self.clock.now();
        let mut graph = self.store.load().await?;

        let mut report = CleanupReport {
            entities_processed: graph.entities.len(),
            ..CleanupReport::default()
        };

        for entity in &mut graph.entities {
            let Entity {
                name, observations, ..
            } = entity;
            observations.retain(|obs| {
                if !policy::is_outdated(obs, now) {
                    return true;
                }
                report.removed_observations.push(RemovedObservation {
                    entity_name: name.clone(),
                    content: obs.content.clone(),
                    age_days: policy::age_in_days(obs, now),
                });
                false
            });
        }
        report.observations_removed = report.removed_observations.len();

        if report.observations_removed > 0 {
            self.store.save(&graph).await?;
            info!(
                removed = report.observations_removed,
                entities = report.entities_processed,
                "removed outdated observations"
            );
        }
        Ok(report)
    }

    /// Partition one entity's observations by durability.
    pub async fn get_observations_by_durability(
        &self,
        entity_name: &str,
    ) -> Result<DurabilityBuckets> {
        let _serial = self.serial.lock().await;
        let graph = self.store.load().await?;

        let entity = graph
            .entity(entity_name)
            .ok_or_else(|| Error::EntityNotFound(entity_name.to_string()))?;

        let mut buckets = DurabilityBuckets::default();
        for obs in &entity.observations {
            if !buckets.push(obs.clone()) {
                debug!(entity = entity_name, durability = %obs.durability, "observation has no durability bucket");
            }
        }
        Ok(buckets)
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Remove the named entities and every relation touching them.
    pub async fn delete_entities(&self, names: Vec<String>) -> Result<()> {
        let _serial = self.serial.lock().await;
        let mut graph = self.store.load().await?;

        let doomed: HashSet<String> = names.into_iter().collect();
        let before = (graph.entities.len(), graph.relations.len());
        graph.entities.retain(|e| !doomed.contains(&e.name));
        graph
            .relations
            .retain(|r| !doomed.contains(&r.from) && !doomed.contains(&r.to));

        if (graph.entities.len(), graph.relations.len()) != before {
            self.store.save(&graph).await?;
        }
        Ok(())
    }

    /// Remove observations by content. Unknown entities are skipped.
    pub async fn delete_observations(&self, deletions: Vec<ObservationDeletion>) -> Result<()> {
        let _serial = self.serial.lock().await;
        let mut graph = self.store.load().await?;

        let mut changed = false;
        for deletion in deletions {
            let Some(entity) = graph.entity_mut(&deletion.entity_name) else {
                debug!(entity = %deletion.entity_name, "skipping observation deletion for unknown entity");
                continue;
            };
            let doomed: HashSet<String> = deletion.observations.into_iter().collect();
            let before = entity.observations.len();
            entity.observations.retain(|o| !doomed.contains(&o.content));
            changed |= entity.observations.len() != before;
        }

        if changed {
            self.store.save(&graph).await?;
        }
        Ok(())
    }

    /// Remove relations matching the given triples exactly.
    pub async fn delete_relations(&self, relations: Vec<Relation>) -> Result<()> {
        let _serial = self.serial.lock().await;
        let mut graph = self.store.load().await?;

        let doomed: HashSet<Relation> = relations.into_iter().collect();
        let before = graph.relations.len();
        graph.relations.retain(|r| !doomed.contains(r));

        if graph.relations.len() != before {
            self.store.save(&graph).await?;
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The full graph.
    pub async fn read_graph(&self) -> Result<KnowledgeGraph> {
        let _serial = self.serial.lock().await;
        self.store.load().await
    }

    /// Entities whose name, type, or any observation contains `query`
    /// (case-insensitive), plus the relations among them.
    pub async fn search_nodes(&self, query: &str) -> Result<KnowledgeGraph> {
        let _serial = self.serial.lock().await;
        let graph = self.store.load().await?;

        let needle = query.to_lowercase();
        Ok(graph.subgraph(|e| e.matches_lowercase(&needle)))
    }

    /// Entities with exactly the given names, plus the relations among them.
    pub async fn open_nodes(&self, names: &[String]) -> Result<KnowledgeGraph> {
        let _serial = self.serial.lock().await;
        let graph = self.store.load().await?;

        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        Ok(graph.subgraph(|e| wanted.contains(e.name.as_str())))
    }
}

fn ensure_known_durability(entity_name: &str, obs: &Observation) -> Result<()> {
    if obs.durability.is_known() {
        return Ok(());
    }
    Err(Error::InvalidRequest(format!(
        "unknown durability '{}' for observation '{}' on {entity_name}; \
         expected permanent, long-term, short-term or temporary",
        obs.durability, obs.content
    )))
}

/// Keep the first observation for each content.
fn dedup_by_content(observations: &mut Vec<Observation>) {
    let mut seen = HashSet::new();
    observations.retain(|o| seen.insert(o.content.clone()));
}
