//! End-to-end tests against the file-backed store.
//!
//! Covers the persisted line format, legacy upgrade on load, failure
//! propagation, and the tool surface running over a real file.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

use kg_memory::tools::{self, Tool};
use kg_memory::{
    Durability, FixedClock, GraphManager, GraphStore, JsonlStore, NewEntity, Observation,
    ObservationAddition, Relation,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap()
}

fn manager_at(path: &std::path::Path) -> GraphManager<JsonlStore> {
    let clock = Arc::new(FixedClock(now()));
    GraphManager::with_clock(JsonlStore::with_clock(path, clock.clone()), clock)
}

/// Records the message of every tracing event.
#[derive(Clone, Default)]
struct CapturedMessages(Arc<Mutex<Vec<String>>>);

impl CapturedMessages {
    fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl<S: tracing::Subscriber> Layer<S> for CapturedMessages {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct Message(String);
        impl Visit for Message {
            fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
                if field.name() == "message" {
                    self.0 = format!("{value:?}");
                }
            }
        }
        let mut message = Message(String::new());
        event.record(&mut message);
        self.0.lock().unwrap().push(message.0);
    }
}

#[tokio::test]
async fn test_fresh_file_is_created_on_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state").join("memory.jsonl");
    let mgr = manager_at(&path);

    assert!(mgr.read_graph().await.unwrap().is_empty());
    assert!(!path.exists());

    mgr.create_entities(vec![NewEntity::new("Ada", "person")]).await.unwrap();
    assert!(path.exists());
}

#[tokio::test]
async fn test_persisted_lines_are_tagged_and_ordered() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.jsonl");
    let mgr = manager_at(&path);

    mgr.create_relations(vec![Relation::new("Ada", "Babbage", "corresponds_with")])
        .await
        .unwrap();
    mgr.create_entities(vec![NewEntity::new("Ada", "person").with_observation("Likes tea")])
        .await
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let records: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["type"], "entity");
    assert_eq!(records[0]["entityType"], "person");
    assert_eq!(records[0]["observations"][0]["durability"], "long-term");
    assert_eq!(
        records[1],
        json!({"type": "relation", "from": "Ada", "to": "Babbage", "relationType": "corresponds_with"})
    );
}

#[tokio::test]
async fn test_legacy_file_is_upgraded_on_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.jsonl");
    std::fs::write(
        &path,
        concat!(
            r#"{"type":"entity","name":"Ada","entityType":"person","observations":["Likes tea",{"content":"Born 1815","timestamp":"2024-02-03T04:05:06.789012","durability":"permanent"}]}"#,
            "\n",
            r#"{"type":"relation","from":"Ada","to":"Babbage","relationType":"knows"}"#,
            "\n",
        ),
    )
    .unwrap();
    let mgr = manager_at(&path);

    mgr.add_observations(vec![ObservationAddition::new("Ada", ["Writes notes"])])
        .await
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    let observations = first["observations"].as_array().unwrap();
    assert_eq!(observations.len(), 3);
    assert!(observations.iter().all(|o| o.is_object()));
    assert_eq!(observations[0]["content"], "Likes tea");
    assert_eq!(observations[0]["durability"], "long-term");

    let graph = mgr.read_graph().await.unwrap();
    assert_eq!(
        graph.entity("Ada").unwrap().observations[1],
        Observation::new(
            "Born 1815",
            Durability::Permanent,
            Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap() + chrono::Duration::microseconds(789_012)
        )
    );
    assert_eq!(graph.relations, vec![Relation::new("Ada", "Babbage", "knows")]);
}

#[tokio::test]
async fn test_save_load_round_trip_normalizes_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.jsonl");
    let store = JsonlStore::with_clock(&path, Arc::new(FixedClock(now())));

    std::fs::write(
        &path,
        r#"{"type":"entity","name":"Ada","entityType":"person","observations":["Likes tea"]}"#,
    )
    .unwrap();
    let first = store.load().await.unwrap();
    store.save(&first).await.unwrap();
    let second = store.load().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        second.entities[0].observations,
        vec![Observation::new("Likes tea", Durability::LongTerm, now())]
    );
}

#[tokio::test]
async fn test_corrupt_file_fails_every_operation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memory.jsonl");
    std::fs::write(&path, "{\"type\":\"entity\",\"name\":").unwrap();
    let mgr = manager_at(&path);

    let err = mgr.read_graph().await.unwrap_err();
    assert!(err.is_storage_unavailable(), "{err}");

    let err = mgr
        .create_entities(vec![NewEntity::new("Ada", "person")])
        .await
        .unwrap_err();
    assert!(err.is_storage_unavailable());

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"type\":\"entity\",\"name\":");
}

#[tokio::test]
async fn test_tools_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let mgr = manager_at(&dir.path().join("memory.jsonl"));

    tools::dispatch(
        &mgr,
        Tool::CreateEntities,
        json!({"entities": [{"name": "Ada", "entityType": "person", "observations": []}]}),
    )
    .await
    .unwrap();

    let added = tools::dispatch(
        &mgr,
        Tool::AddObservations,
        json!({"observations": [{"entityName": "Ada", "contents": [
            "Likes tea",
            {"content": "Traveling to Dominica", "durability": "temporary"}
        ]}]}),
    )
    .await
    .unwrap();
    assert_eq!(added[0]["entityName"], "Ada");
    assert_eq!(added[0]["addedObservations"][1]["durability"], "temporary");

    let report = tools::dispatch(&mgr, Tool::CleanupOutdatedObservations, json!({}))
        .await
        .unwrap();
    assert_eq!(report["observationsRemoved"], 0);
    assert_eq!(report["entitiesProcessed"], 1);

    let found = tools::dispatch(&mgr, Tool::SearchNodes, json!({"query": "DOMINICA"}))
        .await
        .unwrap();
    assert_eq!(found["entities"][0]["name"], "Ada");
    assert_eq!(found["relations"], json!([]));
}

#[tokio::test]
async fn test_one_write_logs_one_save_event() {
    let captured = CapturedMessages::default();
    let _guard = tracing_subscriber::registry()
        .with(captured.clone())
        .set_default();

    let dir = tempfile::tempdir().unwrap();
    let mgr = manager_at(&dir.path().join("memory.jsonl"));
    mgr.create_entities(vec![NewEntity::new("Ada", "person")]).await.unwrap();

    let messages = captured.messages();
    let writes: Vec<&String> = messages
        .iter()
        .filter(|m| m.ends_with(" graph") && m.as_str() != "loaded graph")
        .collect();
    assert_eq!(writes, vec!["saved graph"]);
}
