//! Line-delimited JSON encoding of a whole graph.
//!
//! ```text
//! {"type":"entity","name":"Ada","entityType":"person","observations":[...]}
//! {"type":"relation","from":"Ada","to":"Acme","relationType":"works_at"}
//! ```
//!
//! Entities are written first, then relations. The `type` tag exists only
//! on the wire. On decode, blank lines are skipped, unknown tags are
//! skipped, and every entity's observations are normalized.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::warn;

use crate::model::{Entity, KnowledgeGraph, NewEntity, Relation};
use crate::policy;
use crate::{Error, Result};

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RecordRef<'a> {
    Entity(&'a Entity),
    Relation(&'a Relation),
}

/// Encode every entity then every relation, one record per line.
pub fn encode_graph(graph: &KnowledgeGraph) -> Result<String> {
    let records = graph
        .entities
        .iter()
        .map(RecordRef::Entity)
        .chain(graph.relations.iter().map(RecordRef::Relation));

    let mut out = String::new();
    for record in records {
        let line = serde_json::to_string(&record)
            .map_err(|e| Error::StorageUnavailable(format!("cannot encode record: {e}")))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Decode a persisted graph. Legacy observations are stamped with `now`.
pub fn decode_graph(text: &str, now: DateTime<Utc>) -> Result<KnowledgeGraph> {
    let mut graph = KnowledgeGraph::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: JsonValue = serde_json::from_str(line)
            .map_err(|source| Error::MalformedRecord { line: line_no, source })?;

        match record.get("type").and_then(JsonValue::as_str) {
            Some("entity") => {
                let raw: NewEntity = serde_json::from_value(record)
                    .map_err(|source| Error::MalformedRecord { line: line_no, source })?;
                graph.entities.push(policy::normalize_entity(raw, now));
            }
            Some("relation") => {
                let rel: Relation = serde_json::from_value(record)
                    .map_err(|source| Error::MalformedRecord { line: line_no, source })?;
                graph.relations.push(rel);
            }
            other => {
                warn!(line = line_no, kind = ?other, "skipping record with unknown type");
            }
        }
    }

    Ok(graph)
}
