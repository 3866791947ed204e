//! File-backed store: the whole graph as line-delimited JSON.
//!
//! ## Behavior
//!
//! - A missing file loads as an empty graph.
//! - Any other read or parse failure is returned to the caller.
//! - Saves go to a sibling temporary file which is then renamed over the
//!   target, so readers see either the old graph or the new one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::model::KnowledgeGraph;
use crate::policy::{Clock, SystemClock};
use crate::Result;
use super::{codec, GraphStore};

/// Line-delimited JSON file store.
pub struct JsonlStore {
    path: PathBuf,
    clock: Arc<dyn Clock>,
}

impl JsonlStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    /// Use `clock` to timestamp legacy observations upgraded during load.
    pub fn with_clock(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "memory.jsonl".to_string());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

#[async_trait]
impl GraphStore for JsonlStore {
    async fn load(&self) -> Result<KnowledgeGraph> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no memory file yet, starting empty");
                return Ok(KnowledgeGraph::new());
            }
            Err(e) => return Err(e.into()),
        };

        let graph = codec::decode_graph(&text, self.clock.now())?;
        debug!(
            path = %self.path.display(),
            entities = graph.entities.len(),
            relations = graph.relations.len(),
            "loaded graph"
        );
        Ok(graph)
    }

    async fn save(&self, graph: &KnowledgeGraph) -> Result<()> {
        let body = codec::encode_graph(graph)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.temp_path();
        if let Err(e) = write_then_rename(&tmp, &self.path, body.as_bytes()).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!(
            path = %self.path.display(),
            entities = graph.entities.len(),
            relations = graph.relations.len(),
            "saved graph"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

async fn write_then_rename(tmp: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(tmp, target).await
}
