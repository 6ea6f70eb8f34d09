use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::meals::MealRecord;

/// Fixed key the whole collection is stored under. There is exactly one blob;
/// every save overwrites it with the full serialized collection.
pub const STORE_KEY: &str = "meals";

#[async_trait]
pub trait MealStore: Send + Sync {
    /// Fetch and deserialize the stored collection. Never fails from the
    /// caller's point of view: "no data yet" and "could not read/parse" both
    /// come back as the empty collection, with the cause logged.
    async fn load(&self) -> Vec<MealRecord>;

    /// Serialize the full collection and overwrite the blob.
    async fn save(&self, records: &[MealRecord]) -> anyhow::Result<()>;
}

/// File-backed store: one JSON array under `<data_dir>/<STORE_KEY>.json`.
#[derive(Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(format!("{STORE_KEY}.json")),
        }
    }
}

#[async_trait]
impl MealStore for JsonFileStore {
    async fn load(&self) -> Vec<MealRecord> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored meals yet");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "meal store read failed");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "meal store parse failed");
                Vec::new()
            }
        }
    }

    async fn save(&self, records: &[MealRecord]) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create data dir {}", dir.display()))?;
        }
        let body = serde_json::to_vec(records).context("serialize meals")?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("write meal store {}", self.path.display()))?;
        Ok(())
    }
}

/// In-process store used by `AppState::fake()` and tests. The contents handle
/// is shared so tests can observe what the write-through persisted.
#[derive(Clone, Default)]
pub struct MemoryStore {
    contents: Arc<Mutex<Vec<MealRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<MealRecord> {
        self.contents.lock().unwrap().clone()
    }
}

#[async_trait]
impl MealStore for MemoryStore {
    async fn load(&self) -> Vec<MealRecord> {
        self.contents()
    }

    async fn save(&self, records: &[MealRecord]) -> anyhow::Result<()> {
        *self.contents.lock().unwrap() = records.to_vec();
        Ok(())
    }
}
