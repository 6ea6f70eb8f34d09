use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::meals::MealLog;
use crate::storage::{JsonFileStore, MealStore, MemoryStore};

/// One `MealLog` per process, behind a mutex so mutations stay serialized
/// (single active mutation at a time, as the original single-threaded design
/// assumed).
#[derive(Clone)]
pub struct AppState {
    pub log: Arc<Mutex<MealLog>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = Arc::new(JsonFileStore::new(&config.data_dir)) as Arc<dyn MealStore>;
        let log = MealLog::open(store).await;
        Ok(Self {
            log: Arc::new(Mutex::new(log)),
            config,
        })
    }

    pub fn from_parts(log: MealLog, config: Arc<AppConfig>) -> Self {
        Self {
            log: Arc::new(Mutex::new(log)),
            config,
        }
    }

    /// Memory-backed state for tests. Returns the store alongside so tests can
    /// observe what the write-through persisted.
    pub async fn fake() -> (Self, MemoryStore) {
        let store = MemoryStore::new();
        let log = MealLog::open(Arc::new(store.clone())).await;
        let config = Arc::new(AppConfig {
            data_dir: std::env::temp_dir(),
        });
        (Self::from_parts(log, config), store)
    }
}
