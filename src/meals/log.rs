use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{error, info};

use crate::meals::record::{Category, MealRecord};
use crate::storage::MealStore;

/// User input incomplete; the mutation was blocked and nothing changed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("{field} must not be empty")]
pub struct ValidationError {
    pub field: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub count: usize,
    pub total_calories: i64,
}

/// Owner of the in-memory meal collection. Constructing via [`MealLog::open`]
/// performs the one-time load from the store, so a `MealLog` value is always
/// initialized; every mutation writes the full collection back through the
/// store without awaiting the result.
pub struct MealLog {
    records: Vec<MealRecord>,
    store: Arc<dyn MealStore>,
}

impl MealLog {
    pub async fn open(store: Arc<dyn MealStore>) -> Self {
        let records = store.load().await;
        info!(count = records.len(), "meal log loaded");
        Self { records, store }
    }

    /// Re-runs the startup load, replacing the in-memory collection.
    pub async fn reload(&mut self) {
        self.records = self.store.load().await;
    }

    pub fn records(&self) -> &[MealRecord] {
        &self.records
    }

    pub fn add_meal(
        &mut self,
        name: String,
        description: String,
        category: Category,
        calories: String,
    ) -> Result<MealRecord, ValidationError> {
        for (field, value) in [
            ("name", &name),
            ("description", &description),
            ("calories", &calories),
        ] {
            if value.is_empty() {
                return Err(ValidationError { field });
            }
        }

        let record = MealRecord {
            id: self.fresh_id(),
            name,
            description,
            category,
            calories,
        };
        self.records.push(record.clone());
        self.persist();
        Ok(record)
    }

    /// Removes the record with the given id. Returns false (and skips the
    /// write-through) when no such record exists.
    pub fn delete_meal(&mut self, id: i64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        if self.records.len() == before {
            return false;
        }
        self.persist();
        true
    }

    pub fn summary(&self) -> Summary {
        Summary {
            count: self.records.len(),
            total_calories: self.records.iter().map(MealRecord::calories_kcal).sum(),
        }
    }

    /// Creation time in Unix milliseconds, bumped past the current max id so
    /// two adds within the same millisecond still get distinct ids.
    fn fresh_id(&self) -> i64 {
        let now_ms = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        match self.records.iter().map(|r| r.id).max() {
            Some(max) if now_ms <= max => max + 1,
            _ => now_ms,
        }
    }

    /// Fire-and-forget write-through of the full collection. The snapshot is
    /// cloned at call time, so a save enqueued later always carries the later
    /// state; failure is logged and the in-memory collection stays
    /// authoritative.
    fn persist(&self) {
        let snapshot = self.records.clone();
        let store = self.store.clone();
        tokio::spawn(async move {
            if let Err(e) = store.save(&snapshot).await {
                error!(error = %e, "meal store save failed");
            }
        });
    }
}

#[cfg(test)]
mod log_tests {
    use super::*;
    use crate::storage::{MealStore, MemoryStore};
    use async_trait::async_trait;

    /// Store whose saves always fail, for exercising the optimistic
    /// no-rollback path.
    struct FailingStore;

    #[async_trait]
    impl MealStore for FailingStore {
        async fn load(&self) -> Vec<MealRecord> {
            Vec::new()
        }

        async fn save(&self, _records: &[MealRecord]) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    async fn open_empty() -> (MealLog, MemoryStore) {
        let store = MemoryStore::new();
        let log = MealLog::open(Arc::new(store.clone())).await;
        (log, store)
    }

    /// Lets detached save tasks run on the current-thread test runtime.
    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    fn add(log: &mut MealLog, name: &str, desc: &str, cat: Category, cal: &str) -> MealRecord {
        log.add_meal(name.into(), desc.into(), cat, cal.into())
            .expect("valid meal should be accepted")
    }

    #[tokio::test]
    async fn empty_store_initializes_to_empty_summary() {
        let (log, _) = open_empty().await;
        assert_eq!(
            log.summary(),
            Summary {
                count: 0,
                total_calories: 0
            }
        );
    }

    #[tokio::test]
    async fn add_two_meals_sums_calories() {
        let (mut log, _) = open_empty().await;
        add(&mut log, "Oatmeal", "Morning bowl", Category::Breakfast, "300");
        add(&mut log, "Salad", "Lunch bowl", Category::Lunch, "450");
        assert_eq!(
            log.summary(),
            Summary {
                count: 2,
                total_calories: 750
            }
        );
        // Idempotent read
        assert_eq!(log.summary(), log.summary());
    }

    #[tokio::test]
    async fn empty_name_is_rejected_without_mutation() {
        let (mut log, _) = open_empty().await;
        add(&mut log, "Oatmeal", "Morning bowl", Category::Breakfast, "300");
        let err = log
            .add_meal("".into(), "desc".into(), Category::Breakfast, "100".into())
            .unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(log.summary().count, 1);
    }

    #[tokio::test]
    async fn empty_calories_is_rejected() {
        let (mut log, _) = open_empty().await;
        let err = log
            .add_meal("Tea".into(), "Green".into(), Category::Snack, "".into())
            .unwrap_err();
        assert_eq!(err.field, "calories");
        assert_eq!(log.records().len(), 0);
    }

    #[tokio::test]
    async fn unparseable_calories_count_as_zero() {
        let (mut log, _) = open_empty().await;
        add(&mut log, "Mystery", "???", Category::Dinner, "abc");
        add(&mut log, "Salad", "Lunch bowl", Category::Lunch, "450");
        assert_eq!(log.summary().total_calories, 450);
    }

    #[tokio::test]
    async fn delete_keeps_remaining_record_intact() {
        let (mut log, _) = open_empty().await;
        let first = add(&mut log, "Oatmeal", "Morning bowl", Category::Breakfast, "300");
        let second = add(&mut log, "Salad", "Lunch bowl", Category::Lunch, "450");
        assert_ne!(first.id, second.id);

        assert!(log.delete_meal(first.id));
        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0], second);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_a_noop() {
        let (mut log, store) = open_empty().await;
        add(&mut log, "Oatmeal", "Morning bowl", Category::Breakfast, "300");
        settle().await;
        let persisted = store.contents();

        assert!(!log.delete_meal(999));
        assert_eq!(log.records().len(), 1);
        settle().await;
        // No extra write-through happened either
        assert_eq!(store.contents(), persisted);
    }

    #[tokio::test]
    async fn write_through_persists_latest_snapshot() {
        let (mut log, store) = open_empty().await;
        add(&mut log, "Oatmeal", "Morning bowl", Category::Breakfast, "300");
        add(&mut log, "Salad", "Lunch bowl", Category::Lunch, "450");
        settle().await;
        assert_eq!(store.contents(), log.records());
    }

    #[tokio::test]
    async fn reload_restores_persisted_state() {
        let (mut log, store) = open_empty().await;
        add(&mut log, "Oatmeal", "Morning bowl", Category::Breakfast, "300");
        settle().await;

        let mut other = MealLog::open(Arc::new(store.clone())).await;
        assert_eq!(other.summary().count, 1);
        other.reload().await;
        assert_eq!(other.summary().count, 1);
    }

    #[tokio::test]
    async fn failed_save_keeps_memory_state_authoritative() {
        let mut log = MealLog::open(Arc::new(FailingStore)).await;
        let record = add(&mut log, "Oatmeal", "Morning bowl", Category::Breakfast, "300");
        // Let the detached save run (and fail)
        settle().await;
        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0], record);
        assert_eq!(
            log.summary(),
            Summary {
                count: 1,
                total_calories: 300
            }
        );
        // Deletes behave the same way
        assert!(log.delete_meal(record.id));
        settle().await;
        assert_eq!(log.summary().count, 0);
    }

    #[tokio::test]
    async fn ids_stay_monotonic_within_one_millisecond() {
        let (mut log, _) = open_empty().await;
        let a = add(&mut log, "One", "a", Category::Snack, "1");
        let b = add(&mut log, "Two", "b", Category::Snack, "2");
        let c = add(&mut log, "Three", "c", Category::Snack, "3");
        assert!(a.id < b.id && b.id < c.id);
    }
}
