//! Task persistence over a key-value slot, and the session that owns the
//! in-memory task list between loads and saves.

pub mod session;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use dayplan_core::{
    storage::{KeyValueStore, StoreError},
    tasks::{Task, TaskStore},
};
use serde_json::Value;
use tracing::{error, instrument, warn};

pub use session::Session;

/// Single fixed slot holding the whole task array.
pub const TASKS_KEY: &str = "tasks";

/// Task store backed by any `KeyValueStore`: one JSON array under [`TASKS_KEY`].
pub struct KvTaskStore<S: KeyValueStore> {
    store: Arc<S>,
}

impl<S: KeyValueStore> KvTaskStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn from_shared(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Reads the slot. A missing slot is an empty list; an unreadable slot or
    /// one that is not a JSON array is an error. Records that do not decode
    /// as a task are skipped with a warning so the rest survive the next write.
    pub async fn try_load(&self) -> Result<Vec<Task>> {
        let bytes = match self.store.get(TASKS_KEY).await {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound { .. }) => return Ok(Vec::new()),
            Err(err) => return Err(err).context("reading stored tasks"),
        };
        let records: Vec<Value> =
            serde_json::from_slice(&bytes).context("decoding stored tasks")?;
        Ok(records.into_iter().enumerate().filter_map(decode_record).collect())
    }

    /// Strict write of the whole list.
    pub async fn try_replace(&self, tasks: &[Task]) -> Result<()> {
        let bytes = serde_json::to_vec(tasks).context("encoding tasks")?;
        self.store
            .put(TASKS_KEY, &bytes)
            .await
            .context("writing tasks")
    }
}

fn decode_record((index, record): (usize, Value)) -> Option<Task> {
    match serde_json::from_value(record) {
        Ok(task) => Some(task),
        Err(err) => {
            warn!(index, "skipping unreadable task record: {err}");
            None
        }
    }
}

#[async_trait]
impl<S: KeyValueStore> TaskStore for KvTaskStore<S> {
    #[instrument(skip(self))]
    async fn load(&self) -> Vec<Task> {
        match self.try_load().await {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!("error loading {TASKS_KEY}, starting empty: {err:#}");
                Vec::new()
            }
        }
    }

    // Failed writes are dropped: memory and disk diverge until the next good write.
    #[instrument(skip_all, fields(count = tasks.len()))]
    async fn replace(&self, tasks: &[Task]) {
        if let Err(err) = self.try_replace(tasks).await {
            error!("error saving {TASKS_KEY}: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use dayplan_core::{
        storage::InMemoryStore,
        tasks::{Priority, TaskDate, TimeOfDay},
    };

    use super::*;

    /// Store whose every call fails.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn put(&self, _key: &str, _value: &[u8]) -> Result<(), StoreError> {
            Err(StoreError::storage("disk full"))
        }

        async fn get(&self, _key: &str) -> Result<Vec<u8>, StoreError> {
            Err(StoreError::storage("io error"))
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            Task {
                id: 1,
                title: "Write docs".into(),
                description: "release notes".into(),
                date: TaskDate::from_ymd(2025, 1, 1).expect("date"),
                priority: Priority::High,
                completed: false,
                from: TimeOfDay::from_hm(9, 0),
                to: TimeOfDay::from_hm(10, 30),
            },
            Task {
                id: 2,
                title: "Ship".into(),
                description: String::new(),
                date: TaskDate::from_ymd(2025, 1, 2).expect("date"),
                priority: Priority::Low,
                completed: true,
                from: None,
                to: None,
            },
        ]
    }

    #[tokio::test]
    async fn replace_then_load_round_trips() {
        let repo = KvTaskStore::new(InMemoryStore::new());
        repo.replace(&sample()).await;
        assert_eq!(repo.load().await, sample());
    }

    #[tokio::test]
    async fn empty_slot_loads_as_empty_list() {
        let repo = KvTaskStore::new(InMemoryStore::new());
        assert!(repo.load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_slot_degrades_to_empty() {
        let store = Arc::new(InMemoryStore::new());
        store.put(TASKS_KEY, b"{not json").await.expect("put");
        let repo = KvTaskStore::from_shared(store);

        assert!(repo.try_load().await.is_err());
        assert!(repo.load().await.is_empty());
    }

    #[tokio::test]
    async fn reads_records_written_by_older_clients() {
        let store = Arc::new(InMemoryStore::new());
        let legacy = br#"[{"id":4,"title":"Walk","description":"","date":"03/03/2025","priority":"High"}]"#;
        store.put(TASKS_KEY, legacy).await.expect("put");

        let tasks = KvTaskStore::from_shared(store).load().await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].priority, Priority::High);
        assert!(!tasks[0].completed);
    }

    #[tokio::test]
    async fn bad_records_are_skipped_and_the_rest_survive_a_save() {
        let store = Arc::new(InMemoryStore::new());
        let mixed = br#"[
            {"id":1,"title":"Keep me","description":"","date":"01/01/2025","priority":"high","completed":false},
            {"id":2,"title":"Odd time","date":"01/01/2025","priority":"low","from":"9am"},
            {"id":3,"title":"Bad date","date":"2025-01-01","priority":"low"},
            {"title":"No id","date":"01/01/2025"},
            {"id":5,"title":"Also kept","date":"02/01/2025","priority":"medium"}
        ]"#;
        store.put(TASKS_KEY, mixed).await.expect("put");
        let repo = KvTaskStore::from_shared(store.clone());

        let mut tasks = repo.load().await;
        let ids: Vec<u64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 5]);
        assert_eq!(tasks[1].from, None);

        tasks.push(Task {
            id: 6,
            title: "New".into(),
            description: String::new(),
            date: TaskDate::from_ymd(2025, 1, 1).expect("date"),
            priority: Priority::Low,
            completed: false,
            from: None,
            to: None,
        });
        repo.replace(&tasks).await;

        let titles: Vec<String> = repo.load().await.into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["Keep me", "Odd time", "Also kept", "New"]);
    }

    #[tokio::test]
    async fn storage_failures_are_swallowed() {
        let repo = KvTaskStore::new(BrokenStore);
        repo.replace(&sample()).await;
        assert!(repo.try_replace(&sample()).await.is_err());
        assert!(repo.load().await.is_empty());
    }
}
