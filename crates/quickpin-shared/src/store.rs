use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::history::Snapshot;
use crate::pins::PinSet;
use crate::task::{Task, normalize_loaded};

pub const TASKS_KEY: &str = "tasks";
pub const PINS_KEY: &str = "pins";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read {key}: {reason}")]
    Read { key: String, reason: String },
    #[error("failed to write {key}: {reason}")]
    Write { key: String, reason: String },
}

/// String-keyed durable storage: browser `localStorage`, a directory of
/// files, or a map in tests.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed access to the two persisted records.
///
/// Loading never fails: a missing, unreadable or undecodable record yields
/// the empty default. Saving never fails either; errors are logged and the
/// in-memory state stays authoritative.
#[derive(Debug, Clone)]
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load_tasks(&self) -> Vec<Task> {
        normalize_loaded(self.load_record(TASKS_KEY))
    }

    pub fn load_pins(&self) -> PinSet {
        self.load_record(PINS_KEY)
    }

    pub fn load_snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.load_tasks(),
            pins: self.load_pins(),
        }
    }

    pub fn save(&mut self, tasks: &[Task], pins: &PinSet) {
        self.save_record(TASKS_KEY, tasks);
        self.save_record(PINS_KEY, pins);
    }

    fn load_record<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "no stored record, using default");
                return T::default();
            }
            Err(error) => {
                warn!(key, %error, "failed reading stored record");
                return T::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(error) => {
                warn!(key, %error, "stored record is corrupt, using default");
                T::default()
            }
        }
    }

    fn save_record<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(error) => {
                warn!(key, %error, "failed encoding record");
                return;
            }
        };
        if let Err(error) = self.store.set(key, &json) {
            warn!(key, %error, "failed writing record");
        }
    }
}
