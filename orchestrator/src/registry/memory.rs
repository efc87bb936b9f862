use std::collections::{HashMap, hash_map::Entry};

use parking_lot::Mutex;

use super::{ModelRecord, ModelStore};
use crate::{OrchestratorError, Result};

/// A `ModelStore` that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, ModelRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl ModelStore for MemoryStore {
    fn insert(&self, record: ModelRecord) -> Result<()> {
        match self.records.lock().entry(record.name.clone()) {
            Entry::Occupied(_) => Err(OrchestratorError::DuplicateModelName(record.name)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    fn get(&self, name: &str) -> Result<Option<ModelRecord>> {
        Ok(self.records.lock().get(name).cloned())
    }
}
