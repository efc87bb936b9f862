mod dir;
mod memory;
mod store;

pub use dir::DirStore;
pub use memory::MemoryStore;
pub use store::{ModelRecord, ModelStore};

use log::info;
use machine_learning::ModelHandle;

use crate::{OrchestratorError, Result};

/// Writes trained models to a `ModelStore` and reads them back for inference.
pub struct Registry {
    store: Box<dyn ModelStore>,
}

impl Registry {
    pub fn new(store: Box<dyn ModelStore>) -> Self {
        Self { store }
    }

    /// Persists a serialized model under `name`.
    ///
    /// There is no existence pre-check, the store's own insert decides uniqueness.
    ///
    /// # Arguments
    /// * `name` - The model name, must not be empty.
    /// * `type_tag` - The model type, must not be empty.
    /// * `binary` - The serialized model.
    ///
    /// # Returns
    /// `MissingRecordField` for an empty name or tag, `DuplicateModelName` if the name is taken.
    pub fn persist(&self, name: &str, type_tag: &str, binary: Vec<u8>) -> Result<()> {
        if name.is_empty() {
            return Err(OrchestratorError::MissingRecordField("name"));
        }

        if type_tag.is_empty() {
            return Err(OrchestratorError::MissingRecordField("type"));
        }

        let size = binary.len();
        self.store.insert(ModelRecord {
            name: name.to_string(),
            type_tag: type_tag.to_string(),
            binary: Some(binary),
        })?;

        info!("persisted {type_tag} model {name} ({size} bytes)");
        Ok(())
    }

    /// Looks up a model record.
    ///
    /// # Returns
    /// The type tag and the serialized model, or `ModelNotFound`.
    pub fn resolve(&self, name: &str) -> Result<(String, Vec<u8>)> {
        let record = self
            .store
            .get(name)?
            .ok_or_else(|| OrchestratorError::ModelNotFound(name.to_string()))?;

        let binary = record
            .binary
            .ok_or(OrchestratorError::MissingRecordField("binary"))?;

        Ok((record.type_tag, binary))
    }

    /// Resolves `name` and rebuilds the model it holds.
    pub fn load(&self, name: &str) -> Result<ModelHandle> {
        let (type_tag, binary) = self.resolve(name)?;
        Ok(ModelHandle::load(&type_tag, &binary)?)
    }
}
