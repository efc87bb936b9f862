use std::{collections::BTreeMap, fs, num::NonZeroUsize, path::PathBuf};

use serde::Deserialize;

use crate::{OrchestratorError, Result};

const DEFAULT_INFERENCE_BATCH_SIZE: usize = 128;

/// Settings that outlive a single statement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Rows per forward pass during inference.
    pub inference_batch_size: NonZeroUsize,
    /// Where model records are kept; in memory when absent.
    pub models_dir: Option<PathBuf>,
    /// Table name to CSV file.
    pub tables: BTreeMap<String, PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inference_batch_size: NonZeroUsize::new(DEFAULT_INFERENCE_BATCH_SIZE)
                .unwrap_or(NonZeroUsize::MIN),
            models_dir: None,
            tables: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| OrchestratorError::InvalidOption(format!("invalid session config: {e}")))
    }

    /// Loads a `SessionConfig` from a JSON file.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = fs::read_to_string(&path)?;
        Self::from_json(&content)
    }
}
