use serde::{Deserialize, Serialize};

use super::ModelKind;
use crate::{MlErr, OptimizerKind, Result};

/// Everything needed to build a model handle, and everything a serialized model carries besides
/// its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub kind: ModelKind,
    pub input_size: usize,
    pub label_size: usize,
    pub optimizer: OptimizerKind,
    pub learning_rate: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub input_columns: Vec<String>,
    #[serde(default)]
    pub label_columns: Vec<String>,
}

impl ModelConfig {
    /// Checks the widths are usable and the optimizer is supported by the model kind.
    pub fn validate(&self) -> Result<()> {
        if !self.kind.is_implemented() {
            return Err(MlErr::UnsupportedVariant(self.kind.as_str()));
        }

        if !self.kind.supports(self.optimizer) {
            return Err(MlErr::UnsupportedOptimizer {
                model: self.kind.as_str(),
                optimizer: self.optimizer.as_str(),
            });
        }

        if self.input_size == 0 {
            return Err(MlErr::SizeMismatch {
                what: "input width",
                got: 0,
                expected: 1,
            });
        }

        if self.label_size == 0 {
            return Err(MlErr::SizeMismatch {
                what: "label width",
                got: 0,
                expected: 1,
            });
        }

        Ok(())
    }
}
