use std::num::NonZeroUsize;

use log::info;
use machine_learning::OptimizerKind;

use crate::{
    OrchestratorError, Result,
    options::{OptionTable, OptionValue},
};

pub const MAX_EPOCHS: usize = 1000;
pub const DEFAULT_EPOCHS: usize = 10;

/// The validated hyperparameters of a `CREATE MODEL` statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperParams {
    pub learning_rate: f32,
    pub epochs: NonZeroUsize,
    pub batch_size: NonZeroUsize,
    pub optimizer: OptimizerKind,
    pub seed: Option<u64>,
}

impl HyperParams {
    /// Validates the options of a statement, in a fixed order: `lr`, `epochs`, `batch_size`,
    /// `opt`, then `seed`. The first failing option aborts validation; unknown names are ignored.
    ///
    /// # Arguments
    /// * `table` - The statement's options.
    /// * `notices` - Receives a message for every default that had to be applied.
    ///
    /// # Returns
    /// The hyperparameters, or `InvalidOption` describing the first bad option.
    pub fn from_options(table: &OptionTable, notices: &mut Vec<String>) -> Result<Self> {
        let learning_rate = match table.get("lr") {
            None => return Err(invalid("lr is required")),
            Some(&OptionValue::Float(lr)) => match lr as f32 {
                lr if lr > 0.0 && lr < 1.0 => lr,
                _ => return Err(invalid("lr must be in the range (0, 1)")),
            },
            Some(_) => return Err(invalid("lr must be a float")),
        };

        let epochs = match table.get("epochs") {
            None => {
                notice(
                    notices,
                    format!("epochs not specified, using default value: {DEFAULT_EPOCHS}"),
                );
                DEFAULT_EPOCHS
            }
            Some(&OptionValue::Integer(n)) if (1..=MAX_EPOCHS as i64).contains(&n) => n as usize,
            Some(OptionValue::Integer(_)) => {
                return Err(invalid(format!(
                    "epochs must be in the range [1, {MAX_EPOCHS}]"
                )));
            }
            Some(_) => return Err(invalid("epochs must be an integer")),
        };

        let batch_size = match table.get("batch_size") {
            None => return Err(invalid("batch_size is required")),
            Some(&OptionValue::Integer(n)) => usize::try_from(n)
                .ok()
                .and_then(NonZeroUsize::new)
                .ok_or_else(|| invalid("batch_size must be positive"))?,
            Some(_) => return Err(invalid("batch_size must be an integer")),
        };

        let optimizer = match table.get("opt") {
            None => {
                let default = OptimizerKind::default();
                notice(notices, format!("opt not specified, using default value: {default}"));
                default
            }
            Some(OptionValue::String(name)) => name
                .parse::<OptimizerKind>()
                .map_err(|_| invalid("opt must be 'sgd' or 'adam'"))?,
            Some(_) => return Err(invalid("opt must be a string")),
        };

        let seed = match table.get("seed") {
            None => None,
            Some(&OptionValue::Integer(n)) => Some(
                u64::try_from(n).map_err(|_| invalid("seed must not be negative"))?,
            ),
            Some(_) => return Err(invalid("seed must be an integer")),
        };

        Ok(Self {
            learning_rate,
            epochs: NonZeroUsize::new(epochs).ok_or_else(|| invalid("epochs must be positive"))?,
            batch_size,
            optimizer,
            seed,
        })
    }
}

fn invalid(msg: impl Into<String>) -> OrchestratorError {
    OrchestratorError::InvalidOption(msg.into())
}

fn notice(notices: &mut Vec<String>, msg: String) {
    info!("{msg}");
    notices.push(msg);
}
