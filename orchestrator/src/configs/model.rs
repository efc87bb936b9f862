use machine_learning::ModelKind;

use crate::{Result, options::OptionTable};

/// Options specific to one model type, on top of the shared hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelParams {
    LinearRegression,
    Lstm,
}

/// Picks the per model type options out of `table`.
///
/// Neither type recognizes any option of its own yet, every name in `table` is left to the shared
/// hyperparameter validation.
pub fn parse_model_options(kind: ModelKind, _table: &OptionTable) -> Result<ModelParams> {
    Ok(match kind {
        ModelKind::LinearRegression => ModelParams::LinearRegression,
        ModelKind::Lstm => ModelParams::Lstm,
    })
}
