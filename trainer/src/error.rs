use std::{error::Error, fmt};

use machine_learning::MlErr;

/// The trainer module's result type.
pub type Result<T> = std::result::Result<T, TrainErr>;

/// Failures while mapping rows onto tensors or running the training loop.
#[derive(Debug)]
pub enum TrainErr {
    UnknownColumn(String),
    NonNumericColumn(String),
    NullFeatureValue { column: String },
    NullLabelValue { column: String },
    NonNumericValue { column: String },
    Cursor(String),
    Ml(MlErr),
}

impl TrainErr {
    /// Whether the failure comes from the data itself rather than from the statement.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            TrainErr::NullFeatureValue { .. }
                | TrainErr::NullLabelValue { .. }
                | TrainErr::NonNumericValue { .. }
        )
    }
}

impl fmt::Display for TrainErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainErr::UnknownColumn(name) => write!(f, "column {name} not found in result set"),
            TrainErr::NonNumericColumn(name) => {
                write!(f, "column {name} is not numeric and can't feed a model")
            }
            TrainErr::NullFeatureValue { column } => {
                write!(f, "null input value in column {column}")
            }
            TrainErr::NullLabelValue { column } => write!(f, "null label value in column {column}"),
            TrainErr::NonNumericValue { column } => {
                write!(f, "non numeric value in column {column}")
            }
            TrainErr::Cursor(msg) => write!(f, "result cursor error: {msg}"),
            TrainErr::Ml(e) => write!(f, "model error: {e}"),
        }
    }
}

impl Error for TrainErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TrainErr::Ml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for TrainErr {
    fn from(value: MlErr) -> Self {
        Self::Ml(value)
    }
}
