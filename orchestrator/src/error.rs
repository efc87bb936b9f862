use std::{fmt, io};

use machine_learning::MlErr;
use trainer::TrainErr;

/// The orchestrator's result type.
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Broad classes of failure, as reported back to the statement's caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad statement arguments, caught before any training resource exists.
    Configuration,
    /// A row that can't be turned into a tensor, found mid-epoch.
    Data,
    /// The model record couldn't be written or read back.
    Persistence,
    /// The query engine failed.
    Query,
    /// The numeric backend failed.
    Backend,
    Io,
}

/// All errors that can occur while executing a statement.
#[derive(Debug)]
pub enum OrchestratorError {
    /// The statement text doesn't follow the grammar.
    Parse(String),
    /// The same option name appeared twice in `OPTIONS (...)`.
    DuplicateOption(String),
    /// An option is missing, has the wrong literal kind or is out of range.
    InvalidOption(String),
    UnknownModelType(String),
    /// A model record with this name already exists.
    DuplicateModelName(String),
    ModelNotFound(String),
    /// A model record lacks one of its required fields.
    MissingRecordField(&'static str),
    /// The inference input columns don't match the model's input width.
    ColumnCountMismatch { expected: usize, got: usize },
    Query(String),
    Train(TrainErr),
    Ml(MlErr),
    Io(io::Error),
}

impl OrchestratorError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_)
            | Self::DuplicateOption(_)
            | Self::InvalidOption(_)
            | Self::UnknownModelType(_)
            | Self::ModelNotFound(_)
            | Self::ColumnCountMismatch { .. } => ErrorKind::Configuration,
            Self::DuplicateModelName(_) | Self::MissingRecordField(_) => ErrorKind::Persistence,
            Self::Query(_) => ErrorKind::Query,
            Self::Train(e) if e.is_data_error() => ErrorKind::Data,
            Self::Train(TrainErr::Cursor(_)) => ErrorKind::Query,
            Self::Train(_) => ErrorKind::Configuration,
            Self::Ml(
                MlErr::UnknownModelType(_)
                | MlErr::UnsupportedVariant(_)
                | MlErr::UnsupportedOptimizer { .. },
            ) => ErrorKind::Configuration,
            Self::Ml(MlErr::CorruptBlob(_) | MlErr::TypeTagMismatch { .. }) => {
                ErrorKind::Persistence
            }
            Self::Ml(_) => ErrorKind::Backend,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "syntax error: {msg}"),
            Self::DuplicateOption(name) => write!(f, "duplicate option: {name}"),
            Self::InvalidOption(msg) => write!(f, "{msg}"),
            Self::UnknownModelType(name) => write!(f, "unknown model type: {name}"),
            Self::DuplicateModelName(name) => write!(f, "model {name} already exists"),
            Self::ModelNotFound(name) => write!(f, "model {name} does not exist"),
            Self::MissingRecordField(field) => write!(f, "no model {field} supplied"),
            Self::ColumnCountMismatch { expected, got } => {
                write!(f, "model takes {expected} input column(s), got {got}")
            }
            Self::Query(msg) => write!(f, "query error: {msg}"),
            Self::Train(e) => write!(f, "{e}"),
            Self::Ml(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Train(e) => Some(e),
            Self::Ml(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for OrchestratorError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<MlErr> for OrchestratorError {
    fn from(e: MlErr) -> Self {
        match e {
            MlErr::UnknownModelType(name) => Self::UnknownModelType(name),
            e => Self::Ml(e),
        }
    }
}

impl From<TrainErr> for OrchestratorError {
    fn from(e: TrainErr) -> Self {
        match e {
            TrainErr::Ml(e) => e.into(),
            e => Self::Train(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_fall_into_the_statement_taxonomy() {
        let null: OrchestratorError = TrainErr::NullFeatureValue { column: "x".into() }.into();
        assert_eq!(null.kind(), ErrorKind::Data);

        let unknown: OrchestratorError = TrainErr::UnknownColumn("x".into()).into();
        assert_eq!(unknown.kind(), ErrorKind::Configuration);

        let lstm: OrchestratorError = TrainErr::Ml(MlErr::UnsupportedVariant("lstm")).into();
        assert!(matches!(lstm, OrchestratorError::Ml(MlErr::UnsupportedVariant("lstm"))));
        assert_eq!(lstm.kind(), ErrorKind::Configuration);

        let tag: OrchestratorError = MlErr::UnknownModelType("forest".into()).into();
        assert!(matches!(tag, OrchestratorError::UnknownModelType(_)));

        assert_eq!(
            OrchestratorError::DuplicateModelName("m".into()).kind(),
            ErrorKind::Persistence
        );
    }
}
