use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    UnknownModelType(String),
    UnsupportedVariant(&'static str),
    UnsupportedOptimizer {
        model: &'static str,
        optimizer: &'static str,
    },
    InvalidInitRange {
        low: f32,
        high: f32,
    },
    CorruptBlob(String),
    TypeTagMismatch {
        tag: String,
        stored: &'static str,
    },
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(f, "size mismatch in {what}: got {got}, expected {expected}"),
            MlErr::UnknownModelType(name) => write!(f, "unknown model type: {name}"),
            MlErr::UnsupportedVariant(kind) => {
                write!(f, "model type {kind} is not implemented")
            }
            MlErr::UnsupportedOptimizer { model, optimizer } => {
                write!(f, "model type {model} does not support the {optimizer} optimizer")
            }
            MlErr::InvalidInitRange { low, high } => {
                write!(f, "invalid initialization range [{low}, {high})")
            }
            MlErr::CorruptBlob(reason) => write!(f, "corrupt model binary: {reason}"),
            MlErr::TypeTagMismatch { tag, stored } => write!(
                f,
                "model record is tagged {tag} but the binary holds a {stored} model"
            ),
        }
    }
}

impl Error for MlErr {}
