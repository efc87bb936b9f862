pub mod arch;
pub mod error;
pub mod initialization;
pub mod models;
pub mod optimization;
pub mod serialization;

pub use error::{MlErr, Result};
pub use models::{Model, ModelConfig, ModelHandle, ModelKind};
pub use optimization::OptimizerKind;
