pub mod columns;
pub mod config;
pub mod data;
pub mod error;
mod loop_;
pub mod metrics;

pub use columns::ColumnMapping;
pub use config::TrainConfig;
pub use error::{Result, TrainErr};
pub use loop_::TrainingLoop;
pub use metrics::TrainingMetrics;
