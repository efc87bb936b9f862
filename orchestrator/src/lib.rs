pub mod configs;
pub mod engine;
pub mod error;
pub mod inference;
pub mod options;
pub mod registry;
mod session;
pub mod statement;
mod tokens;

pub use configs::SessionConfig;
pub use engine::{MemoryEngine, QueryEngine};
pub use error::{ErrorKind, OrchestratorError, Result};
pub use inference::{RowSink, VecSink};
pub use session::{Outcome, Phase, Session, TrainingReport};
pub use statement::Statement;
