mod model;
mod session;
mod training;

pub use model::{ModelParams, parse_model_options};
pub use session::SessionConfig;
pub use training::{DEFAULT_EPOCHS, HyperParams, MAX_EPOCHS};
