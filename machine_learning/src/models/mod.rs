mod config;
mod handle;
mod kind;
mod linear_regression;
mod model;

pub use config::ModelConfig;
pub use handle::ModelHandle;
pub use kind::ModelKind;
pub use linear_regression::LinearRegression;
pub use model::Model;
