use ndarray::{Array2, ArrayView2};

use super::{ModelConfig, ModelKind};
use crate::{Result, serialization};

/// The contract every model backend fulfils.
///
/// A model owns its parameters and its optimizer state. It is trained one batch at a time and
/// can be turned into a self describing binary at any point.
pub trait Model {
    /// Returns the configuration the model was built from.
    fn config(&self) -> &ModelConfig;

    /// Returns the flat parameter buffer.
    fn params(&self) -> &[f32];

    /// Evaluates the model over a batch without touching its parameters.
    ///
    /// # Arguments
    /// * `x` - The input batch, shape `[rows, input_size]`.
    ///
    /// # Returns
    /// The predictions, shape `[rows, label_size]`.
    fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Runs a forward pass, back-propagates the loss and applies one optimizer update.
    ///
    /// The row count may vary between calls.
    ///
    /// # Arguments
    /// * `x` - The input batch, shape `[rows, input_size]`.
    /// * `y` - The label batch, shape `[rows, label_size]`.
    ///
    /// # Returns
    /// The batch loss before the update.
    fn train_step(&mut self, x: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<f32>;

    fn kind(&self) -> ModelKind {
        self.config().kind
    }

    /// Encodes the model into its binary form.
    fn serialize(&self) -> Result<Vec<u8>> {
        serialization::encode(self.config(), self.params())
    }
}
