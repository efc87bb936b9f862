use std::num::NonZeroUsize;

/// Immutable bounds of one training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainConfig {
    epochs: NonZeroUsize,
    batch_size: NonZeroUsize,
}

impl TrainConfig {
    /// Creates a new training configuration.
    ///
    /// # Args
    /// * `epochs` - Number of full passes over the result set.
    /// * `batch_size` - Number of rows per training step.
    ///
    /// # Returns
    /// A `TrainConfig` instance.
    pub fn new(epochs: NonZeroUsize, batch_size: NonZeroUsize) -> Self {
        Self { epochs, batch_size }
    }

    pub fn epochs(&self) -> usize {
        self.epochs.get()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.get()
    }

    /// Number of steps per epoch for `total_rows` rows.
    ///
    /// The division truncates: the `total_rows % batch_size` trailing rows never reach the model.
    pub fn batches_per_epoch(&self, total_rows: usize) -> usize {
        total_rows / self.batch_size.get()
    }
}
