/// What a training run did, for reporting back to the statement's caller.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TrainingMetrics {
    pub total_rows: usize,
    pub batches_per_epoch: usize,
    pub dropped_rows_per_epoch: usize,

    pub steps: u64,
    pub samples: u64,
    pub epoch_losses: Vec<f32>,
}

impl TrainingMetrics {
    #[inline]
    pub fn bump_step(&mut self, rows: usize) {
        self.steps += 1;
        self.samples += rows as u64;
    }

    #[inline]
    pub fn push_epoch(&mut self, loss: f32) {
        self.epoch_losses.push(loss);
    }

    /// Mean loss of the last epoch, `None` if no step ever ran.
    pub fn final_loss(&self) -> Option<f32> {
        self.epoch_losses.last().copied()
    }
}
