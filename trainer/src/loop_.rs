use log::{debug, info, warn};
use machine_learning::Model;

use crate::{
    ColumnMapping, Result, TrainConfig, TrainingMetrics,
    data::{BatchBuffer, ResultCursor, fill_batch},
};

/// Drives the epoch x batch loop of a training statement.
pub struct TrainingLoop {
    cfg: TrainConfig,
    mapping: ColumnMapping,
}

impl TrainingLoop {
    /// Creates a new `TrainingLoop`.
    ///
    /// # Arguments
    /// * `cfg` - The epoch count and batch size.
    /// * `mapping` - The resolved input and label columns.
    ///
    /// # Returns
    /// A new `TrainingLoop` instance.
    pub fn new(cfg: TrainConfig, mapping: &ColumnMapping) -> Self {
        Self {
            cfg,
            mapping: mapping.clone(),
        }
    }

    /// Trains `model` over every epoch of `cursor`.
    ///
    /// Each epoch rewinds the cursor and runs `floor(rows / batch_size)` steps; the trailing
    /// remainder is never read. A batch that comes back empty ends its epoch early.
    ///
    /// The batch buffer is allocated once, only when at least one full batch exists, so its size
    /// is bounded by the result set rather than by the requested batch size.
    ///
    /// # Arguments
    /// * `cursor` - The result set to train on.
    /// * `model` - The model to update.
    ///
    /// # Returns
    /// What the run did, or the first error hit, in which case the model is left mid-training.
    pub fn run<C, M>(self, cursor: &mut C, model: &mut M) -> Result<TrainingMetrics>
    where
        C: ResultCursor + ?Sized,
        M: Model + ?Sized,
    {
        let total_rows = cursor.row_count();
        let batch_size = self.cfg.batch_size();
        let batches = self.cfg.batches_per_epoch(total_rows);

        let mut metrics = TrainingMetrics {
            total_rows,
            batches_per_epoch: batches,
            dropped_rows_per_epoch: total_rows - batches * batch_size,
            ..Default::default()
        };

        if batches == 0 {
            warn!(
                "{total_rows} rows can't fill a single batch of {batch_size}, no training step will run"
            );
            return Ok(metrics);
        }

        let mut buffer = BatchBuffer::new(
            batch_size,
            self.mapping.input_width(),
            self.mapping.label_width(),
        );

        for epoch in 1..=self.cfg.epochs() {
            cursor.rewind()?;

            let mut loss_sum = 0.0;
            let mut steps = 0;

            for batch in 0..batches {
                let filled = fill_batch(cursor, &self.mapping, &mut buffer)?;
                if filled == 0 {
                    debug!("epoch {epoch} ran out of rows at batch {batch}");
                    break;
                }

                let x = buffer.inputs(filled);
                let y = buffer.labels(filled);
                let loss = model.train_step(x, y)?;

                debug!(epoch = epoch, batch = batch, rows = filled; "batch loss {loss}");
                metrics.bump_step(filled);
                loss_sum += loss;
                steps += 1;
            }

            if steps > 0 {
                let mean = loss_sum / steps as f32;
                info!("epoch {epoch}/{}: loss {mean}", self.cfg.epochs());
                metrics.push_epoch(mean);
            }
        }

        Ok(metrics)
    }
}
