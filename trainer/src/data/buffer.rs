use ndarray::{Array2, ArrayView2, ArrayViewMut2, s};

/// Dense, row-major staging area for one batch: `[batch_size, input_width]` inputs and
/// `[batch_size, label_width]` labels.
///
/// Allocated once per statement and overwritten on every batch; never resized.
#[derive(Debug)]
pub struct BatchBuffer {
    inputs: Array2<f32>,
    labels: Array2<f32>,
}

impl BatchBuffer {
    pub fn new(batch_size: usize, input_width: usize, label_width: usize) -> Self {
        Self {
            inputs: Array2::zeros((batch_size, input_width)),
            labels: Array2::zeros((batch_size, label_width)),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.inputs.nrows()
    }

    pub fn input_width(&self) -> usize {
        self.inputs.ncols()
    }

    pub fn label_width(&self) -> usize {
        self.labels.ncols()
    }

    /// The first `rows` input rows.
    pub fn inputs(&self, rows: usize) -> ArrayView2<'_, f32> {
        self.inputs.slice(s![..rows.min(self.batch_size()), ..])
    }

    /// The first `rows` label rows.
    pub fn labels(&self, rows: usize) -> ArrayView2<'_, f32> {
        self.labels.slice(s![..rows.min(self.batch_size()), ..])
    }

    pub(crate) fn parts_mut(&mut self) -> (ArrayViewMut2<'_, f32>, ArrayViewMut2<'_, f32>) {
        (self.inputs.view_mut(), self.labels.view_mut())
    }
}
