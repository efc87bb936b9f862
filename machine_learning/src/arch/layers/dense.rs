use ndarray::{linalg, prelude::*};

use crate::{MlErr, Result};

/// A fully connected layer without activation, `y = x·W + b`.
///
/// The layer owns no parameters: they live in a flat slice laid out as
/// `[W (row-major, n_in × n_out), b (n_out)]` and are handed in on every call.
#[derive(Debug, Clone)]
pub struct Dense {
    dim: (usize, usize),
    size: usize,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The input and output widths of the layer.
    ///
    /// # Returns
    /// A new `Dense` instance.
    pub fn new(dim: (usize, usize)) -> Self {
        Self {
            dim,
            size: (dim.0 + 1) * dim.1,
        }
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Makes a forward pass through the layer.
    ///
    /// # Arguments
    /// * `params` - The layer's parameters.
    /// * `x` - The input batch, one sample per row.
    ///
    /// # Returns
    /// The output batch or an error if the shapes don't line up.
    pub fn forward(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_input(x)?;

        let (w, b) = self.view_params(params)?;
        let mut z = x.dot(&w);
        z += &b;

        Ok(z)
    }

    /// Computes the gradient of the loss with respect to this layer's parameters.
    ///
    /// # Arguments
    /// * `x` - The input batch used on the forward pass.
    /// * `d` - The derivative of the loss with respect to the layer's output.
    /// * `grad` - The buffer the gradient gets written to, same layout as the parameters.
    pub fn backward(&self, x: ArrayView2<f32>, d: ArrayView2<f32>, grad: &mut [f32]) -> Result<()> {
        self.check_input(x)?;

        if d.dim() != (x.nrows(), self.dim.1) {
            return Err(MlErr::SizeMismatch {
                what: "output delta",
                got: d.len(),
                expected: x.nrows() * self.dim.1,
            });
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &x.t(), &d, 0.0, &mut dw);
        db.assign(&d.sum_axis(Axis(0)));

        Ok(())
    }

    fn check_input(&self, x: ArrayView2<f32>) -> Result<()> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "input columns",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        Ok(())
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        if grad.len() != self.size {
            return Err(MlErr::SizeMismatch {
                what: "gradient",
                got: grad.len(),
                expected: self.size,
            });
        }

        let w_size = self.size - self.dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).map_err(|_| self.shape_err(w_size))?;
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw)
            .map_err(|_| self.shape_err(self.dim.1))?;

        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    fn view_params<'a>(&self, params: &'a [f32]) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        if params.len() != self.size {
            return Err(MlErr::SizeMismatch {
                what: "parameters",
                got: params.len(),
                expected: self.size,
            });
        }

        let w_size = self.size - self.dim.1;
        let w = ArrayView2::from_shape(self.dim, &params[..w_size])
            .map_err(|_| self.shape_err(w_size))?;
        let b = ArrayView1::from_shape(self.dim.1, &params[w_size..])
            .map_err(|_| self.shape_err(self.dim.1))?;

        Ok((w, b))
    }

    fn shape_err(&self, got: usize) -> MlErr {
        MlErr::SizeMismatch {
            what: "dense layer view",
            got,
            expected: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn forward_applies_weights_then_bias() {
        let dense = Dense::new((2, 1));
        // w = [[2], [3]], b = [1]
        let params = [2.0, 3.0, 1.0];
        let x = array![[1.0_f32, 1.0], [0.0, 2.0]];

        let y = dense.forward(&params, x.view()).unwrap();
        assert_eq!(y, array![[6.0_f32], [7.0]]);
    }

    #[test]
    fn backward_sums_bias_gradient_over_rows() {
        let dense = Dense::new((1, 1));
        let x = array![[1.0_f32], [2.0], [3.0]];
        let d = array![[1.0_f32], [1.0], [1.0]];
        let mut grad = [0.0; 2];

        dense.backward(x.view(), d.view(), &mut grad).unwrap();
        assert_eq!(grad, [6.0, 3.0]);
    }

    #[test]
    fn forward_rejects_wrong_input_width() {
        let dense = Dense::new((3, 1));
        let params = [0.0; 4];
        let x = array![[1.0_f32, 2.0]];

        assert!(matches!(
            dense.forward(&params, x.view()),
            Err(MlErr::SizeMismatch { got: 2, expected: 3, .. })
        ));
    }
}
