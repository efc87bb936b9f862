use ndarray::{Array2, ArrayView2};

pub trait LossFn {
    /// Scalar loss of a prediction batch against its targets.
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32;

    /// Derivative of the loss with respect to every element of `y_pred`.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32>;
}
