use super::{Adam, GradientDescentWithMomentum, OptimizerKind};
use crate::Result;

/// Defines the strategy for updating model parameters based on calculated gradients.
pub trait Optimizer {
    /// Updates the provided slice of parameters using the gradient.
    ///
    /// # Arguments
    /// * `grad` - A reference to the model's gradient.
    /// * `params` - The parameters to update.
    ///
    /// # Returns
    /// An error if there's a mismatch in the sizes of `grad` and `params`.
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()>;
}

/// The live optimizer bound to a model's parameters, one variant per `OptimizerKind`.
#[derive(Debug)]
pub enum OptimizerState {
    Sgd(GradientDescentWithMomentum),
    Adam(Adam),
}

impl OptimizerState {
    pub const SGD_MOMENTUM: f32 = 0.9;
    pub const ADAM_BETA1: f32 = 0.9;
    pub const ADAM_BETA2: f32 = 0.999;
    pub const ADAM_EPSILON: f32 = 1e-8;

    /// Binds a fresh optimizer over `len` parameters.
    ///
    /// # Arguments
    /// * `kind` - The optimization algorithm.
    /// * `len` - The amount of parameters the optimizer tracks state for.
    /// * `learning_rate` - The step length.
    pub fn new(kind: OptimizerKind, len: usize, learning_rate: f32) -> Self {
        match kind {
            OptimizerKind::Sgd => Self::Sgd(GradientDescentWithMomentum::new(
                len,
                learning_rate,
                Self::SGD_MOMENTUM,
            )),
            OptimizerKind::Adam => Self::Adam(Adam::new(
                len,
                learning_rate,
                Self::ADAM_BETA1,
                Self::ADAM_BETA2,
                Self::ADAM_EPSILON,
            )),
        }
    }
}

impl Optimizer for OptimizerState {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        match self {
            Self::Sgd(o) => o.update_params(grad, params),
            Self::Adam(o) => o.update_params(grad, params),
        }
    }
}
