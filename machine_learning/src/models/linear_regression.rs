use ndarray::{Array2, ArrayView2};

use super::{Model, ModelConfig};
use crate::{
    MlErr, Result,
    arch::{
        layers::Dense,
        loss::{LossFn, Mse},
    },
    initialization,
    optimization::{Optimizer, OptimizerState},
};

/// Linear regression: a single dense layer from the input features to the labels, trained on
/// mean squared error.
#[derive(Debug)]
pub struct LinearRegression {
    config: ModelConfig,
    layer: Dense,
    params: Vec<f32>,
    grad: Vec<f32>,
    optimizer: OptimizerState,
    loss_fn: Mse,
}

impl LinearRegression {
    /// Creates a freshly initialized `LinearRegression`.
    ///
    /// Weights and biases are drawn from `U(-1/sqrt(n), 1/sqrt(n))`, `n` being the input width.
    ///
    /// # Arguments
    /// * `config` - The model configuration.
    ///
    /// # Returns
    /// A new model, or an error if the configuration is unusable.
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;

        let layer = Dense::new((config.input_size, config.label_size));
        let mut params = vec![0.0; layer.size()];
        let mut rng = initialization::generate_rng(config.seed);
        let bound = initialization::fan_in_bound(config.input_size);
        initialization::uniform_fill(&mut rng, bound, &mut params)?;

        Ok(Self::assemble(config, layer, params))
    }

    /// Rebuilds a `LinearRegression` from previously trained parameters.
    ///
    /// # Arguments
    /// * `config` - The model configuration.
    /// * `params` - The flat parameters, `[W, b]`.
    ///
    /// # Returns
    /// The model, with a fresh optimizer, or an error if `params` doesn't fit the configuration.
    pub fn from_parts(config: ModelConfig, params: Vec<f32>) -> Result<Self> {
        config.validate()?;

        let layer = Dense::new((config.input_size, config.label_size));
        if params.len() != layer.size() {
            return Err(MlErr::SizeMismatch {
                what: "stored parameters",
                got: params.len(),
                expected: layer.size(),
            });
        }

        Ok(Self::assemble(config, layer, params))
    }

    fn assemble(config: ModelConfig, layer: Dense, params: Vec<f32>) -> Self {
        let size = layer.size();
        let optimizer = OptimizerState::new(config.optimizer, size, config.learning_rate);

        Self {
            config,
            layer,
            params,
            grad: vec![0.0; size],
            optimizer,
            loss_fn: Mse::new(),
        }
    }
}

impl Model for LinearRegression {
    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn params(&self) -> &[f32] {
        &self.params
    }

    fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.layer.forward(&self.params, x)
    }

    fn train_step(&mut self, x: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<f32> {
        if y.dim() != (x.nrows(), self.config.label_size) {
            return Err(MlErr::SizeMismatch {
                what: "label batch",
                got: y.len(),
                expected: x.nrows() * self.config.label_size,
            });
        }

        let y_pred = self.layer.forward(&self.params, x)?;
        let loss = self.loss_fn.loss(y_pred.view(), y);
        let d = self.loss_fn.loss_prime(y_pred.view(), y);

        self.grad.fill(0.0);
        self.layer.backward(x, d.view(), &mut self.grad)?;
        self.optimizer.update_params(&self.grad, &mut self.params)?;

        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ModelKind, OptimizerKind};
    use ndarray::Array2;

    fn config(optimizer: OptimizerKind, learning_rate: f32) -> ModelConfig {
        ModelConfig {
            kind: ModelKind::LinearRegression,
            input_size: 1,
            label_size: 1,
            optimizer,
            learning_rate,
            seed: Some(42),
            input_columns: vec!["x".into()],
            label_columns: vec!["y".into()],
        }
    }

    // y = 2x + 1
    fn line() -> (Array2<f32>, Array2<f32>) {
        let xs: Vec<f32> = (0..8).map(|i| i as f32 / 8.0).collect();
        let ys: Vec<f32> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
        (
            Array2::from_shape_vec((8, 1), xs).unwrap(),
            Array2::from_shape_vec((8, 1), ys).unwrap(),
        )
    }

    #[test]
    fn sgd_fits_a_line() {
        let mut model = LinearRegression::new(config(OptimizerKind::Sgd, 0.1)).unwrap();
        let (x, y) = line();

        let first = model.train_step(x.view(), y.view()).unwrap();
        let mut last = first;
        for _ in 0..300 {
            last = model.train_step(x.view(), y.view()).unwrap();
        }

        assert!(last < first);
        assert!(last < 1e-3, "loss {last}");
        assert!((model.params()[0] - 2.0).abs() < 0.1);
        assert!((model.params()[1] - 1.0).abs() < 0.1);
    }

    #[test]
    fn adam_fits_a_line() {
        let mut model = LinearRegression::new(config(OptimizerKind::Adam, 0.05)).unwrap();
        let (x, y) = line();

        let first = model.train_step(x.view(), y.view()).unwrap();
        let mut last = first;
        for _ in 0..1000 {
            last = model.train_step(x.view(), y.view()).unwrap();
        }

        assert!(last < first);
        assert!(last < 5e-2, "loss {last}");
    }

    #[test]
    fn forward_does_not_mutate_params() {
        let model = LinearRegression::new(config(OptimizerKind::Sgd, 0.1)).unwrap();
        let before = model.params().to_vec();
        let (x, _) = line();

        let y = model.forward(x.view()).unwrap();
        assert_eq!(y.dim(), (8, 1));
        assert_eq!(model.params(), before.as_slice());
    }

    #[test]
    fn train_step_accepts_short_batches() {
        let mut model = LinearRegression::new(config(OptimizerKind::Sgd, 0.1)).unwrap();
        let (x, y) = line();

        let short_x = x.slice(ndarray::s![..3, ..]);
        let short_y = y.slice(ndarray::s![..3, ..]);
        assert!(model.train_step(short_x, short_y).is_ok());
    }

    #[test]
    fn from_parts_rejects_wrong_param_count() {
        let err = LinearRegression::from_parts(config(OptimizerKind::Sgd, 0.1), vec![1.0]);
        assert!(matches!(err, Err(MlErr::SizeMismatch { got: 1, expected: 2, .. })));
    }
}
