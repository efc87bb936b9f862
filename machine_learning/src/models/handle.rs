use log::debug;
use ndarray::{Array2, ArrayView2};

use super::{LinearRegression, Model, ModelConfig, ModelKind};
use crate::{MlErr, Result, serialization};

/// An owned model instance, exactly one concrete backend selected by `ModelKind`.
#[derive(Debug)]
pub enum ModelHandle {
    LinearRegression(LinearRegression),
}

impl ModelHandle {
    /// Allocates and initializes a new model for `config.kind`.
    ///
    /// # Arguments
    /// * `config` - The model configuration.
    ///
    /// # Returns
    /// The handle, or `MlErr::UnsupportedVariant` for kinds without a backend.
    pub fn create(config: ModelConfig) -> Result<Self> {
        debug!(
            "creating {} model {} -> {} ({}, lr {})",
            config.kind, config.input_size, config.label_size, config.optimizer, config.learning_rate
        );

        match config.kind {
            ModelKind::LinearRegression => LinearRegression::new(config).map(Self::LinearRegression),
            ModelKind::Lstm => Err(MlErr::UnsupportedVariant(ModelKind::Lstm.as_str())),
        }
    }

    /// Reconstructs a model from a persisted record.
    ///
    /// # Arguments
    /// * `type_tag` - The type tag the record was stored with.
    /// * `bytes` - The serialized model.
    ///
    /// # Returns
    /// The handle, or an error if the binary is corrupt or disagrees with `type_tag`.
    pub fn load(type_tag: &str, bytes: &[u8]) -> Result<Self> {
        let tagged: ModelKind = type_tag.parse()?;
        let (config, params) = serialization::decode(bytes)?;
        debug!("loaded {} model with {} parameter(s)", config.kind, params.len());

        if config.kind != tagged {
            return Err(MlErr::TypeTagMismatch {
                tag: type_tag.to_string(),
                stored: config.kind.as_str(),
            });
        }

        match config.kind {
            ModelKind::LinearRegression => {
                LinearRegression::from_parts(config, params).map(Self::LinearRegression)
            }
            ModelKind::Lstm => Err(MlErr::UnsupportedVariant(ModelKind::Lstm.as_str())),
        }
    }
}

impl Model for ModelHandle {
    fn config(&self) -> &ModelConfig {
        match self {
            Self::LinearRegression(m) => m.config(),
        }
    }

    fn params(&self) -> &[f32] {
        match self {
            Self::LinearRegression(m) => m.params(),
        }
    }

    fn forward(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        match self {
            Self::LinearRegression(m) => m.forward(x),
        }
    }

    fn train_step(&mut self, x: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<f32> {
        match self {
            Self::LinearRegression(m) => m.train_step(x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OptimizerKind;
    use ndarray::array;

    fn config(kind: ModelKind) -> ModelConfig {
        ModelConfig {
            kind,
            input_size: 2,
            label_size: 1,
            optimizer: OptimizerKind::Adam,
            learning_rate: 0.01,
            seed: Some(3),
            input_columns: vec!["a".into(), "b".into()],
            label_columns: vec!["y".into()],
        }
    }

    #[test]
    fn lstm_is_declared_but_not_creatable() {
        assert!(matches!(
            ModelHandle::create(config(ModelKind::Lstm)),
            Err(MlErr::UnsupportedVariant("lstm"))
        ));
    }

    #[test]
    fn loaded_model_predicts_like_the_original() {
        let mut model = ModelHandle::create(config(ModelKind::LinearRegression)).unwrap();
        let x = array![[1.0_f32, 2.0], [3.0, -1.0]];
        let y = array![[1.0_f32], [0.0]];
        model.train_step(x.view(), y.view()).unwrap();

        let bytes = model.serialize().unwrap();
        let loaded = ModelHandle::load("linear_regression", &bytes).unwrap();

        assert_eq!(loaded.config(), model.config());
        assert_eq!(loaded.params(), model.params());
        assert_eq!(loaded.forward(x.view()).unwrap(), model.forward(x.view()).unwrap());
    }

    #[test]
    fn load_rejects_a_disagreeing_tag() {
        let model = ModelHandle::create(config(ModelKind::LinearRegression)).unwrap();
        let bytes = model.serialize().unwrap();

        assert!(matches!(
            ModelHandle::load("lstm", &bytes),
            Err(MlErr::TypeTagMismatch { .. })
        ));
        assert!(matches!(
            ModelHandle::load("forest", &bytes),
            Err(MlErr::UnknownModelType(_))
        ));
    }
}
