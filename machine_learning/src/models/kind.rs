use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{MlErr, OptimizerKind};

/// The closed set of model architectures.
///
/// `Lstm` is recognized by name but has no backend yet: creating or loading one fails with
/// `MlErr::UnsupportedVariant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LinearRegression,
    Lstm,
}

impl ModelKind {
    /// The type tag stored next to a persisted model.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LinearRegression => "linear_regression",
            Self::Lstm => "lstm",
        }
    }

    /// Whether a backend exists for this kind.
    pub fn is_implemented(self) -> bool {
        matches!(self, Self::LinearRegression)
    }

    /// Optimizers this kind can be bound to.
    pub fn supports(self, optimizer: OptimizerKind) -> bool {
        match self {
            Self::LinearRegression => matches!(optimizer, OptimizerKind::Sgd | OptimizerKind::Adam),
            Self::Lstm => false,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = MlErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear_regression" => Ok(Self::LinearRegression),
            "lstm" => Ok(Self::Lstm),
            other => Err(MlErr::UnknownModelType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags_only() {
        assert_eq!("linear_regression".parse::<ModelKind>().unwrap(), ModelKind::LinearRegression);
        assert_eq!("lstm".parse::<ModelKind>().unwrap(), ModelKind::Lstm);
        assert!(matches!(
            "svm".parse::<ModelKind>(),
            Err(MlErr::UnknownModelType(name)) if name == "svm"
        ));
    }
}
