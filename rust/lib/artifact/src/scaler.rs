//! Fitted feature scalers.
//!
//! Both kinds are stored as the fitted per-dimension parameters, in the
//! same layout scikit-learn exposes them (`mean_`/`scale_` for standard
//! scaling, `min_`/`scale_` for min-max scaling).

use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;
use crate::traits::{check_len, Transform};

/// A fitted scaler, tagged by `"kind"` in its serialized form.
///
/// ```json
/// {"kind": "standard", "mean": [2022.4, 1.5], "scale": [0.7, 0.9]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

impl Scaler {
    /// Check internal consistency of the fitted parameters.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        match self {
            Scaler::Standard(s) => s.validate(),
            Scaler::MinMax(s) => s.validate(),
        }
    }
}

impl Transform for Scaler {
    fn dim(&self) -> usize {
        match self {
            Scaler::Standard(s) => s.dim(),
            Scaler::MinMax(s) => s.dim(),
        }
    }

    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        match self {
            Scaler::Standard(s) => s.transform(values),
            Scaler::MinMax(s) => s.transform(values),
        }
    }

    fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        match self {
            Scaler::Standard(s) => s.inverse_transform(values),
            Scaler::MinMax(s) => s.inverse_transform(values),
        }
    }
}

// ---------------------------------------------------------------------------
// StandardScaler
// ---------------------------------------------------------------------------

/// Standardization: `x' = (x - mean) / scale`.
///
/// Either parameter may be absent (fit with `with_mean=False` or
/// `with_std=False`), in which case centering or scaling is skipped.
/// A zero scale entry is treated as 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec<f64>>,
}

impl StandardScaler {
    fn dim(&self) -> usize {
        self.mean
            .as_ref()
            .or(self.scale.as_ref())
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        match (&self.mean, &self.scale) {
            (None, None) => Err(ArtifactError::Invalid(
                "standard scaler has neither mean nor scale".into(),
            )),
            (Some(m), Some(s)) if m.len() != s.len() => Err(ArtifactError::Invalid(format!(
                "standard scaler mean has {} entries but scale has {}",
                m.len(),
                s.len()
            ))),
            _ => {
                let mut params = self.mean.iter().chain(self.scale.iter()).flatten();
                if params.any(|v| !v.is_finite()) {
                    return Err(ArtifactError::Invalid(
                        "standard scaler has non-finite parameters".into(),
                    ));
                }
                if self.dim() == 0 {
                    return Err(ArtifactError::Invalid("standard scaler is empty".into()));
                }
                Ok(())
            }
        }
    }

    fn mean_at(&self, i: usize) -> f64 {
        self.mean.as_ref().map_or(0.0, |m| m[i])
    }

    fn scale_at(&self, i: usize) -> f64 {
        match self.scale.as_ref().map(|s| s[i]) {
            Some(s) if s != 0.0 => s,
            _ => 1.0,
        }
    }

    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        check_len(self.dim(), values)?;
        Ok(values
            .iter()
            .enumerate()
            .map(|(i, x)| (x - self.mean_at(i)) / self.scale_at(i))
            .collect())
    }

    fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        check_len(self.dim(), values)?;
        Ok(values
            .iter()
            .enumerate()
            .map(|(i, x)| x * self.scale_at(i) + self.mean_at(i))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MinMaxScaler
// ---------------------------------------------------------------------------

/// Min-max scaling: `x' = x * scale + min`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub min: Vec<f64>,
    pub scale: Vec<f64>,
}

impl MinMaxScaler {
    fn dim(&self) -> usize {
        self.min.len()
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.min.is_empty() {
            return Err(ArtifactError::Invalid("min-max scaler is empty".into()));
        }
        if self.min.len() != self.scale.len() {
            return Err(ArtifactError::Invalid(format!(
                "min-max scaler min has {} entries but scale has {}",
                self.min.len(),
                self.scale.len()
            )));
        }
        if self.scale.iter().any(|s| *s == 0.0 || !s.is_finite())
            || self.min.iter().any(|m| !m.is_finite())
        {
            return Err(ArtifactError::Invalid(
                "min-max scaler has zero or non-finite parameters".into(),
            ));
        }
        Ok(())
    }

    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        check_len(self.dim(), values)?;
        Ok(values
            .iter()
            .zip(self.scale.iter().zip(&self.min))
            .map(|(x, (s, m))| x * s + m)
            .collect())
    }

    fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        check_len(self.dim(), values)?;
        Ok(values
            .iter()
            .zip(self.scale.iter().zip(&self.min))
            .map(|(x, (s, m))| (x - m) / s)
            .collect())
    }
}
