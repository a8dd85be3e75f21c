//! Fitted regressors.

use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;
use crate::traits::{check_len, Predict};
use crate::tree::Tree;

/// A fitted regressor, tagged by `"kind"` in its serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    Linear(LinearRegressor),
    TreeEnsemble(TreeEnsemble),
}

impl Regressor {
    /// Check internal consistency of the fitted parameters.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        match self {
            Regressor::Linear(m) => m.validate(),
            Regressor::TreeEnsemble(m) => m.validate(),
        }
    }
}

impl Predict for Regressor {
    fn num_features(&self) -> usize {
        match self {
            Regressor::Linear(m) => m.coef.len(),
            Regressor::TreeEnsemble(m) => m.num_features,
        }
    }

    fn predict(&self, features: &[f64]) -> Result<f64, ArtifactError> {
        check_len(self.num_features(), features)?;
        let out = match self {
            Regressor::Linear(m) => m.predict_row(features),
            Regressor::TreeEnsemble(m) => m.predict_row(features),
        };
        if !out.is_finite() {
            return Err(ArtifactError::NonFinite(out));
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Linear
// ---------------------------------------------------------------------------

/// Linear model: `y = intercept + Σ coef[i] × x[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub coef: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LinearRegressor {
    fn validate(&self) -> Result<(), ArtifactError> {
        if self.coef.is_empty() {
            return Err(ArtifactError::Invalid("linear model has no coefficients".into()));
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|c| !c.is_finite()) {
            return Err(ArtifactError::Invalid(
                "linear model has non-finite coefficients".into(),
            ));
        }
        Ok(())
    }

    fn predict_row(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coef
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

// ---------------------------------------------------------------------------
// Tree ensemble
// ---------------------------------------------------------------------------

/// How per-tree outputs are folded into one value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combine {
    /// Average of tree outputs (random forest, bagging).
    #[default]
    Mean,
    /// Sum of tree outputs (gradient boosting).
    Sum,
}

/// An ensemble of regression trees:
///
/// ```text
/// y = base_score + learning_rate × combine(tree_0(x), ..., tree_n(x))
/// ```
///
/// A random forest is `combine = mean`, `learning_rate = 1`, `base_score = 0`;
/// a boosted model is `combine = sum` with its shrinkage and initial estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub num_features: usize,
    pub trees: Vec<Tree>,
    #[serde(default)]
    pub combine: Combine,
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
}

fn default_learning_rate() -> f64 {
    1.0
}

impl TreeEnsemble {
    fn validate(&self) -> Result<(), ArtifactError> {
        if self.trees.is_empty() {
            return Err(ArtifactError::Invalid("tree ensemble has no trees".into()));
        }
        if self.num_features == 0 {
            return Err(ArtifactError::Invalid("tree ensemble has no features".into()));
        }
        if !self.base_score.is_finite() || !self.learning_rate.is_finite() {
            return Err(ArtifactError::Invalid(
                "tree ensemble has non-finite base score or learning rate".into(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.num_features)
                .map_err(|e| ArtifactError::Invalid(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }

    fn predict_row(&self, features: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict_row(features)).sum();
        let combined = match self.combine {
            Combine::Mean => total / self.trees.len() as f64,
            Combine::Sum => total,
        };
        self.base_score + self.learning_rate * combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single split on feature 0 at 0.5: left leaf 1.0, right leaf 3.0.
    fn stump(left: f64, right: f64) -> Tree {
        Tree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            value: vec![0.0, left, right],
        }
    }

    #[test]
    fn linear_predict() {
        let model = Regressor::Linear(LinearRegressor {
            coef: vec![2.0, -1.0],
            intercept: 0.5,
        });
        model.validate().unwrap();
        assert_eq!(model.predict(&[3.0, 4.0]).unwrap(), 2.5);
    }

    #[test]
    fn linear_rejects_wrong_width() {
        let model = Regressor::Linear(LinearRegressor {
            coef: vec![1.0, 1.0, 1.0],
            intercept: 0.0,
        });
        assert!(matches!(
            model.predict(&[1.0]),
            Err(ArtifactError::Shape { expected: 3, actual: 1 })
        ));
    }

    #[test]
    fn forest_averages_trees() {
        let model = Regressor::TreeEnsemble(TreeEnsemble {
            num_features: 2,
            trees: vec![stump(1.0, 3.0), stump(3.0, 5.0)],
            combine: Combine::Mean,
            base_score: 0.0,
            learning_rate: 1.0,
        });
        model.validate().unwrap();
        assert_eq!(model.predict(&[0.0, 9.0]).unwrap(), 2.0);
        assert_eq!(model.predict(&[1.0, 9.0]).unwrap(), 4.0);
    }

    #[test]
    fn boosting_sums_with_shrinkage() {
        let model = Regressor::TreeEnsemble(TreeEnsemble {
            num_features: 1,
            trees: vec![stump(1.0, 3.0), stump(3.0, 5.0)],
            combine: Combine::Sum,
            base_score: 10.0,
            learning_rate: 0.5,
        });
        // right branch: 3 + 5 = 8, scaled to 4, plus base 10.
        assert_eq!(model.predict(&[2.0]).unwrap(), 14.0);
    }

    #[test]
    fn non_finite_output_is_error() {
        let model = Regressor::Linear(LinearRegressor {
            coef: vec![1.0],
            intercept: 0.0,
        });
        assert!(matches!(
            model.predict(&[f64::INFINITY]),
            Err(ArtifactError::NonFinite(_))
        ));
    }

    #[test]
    fn deserialize_defaults() {
        let json = r#"{
            "kind": "tree_ensemble",
            "num_features": 1,
            "trees": [{
                "children_left": [-1],
                "children_right": [-1],
                "feature": [-2],
                "threshold": [-2.0],
                "value": [7.0]
            }]
        }"#;
        let model: Regressor = serde_json::from_str(json).unwrap();
        model.validate().unwrap();
        match &model {
            Regressor::TreeEnsemble(e) => {
                assert_eq!(e.combine, Combine::Mean);
                assert_eq!(e.learning_rate, 1.0);
            }
            other => panic!("unexpected model {other:?}"),
        }
        assert_eq!(model.predict(&[123.0]).unwrap(), 7.0);
    }
}
