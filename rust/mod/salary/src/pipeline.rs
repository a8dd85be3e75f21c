//! Prediction pipeline: input scaler → regressor → output scaler.

use salary_artifact::{
    ArtifactError, ArtifactPaths, ArtifactSet, Predict, Regressor, Scaler, Transform,
};
use salary_core::ServiceError;
use tracing::debug;

use crate::model::{SalaryFeatures, NUM_FEATURES};

/// The model predicts salary in thousands.
pub const SALARY_UNIT: f64 = 1000.0;

/// Fitted artifacts composed into a single `features -> salary` function.
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct SalaryPipeline {
    artifacts: ArtifactSet,
}

impl SalaryPipeline {
    /// Build from in-memory artifacts, checking they take [`NUM_FEATURES`] inputs.
    pub fn new(
        regressor: Regressor,
        input_scaler: Scaler,
        output_scaler: Scaler,
    ) -> Result<Self, ArtifactError> {
        Ok(Self {
            artifacts: ArtifactSet::new(regressor, input_scaler, output_scaler, NUM_FEATURES)?,
        })
    }

    /// Load all three artifacts from disk.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        Ok(Self {
            artifacts: ArtifactSet::load(paths, NUM_FEATURES)?,
        })
    }

    /// Predict the salary for one feature tuple, rounded to cents.
    pub fn predict(&self, features: &SalaryFeatures) -> Result<f64, ServiceError> {
        let raw = features.to_vector();
        let scaled = self
            .artifacts
            .input_scaler()
            .transform(&raw)
            .map_err(model_error)?;
        let target = self
            .artifacts
            .regressor()
            .predict(&scaled)
            .map_err(model_error)?;
        let thousands = self
            .artifacts
            .output_scaler()
            .inverse_transform(&[target])
            .map_err(model_error)?
            .first()
            .copied()
            .ok_or_else(|| ServiceError::ModelUnavailable("output scaler returned no value".into()))?;

        let salary = round_cents(thousands * SALARY_UNIT);
        if !salary.is_finite() {
            return Err(ServiceError::ModelUnavailable(format!(
                "prediction is not finite: {salary}"
            )));
        }
        debug!(?features, salary, "predicted salary");
        Ok(salary)
    }
}

fn model_error(e: ArtifactError) -> ServiceError {
    ServiceError::ModelUnavailable(format!("prediction failed: {e}"))
}

/// Round to 2 decimal places.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A pipeline whose output depends on every feature, for tests.
#[cfg(test)]
pub(crate) fn test_pipeline() -> SalaryPipeline {
    use salary_artifact::{LinearRegressor, StandardScaler};

    SalaryPipeline::new(
        Regressor::Linear(LinearRegressor {
            coef: vec![0.35, 0.4, 0.05, 0.1, 0.08, -0.02, 0.06, 0.12],
            intercept: 0.0,
        }),
        Scaler::Standard(StandardScaler {
            mean: Some(vec![2022.4, 1.9, 1.0, 70.0, 60.0, 55.0, 55.0, 1.2]),
            scale: Some(vec![0.7, 0.9, 0.2, 30.0, 25.0, 45.0, 25.0, 0.5]),
        }),
        Scaler::Standard(StandardScaler {
            mean: Some(vec![137.5]),
            scale: Some(vec![63.0]),
        }),
    )
    .expect("test artifacts are consistent")
}

#[cfg(test)]
mod tests {
    use super::*;
    use salary_artifact::{LinearRegressor, StandardScaler};

    fn features() -> SalaryFeatures {
        SalaryFeatures {
            work_year: 2023,
            experience_level: 2,
            employment_type: 1,
            job_title: 114,
            employee_residence: 91,
            remote_ratio: 0,
            company_location: 86,
            company_size: 1,
        }
    }

    fn identity_scaler(dim: usize) -> Scaler {
        Scaler::Standard(StandardScaler {
            mean: Some(vec![0.0; dim]),
            scale: Some(vec![1.0; dim]),
        })
    }

    /// Regressor that returns feature `i` unchanged.
    fn pick_feature(i: usize) -> SalaryPipeline {
        let mut coef = vec![0.0; NUM_FEATURES];
        coef[i] = 1.0;
        SalaryPipeline::new(
            Regressor::Linear(LinearRegressor { coef, intercept: 0.0 }),
            identity_scaler(NUM_FEATURES),
            identity_scaler(1),
        )
        .unwrap()
    }

    #[test]
    fn composes_scale_predict_inverse() {
        // work_year 2023 -> 23 after the intercept, then 23 * 2 + 100 = 146 thousand.
        let mut coef = vec![0.0; NUM_FEATURES];
        coef[0] = 1.0;
        let pipeline = SalaryPipeline::new(
            Regressor::Linear(LinearRegressor {
                coef,
                intercept: -2000.0,
            }),
            identity_scaler(NUM_FEATURES),
            Scaler::Standard(StandardScaler {
                mean: Some(vec![100.0]),
                scale: Some(vec![2.0]),
            }),
        )
        .unwrap();
        assert_eq!(pipeline.predict(&features()).unwrap(), 146_000.0);
    }

    #[test]
    fn feeds_features_in_positional_order() {
        let f = features();
        let expected = f.to_vector();
        for (i, value) in expected.iter().enumerate() {
            let got = pick_feature(i).predict(&f).unwrap();
            assert_eq!(got, value * SALARY_UNIT, "feature {i}");
        }
    }

    #[test]
    fn is_deterministic() {
        let pipeline = test_pipeline();
        let first = pipeline.predict(&features()).unwrap();
        for _ in 0..10 {
            assert_eq!(pipeline.predict(&features()).unwrap(), first);
        }
    }

    #[test]
    fn sensitive_to_work_year() {
        let pipeline = test_pipeline();
        let mut later = features();
        later.work_year = 2024;
        assert_ne!(
            pipeline.predict(&features()).unwrap(),
            pipeline.predict(&later).unwrap()
        );
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round_cents(123.456), 123.46);
        assert_eq!(round_cents(123.454), 123.45);
        assert_eq!(round_cents(-1.005_1), -1.01);
        assert_eq!(round_cents(100.0), 100.0);
    }

    #[test]
    fn rejects_artifacts_of_wrong_width() {
        let result = SalaryPipeline::new(
            Regressor::Linear(LinearRegressor {
                coef: vec![1.0; 3],
                intercept: 0.0,
            }),
            identity_scaler(3),
            identity_scaler(1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn overflow_is_model_unavailable() {
        let pipeline = SalaryPipeline::new(
            Regressor::Linear(LinearRegressor {
                coef: vec![1e308; NUM_FEATURES],
                intercept: 0.0,
            }),
            identity_scaler(NUM_FEATURES),
            identity_scaler(1),
        )
        .unwrap();
        match pipeline.predict(&features()) {
            Err(ServiceError::ModelUnavailable(msg)) => assert!(msg.starts_with("prediction failed")),
            other => panic!("expected model unavailable, got {other:?}"),
        }
    }

    #[test]
    fn huge_codes_still_predict() {
        let mut f = features();
        f.work_year = i64::MAX;
        let salary = test_pipeline().predict(&f).unwrap();
        assert!(salary.is_finite());
    }
}
