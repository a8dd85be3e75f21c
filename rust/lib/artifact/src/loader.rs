use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::ArtifactError;
use crate::regressor::Regressor;
use crate::scaler::Scaler;
use crate::traits::{Predict, Transform};

/// Default artifact file names inside the model directory.
pub const DEFAULT_REGRESSOR_FILE: &str = "model_salaries.json";
pub const DEFAULT_INPUT_SCALER_FILE: &str = "scaler_X_salaries.json";
pub const DEFAULT_OUTPUT_SCALER_FILE: &str = "scaler_y_salaries.json";

/// Locations of the three artifact files.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub regressor: PathBuf,
    pub input_scaler: PathBuf,
    pub output_scaler: PathBuf,
}

impl ArtifactPaths {
    /// The default file names, resolved against `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            regressor: dir.join(DEFAULT_REGRESSOR_FILE),
            input_scaler: dir.join(DEFAULT_INPUT_SCALER_FILE),
            output_scaler: dir.join(DEFAULT_OUTPUT_SCALER_FILE),
        }
    }
}

/// A regressor with its input and output scalers, checked to fit together.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    regressor: Regressor,
    input_scaler: Scaler,
    output_scaler: Scaler,
}

impl ArtifactSet {
    /// Assemble a set from already-built artifacts.
    ///
    /// Fails unless the input scaler and regressor both take `num_features`
    /// values and the output scaler is one-dimensional.
    pub fn new(
        regressor: Regressor,
        input_scaler: Scaler,
        output_scaler: Scaler,
        num_features: usize,
    ) -> Result<Self, ArtifactError> {
        regressor.validate()?;
        input_scaler.validate()?;
        output_scaler.validate()?;

        if input_scaler.dim() != num_features {
            return Err(ArtifactError::Invalid(format!(
                "input scaler is fit on {} features, expected {num_features}",
                input_scaler.dim()
            )));
        }
        if regressor.num_features() != num_features {
            return Err(ArtifactError::Invalid(format!(
                "regressor takes {} features, expected {num_features}",
                regressor.num_features()
            )));
        }
        if output_scaler.dim() != 1 {
            return Err(ArtifactError::Invalid(format!(
                "output scaler is fit on {} targets, expected 1",
                output_scaler.dim()
            )));
        }

        Ok(Self {
            regressor,
            input_scaler,
            output_scaler,
        })
    }

    /// Read, parse and validate all three artifact files.
    pub fn load(paths: &ArtifactPaths, num_features: usize) -> Result<Self, ArtifactError> {
        let regressor: Regressor = read_json(&paths.regressor)?;
        let input_scaler: Scaler = read_json(&paths.input_scaler)?;
        let output_scaler: Scaler = read_json(&paths.output_scaler)?;

        let set = Self::new(regressor, input_scaler, output_scaler, num_features)?;
        info!(
            "Loaded model artifacts: regressor={}, input_scaler={}, output_scaler={}",
            paths.regressor.display(),
            paths.input_scaler.display(),
            paths.output_scaler.display(),
        );
        Ok(set)
    }

    pub fn regressor(&self) -> &Regressor {
        &self.regressor
    }

    pub fn input_scaler(&self) -> &Scaler {
        &self.input_scaler
    }

    pub fn output_scaler(&self) -> &Scaler {
        &self.output_scaler
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let text = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGRESSOR: &str = r#"{"kind": "linear", "coef": [1.0, 2.0], "intercept": 0.0}"#;
    const INPUT: &str = r#"{"kind": "standard", "mean": [0.0, 0.0], "scale": [1.0, 1.0]}"#;
    const OUTPUT: &str = r#"{"kind": "standard", "mean": [100.0], "scale": [10.0]}"#;

    fn write_set(dir: &Path, regressor: &str, input: &str, output: &str) -> ArtifactPaths {
        let paths = ArtifactPaths::in_dir(dir);
        fs::write(&paths.regressor, regressor).unwrap();
        fs::write(&paths.input_scaler, input).unwrap();
        fs::write(&paths.output_scaler, output).unwrap();
        paths
    }

    #[test]
    fn load_valid_set() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_set(dir.path(), REGRESSOR, INPUT, OUTPUT);

        let set = ArtifactSet::load(&paths, 2).unwrap();
        let scaled = set.input_scaler().transform(&[1.0, 1.0]).unwrap();
        let y = set.regressor().predict(&scaled).unwrap();
        let out = set.output_scaler().inverse_transform(&[y]).unwrap();
        assert_eq!(out, vec![130.0]);
    }

    #[test]
    fn missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        match ArtifactSet::load(&paths, 2) {
            Err(ArtifactError::Io { path, .. }) => assert_eq!(path, paths.regressor),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_set(dir.path(), REGRESSOR, "{not json", OUTPUT);
        match ArtifactSet::load(&paths, 2) {
            Err(ArtifactError::Parse { path, .. }) => assert_eq!(path, paths.input_scaler),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn feature_count_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_set(dir.path(), REGRESSOR, INPUT, OUTPUT);
        assert!(matches!(
            ArtifactSet::load(&paths, 8),
            Err(ArtifactError::Invalid(_))
        ));
    }

    #[test]
    fn multi_target_output_scaler_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_set(
            dir.path(),
            REGRESSOR,
            INPUT,
            r#"{"kind": "standard", "mean": [1.0, 2.0]}"#,
        );
        assert!(ArtifactSet::load(&paths, 2).is_err());
    }
}
