//! Server-side configuration file.
//!
//! Reads a TOML file such as `/etc/salaryd/<name>.toml`. Every section
//! is optional; a missing file yields the defaults.

use std::path::{Path, PathBuf};

use salary_artifact::loader::{
    DEFAULT_INPUT_SCALER_FILE, DEFAULT_OUTPUT_SCALER_FILE, DEFAULT_REGRESSOR_FILE,
};
use salary_artifact::ArtifactPaths;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the SQLite database.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Explicit database file; overrides `{data_dir}/salary.sqlite`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database: None,
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Directory holding the artifact files.
    #[serde(default = "default_model_dir")]
    pub dir: String,

    #[serde(default = "default_regressor")]
    pub regressor: String,

    #[serde(default = "default_input_scaler")]
    pub input_scaler: String,

    #[serde(default = "default_output_scaler")]
    pub output_scaler: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: default_model_dir(),
            regressor: default_regressor(),
            input_scaler: default_input_scaler(),
            output_scaler: default_output_scaler(),
        }
    }
}

fn default_model_dir() -> String {
    "model".to_string()
}

fn default_regressor() -> String {
    DEFAULT_REGRESSOR_FILE.to_string()
}

fn default_input_scaler() -> String {
    DEFAULT_INPUT_SCALER_FILE.to_string()
}

fn default_output_scaler() -> String {
    DEFAULT_OUTPUT_SCALER_FILE.to_string()
}

impl ModelConfig {
    /// Artifact file paths, with file names resolved against `dir`.
    pub fn artifact_paths(&self, dir: &Path) -> ArtifactPaths {
        ArtifactPaths {
            regressor: dir.join(&self.regressor),
            input_scaler: dir.join(&self.input_scaler),
            output_scaler: dir.join(&self.output_scaler),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Value of `Access-Control-Allow-Origin` on every response.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl ServerConfig {
    /// Resolve a context name or path to a config file.
    ///
    /// A value containing `/` or ending in `.toml` is used as a path;
    /// anything else names `/etc/salaryd/<name>.toml`.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.ends_with(".toml") {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from("/etc/salaryd").join(format!("{}.toml", name_or_path))
        }
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
