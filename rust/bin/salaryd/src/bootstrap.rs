//! Bootstrap: configuration checks, storage and model initialisation.
//!
//! Everything here runs before the listener binds. Any failure stops the
//! process: a server without its model or schema must not start.

use std::path::Path;
use std::sync::Arc;

use salary::pipeline::SalaryPipeline;
use salary_artifact::ArtifactPaths;
use salary_core::ServiceConfig;
use salary_sql::{SQLStore, SqliteStore};
use tracing::info;

use crate::config::ServerConfig;

/// Verify server configuration is usable.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.storage.data_dir.is_empty() && config.storage.database.is_none() {
        anyhow::bail!("Storage data_dir is empty and no database path is configured.");
    }
    if config.model.dir.is_empty() {
        anyhow::bail!("Model dir is empty in configuration.");
    }
    for (name, file) in [
        ("regressor", &config.model.regressor),
        ("input_scaler", &config.model.input_scaler),
        ("output_scaler", &config.model.output_scaler),
    ] {
        if file.is_empty() {
            anyhow::bail!("Model {} file name is empty in configuration.", name);
        }
    }
    if config.http.cors_origin.is_empty() {
        anyhow::bail!("HTTP cors_origin is empty in configuration.");
    }
    Ok(())
}

/// Build the runtime config from the file, the listen flag and an
/// optional `DATABASE_URL` override.
pub fn service_config(
    config: &ServerConfig,
    listen: &str,
    database_url: Option<&str>,
) -> ServiceConfig {
    let mut service = ServiceConfig {
        data_dir: Some(config.storage.data_dir.clone().into()),
        sqlite_path: config.storage.database.clone().map(Into::into),
        model_dir: Some(config.model.dir.clone().into()),
        listen: listen.to_string(),
    };
    if let Some(url) = database_url {
        service.apply_database_url(url);
    }
    service
}

/// Open (creating if needed) the SQLite database.
pub fn open_database(config: &ServiceConfig) -> anyhow::Result<Arc<dyn SQLStore>> {
    let path = config.resolve_sqlite_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    info!("Opening database {}", path.display());
    let store = SqliteStore::open(&path)
        .map_err(|e| anyhow::anyhow!("failed to open database {}: {}", path.display(), e))?;
    Ok(Arc::new(store))
}

/// Load the prediction artifacts. Fails if any file is missing or corrupt.
pub fn load_pipeline(paths: &ArtifactPaths) -> anyhow::Result<SalaryPipeline> {
    SalaryPipeline::load(paths).map_err(|e| anyhow::anyhow!("model unavailable: {}", e))
}

/// Artifact paths for a config, resolved against the model directory.
pub fn artifact_paths(config: &ServerConfig, service: &ServiceConfig) -> ArtifactPaths {
    config.model.artifact_paths(Path::new(&service.resolve_model_dir()))
}
