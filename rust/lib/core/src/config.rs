use std::path::PathBuf;

/// Resolved runtime configuration handed to storage and model initialisation.
///
/// The server binary builds this from its TOML config, the command line
/// and the environment, then passes it to the layers that open files.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding the service's mutable state.
    pub data_dir: Option<PathBuf>,

    /// Path to the SQLite database file.
    /// Defaults to `{data_dir}/salary.sqlite` if not specified.
    pub sqlite_path: Option<PathBuf>,

    /// Directory containing the serialized model artifacts.
    /// Defaults to `./model` if not specified.
    pub model_dir: Option<PathBuf>,

    /// Listen address for the HTTP server.
    pub listen: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            sqlite_path: None,
            model_dir: None,
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Override the database location from a `DATABASE_URL`-style value.
    ///
    /// Accepts a plain path or a `sqlite://` / `sqlite:` prefixed URL.
    /// Blank values are ignored.
    pub fn apply_database_url(&mut self, url: &str) {
        let url = url.trim();
        let path = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        if !path.is_empty() {
            self.sqlite_path = Some(PathBuf::from(path));
        }
    }

    /// Resolve the SQLite database path, falling back to `{data_dir}/salary.sqlite`.
    pub fn resolve_sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("salary.sqlite"))
    }

    /// Resolve the model artifact directory.
    pub fn resolve_model_dir(&self) -> PathBuf {
        self.model_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("model"))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_sqlite_path(),
            PathBuf::from("/data/salary.sqlite")
        );
        assert_eq!(config.resolve_model_dir(), PathBuf::from("model"));
        assert_eq!(config.listen, "0.0.0.0:8080");
    }

    #[test]
    fn test_resolve_without_data_dir() {
        let config = ServiceConfig::default();
        assert_eq!(config.resolve_sqlite_path(), PathBuf::from("salary.sqlite"));
    }

    #[test]
    fn test_database_url_override() {
        let mut config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        config.apply_database_url("sqlite:///var/lib/salary/db.sqlite");
        assert_eq!(
            config.resolve_sqlite_path(),
            PathBuf::from("/var/lib/salary/db.sqlite")
        );

        config.apply_database_url("sqlite:relative.db");
        assert_eq!(config.resolve_sqlite_path(), PathBuf::from("relative.db"));

        config.apply_database_url("plain.db");
        assert_eq!(config.resolve_sqlite_path(), PathBuf::from("plain.db"));
    }

    #[test]
    fn test_blank_database_url_is_ignored() {
        let mut config = ServiceConfig::default();
        config.apply_database_url("   ");
        assert!(config.sqlite_path.is_none());
    }
}
