//! `salaryd`: the salary prediction server binary.
//!
//! Usage:
//!   salaryd [-c <context-name-or-path>] [--listen <addr>] [serve [--migrate] | migrate]
//!
//! The context name resolves to `/etc/salaryd/<name>.toml`.
//! If a path with `/` or ending in `.toml` is given, it's used directly.
//! `DATABASE_URL`, when set, overrides the configured database file.

mod bootstrap;
mod config;
mod middleware;
mod routes;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use salary_core::Module;
use tracing::info;

use config::ServerConfig;
use middleware::CorsState;

/// Salary prediction server.
#[derive(Parser, Debug)]
#[command(name = "salaryd", about = "Salary prediction server", version)]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", default_value = "salaryd.toml")]
    config: String,

    /// Listen address (overrides default 0.0.0.0:8080).
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Apply pending schema migrations before serving.
        #[arg(long)]
        migrate: bool,
    },
    /// Apply pending schema migrations and exit.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    let database_url = std::env::var("DATABASE_URL").ok();
    let service_config =
        bootstrap::service_config(&server_config, &cli.listen, database_url.as_deref());

    let sql = bootstrap::open_database(&service_config)?;

    let run_migrations = match cli.command {
        Some(Command::Migrate) => {
            let applied = salary::migrate(sql.as_ref())?;
            info!("Applied {} migration(s)", applied);
            return Ok(());
        }
        Some(Command::Serve { migrate }) => migrate,
        None => false,
    };
    if run_migrations {
        let applied = salary::migrate(sql.as_ref())?;
        info!("Applied {} migration(s)", applied);
    }

    // Load model artifacts. The server does not start without them.
    let paths = bootstrap::artifact_paths(&server_config, &service_config);
    let pipeline = Arc::new(bootstrap::load_pipeline(&paths)?);
    info!("Model loaded from {}", paths.regressor.display());

    let salary_module = salary::SalaryModule::new(Arc::clone(&sql), pipeline)?;
    info!("Salary module initialized");

    let module_routes = vec![(salary_module.name(), salary_module.routes())];

    let cors = Arc::new(CorsState::new(&server_config.http.cors_origin)?);
    let app = routes::build_router(cors, module_routes);

    let listener = tokio::net::TcpListener::bind(&service_config.listen).await?;
    info!("salaryd listening on {}", service_config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
