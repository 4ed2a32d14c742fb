//! Chamba backend server
//!
//! Entry point: configuration loading, database migrations and HTTP server
//! startup for the job marketplace API.

use std::sync::Arc;

use tokio::net::TcpListener;

use chamba_backend::build_router;
use chamba_backend::state::AppState;

mod cli;
mod config_helpers;
mod tracing_setup;

use cli::CliArgs;
use config_helpers::{database_config_from_config, parse_bind_address};
use tracing_setup::install_tracing_from_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.help_requested {
        CliArgs::print_help();
        return Ok(());
    }

    // Resolve config path: CLI > environment variable
    let config_path = args
        .config_path
        .or_else(|| std::env::var("CHAMBA_CONFIG_PATH").ok());

    let config = load_config(&config_path)?;

    let _reload_handle = install_tracing_from_config(&config.logging);

    let db_cfg = database_config_from_config(&config);
    let db_pool = chamba_db::create_pool(&db_cfg).await?;
    run_migrations(&db_cfg, &db_pool).await?;

    tracing::info!(
        db_url = %chamba_db::sanitize_database_url(&db_cfg.url),
        db_max_connections = %db_cfg.max_connections,
        "database configuration"
    );

    let state = Arc::new(AppState::new(db_pool, config.pagination.clone()));
    let app = build_router(state);

    let addr = parse_bind_address(&config.server.host, config.server.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Load configuration from file or defaults.
fn load_config(path: &Option<String>) -> anyhow::Result<chamba_config::Config> {
    match path.as_deref() {
        Some(p) => chamba_config::load_config(Some(p))
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}")),
        None => chamba_config::load_config::<&std::path::Path>(None)
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}")),
    }
}

/// Run database migrations based on the database type.
async fn run_migrations(
    db_cfg: &chamba_db::DbConnectionConfig,
    db_pool: &chamba_db::DbPool,
) -> anyhow::Result<()> {
    let url_lower = db_cfg.url.to_lowercase();

    let migrate_res = if url_lower.starts_with("postgres") || url_lower.contains("postgresql") {
        tracing::info!("applying Postgres migrations");
        chamba_migrations::postgres_migrator().run(db_pool).await
    } else {
        tracing::info!("applying SQLite migrations");
        chamba_migrations::sqlite_migrator().run(db_pool).await
    };

    match migrate_res {
        Ok(_) => {
            tracing::info!("database migrations applied");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("failed to apply database migrations: {e}")),
    }
}
