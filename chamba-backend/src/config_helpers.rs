use std::net::{IpAddr, SocketAddr};

use chamba_db::DbConnectionConfig;

/// Build database connection config from application config.
///
/// A `sqlite` driver with a `path` becomes a file-backed sqlite URL; anything
/// else is assembled into a postgres URL. When the file config carries no
/// usable database, the `CHAMBA_*` environment is consulted, falling back to
/// an in-memory sqlite database as a last resort.
pub fn database_config_from_config(cfg: &chamba_config::Config) -> DbConnectionConfig {
    if cfg.database.driver == "sqlite" {
        if let Some(path) = &cfg.database.path {
            return DbConnectionConfig::new(path);
        }
    } else if let (Some(host), Some(database)) = (&cfg.database.host, &cfg.database.database) {
        let port = cfg.database.port.unwrap_or(5432);
        let username = cfg.database.username.as_deref().unwrap_or("postgres");
        let password = cfg
            .database
            .password
            .as_deref()
            .map(|p| format!(":{p}"))
            .unwrap_or_default();
        return DbConnectionConfig::new(format!(
            "postgres://{username}{password}@{host}:{port}/{database}"
        ));
    }

    match DbConnectionConfig::from_env("CHAMBA") {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!(%error, "falling back to in-memory sqlite database");
            DbConnectionConfig::new("sqlite::memory:")
        }
    }
}

/// Parse host:port into a SocketAddr, with fallback to 0.0.0.0.
pub fn parse_bind_address(host: &str, port: u16) -> SocketAddr {
    host.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, port))
        .or_else(|_| host.parse::<SocketAddr>())
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)))
}
