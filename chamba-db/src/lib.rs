#[cfg(not(any(feature = "postgres", feature = "sqlite")))]
compile_error!("Enable exactly one of the `postgres` or `sqlite` features for chamba-db.");

#[cfg(all(feature = "postgres", feature = "sqlite"))]
compile_error!("Activate only one backend feature (`postgres` or `sqlite`) for chamba-db.");

#[cfg(feature = "postgres")]
pub type DbBackend = sqlx::Postgres;
#[cfg(feature = "sqlite")]
pub type DbBackend = sqlx::Sqlite;

pub mod jobs;
pub mod store;
pub mod users;

pub use chamba_db_connection::{
    create_pool, sanitize_database_url, DbConnectionConfig, DbConnectionError, DbPool,
};
pub use store::{SqlJobStore, SqlUserDirectory};
