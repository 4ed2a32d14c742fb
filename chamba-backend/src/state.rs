use std::sync::Arc;

use chamba_config::PaginationConfig;
use chamba_core::JobWorkflow;
use chamba_db::{DbPool, SqlJobStore, SqlUserDirectory};

/// Shared application state handed to every handler via `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: Arc<DbPool>,
    pub workflow: Arc<JobWorkflow<SqlJobStore, SqlUserDirectory>>,
    pub pagination: PaginationConfig,
}

impl AppState {
    pub fn new(pool: DbPool, pagination: PaginationConfig) -> Self {
        let pool = Arc::new(pool);
        let store = SqlJobStore::new(pool.as_ref().clone());
        let users = SqlUserDirectory::new(pool.as_ref().clone());
        Self {
            db_pool: pool,
            workflow: Arc::new(JobWorkflow::new(store, users)),
            pagination,
        }
    }
}
