//! Row codec and queries for the `users` table.

use sqlx::Executor;
use uuid::Uuid;

use crate::DbBackend;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct UsersRow {
    pub id: Uuid,
    pub display_name: String,
    pub banned: i32,
    pub prime_until: Option<String>,
    pub completed_jobs: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl UsersRow {
    #[inline]
    pub fn is_banned(&self) -> bool {
        self.banned != 0
    }

    /// Whether the Prime subscription window covers the given instant.
    pub fn prime_active_at(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.prime_until
            .as_deref()
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|until| until.with_timezone(&chrono::Utc) > now)
            .unwrap_or(false)
    }
}

pub async fn insert_user<'e, E>(executor: E, row: &UsersRow) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query(
        "INSERT INTO users (id, display_name, banned, prime_until, completed_jobs, \
         created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(row.id)
    .bind(&row.display_name)
    .bind(row.banned)
    .bind(&row.prime_until)
    .bind(row.completed_jobs)
    .bind(&row.created_at)
    .bind(&row.updated_at)
    .execute(executor)
    .await
    .map(|_| ())
}

pub async fn find_by_primary_key<'e, E>(
    executor: E,
    user_id: &Uuid,
) -> Result<Option<UsersRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as::<_, UsersRow>(
        "SELECT id, display_name, banned, prime_until, completed_jobs, created_at, updated_at \
         FROM users WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn set_banned<'e, E>(
    executor: E,
    user_id: &Uuid,
    banned: bool,
    updated_at: &str,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query("UPDATE users SET banned = ?, updated_at = ? WHERE id = ?")
        .bind(i32::from(banned))
        .bind(updated_at)
        .bind(user_id)
        .execute(executor)
        .await
        .map(|r| r.rows_affected())
}

pub async fn set_prime_until<'e, E>(
    executor: E,
    user_id: &Uuid,
    prime_until: Option<&str>,
    updated_at: &str,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query("UPDATE users SET prime_until = ?, updated_at = ? WHERE id = ?")
        .bind(prime_until)
        .bind(updated_at)
        .bind(user_id)
        .execute(executor)
        .await
        .map(|r| r.rows_affected())
}

/// Atomic counter bump; returns the matched-row count so callers can detect
/// a missing user.
pub async fn increment_completed_jobs<'e, E>(
    executor: E,
    user_id: &Uuid,
    updated_at: &str,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query(
        "UPDATE users SET completed_jobs = completed_jobs + 1, updated_at = ? WHERE id = ?",
    )
    .bind(updated_at)
    .bind(user_id)
    .execute(executor)
    .await
    .map(|r| r.rows_affected())
}
