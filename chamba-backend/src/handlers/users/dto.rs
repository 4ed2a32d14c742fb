use serde::{Deserialize, Serialize};

use chamba_core::ValidationIssue;
use chamba_db::users::UsersRow;

/// Response DTO for users - uses camelCase for JSON serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub display_name: String,
    pub banned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prime_until: Option<String>,
    pub completed_jobs: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UsersRow> for UserResponse {
    fn from(row: UsersRow) -> Self {
        Self {
            id: row.id.to_string(),
            display_name: row.display_name,
            banned: row.banned != 0,
            prime_until: row.prime_until,
            completed_jobs: row.completed_jobs,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
    pub display_name: String,
}

impl CreateUserDto {
    pub fn validate(&self) -> Result<(), Vec<ValidationIssue>> {
        let mut issues: Vec<ValidationIssue> = Vec::new();
        if self.display_name.trim().is_empty() {
            issues.push(ValidationIssue::new(
                "displayName",
                "empty",
                "displayName is required",
            ));
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}
