//! Row codec and hand-written queries for the `jobs` table.
//!
//! Collection-valued fields (tags, applicants, feedback records) are stored
//! as JSON text columns; the location is flattened into `lon`/`lat` so the
//! bounding-box prefilter can use the `(lat, lon)` index.

use chrono::{DateTime, Utc};
use sqlx::Executor;
use uuid::Uuid;

use chamba_core::{
    Feedback, FeedbackRole, GeoPoint, Job, JobPatch, JobStatus, PaymentStatus, UpdateGuard,
};

use crate::DbBackend;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct JobsRow {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub assigned_worker_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub tags: String,
    pub lon: f64,
    pub lat: f64,
    pub budget: f64,
    pub final_cost: f64,
    pub status: String,
    pub applicants: String,
    pub employer_feedback: Option<String>,
    pub worker_feedback: Option<String>,
    pub payment_status: String,
    pub payment_amount: f64,
    pub payment_intent: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub(crate) fn status_to_str(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Open => "open",
        JobStatus::InProgress => "in_progress",
        JobStatus::Completed => "completed",
        JobStatus::Cancelled => "cancelled",
    }
}

fn status_from_str(s: &str) -> Result<JobStatus, anyhow::Error> {
    match s {
        "open" => Ok(JobStatus::Open),
        "in_progress" => Ok(JobStatus::InProgress),
        "completed" => Ok(JobStatus::Completed),
        "cancelled" => Ok(JobStatus::Cancelled),
        other => Err(anyhow::anyhow!("unknown job status '{other}'")),
    }
}

pub(crate) fn payment_status_to_str(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "pending",
        PaymentStatus::Paid => "paid",
        PaymentStatus::Released => "released",
    }
}

fn payment_status_from_str(s: &str) -> Result<PaymentStatus, anyhow::Error> {
    match s {
        "pending" => Ok(PaymentStatus::Pending),
        "paid" => Ok(PaymentStatus::Paid),
        "released" => Ok(PaymentStatus::Released),
        other => Err(anyhow::anyhow!("unknown payment status '{other}'")),
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, anyhow::Error> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

impl JobsRow {
    pub fn from_job(job: &Job) -> Result<Self, anyhow::Error> {
        Ok(Self {
            id: job.id,
            employer_id: job.employer_id,
            assigned_worker_id: job.assigned_worker_id,
            title: job.title.clone(),
            description: job.description.clone(),
            tags: serde_json::to_string(&job.tags)?,
            lon: job.location.lon,
            lat: job.location.lat,
            budget: job.budget,
            final_cost: job.final_cost,
            status: status_to_str(job.status).to_string(),
            applicants: serde_json::to_string(&job.applicants)?,
            employer_feedback: job
                .employer_feedback
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            worker_feedback: job
                .worker_feedback
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            payment_status: payment_status_to_str(job.payment_status).to_string(),
            payment_amount: job.payment_amount,
            payment_intent: job.payment_intent.clone(),
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        })
    }

    pub fn into_job(self) -> Result<Job, anyhow::Error> {
        Ok(Job {
            id: self.id,
            employer_id: self.employer_id,
            assigned_worker_id: self.assigned_worker_id,
            title: self.title,
            description: self.description,
            tags: serde_json::from_str(&self.tags)?,
            location: GeoPoint::new(self.lon, self.lat),
            budget: self.budget,
            final_cost: self.final_cost,
            status: status_from_str(&self.status)?,
            applicants: serde_json::from_str(&self.applicants)?,
            employer_feedback: self
                .employer_feedback
                .as_deref()
                .map(serde_json::from_str::<Feedback>)
                .transpose()?,
            worker_feedback: self
                .worker_feedback
                .as_deref()
                .map(serde_json::from_str::<Feedback>)
                .transpose()?,
            payment_status: payment_status_from_str(&self.payment_status)?,
            payment_amount: self.payment_amount,
            payment_intent: self.payment_intent,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

const ALL_COLUMNS: &str = "id, employer_id, assigned_worker_id, title, description, tags, \
     lon, lat, budget, final_cost, status, applicants, employer_feedback, worker_feedback, \
     payment_status, payment_amount, payment_intent, created_at, updated_at";

pub async fn insert_job<'e, E>(executor: E, row: &JobsRow) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query(
        "INSERT INTO jobs (id, employer_id, assigned_worker_id, title, description, tags, \
         lon, lat, budget, final_cost, status, applicants, employer_feedback, worker_feedback, \
         payment_status, payment_amount, payment_intent, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(row.id)
    .bind(row.employer_id)
    .bind(row.assigned_worker_id)
    .bind(&row.title)
    .bind(&row.description)
    .bind(&row.tags)
    .bind(row.lon)
    .bind(row.lat)
    .bind(row.budget)
    .bind(row.final_cost)
    .bind(&row.status)
    .bind(&row.applicants)
    .bind(&row.employer_feedback)
    .bind(&row.worker_feedback)
    .bind(&row.payment_status)
    .bind(row.payment_amount)
    .bind(&row.payment_intent)
    .bind(&row.created_at)
    .bind(&row.updated_at)
    .execute(executor)
    .await
    .map(|_| ())
}

pub async fn find_by_primary_key<'e, E>(
    executor: E,
    job_id: &Uuid,
) -> Result<Option<JobsRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as::<_, JobsRow>(&format!("SELECT {ALL_COLUMNS} FROM jobs WHERE id = ?"))
        .bind(job_id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_employer<'e, E>(
    executor: E,
    employer_id: &Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<JobsRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query_as::<_, JobsRow>(&format!(
        "SELECT {ALL_COLUMNS} FROM jobs WHERE employer_id = ? ORDER BY created_at LIMIT ? OFFSET ?"
    ))
    .bind(employer_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await
}

/// Bounding-box prefilter; the exact spherical-cap predicate is applied by
/// the caller on the decoded rows.
pub async fn find_in_bounding_box<'e, E>(
    executor: E,
    min: GeoPoint,
    max: GeoPoint,
) -> Result<Vec<JobsRow>, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    // A box that crosses the antimeridian arrives wrapped (min.lon > max.lon)
    // and matches the two longitude ranges on either side of it.
    let lon_clause = if min.lon <= max.lon {
        "lon BETWEEN ? AND ?"
    } else {
        "(lon >= ? OR lon <= ?)"
    };
    sqlx::query_as::<_, JobsRow>(&format!(
        "SELECT {ALL_COLUMNS} FROM jobs \
         WHERE lat BETWEEN ? AND ? AND {lon_clause} ORDER BY created_at"
    ))
    .bind(min.lat)
    .bind(max.lat)
    .bind(min.lon)
    .bind(max.lon)
    .fetch_all(executor)
    .await
}

pub async fn set_applicants<'e, E>(
    executor: E,
    job_id: &Uuid,
    applicants_json: &str,
    updated_at: &str,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    sqlx::query("UPDATE jobs SET applicants = ?, updated_at = ? WHERE id = ?")
        .bind(applicants_json)
        .bind(updated_at)
        .bind(job_id)
        .execute(executor)
        .await
        .map(|r| r.rows_affected())
}

/// Single-row conditional update: the guard conditions are evaluated in the
/// WHERE clause so the match-and-set is atomic at the database.
///
/// `JobPatch::AddApplicant` is not handled here; the applicant list is a
/// JSON column updated through [`set_applicants`] after a read-modify-write
/// in the store (the add-to-set write is unconditional by design).
pub async fn update_guarded<'e, E>(
    executor: E,
    job_id: &Uuid,
    guard: &UpdateGuard,
    patch: &JobPatch,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = DbBackend>,
{
    let set_clause = match patch {
        JobPatch::Assign(_) => "assigned_worker_id = ?, status = ?, updated_at = ?",
        JobPatch::Feedback(p) => match p.role {
            FeedbackRole::Employer => "employer_feedback = ?, updated_at = ?",
            FeedbackRole::Worker => "worker_feedback = ?, updated_at = ?",
        },
        JobPatch::Complete(_) => "status = ?, updated_at = ?",
        JobPatch::Payment(_) => "payment_status = ?, payment_amount = ?, updated_at = ?",
        JobPatch::AddApplicant { .. } => {
            return Err(sqlx::Error::Protocol(
                "AddApplicant must go through set_applicants".into(),
            ))
        }
    };

    let mut sql = format!("UPDATE jobs SET {set_clause} WHERE id = ?");
    if guard.employer_id.is_some() {
        sql.push_str(" AND employer_id = ?");
    }
    if guard.status_not.is_some() {
        sql.push_str(" AND status != ?");
    }
    if guard.payment_status.is_some() {
        sql.push_str(" AND payment_status = ?");
    }

    let mut query = sqlx::query(&sql);
    query = match patch {
        JobPatch::Assign(p) => query
            .bind(p.worker_id)
            .bind(status_to_str(p.status))
            .bind(p.updated_at.to_rfc3339()),
        JobPatch::Feedback(p) => {
            let json = serde_json::to_string(&p.feedback)
                .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
            query.bind(json).bind(p.updated_at.to_rfc3339())
        }
        JobPatch::Complete(p) => query
            .bind(status_to_str(p.status))
            .bind(p.updated_at.to_rfc3339()),
        JobPatch::Payment(p) => query
            .bind(payment_status_to_str(p.payment_status))
            .bind(p.payment_amount)
            .bind(p.updated_at.to_rfc3339()),
        JobPatch::AddApplicant { .. } => unreachable!(),
    };
    query = query.bind(job_id);
    if let Some(employer) = guard.employer_id {
        query = query.bind(employer);
    }
    if let Some(status) = guard.status_not {
        query = query.bind(status_to_str(status));
    }
    if let Some(payment) = guard.payment_status {
        query = query.bind(payment_status_to_str(payment));
    }

    query
        .execute(executor)
        .await
        .map(|r| r.rows_affected())
}
