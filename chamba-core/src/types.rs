//! Core types for the job lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a job.
///
/// `Cancelled` is a declared state with no producing transition in this
/// workflow; it is reserved for administrative tooling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    /// Returns true if this status represents a terminal state.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Payment bookkeeping state; moves monotonically pending -> paid -> released.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Released,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Released => "released",
        })
    }
}

/// Which side of the job a feedback record came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackRole {
    Employer,
    Worker,
}

/// A rating plus comment left by either party.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub comment: String,
    pub rating: u8,
    pub created_at: DateTime<Utc>,
}

/// GeoJSON-style point: longitude first, then latitude.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Whether both coordinates fall inside their valid ranges.
    #[inline]
    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.lon) && (-90.0..=90.0).contains(&self.lat)
    }
}

/// The central entity: a posted task moving through the lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub assigned_worker_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub location: GeoPoint,
    pub budget: f64,
    pub final_cost: f64,
    pub status: JobStatus,
    pub applicants: Vec<Uuid>,
    pub employer_feedback: Option<Feedback>,
    pub worker_feedback: Option<Feedback>,
    pub payment_status: PaymentStatus,
    pub payment_amount: f64,
    pub payment_intent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Build a freshly posted job in the `Open` state.
    pub fn open(input: NewJob) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            employer_id: input.employer_id,
            assigned_worker_id: None,
            title: input.title,
            description: input.description,
            tags: input.tags,
            location: input.location,
            budget: input.budget,
            final_cost: 0.0,
            status: JobStatus::Open,
            applicants: Vec::new(),
            employer_feedback: None,
            worker_feedback: None,
            payment_status: PaymentStatus::Pending,
            payment_amount: 0.0,
            payment_intent: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given worker already applied.
    #[inline]
    pub fn has_applicant(&self, worker: Uuid) -> bool {
        self.applicants.contains(&worker)
    }

    /// Whether the tag set intersects the given query tags.
    pub fn tags_intersect(&self, query: &[String]) -> bool {
        self.tags.iter().any(|t| query.iter().any(|q| q == t))
    }
}

/// Validated input for posting a job.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub employer_id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub location: GeoPoint,
    pub budget: f64,
}

/// Typed patch: worker assignment (also used for reassignment).
#[derive(Debug, Clone)]
pub struct AssignPatch {
    pub worker_id: Uuid,
    pub status: JobStatus,
    pub updated_at: DateTime<Utc>,
}

impl AssignPatch {
    #[inline]
    pub fn now(worker_id: Uuid) -> Self {
        Self {
            worker_id,
            status: JobStatus::InProgress,
            updated_at: Utc::now(),
        }
    }
}

/// Typed patch: feedback slot write. Replaces the slot wholesale.
#[derive(Debug, Clone)]
pub struct FeedbackPatch {
    pub role: FeedbackRole,
    pub feedback: Feedback,
    pub updated_at: DateTime<Utc>,
}

/// Typed patch: the completion status flip.
#[derive(Debug, Clone)]
pub struct CompletePatch {
    pub status: JobStatus,
    pub updated_at: DateTime<Utc>,
}

impl CompletePatch {
    #[inline]
    pub fn now() -> Self {
        Self {
            status: JobStatus::Completed,
            updated_at: Utc::now(),
        }
    }
}

/// Typed patch: payment status advance.
#[derive(Debug, Clone)]
pub struct PaymentPatch {
    pub payment_status: PaymentStatus,
    pub payment_amount: f64,
    pub updated_at: DateTime<Utc>,
}
