//! Storage and user-lookup ports consumed by the workflow.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{
    AssignPatch, CompletePatch, FeedbackPatch, GeoPoint, Job, JobStatus, PaymentPatch,
    PaymentStatus,
};

/// Page-based pagination; ordering is whatever the storage naturally returns.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    /// 1-based page index.
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    #[inline]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size,
        }
    }

    /// Number of records to skip before this page. A page of 0 built without
    /// `new` reads the same as page 1.
    #[inline]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// Match conditions for a conditional update. An empty guard matches the row
/// unconditionally (last-write-wins).
#[derive(Debug, Clone, Default)]
pub struct UpdateGuard {
    /// Require the job to belong to this employer.
    pub employer_id: Option<Uuid>,
    /// Require the status to differ from this one.
    pub status_not: Option<JobStatus>,
    /// Require the payment status to equal this one.
    pub payment_status: Option<PaymentStatus>,
}

impl UpdateGuard {
    /// Whether the given job satisfies every condition in the guard.
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(employer) = self.employer_id {
            if job.employer_id != employer {
                return false;
            }
        }
        if let Some(status) = self.status_not {
            if job.status == status {
                return false;
            }
        }
        if let Some(payment) = self.payment_status {
            if job.payment_status != payment {
                return false;
            }
        }
        true
    }
}

/// One typed mutation against a single job record.
#[derive(Debug, Clone)]
pub enum JobPatch {
    Assign(AssignPatch),
    /// Add-to-set: a worker id joining the applicant list.
    AddApplicant {
        worker_id: Uuid,
        updated_at: chrono::DateTime<chrono::Utc>,
    },
    Feedback(FeedbackPatch),
    Complete(CompletePatch),
    Payment(PaymentPatch),
}

impl JobPatch {
    /// Apply this patch to an owned job record.
    ///
    /// Both the in-memory store and the SQL store funnel through this so the
    /// write semantics cannot drift between backends.
    pub fn apply(&self, job: &mut Job) {
        match self {
            Self::Assign(patch) => {
                job.assigned_worker_id = Some(patch.worker_id);
                job.status = patch.status;
                job.updated_at = patch.updated_at;
            }
            Self::AddApplicant {
                worker_id,
                updated_at,
            } => {
                if !job.applicants.contains(worker_id) {
                    job.applicants.push(*worker_id);
                }
                job.updated_at = *updated_at;
            }
            Self::Feedback(patch) => {
                let slot = match patch.role {
                    crate::types::FeedbackRole::Employer => &mut job.employer_feedback,
                    crate::types::FeedbackRole::Worker => &mut job.worker_feedback,
                };
                *slot = Some(patch.feedback.clone());
                job.updated_at = patch.updated_at;
            }
            Self::Complete(patch) => {
                job.status = patch.status;
                job.updated_at = patch.updated_at;
            }
            Self::Payment(patch) => {
                job.payment_status = patch.payment_status;
                job.payment_amount = patch.payment_amount;
                job.updated_at = patch.updated_at;
            }
        }
    }
}

/// Persistence contract over job records.
///
/// `update` must evaluate the guard and apply the patch atomically with
/// respect to other updates of the same record; that single-record
/// compare-and-set is the only concurrency-safety mechanism the workflow
/// relies on.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn insert(&self, job: &Job) -> Result<(), StoreError>;

    async fn fetch(&self, id: Uuid) -> Result<Option<Job>, StoreError>;

    /// Conditional update: returns the number of matched records (0 or 1) so
    /// callers can detect a no-op without a second read.
    async fn update(
        &self,
        id: Uuid,
        guard: UpdateGuard,
        patch: JobPatch,
    ) -> Result<u64, StoreError>;

    async fn find_by_employer(
        &self,
        employer_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Job>, StoreError>;

    /// Jobs whose tags intersect `tags` and whose location lies within
    /// `radius_m` meters of `center`, great-circle distance.
    async fn find_by_tags_near(
        &self,
        tags: &[String],
        center: GeoPoint,
        radius_m: f64,
        page: PageRequest,
    ) -> Result<Vec<Job>, StoreError>;
}

/// Minimal user capability the workflow consumes.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns None when the user does not exist.
    async fn is_banned(&self, user_id: Uuid) -> Result<Option<bool>, StoreError>;

    async fn is_prime_active(&self, user_id: Uuid) -> Result<Option<bool>, StoreError>;

    async fn completed_job_count(&self, user_id: Uuid) -> Result<Option<i64>, StoreError>;

    async fn increment_completed_jobs(&self, user_id: Uuid) -> Result<(), StoreError>;
}
