//! The job state machine and its business rules.
//!
//! Every operation is a thin, non-resilient wrapper over the storage port:
//! errors propagate immediately, there are no retries, and apart from the
//! conditional completion write there is no protection against concurrent
//! writers (last write wins).

use chrono::Utc;
use uuid::Uuid;

use crate::error::{ConflictKind, WorkflowError};
use crate::store::{JobPatch, JobStore, PageRequest, UpdateGuard, UserDirectory};
use crate::types::{
    AssignPatch, CompletePatch, Feedback, FeedbackPatch, FeedbackRole, GeoPoint, Job, JobStatus,
    NewJob, PaymentPatch, PaymentStatus,
};
use crate::validation::{validate_new_job, validate_rating};

/// Workers without an active Prime subscription may hold at most this many
/// completed jobs before further applications are rejected.
pub const FREE_TIER_COMPLETED_JOB_LIMIT: i64 = 2;

/// Coordinates job records and user lookups; the only component with logic.
#[derive(Debug, Clone)]
pub struct JobWorkflow<S, U> {
    store: S,
    users: U,
}

impl<S: JobStore, U: UserDirectory> JobWorkflow<S, U> {
    pub fn new(store: S, users: U) -> Self {
        Self { store, users }
    }

    /// Post a new job. The employer must exist and must not be banned.
    pub async fn create_job(&self, input: NewJob) -> Result<Job, WorkflowError> {
        validate_new_job(&input).map_err(WorkflowError::Validation)?;

        match self.users.is_banned(input.employer_id).await? {
            None => return Err(WorkflowError::NotFound("employer")),
            Some(true) => {
                return Err(WorkflowError::forbidden("employer account is banned"));
            }
            Some(false) => {}
        }

        let job = Job::open(input);
        self.store.insert(&job).await?;
        tracing::info!(job_id = %job.id, employer_id = %job.employer_id, "job posted");
        Ok(job)
    }

    pub async fn get_job(&self, job_id: Uuid) -> Result<Job, WorkflowError> {
        self.store
            .fetch(job_id)
            .await?
            .ok_or(WorkflowError::NotFound("job"))
    }

    pub async fn list_jobs_by_employer(
        &self,
        employer_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Job>, WorkflowError> {
        Ok(self.store.find_by_employer(employer_id, page).await?)
    }

    /// Express interest in a job. Set semantics: reapplying is a no-op.
    ///
    /// Eligibility: an active Prime subscription lifts the free-tier cap of
    /// [`FREE_TIER_COMPLETED_JOB_LIMIT`] completed jobs.
    pub async fn apply_to_job(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
        proposal: Option<String>,
        proposed_price: Option<f64>,
    ) -> Result<(), WorkflowError> {
        let job = self.get_job(job_id).await?;
        if job.employer_id == applicant_id {
            return Err(WorkflowError::forbidden(
                "employers cannot apply to their own job",
            ));
        }

        let prime = self
            .users
            .is_prime_active(applicant_id)
            .await?
            .ok_or(WorkflowError::NotFound("applicant"))?;
        if !prime {
            let completed = self
                .users
                .completed_job_count(applicant_id)
                .await?
                .ok_or(WorkflowError::NotFound("applicant"))?;
            if completed >= FREE_TIER_COMPLETED_JOB_LIMIT {
                return Err(WorkflowError::forbidden(
                    "completed-job limit reached; a Prime subscription is required to keep applying",
                ));
            }
        }

        tracing::debug!(
            job_id = %job_id,
            applicant_id = %applicant_id,
            proposal = proposal.as_deref().unwrap_or(""),
            proposed_price,
            "application received"
        );

        let matched = self
            .store
            .update(
                job_id,
                UpdateGuard::default(),
                JobPatch::AddApplicant {
                    worker_id: applicant_id,
                    updated_at: Utc::now(),
                },
            )
            .await?;
        if matched == 0 {
            // The job disappeared between the read and the write.
            return Err(WorkflowError::NotFound("job"));
        }
        Ok(())
    }

    /// Choose a worker: sets the assignment and moves the job to InProgress.
    ///
    /// Deliberately unconditional: no applicant-membership check and no guard
    /// against an already assigned or completed job.
    pub async fn assign_job(&self, job_id: Uuid, worker_id: Uuid) -> Result<(), WorkflowError> {
        let matched = self
            .store
            .update(
                job_id,
                UpdateGuard::default(),
                JobPatch::Assign(AssignPatch::now(worker_id)),
            )
            .await?;
        if matched == 0 {
            return Err(WorkflowError::NotFound("job"));
        }
        tracing::info!(job_id = %job_id, worker_id = %worker_id, "worker assigned");
        Ok(())
    }

    /// Swap the assigned worker; the status stays at InProgress.
    pub async fn reassign_job(
        &self,
        job_id: Uuid,
        new_worker_id: Uuid,
    ) -> Result<(), WorkflowError> {
        let matched = self
            .store
            .update(
                job_id,
                UpdateGuard::default(),
                JobPatch::Assign(AssignPatch::now(new_worker_id)),
            )
            .await?;
        if matched == 0 {
            return Err(WorkflowError::NotFound("job"));
        }
        tracing::info!(job_id = %job_id, worker_id = %new_worker_id, "worker reassigned");
        Ok(())
    }

    /// Write one of the two feedback slots with a server-assigned timestamp.
    /// Resubmission overwrites the previous record.
    pub async fn provide_feedback(
        &self,
        job_id: Uuid,
        role: FeedbackRole,
        comment: String,
        rating: u8,
    ) -> Result<(), WorkflowError> {
        validate_rating(rating).map_err(WorkflowError::Validation)?;

        let now = Utc::now();
        let matched = self
            .store
            .update(
                job_id,
                UpdateGuard::default(),
                JobPatch::Feedback(FeedbackPatch {
                    role,
                    feedback: Feedback {
                        comment,
                        rating,
                        created_at: now,
                    },
                    updated_at: now,
                }),
            )
            .await?;
        if matched == 0 {
            return Err(WorkflowError::NotFound("job"));
        }
        Ok(())
    }

    /// Mark the job completed and credit both parties.
    ///
    /// The status flip is a conditional write so two racing completion
    /// attempts resolve to exactly one winner. The two counter increments
    /// that follow are independent writes: if one fails the flip is not
    /// rolled back and the error surfaces to the caller.
    pub async fn complete_job(&self, job_id: Uuid, requester_id: Uuid) -> Result<(), WorkflowError> {
        let matched = self
            .store
            .update(
                job_id,
                UpdateGuard {
                    employer_id: Some(requester_id),
                    status_not: Some(JobStatus::Completed),
                    ..UpdateGuard::default()
                },
                JobPatch::Complete(CompletePatch::now()),
            )
            .await?;

        if matched == 0 {
            return match self.store.fetch(job_id).await? {
                None => Err(WorkflowError::NotFound("job")),
                Some(job) if job.employer_id != requester_id => {
                    Err(WorkflowError::NotFound("job"))
                }
                Some(_) => Err(WorkflowError::Conflict(ConflictKind::AlreadyCompleted)),
            };
        }

        let job = self.get_job(job_id).await?;
        self.users.increment_completed_jobs(job.employer_id).await?;
        if let Some(worker_id) = job.assigned_worker_id {
            self.users.increment_completed_jobs(worker_id).await?;
        } else {
            tracing::warn!(job_id = %job_id, "job completed without an assigned worker");
        }
        tracing::info!(job_id = %job_id, "job completed");
        Ok(())
    }

    /// Record a payment: pending -> paid, stores the amount.
    pub async fn register_payment(&self, job_id: Uuid, amount: f64) -> Result<(), WorkflowError> {
        let matched = self
            .store
            .update(
                job_id,
                UpdateGuard {
                    payment_status: Some(PaymentStatus::Pending),
                    ..UpdateGuard::default()
                },
                JobPatch::Payment(PaymentPatch {
                    payment_status: PaymentStatus::Paid,
                    payment_amount: amount,
                    updated_at: Utc::now(),
                }),
            )
            .await?;

        if matched == 0 {
            return match self.store.fetch(job_id).await? {
                None => Err(WorkflowError::NotFound("job")),
                Some(job) if job.payment_status == PaymentStatus::Released => {
                    Err(WorkflowError::Conflict(ConflictKind::AlreadyReleased))
                }
                Some(_) => Err(WorkflowError::Conflict(ConflictKind::AlreadyPaid)),
            };
        }
        tracing::info!(job_id = %job_id, amount, "payment registered");
        Ok(())
    }

    /// Release a previously registered payment: paid -> released.
    pub async fn release_payment(&self, job_id: Uuid) -> Result<(), WorkflowError> {
        let job = self.get_job(job_id).await?;
        let matched = self
            .store
            .update(
                job_id,
                UpdateGuard {
                    payment_status: Some(PaymentStatus::Paid),
                    ..UpdateGuard::default()
                },
                JobPatch::Payment(PaymentPatch {
                    payment_status: PaymentStatus::Released,
                    payment_amount: job.payment_amount,
                    updated_at: Utc::now(),
                }),
            )
            .await?;

        if matched == 0 {
            return match self.store.fetch(job_id).await? {
                None => Err(WorkflowError::NotFound("job")),
                Some(job) if job.payment_status == PaymentStatus::Pending => {
                    Err(WorkflowError::Conflict(ConflictKind::NotPaid))
                }
                Some(_) => Err(WorkflowError::Conflict(ConflictKind::AlreadyReleased)),
            };
        }
        tracing::info!(job_id = %job_id, "payment released");
        Ok(())
    }

    /// Geo-cap search: jobs with intersecting tags within `radius_m` meters
    /// of the center. Storage order, no distance sort.
    pub async fn find_jobs(
        &self,
        tags: &[String],
        center: GeoPoint,
        radius_m: f64,
        page: PageRequest,
    ) -> Result<Vec<Job>, WorkflowError> {
        if !center.is_valid() || !(radius_m >= 0.0) {
            return Err(WorkflowError::Validation(vec![
                crate::validation::ValidationIssue::new(
                    "location",
                    "out_of_range",
                    "search center or radius is out of range",
                ),
            ]));
        }
        Ok(self
            .store
            .find_by_tags_near(tags, center, radius_m, page)
            .await?)
    }
}
