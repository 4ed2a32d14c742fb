use serde::{Deserialize, Serialize};

use chamba_core::{Feedback, GeoPoint, Job, JobStatus, PaymentStatus};

/// Response DTO for jobs - uses camelCase for JSON serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: String,
    pub employer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_worker_id: Option<String>,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub location: GeoPoint,
    pub budget: f64,
    pub final_cost: f64,
    pub status: JobStatus,
    pub applicants: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_feedback: Option<FeedbackView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_feedback: Option<FeedbackView>,
    pub payment_status: PaymentStatus,
    pub payment_amount: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackView {
    pub comment: String,
    pub rating: u8,
    pub created_at: String,
}

impl From<Feedback> for FeedbackView {
    fn from(feedback: Feedback) -> Self {
        Self {
            comment: feedback.comment,
            rating: feedback.rating,
            created_at: feedback.created_at.to_rfc3339(),
        }
    }
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            id: job.id.to_string(),
            employer_id: job.employer_id.to_string(),
            assigned_worker_id: job.assigned_worker_id.map(|u| u.to_string()),
            title: job.title,
            description: job.description,
            tags: job.tags,
            location: job.location,
            budget: job.budget,
            final_cost: job.final_cost,
            status: job.status,
            applicants: job.applicants.iter().map(|u| u.to_string()).collect(),
            employer_feedback: job.employer_feedback.map(Into::into),
            worker_feedback: job.worker_feedback.map(Into::into),
            payment_status: job.payment_status,
            payment_amount: job.payment_amount,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobDto {
    pub employer_id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub location: GeoPoint,
    pub budget: f64,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyDto {
    pub applicant_id: String,
    pub proposal: Option<String>,
    pub proposed_price: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDto {
    pub role: String,
    pub comment: String,
    pub rating: u8,
}
