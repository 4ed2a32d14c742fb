//! Job lifecycle core for the chamba marketplace backend.
//!
//! This crate holds the domain model and the assignment workflow: employers
//! post jobs, workers apply, the employer assigns and eventually completes,
//! both sides leave feedback, and payment status is tracked. Storage and user
//! lookups are consumed through ports so the workflow can be exercised against
//! the in-memory implementations in [`memory`] without provisioning a real
//! database.
//!
//! # Architecture
//!
//! - [`JobWorkflow`] - The workflow service enforcing the job state machine
//! - [`JobStore`] - Persistence port for job records
//! - [`UserDirectory`] - Lookup port for ban/prime/counter state
//! - [`Job`] - The central entity, see [`types`]
//!
//! # Example
//!
//! ```rust,no_run
//! use chamba_core::{JobWorkflow, NewJob, GeoPoint};
//! use chamba_core::memory::{MemoryJobStore, MemoryUserDirectory};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() {
//!     let users = MemoryUserDirectory::default();
//!     let employer = users.add_user("maria").await;
//!     let workflow = JobWorkflow::new(MemoryJobStore::default(), users);
//!
//!     let job = workflow
//!         .create_job(NewJob {
//!             employer_id: employer,
//!             title: "Fix kitchen sink".into(),
//!             description: "Leaking trap under the sink, parts provided.".into(),
//!             tags: vec!["plumbing".into()],
//!             location: GeoPoint::new(-99.13, 19.43),
//!             budget: 100.0,
//!         })
//!         .await
//!         .unwrap();
//!     println!("posted job {}", job.id);
//! }
//! ```

mod error;
pub mod geo;
pub mod memory;
mod store;
mod types;
mod validation;
mod workflow;

pub use error::{ConflictKind, StoreError, WorkflowError};
pub use store::{JobPatch, JobStore, PageRequest, UpdateGuard, UserDirectory};
pub use types::{
    AssignPatch, CompletePatch, Feedback, FeedbackPatch, FeedbackRole, GeoPoint, Job, JobStatus,
    NewJob, PaymentPatch, PaymentStatus,
};
pub use validation::ValidationIssue;
pub use workflow::{JobWorkflow, FREE_TIER_COMPLETED_JOB_LIMIT};

// Re-export async_trait for convenience when implementing the ports
pub use async_trait::async_trait;
