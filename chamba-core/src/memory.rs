//! In-memory port implementations.
//!
//! These back the workflow unit tests and let the HTTP layer be exercised
//! without provisioning a database. The store keeps the same atomicity
//! contract as the SQL implementation: guard evaluation and patch application
//! happen under one write lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::geo;
use crate::store::{JobPatch, JobStore, PageRequest, UpdateGuard, UserDirectory};
use crate::types::{GeoPoint, Job};

/// Jobs held in insertion order so pagination is deterministic.
#[derive(Debug, Default)]
struct MemoryJobState {
    order: Vec<Uuid>,
    jobs: HashMap<Uuid, Job>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryJobStore {
    state: Arc<RwLock<MemoryJobState>>,
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, job: &Job) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.order.push(job.id);
        state.jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let state = self.state.read().await;
        Ok(state.jobs.get(&id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        guard: UpdateGuard,
        patch: JobPatch,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        match state.jobs.get_mut(&id) {
            Some(job) if guard.matches(job) => {
                patch.apply(job);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn find_by_employer(
        &self,
        employer_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Job>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.jobs.get(id))
            .filter(|job| job.employer_id == employer_id)
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .cloned()
            .collect())
    }

    async fn find_by_tags_near(
        &self,
        tags: &[String],
        center: GeoPoint,
        radius_m: f64,
        page: PageRequest,
    ) -> Result<Vec<Job>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.jobs.get(id))
            .filter(|job| {
                job.tags_intersect(tags) && geo::within_cap(center, radius_m, job.location)
            })
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .cloned()
            .collect())
    }
}

/// One directory entry; mirrors the fields the workflow reads.
#[derive(Debug, Clone)]
pub struct MemoryUser {
    pub id: Uuid,
    pub display_name: String,
    pub banned: bool,
    pub prime_until: Option<DateTime<Utc>>,
    pub completed_jobs: i64,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryUserDirectory {
    users: Arc<RwLock<HashMap<Uuid, MemoryUser>>>,
}

impl MemoryUserDirectory {
    /// Register a plain user and return its id.
    pub async fn add_user(&self, display_name: impl Into<String>) -> Uuid {
        let user = MemoryUser {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            banned: false,
            prime_until: None,
            completed_jobs: 0,
        };
        let id = user.id;
        self.users.write().await.insert(id, user);
        id
    }

    pub async fn set_banned(&self, id: Uuid, banned: bool) {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.banned = banned;
        }
    }

    pub async fn set_prime_until(&self, id: Uuid, until: Option<DateTime<Utc>>) {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.prime_until = until;
        }
    }

    pub async fn set_completed_jobs(&self, id: Uuid, count: i64) {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.completed_jobs = count;
        }
    }

    pub async fn completed_jobs(&self, id: Uuid) -> Option<i64> {
        self.users.read().await.get(&id).map(|u| u.completed_jobs)
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn is_banned(&self, user_id: Uuid) -> Result<Option<bool>, StoreError> {
        Ok(self.users.read().await.get(&user_id).map(|u| u.banned))
    }

    async fn is_prime_active(&self, user_id: Uuid) -> Result<Option<bool>, StoreError> {
        Ok(self.users.read().await.get(&user_id).map(|u| {
            u.prime_until
                .map(|until| until > Utc::now())
                .unwrap_or(false)
        }))
    }

    async fn completed_job_count(&self, user_id: Uuid) -> Result<Option<i64>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .get(&user_id)
            .map(|u| u.completed_jobs))
    }

    async fn increment_completed_jobs(&self, user_id: Uuid) -> Result<(), StoreError> {
        match self.users.write().await.get_mut(&user_id) {
            Some(user) => {
                user.completed_jobs += 1;
                Ok(())
            }
            None => Err(StoreError::new(anyhow::anyhow!(
                "user {user_id} missing from directory"
            ))),
        }
    }
}
