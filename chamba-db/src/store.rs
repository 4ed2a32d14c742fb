//! SQL implementations of the chamba-core ports.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use chamba_core::geo;
use chamba_core::{
    GeoPoint, Job, JobPatch, JobStore, PageRequest, StoreError, UpdateGuard, UserDirectory,
};

use crate::{jobs, users, DbPool};

fn store_err(err: impl Into<anyhow::Error>) -> StoreError {
    StoreError::new(err.into())
}

/// Job persistence over the relational pool.
#[derive(Debug, Clone)]
pub struct SqlJobStore {
    pool: DbPool,
}

impl SqlJobStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for SqlJobStore {
    async fn insert(&self, job: &Job) -> Result<(), StoreError> {
        let row = jobs::JobsRow::from_job(job).map_err(store_err)?;
        jobs::insert_job(&self.pool, &row).await.map_err(store_err)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        let row = jobs::find_by_primary_key(&self.pool, &id)
            .await
            .map_err(store_err)?;
        row.map(|r| r.into_job().map_err(store_err)).transpose()
    }

    async fn update(
        &self,
        id: Uuid,
        guard: UpdateGuard,
        patch: JobPatch,
    ) -> Result<u64, StoreError> {
        match &patch {
            JobPatch::AddApplicant {
                worker_id,
                updated_at,
            } => {
                // Add-to-set over a JSON column: read, merge, write back.
                // Deliberately unconditional (last write wins), matching the
                // workflow's concurrency model for applications.
                let Some(job) = self.fetch(id).await? else {
                    return Ok(0);
                };
                if !guard.matches(&job) {
                    return Ok(0);
                }
                let mut applicants = job.applicants;
                if !applicants.contains(worker_id) {
                    applicants.push(*worker_id);
                }
                let json = serde_json::to_string(&applicants).map_err(store_err)?;
                jobs::set_applicants(&self.pool, &id, &json, &updated_at.to_rfc3339())
                    .await
                    .map_err(store_err)
            }
            _ => jobs::update_guarded(&self.pool, &id, &guard, &patch)
                .await
                .map_err(store_err),
        }
    }

    async fn find_by_employer(
        &self,
        employer_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Job>, StoreError> {
        let rows = jobs::find_by_employer(
            &self.pool,
            &employer_id,
            i64::from(page.page_size),
            page.offset() as i64,
        )
        .await
        .map_err(store_err)?;
        rows.into_iter()
            .map(|r| r.into_job().map_err(store_err))
            .collect()
    }

    async fn find_by_tags_near(
        &self,
        tags: &[String],
        center: GeoPoint,
        radius_m: f64,
        page: PageRequest,
    ) -> Result<Vec<Job>, StoreError> {
        // Index-backed bounding-box prefilter in SQL, exact cap and tag
        // intersection on the decoded rows. Pagination applies to the final
        // filtered sequence so page boundaries are stable.
        let (min, max) = geo::bounding_box(center, radius_m);
        let rows = jobs::find_in_bounding_box(&self.pool, min, max)
            .await
            .map_err(store_err)?;
        tracing::debug!(
            candidates = rows.len(),
            radius_m,
            "geo prefilter returned candidates"
        );

        let mut out = Vec::new();
        let mut skipped = 0u64;
        for row in rows {
            let job = row.into_job().map_err(store_err)?;
            if !job.tags_intersect(tags) || !geo::within_cap(center, radius_m, job.location) {
                continue;
            }
            if skipped < page.offset() {
                skipped += 1;
                continue;
            }
            out.push(job);
            if out.len() as u64 >= u64::from(page.page_size) {
                break;
            }
        }
        Ok(out)
    }
}

/// User lookups over the relational pool.
#[derive(Debug, Clone)]
pub struct SqlUserDirectory {
    pool: DbPool,
}

impl SqlUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for SqlUserDirectory {
    async fn is_banned(&self, user_id: Uuid) -> Result<Option<bool>, StoreError> {
        let row = users::find_by_primary_key(&self.pool, &user_id)
            .await
            .map_err(store_err)?;
        Ok(row.map(|r| r.is_banned()))
    }

    async fn is_prime_active(&self, user_id: Uuid) -> Result<Option<bool>, StoreError> {
        let row = users::find_by_primary_key(&self.pool, &user_id)
            .await
            .map_err(store_err)?;
        Ok(row.map(|r| r.prime_active_at(Utc::now())))
    }

    async fn completed_job_count(&self, user_id: Uuid) -> Result<Option<i64>, StoreError> {
        let row = users::find_by_primary_key(&self.pool, &user_id)
            .await
            .map_err(store_err)?;
        Ok(row.map(|r| r.completed_jobs))
    }

    async fn increment_completed_jobs(&self, user_id: Uuid) -> Result<(), StoreError> {
        let matched =
            users::increment_completed_jobs(&self.pool, &user_id, &Utc::now().to_rfc3339())
                .await
                .map_err(store_err)?;
        if matched == 0 {
            return Err(store_err(anyhow::anyhow!(
                "user {user_id} missing from directory"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chamba_core::{JobStatus, JobWorkflow, NewJob};
    use chamba_db_connection::{create_pool, DbConnectionConfig};

    async fn test_pool() -> DbPool {
        let pool = create_pool(&DbConnectionConfig::new("sqlite::memory:"))
            .await
            .expect("create pool");
        chamba_migrations::sqlite_migrator()
            .run(&pool)
            .await
            .expect("migrate");
        pool
    }

    async fn seed_user(pool: &DbPool, name: &str) -> Uuid {
        let now = Utc::now().to_rfc3339();
        let row = users::UsersRow {
            id: Uuid::new_v4(),
            display_name: name.into(),
            banned: 0,
            prime_until: None,
            completed_jobs: 0,
            created_at: now.clone(),
            updated_at: now,
        };
        users::insert_user(pool, &row).await.expect("insert user");
        row.id
    }

    fn new_job(employer: Uuid, lon: f64, lat: f64, tag: &str) -> NewJob {
        NewJob {
            employer_id: employer,
            title: "Hang two shelves".into(),
            description: "Two floating shelves, drywall anchors.".into(),
            tags: vec![tag.into()],
            location: GeoPoint::new(lon, lat),
            budget: 40.0,
        }
    }

    #[tokio::test]
    async fn job_round_trips_through_rows() {
        let pool = test_pool().await;
        let store = SqlJobStore::new(pool.clone());
        let employer = seed_user(&pool, "ana").await;

        let job = Job::open(new_job(employer, -99.13, 19.43, "carpentry"));
        store.insert(&job).await.unwrap();
        let fetched = store.fetch(job.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, job.title);
        assert_eq!(fetched.tags, job.tags);
        assert_eq!(fetched.status, JobStatus::Open);
        assert_eq!(fetched.location, job.location);
    }

    #[tokio::test]
    async fn guarded_completion_matches_once() {
        let pool = test_pool().await;
        let store = SqlJobStore::new(pool.clone());
        let directory = SqlUserDirectory::new(pool.clone());
        let employer = seed_user(&pool, "ana").await;
        let worker = seed_user(&pool, "luis").await;
        let workflow = JobWorkflow::new(store, directory);

        let job = workflow
            .create_job(new_job(employer, 0.0, 0.0, "carpentry"))
            .await
            .unwrap();
        workflow.assign_job(job.id, worker).await.unwrap();
        workflow.complete_job(job.id, employer).await.unwrap();

        let err = workflow.complete_job(job.id, employer).await.unwrap_err();
        assert!(err.is_conflict());

        let row = users::find_by_primary_key(&pool, &worker)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.completed_jobs, 1);
    }

    #[tokio::test]
    async fn geo_query_prefilters_and_paginates() {
        let pool = test_pool().await;
        let store = SqlJobStore::new(pool.clone());
        let employer = seed_user(&pool, "ana").await;

        for i in 0..3 {
            let job = Job::open(new_job(employer, 0.001 * f64::from(i), 0.0, "plumbing"));
            store.insert(&job).await.unwrap();
        }
        // Same tag, far away.
        store
            .insert(&Job::open(new_job(employer, 3.0, 3.0, "plumbing")))
            .await
            .unwrap();
        // In range, different tag.
        store
            .insert(&Job::open(new_job(employer, 0.0, 0.0, "tiling")))
            .await
            .unwrap();

        let center = GeoPoint::new(0.0, 0.0);
        let page1 = store
            .find_by_tags_near(&["plumbing".into()], center, 5_000.0, PageRequest::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page1.len(), 2);
        let page2 = store
            .find_by_tags_near(&["plumbing".into()], center, 5_000.0, PageRequest::new(2, 2))
            .await
            .unwrap();
        assert_eq!(page2.len(), 1);
        assert!(page1.iter().all(|j| !page2.iter().any(|o| o.id == j.id)));
    }

    #[tokio::test]
    async fn employer_listing_keeps_creation_order() {
        let pool = test_pool().await;
        let store = SqlJobStore::new(pool.clone());
        let employer = seed_user(&pool, "ana").await;

        let mut older = Job::open(new_job(employer, 0.0, 0.0, "plumbing"));
        older.created_at = "2026-01-01T00:00:00Z".parse().unwrap();
        let mut newer = Job::open(new_job(employer, 0.0, 0.0, "plumbing"));
        newer.created_at = "2026-02-01T00:00:00Z".parse().unwrap();

        // Inserted out of order; the listing still reads oldest first.
        store.insert(&newer).await.unwrap();
        store.insert(&older).await.unwrap();

        let listed = store
            .find_by_employer(employer, PageRequest::default())
            .await
            .unwrap();
        let ids: Vec<_> = listed.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![older.id, newer.id]);
    }

    #[tokio::test]
    async fn geo_query_spans_the_antimeridian() {
        let pool = test_pool().await;
        let store = SqlJobStore::new(pool.clone());
        let employer = seed_user(&pool, "ana").await;

        // ~22 km from the search center, on the far side of the date line.
        let job = Job::open(new_job(employer, -179.9, 0.0, "plumbing"));
        store.insert(&job).await.unwrap();

        let center = GeoPoint::new(179.9, 0.0);
        let found = store
            .find_by_tags_near(&["plumbing".into()], center, 50_000.0, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, job.id);
    }

    #[tokio::test]
    async fn applicants_merge_as_a_set() {
        let pool = test_pool().await;
        let store = SqlJobStore::new(pool.clone());
        let employer = seed_user(&pool, "ana").await;
        let worker = Uuid::new_v4();

        let job = Job::open(new_job(employer, 0.0, 0.0, "moving"));
        store.insert(&job).await.unwrap();

        for _ in 0..2 {
            store
                .update(
                    job.id,
                    UpdateGuard::default(),
                    JobPatch::AddApplicant {
                        worker_id: worker,
                        updated_at: Utc::now(),
                    },
                )
                .await
                .unwrap();
        }
        let fetched = store.fetch(job.id).await.unwrap().unwrap();
        assert_eq!(fetched.applicants, vec![worker]);
    }
}
