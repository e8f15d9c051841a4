use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Result as SqlxResult;
use tracing::debug;

use crate::build_queue::{
    deadline, holds_claim, status_after_completion, BuildQueue, SITE_TASK_KEY,
};
use crate::db::Db;
use crate::error::StoreError;
use crate::models::{BuildTaskRow, BuildTaskStatus};

/// Postgres-backed [`BuildQueue`] over the `build_tasks` table.
#[derive(Debug, Clone)]
pub struct BuildTaskRepo {
    pub pool: Db,
    task_key: String,
    lease: Option<Duration>,
}

impl BuildTaskRepo {
    pub fn new(pool: Db) -> Self {
        Self {
            pool,
            task_key: SITE_TASK_KEY.to_string(),
            lease: None,
        }
    }

    /// Stamp claims with a lease so a crashed worker's claim can be taken over.
    pub fn with_lease(mut self, lease: Option<Duration>) -> Self {
        self.lease = lease;
        self
    }

    /// Operate on a different logical task key (isolated test runs).
    pub fn with_task_key(mut self, task_key: impl Into<String>) -> Self {
        self.task_key = task_key.into();
        self
    }

    pub fn task_key(&self) -> &str {
        &self.task_key
    }

    /// Get the task row for this repo's key
    pub async fn get(&self) -> SqlxResult<Option<BuildTaskRow>> {
        sqlx::query_as::<_, BuildTaskRow>(
            "SELECT id, task_key, status, next_run_at, last_event_at, claimed_at, lease_expires_at,
                    created_at, updated_at
             FROM build_tasks WHERE task_key = $1",
        )
        .bind(&self.task_key)
        .fetch_optional(&self.pool)
        .await
    }
}

#[async_trait]
impl BuildQueue for BuildTaskRepo {
    async fn enqueue_at(
        &self,
        now: DateTime<Utc>,
        debounce: Duration,
    ) -> Result<BuildTaskRow, StoreError> {
        // A running task keeps its status; the run's completion notices the
        // newer last_event_at / next_run_at and leaves it pending.
        let task = sqlx::query_as::<_, BuildTaskRow>(
            r#"
            INSERT INTO build_tasks (task_key, status, next_run_at, last_event_at)
            VALUES ($1, 'pending', $2, $3)
            ON CONFLICT (task_key) DO UPDATE
            SET status = CASE
                    WHEN build_tasks.status = 'running' THEN build_tasks.status
                    ELSE 'pending'::build_task_status
                END,
                next_run_at = EXCLUDED.next_run_at,
                last_event_at = EXCLUDED.last_event_at,
                updated_at = NOW()
            RETURNING id, task_key, status, next_run_at, last_event_at, claimed_at, lease_expires_at,
                      created_at, updated_at
            "#,
        )
        .bind(&self.task_key)
        .bind(deadline(now, debounce))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(
            status = %task.status,
            next_run_at = ?task.next_run_at,
            "build task enqueued"
        );
        Ok(task)
    }

    async fn claim(&self, now: DateTime<Utc>) -> Result<Option<BuildTaskRow>, StoreError> {
        // Single conditional UPDATE: concurrent claimers serialize on the row
        // lock and the loser re-evaluates the predicate against 'running'.
        let lease_expires_at = self.lease.map(|lease| deadline(now, lease));

        let task = sqlx::query_as::<_, BuildTaskRow>(
            r#"
            UPDATE build_tasks
            SET status = 'running',
                claimed_at = $2,
                lease_expires_at = $3,
                updated_at = NOW()
            WHERE task_key = $1
              AND (
                    (status = 'pending' AND next_run_at IS NOT NULL AND next_run_at <= $2)
                 OR (status = 'running' AND lease_expires_at IS NOT NULL AND lease_expires_at <= $2)
              )
            RETURNING id, task_key, status, next_run_at, last_event_at, claimed_at, lease_expires_at,
                      created_at, updated_at
            "#,
        )
        .bind(&self.task_key)
        .bind(now)
        .bind(lease_expires_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn complete_at(
        &self,
        claim: &BuildTaskRow,
        now: DateTime<Utc>,
    ) -> Result<Option<BuildTaskRow>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, BuildTaskRow>(
            "SELECT id, task_key, status, next_run_at, last_event_at, claimed_at, lease_expires_at,
                    created_at, updated_at
             FROM build_tasks WHERE id = $1
             FOR UPDATE",
        )
        .bind(claim.id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current.filter(|task| holds_claim(task, claim)) else {
            tx.commit().await?;
            debug!(task_id = %claim.id, "build claim no longer held, completion ignored");
            return Ok(None);
        };

        let status = status_after_completion(&current, now);
        let task = sqlx::query_as::<_, BuildTaskRow>(
            r#"
            UPDATE build_tasks
            SET status = $2,
                next_run_at = CASE WHEN $2 = 'idle'::build_task_status THEN NULL ELSE next_run_at END,
                claimed_at = NULL,
                lease_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, task_key, status, next_run_at, last_event_at, claimed_at, lease_expires_at,
                      created_at, updated_at
            "#,
        )
        .bind(claim.id)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if status == BuildTaskStatus::Pending {
            debug!(next_run_at = ?task.next_run_at, "build requested during run, task stays pending");
        }
        Ok(Some(task))
    }

    async fn reschedule_at(
        &self,
        claim: &BuildTaskRow,
        now: DateTime<Utc>,
        delay: Duration,
    ) -> Result<Option<BuildTaskRow>, StoreError> {
        // claimed_at = NULL never matches, so an unclaimed row is left alone.
        let task = sqlx::query_as::<_, BuildTaskRow>(
            r#"
            UPDATE build_tasks
            SET status = 'pending',
                next_run_at = $2,
                claimed_at = NULL,
                lease_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1 AND status = 'running' AND claimed_at = $3
            RETURNING id, task_key, status, next_run_at, last_event_at, claimed_at, lease_expires_at,
                      created_at, updated_at
            "#,
        )
        .bind(claim.id)
        .bind(deadline(now, delay))
        .bind(claim.claimed_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn current(&self) -> Result<Option<BuildTaskRow>, StoreError> {
        Ok(self.get().await?)
    }
}
