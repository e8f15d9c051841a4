//! Coordination of static-site rebuilds through a single durable task row.
//!
//! The web process calls [`BuildQueue::enqueue`] after every profile save; the
//! worker process polls [`BuildQueue::claim`] and reports back through
//! [`BuildQueue::complete`] or [`BuildQueue::reschedule`]. Both processes only
//! share the store, so every transition is expressed against the row itself:
//!
//! ```text
//!            enqueue                 claim (next_run_at <= now)
//!   idle ─────────────► pending ─────────────────────────────► running
//!    ▲                    ▲  ▲                                   │
//!    │                    │  └──── reschedule (build failed) ────┤
//!    │                    └─────── complete (new request) ───────┤
//!    └──────────────────────────── complete (nothing new) ───────┘
//! ```
//!
//! Enqueue on a running task only moves `next_run_at`; the in-flight run sees
//! the newer request when it completes.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{BuildTaskRow, BuildTaskStatus};

/// Logical key of the one task the portal uses: "the static site needs rebuilding".
pub const SITE_TASK_KEY: &str = "site";

#[async_trait]
pub trait BuildQueue: Send + Sync {
    /// Request a build no earlier than `now + debounce`, creating the task on first use.
    async fn enqueue_at(
        &self,
        now: DateTime<Utc>,
        debounce: Duration,
    ) -> Result<BuildTaskRow, StoreError>;

    /// Atomically move a due task to running. `None` when nothing is due.
    async fn claim(&self, now: DateTime<Utc>) -> Result<Option<BuildTaskRow>, StoreError>;

    /// Finish a successful run.
    ///
    /// `claim` is the row returned by [`BuildQueue::claim`]. `None` when the
    /// caller no longer holds that claim (taken over after its lease expired).
    async fn complete_at(
        &self,
        claim: &BuildTaskRow,
        now: DateTime<Utc>,
    ) -> Result<Option<BuildTaskRow>, StoreError>;

    /// Put a failed run back to pending, due at `now + delay`. Same claim
    /// check as [`BuildQueue::complete_at`].
    async fn reschedule_at(
        &self,
        claim: &BuildTaskRow,
        now: DateTime<Utc>,
        delay: Duration,
    ) -> Result<Option<BuildTaskRow>, StoreError>;

    /// Current state of the task, if it was ever enqueued.
    async fn current(&self) -> Result<Option<BuildTaskRow>, StoreError>;

    async fn enqueue(&self, debounce: Duration) -> Result<BuildTaskRow, StoreError> {
        self.enqueue_at(Utc::now(), debounce).await
    }

    async fn complete(&self, claim: &BuildTaskRow) -> Result<Option<BuildTaskRow>, StoreError> {
        self.complete_at(claim, Utc::now()).await
    }

    async fn reschedule(
        &self,
        claim: &BuildTaskRow,
        delay: Duration,
    ) -> Result<Option<BuildTaskRow>, StoreError> {
        self.reschedule_at(claim, Utc::now(), delay).await
    }
}

/// `now + delay`, saturating instead of overflowing.
pub fn deadline(now: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(delay)
        .ok()
        .and_then(|delay| now.checked_add_signed(delay))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Whether `claim(now)` may take this task.
///
/// A running task is only claimable again once its lease has expired; tasks
/// claimed without a lease stay running until completed or rescheduled.
pub fn is_claimable(task: &BuildTaskRow, now: DateTime<Utc>) -> bool {
    match task.status {
        BuildTaskStatus::Pending => task.next_run_at.is_some_and(|at| at <= now),
        BuildTaskStatus::Running => task.lease_expires_at.is_some_and(|at| at <= now),
        BuildTaskStatus::Idle => false,
    }
}

/// Whether `task` is still running under the claim the caller got from `claim`.
pub fn holds_claim(task: &BuildTaskRow, claim: &BuildTaskRow) -> bool {
    task.id == claim.id
        && task.status == BuildTaskStatus::Running
        && claim.claimed_at.is_some()
        && task.claimed_at == claim.claimed_at
}

/// Status a task takes when its run completes at `now`.
///
/// It stays pending when an enqueue arrived after the claim, either because
/// the debounce pushed `next_run_at` past `now` or because `last_event_at`
/// is newer than the claim (a zero-debounce enqueue mid-run).
pub fn status_after_completion(task: &BuildTaskRow, now: DateTime<Utc>) -> BuildTaskStatus {
    let deferred = task.next_run_at.is_some_and(|at| at > now);
    let requested_during_run = task
        .claimed_at
        .is_some_and(|claimed| task.last_event_at > claimed);

    if deferred || requested_during_run {
        BuildTaskStatus::Pending
    } else {
        BuildTaskStatus::Idle
    }
}

/// Process-local [`BuildQueue`] with the same transitions as the Postgres one.
///
/// Lets the worker and the web routes be exercised without Postgres; it
/// cannot coordinate two processes.
#[derive(Debug, Default)]
pub struct InMemoryBuildQueue {
    task: Mutex<Option<BuildTaskRow>>,
    lease: Option<Duration>,
}

impl InMemoryBuildQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lease(lease: Duration) -> Self {
        Self {
            task: Mutex::new(None),
            lease: Some(lease),
        }
    }

    pub fn snapshot(&self) -> Option<BuildTaskRow> {
        self.task.lock().clone()
    }
}

#[async_trait]
impl BuildQueue for InMemoryBuildQueue {
    async fn enqueue_at(
        &self,
        now: DateTime<Utc>,
        debounce: Duration,
    ) -> Result<BuildTaskRow, StoreError> {
        let next_run_at = deadline(now, debounce);
        let mut guard = self.task.lock();

        let task = guard.get_or_insert_with(|| BuildTaskRow {
            id: Uuid::new_v4(),
            task_key: SITE_TASK_KEY.to_string(),
            status: BuildTaskStatus::Pending,
            next_run_at: None,
            last_event_at: now,
            claimed_at: None,
            lease_expires_at: None,
            created_at: now,
            updated_at: now,
        });

        if task.status != BuildTaskStatus::Running {
            task.status = BuildTaskStatus::Pending;
        }
        task.next_run_at = Some(next_run_at);
        task.last_event_at = now;
        task.updated_at = now;

        Ok(task.clone())
    }

    async fn claim(&self, now: DateTime<Utc>) -> Result<Option<BuildTaskRow>, StoreError> {
        let mut guard = self.task.lock();
        let Some(task) = guard.as_mut() else {
            return Ok(None);
        };
        if !is_claimable(task, now) {
            return Ok(None);
        }

        task.status = BuildTaskStatus::Running;
        task.claimed_at = Some(now);
        task.lease_expires_at = self.lease.map(|lease| deadline(now, lease));
        task.updated_at = now;

        Ok(Some(task.clone()))
    }

    async fn complete_at(
        &self,
        claim: &BuildTaskRow,
        now: DateTime<Utc>,
    ) -> Result<Option<BuildTaskRow>, StoreError> {
        let mut guard = self.task.lock();
        let Some(task) = guard.as_mut().filter(|task| holds_claim(task, claim)) else {
            return Ok(None);
        };

        let status = status_after_completion(task, now);
        task.status = status;
        if status == BuildTaskStatus::Idle {
            task.next_run_at = None;
        }
        task.claimed_at = None;
        task.lease_expires_at = None;
        task.updated_at = now;

        Ok(Some(task.clone()))
    }

    async fn reschedule_at(
        &self,
        claim: &BuildTaskRow,
        now: DateTime<Utc>,
        delay: Duration,
    ) -> Result<Option<BuildTaskRow>, StoreError> {
        let mut guard = self.task.lock();
        let Some(task) = guard.as_mut().filter(|task| holds_claim(task, claim)) else {
            return Ok(None);
        };

        task.status = BuildTaskStatus::Pending;
        task.next_run_at = Some(deadline(now, delay));
        task.claimed_at = None;
        task.lease_expires_at = None;
        task.updated_at = now;

        Ok(Some(task.clone()))
    }

    async fn current(&self) -> Result<Option<BuildTaskRow>, StoreError> {
        Ok(self.snapshot())
    }
}
