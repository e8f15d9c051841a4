//! The worker process loop: nightly enqueue, claim, build, complete or retry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};
use infra::{BuildQueue, ClubSource, StoreError};
use site::{SiteError, SiteRenderer};
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::config::{WorkerConfig, DEFAULT_POLL_INTERVAL};

/// Why a claimed run did not produce a site.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("loading clubs failed: {0}")]
    Store(#[from] StoreError),

    #[error("site build failed: {0}")]
    Site(#[from] SiteError),

    #[error("build task panicked or was cancelled: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result of one queue pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Nothing was due.
    Idle,
    Built { clubs: usize, pages: usize },
    /// The run failed and was put back for `retry_at`.
    Failed { retry_at: Option<DateTime<Utc>> },
}

pub struct BuildWorker {
    queue: Arc<dyn BuildQueue>,
    clubs: Arc<dyn ClubSource>,
    renderer: Arc<dyn SiteRenderer>,
    config: WorkerConfig,
    next_nightly: DateTime<Utc>,
}

impl BuildWorker {
    pub fn new(
        queue: Arc<dyn BuildQueue>,
        clubs: Arc<dyn ClubSource>,
        renderer: Arc<dyn SiteRenderer>,
        mut config: WorkerConfig,
    ) -> Self {
        if config.poll_interval.is_zero() {
            warn!(default = ?DEFAULT_POLL_INTERVAL, "zero poll interval, using default");
            config.poll_interval = DEFAULT_POLL_INTERVAL;
        }
        let next_nightly = nightly_after(&config, Utc::now());
        Self {
            queue,
            clubs,
            renderer,
            config,
            next_nightly,
        }
    }

    /// When the next nightly rebuild will be requested.
    pub fn next_nightly(&self) -> DateTime<Utc> {
        self.next_nightly
    }

    /// Poll until Ctrl-C. A running build always finishes first.
    pub async fn run(&mut self) {
        info!(
            nightly_at = %self.config.nightly_at,
            poll_interval = ?self.config.poll_interval,
            "build worker started"
        );

        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.tick(Utc::now()).await {
                        error!(error = %err, "build queue error");
                    }
                }
                _ = &mut shutdown => {
                    info!("build worker stopping");
                    break;
                }
            }
        }
    }

    /// One iteration: request the nightly build when due, then process the queue.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<BuildOutcome, StoreError> {
        if now >= self.next_nightly {
            match self.queue.enqueue_at(now, Duration::ZERO).await {
                Ok(_) => info!("nightly build enqueued"),
                Err(err) => error!(error = %err, "nightly enqueue failed"),
            }
            self.next_nightly = nightly_after(&self.config, now + chrono::Duration::minutes(1));
        }

        self.process_queue(now).await
    }

    /// Claim the task if it is due and run one build.
    pub async fn process_queue(&self, now: DateTime<Utc>) -> Result<BuildOutcome, StoreError> {
        let Some(task) = self.queue.claim(now).await? else {
            return Ok(BuildOutcome::Idle);
        };
        info!(task_id = %task.id, next_run_at = ?task.next_run_at, "build task claimed");

        let started = Instant::now();
        let result = self.build().await;
        let finished = now + chrono::Duration::from_std(started.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());

        match result {
            Ok((clubs, pages)) => {
                if self.queue.complete_at(&task, finished).await?.is_none() {
                    warn!(task_id = %task.id, "build claim was taken over before completion");
                }
                info!(clubs, pages, "build finished ({clubs} clubs)");
                Ok(BuildOutcome::Built { clubs, pages })
            }
            Err(err) => {
                warn!(error = %err, retry_in = ?self.config.retry_delay, "build failed");
                let task = self
                    .queue
                    .reschedule_at(&task, finished, self.config.retry_delay)
                    .await?;
                Ok(BuildOutcome::Failed {
                    retry_at: task.and_then(|task| task.next_run_at),
                })
            }
        }
    }

    async fn build(&self) -> Result<(usize, usize), BuildError> {
        let clubs = self.clubs.all_clubs().await?;
        let renderer = Arc::clone(&self.renderer);

        let (count, report) = tokio::task::spawn_blocking(move || {
            renderer.render(&clubs).map(|report| (clubs.len(), report))
        })
        .await??;

        Ok((count, report.pages))
    }
}

/// Next nightly run strictly after `now`, on the local wall clock.
fn nightly_after(config: &WorkerConfig, now: DateTime<Utc>) -> DateTime<Utc> {
    config
        .nightly_at
        .next_run(&now.with_timezone(&Local))
        .with_timezone(&Utc)
}
