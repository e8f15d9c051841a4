mod common;

use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use common::*;
use infra::repos::BuildTaskRepo;
use infra::{BuildQueue, BuildTaskStatus};

/// Postgres stores microseconds; keep test clocks comparable after a round trip.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn secs(base: DateTime<Utc>, offset: i64) -> DateTime<Utc> {
    base + chrono::Duration::seconds(offset)
}

async fn repo() -> Option<BuildTaskRepo> {
    let db = setup_test_db().await?;
    Some(BuildTaskRepo::new(db).with_task_key(unique("site")))
}

#[tokio::test]
async fn test_debounce_runs_after_last_enqueue() {
    let Some(repo) = repo().await else { return };
    let t0 = now();
    let debounce = Duration::from_secs(10);

    for offset in [0, 3, 9] {
        repo.enqueue_at(secs(t0, offset), debounce).await.unwrap();
    }

    let task = repo.get().await.unwrap().expect("task row created");
    assert_eq!(task.status, BuildTaskStatus::Pending);
    assert_eq!(task.next_run_at, Some(secs(t0, 19)));

    assert!(repo.claim(secs(t0, 18)).await.unwrap().is_none());
    let claimed = repo.claim(secs(t0, 19)).await.unwrap().expect("task is due");
    assert_eq!(claimed.status, BuildTaskStatus::Running);
    assert!(repo.claim(secs(t0, 20)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_enqueue_keeps_a_single_row() {
    let Some(repo) = repo().await else { return };
    let t0 = now();

    let first = repo.enqueue_at(t0, Duration::ZERO).await.unwrap();
    let second = repo.enqueue_at(secs(t0, 1), Duration::ZERO).await.unwrap();
    assert_eq!(first.id, second.id);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM build_tasks WHERE task_key = $1")
        .bind(repo.task_key())
        .fetch_one(&repo.pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_have_a_single_winner() {
    let Some(repo) = repo().await else { return };
    let t0 = now();
    repo.enqueue_at(t0, Duration::ZERO).await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.claim(secs(t0, 1)).await.unwrap() })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1, "exactly one claim must win");
}

#[tokio::test]
async fn test_complete_goes_idle_without_new_request() {
    let Some(repo) = repo().await else { return };
    let t0 = now();
    repo.enqueue_at(t0, Duration::ZERO).await.unwrap();
    let claimed = repo.claim(secs(t0, 1)).await.unwrap().unwrap();

    let done = repo
        .complete_at(&claimed, secs(t0, 5))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(done.status, BuildTaskStatus::Idle);
    assert_eq!(done.next_run_at, None);
    assert_eq!(done.claimed_at, None);
}

#[tokio::test]
async fn test_complete_stays_pending_after_mid_run_enqueue() {
    let Some(repo) = repo().await else { return };
    let t0 = now();
    repo.enqueue_at(t0, Duration::ZERO).await.unwrap();
    let claimed = repo.claim(secs(t0, 1)).await.unwrap().unwrap();

    let during = repo
        .enqueue_at(secs(t0, 2), Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(during.status, BuildTaskStatus::Running);

    let done = repo
        .complete_at(&claimed, secs(t0, 5))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.status, BuildTaskStatus::Pending);
    assert_eq!(done.next_run_at, Some(secs(t0, 12)));
}

#[tokio::test]
async fn test_complete_stays_pending_after_mid_run_immediate_enqueue() {
    let Some(repo) = repo().await else { return };
    let t0 = now();
    repo.enqueue_at(t0, Duration::ZERO).await.unwrap();
    let claimed = repo.claim(secs(t0, 1)).await.unwrap().unwrap();
    repo.enqueue_at(secs(t0, 2), Duration::ZERO).await.unwrap();

    let done = repo
        .complete_at(&claimed, secs(t0, 5))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(done.status, BuildTaskStatus::Pending);
    assert!(repo.claim(secs(t0, 6)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_reschedule_sets_fresh_retry_window() {
    let Some(repo) = repo().await else { return };
    let t0 = now();
    repo.enqueue_at(t0, Duration::ZERO).await.unwrap();
    let claimed = repo.claim(secs(t0, 1)).await.unwrap().unwrap();
    repo.enqueue_at(secs(t0, 2), Duration::from_secs(3600))
        .await
        .unwrap();

    let task = repo
        .reschedule_at(&claimed, secs(t0, 4), Duration::from_secs(300))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(task.status, BuildTaskStatus::Pending);
    assert_eq!(task.next_run_at, Some(secs(t0, 304)));
    assert_eq!(task.claimed_at, None);
}

#[tokio::test]
async fn test_expired_lease_is_reclaimed() {
    let Some(repo) = repo().await else { return };
    let repo = repo.with_lease(Some(Duration::from_secs(60)));
    let t0 = now();
    repo.enqueue_at(t0, Duration::ZERO).await.unwrap();

    let first = repo.claim(t0).await.unwrap().unwrap();
    assert_eq!(first.lease_expires_at, Some(secs(t0, 60)));

    assert!(repo.claim(secs(t0, 59)).await.unwrap().is_none());
    let second = repo.claim(secs(t0, 60)).await.unwrap().unwrap();
    assert_eq!(second.id, first.id);
}

#[tokio::test]
async fn test_stale_claim_cannot_finish_a_taken_over_run() {
    let Some(repo) = repo().await else { return };
    let repo = repo.with_lease(Some(Duration::from_secs(60)));
    let t0 = now();
    repo.enqueue_at(t0, Duration::ZERO).await.unwrap();

    let stale = repo.claim(t0).await.unwrap().unwrap();
    let current = repo.claim(secs(t0, 60)).await.unwrap().unwrap();

    assert!(repo.complete_at(&stale, secs(t0, 61)).await.unwrap().is_none());
    assert!(repo
        .reschedule_at(&stale, secs(t0, 61), Duration::from_secs(300))
        .await
        .unwrap()
        .is_none());

    let task = repo.get().await.unwrap().unwrap();
    assert_eq!(task.status, BuildTaskStatus::Running);
    assert_eq!(task.claimed_at, current.claimed_at);

    // No second build may start while the new owner is still running.
    repo.enqueue_at(secs(t0, 62), Duration::ZERO).await.unwrap();
    assert!(repo.claim(secs(t0, 63)).await.unwrap().is_none());

    let done = repo
        .complete_at(&current, secs(t0, 64))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(done.status, BuildTaskStatus::Pending);
}
