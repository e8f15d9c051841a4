//! Build worker: polls the build task, regenerates the static site when it
//! is due, and requests a full rebuild every night.

use std::sync::Arc;

use api::bootstrap;
use api::config::{DatabaseConfig, SiteConfig, WorkerConfig};
use api::services::BuildWorker;
use infra::repos::{BuildTaskRepo, ClubRepo};
use site::StaticSite;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bootstrap::init();

    let database = DatabaseConfig::from_env()?;
    let site = SiteConfig::from_env();
    let config = WorkerConfig::from_env()?;

    let pool = bootstrap::connect_db(&database).await?;
    let queue = Arc::new(BuildTaskRepo::new(pool.clone()).with_lease(config.lease));
    let clubs = Arc::new(ClubRepo::new(pool));
    let renderer = Arc::new(StaticSite::new(site.build_options()));

    let mut worker = BuildWorker::new(queue, clubs, renderer, config);
    tracing::info!(next_nightly = %worker.next_nightly(), "next nightly build scheduled");
    worker.run().await;
    Ok(())
}
