//! One-shot rebuild of the static site from the current database state.

use anyhow::Context;
use api::bootstrap;
use api::config::{DatabaseConfig, SiteConfig};
use infra::repos::ClubRepo;
use infra::ClubSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bootstrap::init();

    let database = DatabaseConfig::from_env()?;
    let site_config = SiteConfig::from_env();

    let pool = bootstrap::connect_db(&database).await?;
    let clubs = ClubRepo::new(pool).all_clubs().await?;
    let count = clubs.len();
    let options = site_config.build_options();

    let report = tokio::task::spawn_blocking(move || site::build(&clubs, &options))
        .await?
        .context("static site build failed")?;

    tracing::info!(
        pages = report.pages,
        assets = report.assets,
        "static site built: {} clubs -> {}",
        count,
        site_config.output_dir.display()
    );
    Ok(())
}
