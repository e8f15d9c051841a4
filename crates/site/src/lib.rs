//! Static site generation for the public club pages.
//!
//! [`build`] turns a full snapshot of clubs into `clubs/<slug>/index.html`
//! pages plus a copy of the asset directory. The same input always produces
//! the same bytes.

pub mod assets;
pub mod error;
pub mod i18n;
pub mod render;
pub mod view;

use std::fs;
use std::path::{Path, PathBuf};

use infra::Club;
use tracing::info;

pub use error::SiteError;
pub use i18n::Labels;

pub const DEFAULT_OUTPUT_DIR: &str = "public";
pub const DEFAULT_TEMPLATE_DIR: &str = "templates/site";
pub const DEFAULT_ASSET_DIR: &str = "static/site";

const CLUBS_DIR: &str = "clubs";
const ASSETS_DIR: &str = "assets";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub output_dir: PathBuf,
    pub template_dir: PathBuf,
    pub asset_dir: PathBuf,
    pub labels: Labels,
}

impl BuildOptions {
    /// Copy with empty directories replaced by their defaults.
    pub fn resolved(&self) -> Self {
        let or_default = |dir: &Path, default: &str| {
            if dir.as_os_str().is_empty() {
                PathBuf::from(default)
            } else {
                dir.to_path_buf()
            }
        };

        Self {
            output_dir: or_default(&self.output_dir, DEFAULT_OUTPUT_DIR),
            template_dir: or_default(&self.template_dir, DEFAULT_TEMPLATE_DIR),
            asset_dir: or_default(&self.asset_dir, DEFAULT_ASSET_DIR),
            labels: self.labels.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub pages: usize,
    pub assets: usize,
}

/// Render every club and replace the generated parts of the output directory.
///
/// All pages are rendered before anything on disk is touched, so a missing
/// layout leaves the previous output in place.
pub fn build(clubs: &[Club], options: &BuildOptions) -> Result<BuildReport, SiteError> {
    let options = options.resolved();
    let labels = &options.labels;
    let layout = render::Layout::load(&options.template_dir)?;

    let pages: Vec<(PathBuf, String)> = clubs
        .iter()
        .map(|club| {
            let view = view::club_view(club, labels);
            let content = render::club_page(&view, labels);
            let html = layout.render(&view.name, &content, labels.app_name());
            (render::club_page_path(club.slug()), html)
        })
        .collect();

    let output_dir = &options.output_dir;
    fs::create_dir_all(output_dir).map_err(SiteError::io(output_dir))?;

    let clubs_dir = output_dir.join(CLUBS_DIR);
    remove_dir_if_exists(&clubs_dir)?;
    for (relative, html) in &pages {
        let path = output_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(SiteError::io(parent))?;
        }
        fs::write(&path, html).map_err(SiteError::io(&path))?;
    }

    let assets_dir = output_dir.join(ASSETS_DIR);
    remove_dir_if_exists(&assets_dir)?;
    let assets = assets::copy_dir(&options.asset_dir, &assets_dir)?;

    let report = BuildReport {
        pages: pages.len(),
        assets,
    };
    info!(
        pages = report.pages,
        assets = report.assets,
        output_dir = %output_dir.display(),
        "static site built"
    );
    Ok(report)
}

fn remove_dir_if_exists(dir: &Path) -> Result<(), SiteError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(SiteError::io(dir)(err)),
    }
}

/// Something that turns a club snapshot into the public site.
///
/// Runs synchronously; async callers move it onto a blocking thread.
pub trait SiteRenderer: Send + Sync + 'static {
    fn render(&self, clubs: &[Club]) -> Result<BuildReport, SiteError>;
}

/// [`SiteRenderer`] writing static files with [`build`].
#[derive(Debug, Clone)]
pub struct StaticSite {
    options: BuildOptions,
}

impl StaticSite {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }
}

impl SiteRenderer for StaticSite {
    fn render(&self, clubs: &[Club]) -> Result<BuildReport, SiteError> {
        build(clubs, &self.options)
    }
}
