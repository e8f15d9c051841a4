use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::SiteError;

/// Recursively copy `src` into `dst`, returning the number of files copied.
///
/// A missing `src` is not an error; nothing is copied.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<usize, SiteError> {
    if !src.is_dir() {
        debug!(asset_dir = %src.display(), "asset directory missing, skipping copy");
        return Ok(0);
    }

    fs::create_dir_all(dst).map_err(SiteError::io(dst))?;

    let mut entries = fs::read_dir(src)
        .map_err(SiteError::io(src))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(SiteError::io(src))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut copied = 0;
    for entry in entries {
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(SiteError::io(&from))?;

        if file_type.is_dir() {
            copied += copy_dir(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(SiteError::io(&from))?;
            copied += 1;
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_nested_files() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::create_dir_all(src.path().join("img")).unwrap();
        fs::write(src.path().join("site.css"), "body {}").unwrap();
        fs::write(src.path().join("img/logo.svg"), "<svg/>").unwrap();

        let copied = copy_dir(src.path(), &dst.path().join("assets")).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(
            fs::read_to_string(dst.path().join("assets/img/logo.svg")).unwrap(),
            "<svg/>"
        );
    }

    #[test]
    fn missing_source_is_skipped() {
        let dst = tempfile::tempdir().unwrap();
        let copied = copy_dir(&dst.path().join("nope"), &dst.path().join("assets")).unwrap();
        assert_eq!(copied, 0);
        assert!(!dst.path().join("assets").exists());
    }
}
