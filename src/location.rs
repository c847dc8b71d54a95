//! Where downloaded datasets land on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RoboflowError;

/// Environment variable naming the base directory for downloads.
pub const DATASET_DIRECTORY_ENV: &str = "DATASET_DIRECTORY";

/// Directory name for a dataset version: `"<name>-<version>"` with spaces
/// replaced by dashes.
pub fn dataset_slug(name: &str, version: u32) -> String {
    format!("{}-{}", name.replace(' ', "-"), version)
}

/// Join the slug onto `base`, or return it as a relative path without one.
pub fn resolve_download_location(base: Option<&Path>, name: &str, version: u32) -> PathBuf {
    let slug = dataset_slug(name, version);
    match base {
        Some(base) => base.join(slug),
        None => PathBuf::from(slug),
    }
}

/// Resolve the location against `DATASET_DIRECTORY` without touching disk.
pub fn default_download_location(name: &str, version: u32) -> PathBuf {
    let base = std::env::var_os(DATASET_DIRECTORY_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    resolve_download_location(base.as_deref(), name, version)
}

/// Resolve the download location from `DATASET_DIRECTORY` and create it.
pub fn download_location(name: &str, version: u32) -> Result<PathBuf, RoboflowError> {
    let location = default_download_location(name, version);
    fs::create_dir_all(&location)?;
    Ok(location)
}

/// Make `location` absolute against the working directory.
pub fn absolute_location(location: &Path) -> Result<PathBuf, RoboflowError> {
    if location.is_absolute() {
        Ok(location.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(location))
    }
}

/// True when `location` is a directory with at least one entry.
pub fn has_contents(location: &Path) -> bool {
    fs::read_dir(location)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_with_base_directory() {
        assert_eq!(
            resolve_download_location(Some(Path::new("/my/exports")), "Test Dataset", 3),
            PathBuf::from("/my/exports/Test-Dataset-3")
        );
    }

    #[test]
    fn location_without_base_directory() {
        assert_eq!(
            resolve_download_location(None, "Test Dataset", 3),
            PathBuf::from("Test-Dataset-3")
        );
    }

    #[test]
    fn relative_location_becomes_absolute() {
        let resolved = absolute_location(Path::new("Test-Dataset-3")).expect("absolute");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("Test-Dataset-3"));
    }

    #[test]
    fn empty_directory_has_no_contents() {
        let temp = tempfile::tempdir().expect("create temp dir");
        assert!(!has_contents(temp.path()));
        fs::write(temp.path().join("data.yaml"), "nc: 1\n").expect("write file");
        assert!(has_contents(temp.path()));
        assert!(!has_contents(&temp.path().join("missing")));
    }

    #[test]
    fn slug_replaces_every_space() {
        assert_eq!(dataset_slug("Hard Hat  Workers", 12), "Hard-Hat--Workers-12");
    }
}
