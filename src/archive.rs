//! Export archive unpacking.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::error::RoboflowError;

/// Name the archive is saved under inside the dataset directory.
pub const ARCHIVE_FILE_NAME: &str = "roboflow.zip";

/// Extract `archive_path` into `dest`, creating it if needed.
///
/// Entries that would escape `dest` are skipped by the zip reader.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<usize, RoboflowError> {
    fs::create_dir_all(dest)?;

    let file = File::open(archive_path)?;
    let mut archive =
        zip::ZipArchive::new(BufReader::new(file)).map_err(|source| RoboflowError::Archive {
            path: archive_path.to_path_buf(),
            source,
        })?;

    let entries = archive.len();
    debug!(
        archive = %archive_path.display(),
        dest = %dest.display(),
        entries,
        "extracting"
    );

    archive
        .extract(dest)
        .map_err(|source| RoboflowError::Archive {
            path: archive_path.to_path_buf(),
            source,
        })?;

    Ok(entries)
}

/// Extract and then delete the archive.
pub fn unpack_and_remove(archive_path: &Path, dest: &Path) -> Result<usize, RoboflowError> {
    let entries = extract_zip(archive_path, dest)?;
    fs::remove_file(archive_path)?;
    Ok(entries)
}
