//! Rewriting of the `data.yaml` bundled with YOLO-style exports.
//!
//! Exports reference their splits relative to the archive root
//! (`train: ../train/images`). After unpacking, those entries are replaced
//! with absolute paths under the dataset directory so training tools can be
//! pointed at the file from anywhere.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde_yaml::Value;
use tracing::debug;

use crate::error::RoboflowError;

pub const DATA_YAML: &str = "data.yaml";

const SPLIT_KEYS: &[&str] = &["train", "val", "test"];

/// Rewrite `<location>/data.yaml` in place if it exists.
///
/// Returns `true` when the file was rewritten.
pub fn rewrite_data_yaml(location: &Path) -> Result<bool, RoboflowError> {
    let path = location.join(DATA_YAML);
    if !path.is_file() {
        return Ok(false);
    }

    let data = fs::read_to_string(&path)?;
    let mut document: Value =
        serde_yaml::from_str(&data).map_err(|source| RoboflowError::YamlParse {
            path: path.clone(),
            source,
        })?;
    let mapping = document
        .as_mapping_mut()
        .ok_or_else(|| RoboflowError::YamlShape { path: path.clone() })?;

    let mut changed = false;
    for key in SPLIT_KEYS {
        let Some(value) = mapping.get_mut(*key) else {
            continue;
        };
        changed |= rebase_value(location, value);
    }

    if changed {
        let rendered =
            serde_yaml::to_string(&document).map_err(|source| RoboflowError::YamlWrite {
                path: path.clone(),
                source,
            })?;
        fs::write(&path, rendered)?;
        debug!(path = %path.display(), "rewrote split paths");
    }

    Ok(changed)
}

fn rebase_value(location: &Path, value: &mut Value) -> bool {
    match value {
        Value::String(raw) => match rebase_path(location, raw) {
            Some(rebased) => {
                *raw = rebased;
                true
            }
            None => false,
        },
        // Ultralytics accepts a list of directories per split.
        Value::Sequence(items) => items
            .iter_mut()
            .fold(false, |changed, item| rebase_value(location, item) | changed),
        _ => false,
    }
}

/// Strip leading `.`/`..` components and join the rest onto `location`.
/// Absolute and empty paths are left alone.
fn rebase_path(location: &Path, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || Path::new(trimmed).is_absolute() {
        return None;
    }

    let relative: PathBuf = Path::new(trimmed)
        .components()
        .skip_while(|component| matches!(component, Component::CurDir | Component::ParentDir))
        .collect();

    Some(location.join(relative).to_string_lossy().into_owned())
}
