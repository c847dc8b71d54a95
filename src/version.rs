//! Dataset versions: triggering exports and downloading them.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::api::ApiClient;
use crate::archive::{self, ARCHIVE_FILE_NAME};
use crate::config::PollConfig;
use crate::data_yaml;
use crate::error::RoboflowError;
use crate::format::resolve_format_identifier;
use crate::location;

/// `workspace/project/version`, the form the service uses for version ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VersionId {
    pub workspace: String,
    pub project: String,
    pub version: u32,
}

impl FromStr for VersionId {
    type Err = RoboflowError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| RoboflowError::InvalidVersionId {
            input: input.to_string(),
            message: message.to_string(),
        };

        let parts: Vec<&str> = input.trim().trim_matches('/').split('/').collect();
        let [workspace, project, version] = parts.as_slice() else {
            return Err(invalid("expected '<workspace>/<project>/<version>'"));
        };
        if workspace.is_empty() || project.is_empty() {
            return Err(invalid("workspace and project must not be empty"));
        }
        let version = version
            .parse::<u32>()
            .map_err(|_| invalid("version must be a non-negative integer"))?;

        Ok(Self {
            workspace: workspace.to_string(),
            project: project.to_string(),
            version,
        })
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.workspace, self.project, self.version)
    }
}

/// A dataset that has been materialized on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub name: String,
    pub version: u32,
    /// The identifier sent to the service, never the caller's alias.
    pub model_format: String,
    pub location: PathBuf,
}

/// Reference to one exportable snapshot of a project.
#[derive(Clone, Debug)]
pub struct Version {
    api: ApiClient,
    id: VersionId,
    name: String,
    model_format: Option<String>,
    exports: Vec<String>,
}

impl Version {
    /// `name` is the project's display name; it names the download directory.
    pub fn new(api: ApiClient, id: VersionId, name: impl Into<String>) -> Self {
        Self {
            api,
            id,
            name: name.into(),
            model_format: None,
            exports: Vec::new(),
        }
    }

    /// Default format used when `export`/`download` are called without one.
    pub fn with_model_format(mut self, model_format: impl Into<String>) -> Self {
        self.model_format = Some(model_format.into());
        self
    }

    /// Formats the service reports as already exported.
    pub fn with_exports(mut self, exports: Vec<String>) -> Self {
        self.exports = exports;
        self
    }

    pub fn id(&self) -> &VersionId {
        &self.id
    }

    pub fn workspace(&self) -> &str {
        &self.id.workspace
    }

    pub fn project(&self) -> &str {
        &self.id.project
    }

    pub fn version(&self) -> u32 {
        self.id.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model_format(&self) -> Option<&str> {
        self.model_format.as_deref()
    }

    pub fn exports(&self) -> &[String] {
        &self.exports
    }

    /// Whether the service already holds an export in `format`.
    pub fn is_exported(&self, format: &str) -> bool {
        self.exports.iter().any(|exported| exported == format)
    }

    /// Canonical format for a request, falling back to the stored default.
    pub fn format_identifier(&self, requested: Option<&str>) -> Result<String, RoboflowError> {
        resolve_format_identifier(requested, self.model_format.as_deref()).ok_or_else(|| {
            RoboflowError::MissingFormat {
                version: self.id.to_string(),
            }
        })
    }

    /// `{api}/{workspace}/{project}/{version}/{format}`.
    pub fn download_url(&self, format: &str) -> Url {
        let version = self.id.version.to_string();
        self.api.endpoint(&[
            self.id.workspace.as_str(),
            self.id.project.as_str(),
            version.as_str(),
            format,
        ])
    }

    /// Default download directory, created if missing.
    pub fn download_location(&self) -> Result<PathBuf, RoboflowError> {
        location::download_location(&self.name, self.id.version)
    }

    /// Ask the service to generate an export in `model_format`.
    pub fn export(&self, model_format: Option<&str>) -> Result<bool, RoboflowError> {
        let format = self.format_identifier(model_format)?;
        let url = self.download_url(&format);

        let response = self.api.post(&url)?;
        info!(version = %self.id, format = %format, status = response.status, "export requested");
        Ok(true)
    }

    /// Download the version in `model_format` and unpack it.
    ///
    /// Without `location` the directory comes from `DATASET_DIRECTORY` and the
    /// project name. With `overwrite == false` an existing, non-empty
    /// directory is returned as-is without contacting the service.
    pub fn download(
        &self,
        model_format: Option<&str>,
        location: Option<&Path>,
        overwrite: bool,
    ) -> Result<Dataset, RoboflowError> {
        let format = self.format_identifier(model_format)?;
        let location = match location {
            Some(location) => location.to_path_buf(),
            None => self.download_location()?,
        };
        // The handle keeps the caller's path; disk work and data.yaml use the absolute one.
        let target = location::absolute_location(&location)?;

        if !overwrite && location::has_contents(&target) {
            info!(location = %target.display(), "dataset already present, skipping download");
            return Ok(self.dataset(format, location));
        }

        if !self.is_exported(&format) {
            debug!(version = %self.id, format = %format, "format not exported yet");
        }

        let url = self.download_url(&format);
        let link = self.wait_for_export_link(&url, &format)?;

        fs::create_dir_all(&target)?;
        let archive_path = target.join(ARCHIVE_FILE_NAME);
        let bytes = self.api.download_to_file(&link, &archive_path)?;
        info!(version = %self.id, format = %format, bytes, "downloaded export");

        let entries = archive::unpack_and_remove(&archive_path, &target)?;
        debug!(entries, location = %target.display(), "unpacked export");

        data_yaml::rewrite_data_yaml(&target)?;

        Ok(self.dataset(format, location))
    }

    fn dataset(&self, model_format: String, location: PathBuf) -> Dataset {
        Dataset {
            name: self.name.clone(),
            version: self.id.version,
            model_format,
            location,
        }
    }

    /// Poll the download endpoint until it hands out an export link.
    fn wait_for_export_link(&self, url: &Url, format: &str) -> Result<String, RoboflowError> {
        let poll = self.api.poll_config();
        let link = poll_until(poll, |attempt| {
            let response = self.api.get_json(url)?;
            if let Some(link) = export_link(&response.body) {
                return Ok(Some(link.to_string()));
            }

            if attempt == 1 {
                info!(version = %self.id, format, "waiting for export to be generated");
            }
            match export_progress(&response.body) {
                Some(progress) => debug!(attempt, progress, "export in progress"),
                None => debug!(attempt, status = response.status, "export link not available"),
            }
            Ok(None)
        })?;

        link.ok_or_else(|| RoboflowError::ExportTimeout {
            version: self.id.to_string(),
            format: format.to_string(),
            attempts: poll.max_attempts.max(1),
        })
    }
}

/// Call `attempt` (with a 1-based attempt number) until it yields a value or
/// the attempt budget is spent, sleeping with backoff in between.
fn poll_until<T>(
    poll: &PollConfig,
    mut attempt: impl FnMut(u32) -> Result<Option<T>, RoboflowError>,
) -> Result<Option<T>, RoboflowError> {
    let attempts = poll.max_attempts.max(1);
    let mut interval = poll.initial_interval;

    for number in 1..=attempts {
        if let Some(value) = attempt(number)? {
            return Ok(Some(value));
        }
        if number < attempts {
            thread::sleep(interval);
            interval = poll.next_interval(interval);
        }
    }

    Ok(None)
}

fn export_link(body: &Value) -> Option<&str> {
    body.get("export")?
        .get("link")?
        .as_str()
        .filter(|link| !link.trim().is_empty())
}

fn export_progress(body: &Value) -> Option<f64> {
    body.get("progress")?.as_f64()
}
