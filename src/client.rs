use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::RoboflowError;
use crate::project::{self, Project, Workspace};
use crate::version::{Version, VersionId};

/// Entry point: an API key plus client settings.
#[derive(Clone, Debug)]
pub struct Roboflow {
    api: ApiClient,
}

impl Roboflow {
    /// Client configured from the environment (`API_URL`).
    pub fn new(api_key: impl Into<String>) -> Result<Self, RoboflowError> {
        Self::with_config(api_key, &ClientConfig::from_env())
    }

    pub fn with_config(
        api_key: impl Into<String>,
        config: &ClientConfig,
    ) -> Result<Self, RoboflowError> {
        Ok(Self {
            api: ApiClient::new(api_key, config)?,
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Load a workspace, or the one the API key belongs to when `None`.
    pub fn workspace(&self, workspace: Option<&str>) -> Result<Workspace, RoboflowError> {
        let slug = match workspace {
            Some(slug) => slug.to_string(),
            None => project::default_workspace(&self.api)?,
        };
        Workspace::fetch(&self.api, &slug)
    }

    /// Load a project directly, skipping the workspace listing.
    pub fn project(&self, workspace: &str, project: &str) -> Result<Project, RoboflowError> {
        Project::fetch(&self.api, workspace, project)
    }

    /// Resolve a `workspace/project/version` id through the project listing.
    pub fn version(&self, id: &VersionId) -> Result<Version, RoboflowError> {
        self.project(&id.workspace, &id.project)?.version(id.version)
    }
}
