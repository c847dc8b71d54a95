//! Workspaces and projects: the path from an API key to a [`Version`].

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::api::ApiClient;
use crate::error::RoboflowError;
use crate::version::{Version, VersionId};

/// Project as listed inside a workspace.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ProjectSummary {
    /// `workspace/project`.
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub versions: u32,
}

impl ProjectSummary {
    /// The project slug, without the workspace prefix.
    pub fn slug(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }
}

/// Version as listed inside a project.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct VersionSummary {
    /// `workspace/project/version`.
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exports: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Workspace {
    api: ApiClient,
    pub name: String,
    pub url: String,
    pub projects: Vec<ProjectSummary>,
}

#[derive(Clone, Debug)]
pub struct Project {
    api: ApiClient,
    pub workspace: String,
    pub id: String,
    pub name: String,
    pub project_type: Option<String>,
    pub versions: Vec<VersionSummary>,
}

#[derive(Deserialize)]
struct WorkspaceEnvelope {
    workspace: WorkspaceBody,
}

#[derive(Deserialize)]
struct WorkspaceBody {
    name: String,
    url: String,
    #[serde(default)]
    projects: Vec<ProjectSummary>,
}

#[derive(Deserialize)]
struct ProjectEnvelope {
    project: ProjectBody,
    #[serde(default)]
    versions: Vec<VersionSummary>,
}

#[derive(Deserialize)]
struct ProjectBody {
    name: String,
    #[serde(rename = "type", default)]
    project_type: Option<String>,
}

impl Workspace {
    pub(crate) fn fetch(api: &ApiClient, workspace: &str) -> Result<Self, RoboflowError> {
        let url = api.endpoint(&[workspace]);
        let body: WorkspaceEnvelope = decode(&url, api.get_json(&url)?.body)?;
        debug!(workspace = %body.workspace.url, projects = body.workspace.projects.len(), "loaded workspace");

        Ok(Self {
            api: api.clone(),
            name: body.workspace.name,
            url: body.workspace.url,
            projects: body.workspace.projects,
        })
    }

    /// Load a project of this workspace by slug (with or without the
    /// `workspace/` prefix).
    pub fn project(&self, project: &str) -> Result<Project, RoboflowError> {
        let slug = project
            .strip_prefix(&format!("{}/", self.url))
            .unwrap_or(project);
        Project::fetch(&self.api, &self.url, slug)
    }
}

impl Project {
    pub(crate) fn fetch(
        api: &ApiClient,
        workspace: &str,
        project: &str,
    ) -> Result<Self, RoboflowError> {
        let url = api.endpoint(&[workspace, project]);
        let body: ProjectEnvelope = decode(&url, api.get_json(&url)?.body)?;
        debug!(workspace, project, versions = body.versions.len(), "loaded project");

        Ok(Self {
            api: api.clone(),
            workspace: workspace.to_string(),
            id: project.to_string(),
            name: body.project.name,
            project_type: body.project.project_type,
            versions: body.versions,
        })
    }

    /// Version numbers the project currently has, in listing order.
    pub fn version_numbers(&self) -> Vec<u32> {
        self.versions
            .iter()
            .filter_map(|summary| summary.id.parse::<VersionId>().ok())
            .map(|id| id.version)
            .collect()
    }

    /// Reference to version `number`, named after this project.
    pub fn version(&self, number: u32) -> Result<Version, RoboflowError> {
        let summary = self
            .versions
            .iter()
            .find(|summary| {
                summary
                    .id
                    .parse::<VersionId>()
                    .map(|id| id.version == number)
                    .unwrap_or(false)
            })
            .ok_or_else(|| RoboflowError::VersionNotFound {
                project: format!("{}/{}", self.workspace, self.id),
                version: number,
            })?;

        let id = VersionId {
            workspace: self.workspace.clone(),
            project: self.id.clone(),
            version: number,
        };
        Ok(Version::new(self.api.clone(), id, &self.name).with_exports(summary.exports.clone()))
    }
}

/// Read the workspace slug the API key belongs to.
pub(crate) fn default_workspace(api: &ApiClient) -> Result<String, RoboflowError> {
    let url = api.endpoint(&[]);
    let body = api.get_json(&url)?.body;
    body.get("workspace")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RoboflowError::ResponseParse {
            url: url.to_string(),
            message: "response has no 'workspace' field".to_string(),
        })
}

fn decode<T: serde::de::DeserializeOwned>(url: &Url, body: Value) -> Result<T, RoboflowError> {
    serde_json::from_value(body).map_err(|source| RoboflowError::ResponseParse {
        url: url.to_string(),
        message: source.to_string(),
    })
}
