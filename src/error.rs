use std::path::PathBuf;
use thiserror::Error;

/// The main error type for roboflow operations.
#[derive(Debug, Error)]
pub enum RoboflowError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network failures and server-side (5xx) responses, passed through as-is.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The service rejected the request (4xx).
    #[error("Request to {url} failed with status {status}: {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Failed to parse response from {url}: {message}")]
    ResponseParse { url: String, message: String },

    #[error("Invalid API URL '{input}': {source}")]
    InvalidApiUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("No API key given; pass --api-key or set ROBOFLOW_API_KEY")]
    MissingApiKey,

    #[error("Invalid version id '{input}': {message}")]
    InvalidVersionId { input: String, message: String },

    #[error("No model format given and {version} has no default model format")]
    MissingFormat { version: String },

    #[error("Version {version} not found in project {project}")]
    VersionNotFound { project: String, version: u32 },

    #[error("Export '{format}' of {version} was not ready after {attempts} attempt(s)")]
    ExportTimeout {
        version: String,
        format: String,
        attempts: u32,
    },

    #[error("Failed to extract archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to parse YAML config {path}: {source}")]
    YamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to write YAML config {path}: {source}")]
    YamlWrite {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("YAML config {path} is not a mapping")]
    YamlShape { path: PathBuf },
}
