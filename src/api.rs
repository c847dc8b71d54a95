//! Blocking HTTP access to the service.
//!
//! Every API call carries the key as the `api_key` query parameter. Responses
//! are classified the same way everywhere: 4xx becomes
//! [`RoboflowError::Api`] with the server's message, 5xx becomes
//! [`RoboflowError::Transport`] wrapping [`ureq::Error::StatusCode`].

use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use serde_json::Value;
use tracing::debug;
use ureq::http::{Response, StatusCode};
use ureq::Body;
use url::Url;

use crate::config::{ClientConfig, PollConfig};
use crate::error::RoboflowError;

/// Decoded body of a successful API call.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: u16,
    /// `Value::Null` when the body was empty.
    pub body: Value,
}

/// Authenticated handle on the API, cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    agent: ureq::Agent,
    api_url: Url,
    api_key: String,
    poll: PollConfig,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &"<redacted>")
            .field("poll", &self.poll)
            .finish()
    }
}

impl ApiClient {
    pub fn new(api_key: impl Into<String>, config: &ClientConfig) -> Result<Self, RoboflowError> {
        let api_url = Url::parse(&config.api_url).map_err(|source| RoboflowError::InvalidApiUrl {
            input: config.api_url.clone(),
            source,
        })?;
        if api_url.cannot_be_a_base() {
            return Err(RoboflowError::InvalidApiUrl {
                input: config.api_url.clone(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        let agent_config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(config.connect_timeout)
            .timeout_recv_response(config.response_timeout)
            .build();
        let agent: ureq::Agent = agent_config.into();

        Ok(Self {
            agent,
            api_url,
            api_key: api_key.into(),
            poll: config.poll.clone(),
        })
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn poll_config(&self) -> &PollConfig {
        &self.poll
    }

    /// Append percent-encoded path segments to the API base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn get_json(&self, url: &Url) -> Result<ApiResponse, RoboflowError> {
        debug!(url = %url, "GET");
        let response = self
            .agent
            .get(url.as_str())
            .query("api_key", &self.api_key)
            .call()?;
        read_api_response(url.as_str(), response)
    }

    pub fn post(&self, url: &Url) -> Result<ApiResponse, RoboflowError> {
        debug!(url = %url, "POST");
        let response = self
            .agent
            .post(url.as_str())
            .query("api_key", &self.api_key)
            .send_empty()?;
        read_api_response(url.as_str(), response)
    }

    /// Stream `link` into `dest`, returning the number of bytes written.
    ///
    /// Export links are pre-signed, so no API key is attached.
    pub fn download_to_file(&self, link: &str, dest: &Path) -> Result<u64, RoboflowError> {
        let shown = display_url(link);
        debug!(url = %shown, dest = %dest.display(), "downloading");

        let mut response = self.agent.get(link).call()?;
        let status = response.status();
        check_status(&shown, status, &mut response)?;

        let mut file = File::create(dest)?;
        let mut reader = response.body_mut().as_reader();
        let written = io::copy(&mut reader, &mut file)?;
        Ok(written)
    }
}

fn read_api_response(url: &str, mut response: Response<Body>) -> Result<ApiResponse, RoboflowError> {
    let status = response.status();
    check_status(url, status, &mut response)?;

    let text = response.body_mut().read_to_string()?;
    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).map_err(|source| RoboflowError::ResponseParse {
            url: url.to_string(),
            message: source.to_string(),
        })?
    };

    Ok(ApiResponse {
        status: status.as_u16(),
        body,
    })
}

fn check_status(
    url: &str,
    status: StatusCode,
    response: &mut Response<Body>,
) -> Result<(), RoboflowError> {
    if status.is_server_error() {
        return Err(RoboflowError::Transport(ureq::Error::StatusCode(
            status.as_u16(),
        )));
    }
    if status.is_client_error() {
        let text = response.body_mut().read_to_string().unwrap_or_default();
        return Err(RoboflowError::Api {
            url: url.to_string(),
            status: status.as_u16(),
            message: error_message(&text, status),
        });
    }
    Ok(())
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = value
            .get("error")
            .and_then(|error| {
                error
                    .as_str()
                    .or_else(|| error.get("message").and_then(Value::as_str))
            })
            .or_else(|| value.get("message").and_then(Value::as_str));
        if let Some(message) = message {
            return message.to_string();
        }
        if !value.is_null() {
            return value.to_string();
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

/// Drop the query string, which may hold signatures.
fn display_url(link: &str) -> String {
    match Url::parse(link) {
        Ok(mut url) => {
            url.set_query(None);
            url.to_string()
        }
        Err(_) => link.split('?').next().unwrap_or_default().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> ApiClient {
        let config = ClientConfig::default().with_api_url(api_url);
        ApiClient::new("test-api-key", &config).expect("client")
    }

    #[test]
    fn endpoint_appends_segments() {
        let api = client("https://api.roboflow.com");
        assert_eq!(
            api.endpoint(&["test-workspace", "test-project", "3", "yolo1337"])
                .as_str(),
            "https://api.roboflow.com/test-workspace/test-project/3/yolo1337"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let api = client("http://localhost:8080/api/");
        assert_eq!(
            api.endpoint(&["ws", "proj"]).as_str(),
            "http://localhost:8080/api/ws/proj"
        );
    }

    #[test]
    fn endpoint_encodes_segments() {
        let api = client("https://api.roboflow.com");
        assert_eq!(
            api.endpoint(&["my ws", "a/b"]).as_str(),
            "https://api.roboflow.com/my%20ws/a%2Fb"
        );
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        let config = ClientConfig::default().with_api_url("not a url");
        let err = ApiClient::new("key", &config).expect_err("should fail");
        assert!(matches!(err, RoboflowError::InvalidApiUrl { .. }));

        let config = ClientConfig::default().with_api_url("mailto:someone@example.com");
        let err = ApiClient::new("key", &config).expect_err("should fail");
        assert!(matches!(err, RoboflowError::InvalidApiUrl { .. }));
    }

    #[test]
    fn debug_output_hides_key() {
        let rendered = format!("{:?}", client("https://api.roboflow.com"));
        assert!(!rendered.contains("test-api-key"));
    }

    #[test]
    fn error_message_prefers_error_field() {
        assert_eq!(
            error_message(r#"{"error": "Broken"}"#, StatusCode::NOT_FOUND),
            "Broken"
        );
        assert_eq!(
            error_message(
                r#"{"error": {"message": "Unsupported format", "type": "GraphMethodException"}}"#,
                StatusCode::BAD_REQUEST
            ),
            "Unsupported format"
        );
        assert_eq!(
            error_message(r#"{"message": "nope"}"#, StatusCode::FORBIDDEN),
            "nope"
        );
    }

    #[test]
    fn error_message_falls_back_to_body_then_reason() {
        assert_eq!(
            error_message(r#"{"code": 7}"#, StatusCode::BAD_REQUEST),
            r#"{"code":7}"#
        );
        assert_eq!(
            error_message("plain text\n", StatusCode::BAD_REQUEST),
            "plain text"
        );
        assert_eq!(error_message("", StatusCode::NOT_FOUND), "Not Found");
    }

    #[test]
    fn display_url_strips_query() {
        assert_eq!(
            display_url("https://storage.example.com/export.zip?X-Signature=abc"),
            "https://storage.example.com/export.zip"
        );
    }
}
