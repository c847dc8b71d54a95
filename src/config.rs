//! Client configuration.

use std::time::Duration;

/// Base URL of the hosted API.
pub const DEFAULT_API_URL: &str = "https://api.roboflow.com";

/// Environment variable overriding [`DEFAULT_API_URL`].
pub const API_URL_ENV: &str = "API_URL";

/// How long to keep asking whether an export is ready.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Total number of status requests, including the first one.
    pub max_attempts: u32,
    /// Sleep after the first unsuccessful attempt.
    pub initial_interval: Duration,
    /// Upper bound for the doubling sleep.
    pub max_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 120,
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
        }
    }
}

impl PollConfig {
    /// Sleep to use after `current`.
    pub fn next_interval(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_interval)
    }
}

/// Settings shared by every request a client makes.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub connect_timeout: Option<Duration>,
    pub response_timeout: Option<Duration>,
    pub poll: PollConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            connect_timeout: Some(Duration::from_secs(30)),
            response_timeout: Some(Duration::from_secs(120)),
            poll: PollConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults, with the API URL taken from `API_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(api_url) = std::env::var(API_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
        {
            config.api_url = api_url;
        }
        config
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_doubles_up_to_cap() {
        let poll = PollConfig {
            max_attempts: 5,
            initial_interval: Duration::from_secs(3),
            max_interval: Duration::from_secs(10),
        };
        let second = poll.next_interval(poll.initial_interval);
        assert_eq!(second, Duration::from_secs(6));
        assert_eq!(poll.next_interval(second), Duration::from_secs(10));
    }

    #[test]
    fn zero_interval_stays_zero() {
        let poll = PollConfig {
            max_attempts: 3,
            initial_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
        };
        assert_eq!(poll.next_interval(Duration::ZERO), Duration::ZERO);
    }
}
