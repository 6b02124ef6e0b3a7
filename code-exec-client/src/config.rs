use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runs endpoint of a locally deployed API
pub const DEFAULT_API_URL: &str = "http://localhost:8080/v1/runs";
/// Whole-request budget, including the run itself
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Endpoint runs are posted to
    pub api_url: String,

    /// Bearer token for authentication
    pub api_key: String,

    /// Request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
