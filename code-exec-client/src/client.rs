use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    config::ClientConfig,
    error::Error,
    format::format_result,
    types::{RunRequest, RunResponse},
};

/// Client for the code execution API
pub struct CodeInterpreterClient {
    client: Client,
    config: ClientConfig,
}

impl CodeInterpreterClient {
    /// Create a new client with the given configuration
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        Url::parse(&config.api_url)
            .map_err(|e| Error::Configuration(format!("api_url {}: {}", config.api_url, e)))?;
        if config.api_key.is_empty() {
            return Err(Error::Configuration("api_key must not be empty".into()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(Error::Http)?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit `code` and return the API's verdict
    pub async fn execute(&self, language: &str, code: &str) -> Result<RunResponse, Error> {
        let request_id = Uuid::new_v4();
        debug!(%request_id, language, "Submitting run");

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
            .header("x-request-id", request_id.to_string())
            .json(&RunRequest { language, code })
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(Error::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => return Err(Error::RateLimited),
            status if !status.is_success() => {
                return Err(Error::Api {
                    status: status.as_u16(),
                    body: response.text().await?,
                });
            }
            _ => {}
        }

        let run = response
            .json::<RunResponse>()
            .await
            .map_err(|e| self.classify(e))?;
        debug!(%request_id, status = %run.status, "Run finished");
        Ok(run)
    }

    /// Like [`execute`](Self::execute), rendered for people. Failures are
    /// rendered too, each with its own message.
    pub async fn execute_formatted(&self, language: &str, code: &str) -> String {
        match self.execute(language, code).await {
            Ok(response) => format_result(&response),
            Err(e) => {
                warn!("Run submission failed: {}", e);
                match e {
                    Error::Http(_) | Error::Configuration(_) => format!("Unexpected error: {}", e),
                    _ => e.to_string(),
                }
            }
        }
    }

    pub async fn run_python(&self, code: &str) -> String {
        self.execute_formatted("python", code).await
    }

    pub async fn run_javascript(&self, code: &str) -> String {
        self.execute_formatted("node", code).await
    }

    pub async fn run_ruby(&self, code: &str) -> String {
        self.execute_formatted("ruby", code).await
    }

    pub async fn run_php(&self, code: &str) -> String {
        self.execute_formatted("php", code).await
    }

    pub async fn run_go(&self, code: &str) -> String {
        self.execute_formatted("go", code).await
    }

    fn classify(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                seconds: self.config.timeout.as_secs(),
            }
        } else if e.is_connect() {
            Error::Connect {
                url: self.config.api_url.clone(),
                source: e,
            }
        } else {
            Error::Http(e)
        }
    }
}
