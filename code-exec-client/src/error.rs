use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Code execution timed out ({seconds} seconds limit)")]
    Timeout { seconds: u64 },

    #[error("Could not connect to code execution API at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Authentication failed. Check API key configuration.")]
    Unauthorized,

    #[error("Rate limited. Please wait before trying again.")]
    RateLimited,

    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}
