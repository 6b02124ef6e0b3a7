//! # Code Exec Client
//!
//! Submits source code to a code execution API and turns the outcome into
//! either a typed [`RunResponse`] or a human-readable report.
//!
//! Every failure class has its own [`Error`] variant and message: request
//! timeouts, unreachable endpoints, rejected credentials, rate limiting and
//! any other non-success status together with the response body.
//!
//! ## Example
//!
//! ```rust,no_run
//! use code_exec_client::{ClientConfig, CodeInterpreterClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("dev_123".to_string())
//!         .with_api_url("http://localhost:8080/v1/runs".to_string());
//!     let client = CodeInterpreterClient::new(config)?;
//!
//!     let response = client.execute("python", "print(2 + 2)").await?;
//!     println!("{}: {}", response.status, response.stdout);
//!
//!     println!("{}", client.run_go("package main\nfunc main() {}").await);
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod format;
mod types;

pub use client::CodeInterpreterClient;
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use error::Error;
pub use format::format_result;
pub use types::*;

/// Result type for API calls
pub type Result<T> = std::result::Result<T, Error>;
