use serde::{Deserialize, Serialize};

/// Body posted to the runs endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RunRequest<'a> {
    pub language: &'a str,
    pub code: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunUsage {
    #[serde(default)]
    pub wall_ms: Option<u64>,
    #[serde(default)]
    pub compile_ms: Option<u64>,
    #[serde(default)]
    pub cpu_ms: Option<u64>,
    #[serde(default)]
    pub max_rss_mb: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub status: String,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub usage: Option<RunUsage>,
}

impl RunResponse {
    pub fn succeeded(&self) -> bool {
        self.status == "succeeded"
    }
}
