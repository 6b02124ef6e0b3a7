use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    Ruby,
    Php,
    Go,
    Rust,
    Cpp,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::Python,
        Language::JavaScript,
        Language::Ruby,
        Language::Php,
        Language::Go,
        Language::Rust,
        Language::Cpp,
    ];

    /// Canonical identifier, as used by the upstream API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "node",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Cpp => "cpp",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "python3" => Ok(Language::Python),
            "node" | "javascript" | "js" => Ok(Language::JavaScript),
            "ruby" => Ok(Language::Ruby),
            "php" => Ok(Language::Php),
            "go" | "golang" => Ok(Language::Go),
            "rust" => Ok(Language::Rust),
            "cpp" | "c++" => Ok(Language::Cpp),
            _ => Err(format!("Unsupported language: {}", s)),
        }
    }
}

/// Where the program source comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// Source text supplied in the request, staged under the language's file name
    Inline(String),
    /// Path relative to the working directory of a file already staged there
    File(PathBuf),
}

/// Resource limits requested for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Memory ceiling (MB)
    pub memory_mb: u64,
    /// CPU-time ceiling (ms)
    pub cpu_ms: u64,
    /// Wall-clock budget of the execute stage (ms)
    pub timeout_ms: u64,
    /// Ceiling on each captured stream (bytes)
    pub max_output_bytes: u64,
}

impl ResourceLimits {
    pub fn memory_bytes(&self) -> u64 {
        self.memory_mb.saturating_mul(1024 * 1024)
    }

    /// CPU ceiling in whole seconds, rounded up, never below one.
    pub fn cpu_seconds(&self) -> u64 {
        self.cpu_ms.div_ceil(1000).max(1)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn max_output(&self) -> usize {
        usize::try_from(self.max_output_bytes).unwrap_or(usize::MAX)
    }
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            memory_mb: 256,
            cpu_ms: 5000,
            timeout_ms: 5000,
            max_output_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// Validated, immutable description of one execution request.
///
/// Built only by [`crate::SpecLoader`]; there is no way to obtain one that
/// skipped validation.
#[derive(Debug, Clone)]
pub struct ExecutionSpec {
    pub(crate) language: Language,
    pub(crate) source: SourceRef,
    pub(crate) args: Vec<String>,
    pub(crate) env: BTreeMap<String, String>,
    pub(crate) limits: ResourceLimits,
}

impl ExecutionSpec {
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }
}

/// A program and its argument vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
    CompileError,
    Timeout,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Succeeded => "succeeded",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::CompileError => "compile_error",
            ExecutionStatus::Timeout => "timeout",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource usage of the children spawned by one invocation
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Wall time of the execute stage; absent when that stage never ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wall_ms: Option<u64>,
    /// Wall time of the compile stage, for compiled languages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_ms: Option<u64>,
    /// User plus system time of all reaped descendants
    pub cpu_ms: u64,
    /// Peak resident set size of the largest reaped descendant
    pub max_rss_mb: u64,
}

/// Execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    /// Program output, at most `max_output_bytes` long
    #[serde(with = "lossy_utf8")]
    pub stdout: Vec<u8>,
    /// Program errors (or compiler diagnostics), at most `max_output_bytes` long
    #[serde(with = "lossy_utf8")]
    pub stderr: Vec<u8>,
    #[serde(default)]
    pub stdout_truncated: bool,
    #[serde(default)]
    pub stderr_truncated: bool,
    /// Exit code of the last stage that ran; absent if it never exited on its own
    pub exit_code: Option<i32>,
    /// Terminating signal, when the child died from one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<i32>,
    /// Short description of a non-success outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub usage: Usage,
}

impl ExecutionResult {
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

mod lossy_utf8 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&String::from_utf8_lossy(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.into_bytes())
    }
}
