//! Spec Loader: turns one raw request into a validated [`ExecutionSpec`].
//!
//! Loading has no side effects. Nothing is created on disk and no limit is
//! touched until a spec has passed every check here.

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

use crate::{
    error::Error,
    types::{ExecutionSpec, Language, ResourceLimits, SourceRef},
    Result,
};

#[derive(Debug, Deserialize)]
struct RawSpec {
    language: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    source_file: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: BTreeMap<String, String>,
    #[serde(default)]
    limits: RawLimits,
}

#[derive(Debug, Default, Deserialize)]
struct RawLimits {
    memory_mb: Option<u64>,
    cpu_ms: Option<u64>,
    timeout_ms: Option<u64>,
    max_output_bytes: Option<u64>,
}

impl RawLimits {
    fn resolve(self) -> Result<ResourceLimits> {
        let defaults = ResourceLimits::default();
        let limits = ResourceLimits {
            memory_mb: positive("memory_mb", self.memory_mb, defaults.memory_mb)?,
            cpu_ms: positive("cpu_ms", self.cpu_ms, defaults.cpu_ms)?,
            timeout_ms: positive("timeout_ms", self.timeout_ms, defaults.timeout_ms)?,
            max_output_bytes: positive(
                "max_output_bytes",
                self.max_output_bytes,
                defaults.max_output_bytes,
            )?,
        };
        Ok(limits)
    }
}

fn positive(name: &str, value: Option<u64>, default: u64) -> Result<u64> {
    match value {
        Some(0) => Err(Error::spec(format!("limits.{} must be positive", name))),
        Some(v) => Ok(v),
        None => Ok(default),
    }
}

fn env_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

/// Reads and validates execution requests for one working directory
#[derive(Debug, Clone)]
pub struct SpecLoader {
    workdir: PathBuf,
}

impl SpecLoader {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Read the whole request from `reader`, then validate it.
    pub fn load<R: Read>(&self, mut reader: R) -> Result<ExecutionSpec> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| Error::spec(format!("Failed to read request: {}", e)))?;
        self.parse(&buf)
    }

    pub fn parse(&self, input: &[u8]) -> Result<ExecutionSpec> {
        let raw: RawSpec = serde_json::from_slice(input)?;
        self.validate(raw)
    }

    fn validate(&self, raw: RawSpec) -> Result<ExecutionSpec> {
        let language: Language = raw.language.parse().map_err(Error::SpecParse)?;

        let source = match (raw.code, raw.source_file) {
            (Some(code), None) => SourceRef::Inline(code),
            (None, Some(file)) => SourceRef::File(self.staged_source(&file)?),
            (Some(_), Some(_)) => {
                return Err(Error::spec(
                    "exactly one of `code` and `source_file` may be given",
                ))
            }
            (None, None) => return Err(Error::spec("missing field `code`")),
        };

        if let Some(arg) = raw.args.iter().find(|a| a.contains('\0')) {
            return Err(Error::spec(format!("argument contains NUL byte: {:?}", arg)));
        }

        for (name, value) in &raw.env {
            if !env_name_pattern().is_match(name) {
                return Err(Error::spec(format!(
                    "invalid environment variable name: {:?}",
                    name
                )));
            }
            if value.contains('\0') {
                return Err(Error::spec(format!(
                    "environment variable {} contains NUL byte",
                    name
                )));
            }
        }

        let limits = raw.limits.resolve()?;
        debug!(%language, ?limits, "Loaded execution spec");

        Ok(ExecutionSpec {
            language,
            source,
            args: raw.args,
            env: raw.env,
            limits,
        })
    }

    fn staged_source(&self, file: &str) -> Result<PathBuf> {
        let path = Path::new(file);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if file.is_empty() || escapes {
            return Err(Error::spec(format!(
                "source_file must be a relative path inside the working directory: {:?}",
                file
            )));
        }
        if !self.workdir.join(path).is_file() {
            return Err(Error::spec(format!("source_file not found: {}", file)));
        }
        Ok(path.to_path_buf())
    }
}
