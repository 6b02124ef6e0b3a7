//! Entrypoint plumbing for the sandbox runner: read one request, run it,
//! forward the bounded streams and persist the usage record.

use code_exec::{
    CodeExecutor, ExecutionResult, ExecutionStatus, LimitScope, RunnerOptions, SpecLoader,
    DEFAULT_COMPILE_TIMEOUT,
};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default usage record location, relative to the working directory
pub const DEFAULT_USAGE_FILE: &str = "usage.json";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Exec(#[from] code_exec::Error),
    #[error("Failed to write {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Failed to forward output: {0}")]
    Forward(std::io::Error),
}

/// Settings for one runner invocation
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub workdir: PathBuf,
    pub usage_file: PathBuf,
    pub result_file: Option<PathBuf>,
    pub compile_timeout: Duration,
    pub limit_scope: LimitScope,
}

impl RunnerConfig {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            usage_file: PathBuf::from(DEFAULT_USAGE_FILE),
            result_file: None,
            compile_timeout: DEFAULT_COMPILE_TIMEOUT,
            limit_scope: LimitScope::Process,
        }
    }

    /// Relative record paths are resolved against the working directory.
    fn resolve(&self, path: &Path) -> PathBuf {
        self.workdir.join(path)
    }
}

/// Run the request read from `input` and forward its streams.
///
/// The returned status decides the process exit code. `Err` means the runner
/// itself failed and nothing useful was produced.
pub async fn run<R, O, E>(
    config: &RunnerConfig,
    input: R,
    stdout: &mut O,
    stderr: &mut E,
) -> Result<ExecutionStatus, Error>
where
    R: Read,
    O: Write,
    E: Write,
{
    let spec = SpecLoader::new(&config.workdir).load(input)?;
    debug!(language = %spec.language(), limits = ?spec.limits(), "Loaded request");

    let options = RunnerOptions::new(&config.workdir)
        .with_compile_timeout(config.compile_timeout)
        .with_limit_scope(config.limit_scope);
    let result = CodeExecutor::new(options).execute(&spec).await?;

    forward(&result, stdout, stderr).map_err(Error::Forward)?;
    persist(&config.resolve(&config.usage_file), &result.usage)?;
    if let Some(path) = &config.result_file {
        persist(&config.resolve(path), &result)?;
    }

    info!(status = %result.status, "Runner finished");
    Ok(result.status)
}

fn forward<O: Write, E: Write>(
    result: &ExecutionResult,
    stdout: &mut O,
    stderr: &mut E,
) -> std::io::Result<()> {
    stdout.write_all(&result.stdout)?;
    stdout.flush()?;

    stderr.write_all(&result.stderr)?;
    // Outside the captured stream, so the byte ceiling still holds exactly
    if let Some(message) = &result.message {
        if !result.stderr.is_empty() && !result.stderr.ends_with(b"\n") {
            stderr.write_all(b"\n")?;
        }
        writeln!(stderr, "{}", message)?;
    }
    stderr.flush()
}

fn persist<T: serde::Serialize>(path: &Path, record: &T) -> Result<(), Error> {
    let encoded = serde_json::to_vec(record)?;
    std::fs::write(path, encoded).map_err(|source| Error::Persist {
        path: path.to_path_buf(),
        source,
    })
}
