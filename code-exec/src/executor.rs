use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::{
    environment::SandboxEnvironment,
    error::Error,
    languages::{executor_for, ToolCheck},
    limits::{LimitScope, MemoryPolicy, ResourceLimiter},
    sandbox::{become_subreaper, Sandbox, StageOutcome},
    status::PipelineOutcome,
    types::{CommandLine, ExecutionResult, ExecutionSpec, Language, ResourceLimits, SourceRef},
    usage::UsageReporter,
    Result,
};

/// Default compile-phase budget
pub const DEFAULT_COMPILE_TIMEOUT: Duration = Duration::from_secs(10);
/// How long to keep draining pipes after the child is gone
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// What a language toolchain needs to know to build its variables
pub struct ToolchainContext<'a> {
    pub workdir: &'a Path,
    pub tmp_dir: &'a Path,
    pub limits: &'a ResourceLimits,
}

/// Trait for language-specific code executors
pub trait LanguageExecutor: ToolCheck + Send + Sync {
    fn language(&self) -> Language;

    /// File name inline source is staged under
    fn source_file(&self) -> &str;

    /// Toolchain directories appended to the fixed search path
    fn search_paths(&self) -> Vec<&str> {
        Vec::new()
    }

    fn memory_policy(&self) -> MemoryPolicy {
        MemoryPolicy::AddressSpace
    }

    /// Toolchain variables; callers may override these
    fn environment(&self, _ctx: &ToolchainContext<'_>) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Build command for languages translated ahead of time
    fn compile_command(&self, _source: &Path) -> Option<CommandLine> {
        None
    }

    fn run_command(&self, source: &Path, args: &[String]) -> CommandLine;
}

/// Per-runner settings that do not come from the request
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub workdir: PathBuf,
    pub compile_timeout: Duration,
    pub limit_scope: LimitScope,
    pub drain_grace: Duration,
}

impl RunnerOptions {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            compile_timeout: DEFAULT_COMPILE_TIMEOUT,
            limit_scope: LimitScope::PerChild,
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }

    pub fn with_compile_timeout(mut self, timeout: Duration) -> Self {
        self.compile_timeout = timeout;
        self
    }

    pub fn with_limit_scope(mut self, scope: LimitScope) -> Self {
        self.limit_scope = scope;
        self
    }

    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }
}

/// Runs one validated spec through the stage pipeline
pub struct CodeExecutor {
    options: RunnerOptions,
}

impl CodeExecutor {
    pub fn new(options: RunnerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Execute `spec` and report what happened.
    ///
    /// Returns `Err` only when no child could be started: sandbox setup,
    /// limit installation or toolchain lookup failed. Every outcome after the
    /// first spawn, including compile failures and timeouts, is an `Ok`
    /// result carrying usage.
    pub async fn execute(&self, spec: &ExecutionSpec) -> Result<ExecutionResult> {
        let executor = executor_for(spec.language());
        self.execute_with(spec, executor.as_ref()).await
    }

    /// Execute `spec` with a toolchain other than the built-in one for its
    /// language.
    pub async fn execute_with(
        &self,
        spec: &ExecutionSpec,
        executor: &dyn LanguageExecutor,
    ) -> Result<ExecutionResult> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id, language = %spec.language());
        self.execute_inner(spec, executor).instrument(span).await
    }

    async fn execute_inner(
        &self,
        spec: &ExecutionSpec,
        executor: &dyn LanguageExecutor,
    ) -> Result<ExecutionResult> {
        let workdir = self.options.workdir.as_path();

        let env = SandboxEnvironment::prepare(spec, executor, workdir).await?;
        let source = self.stage_source(spec, executor).await?;
        executor.check_tools(env.search_path(), workdir)?;

        let limiter = ResourceLimiter::new(spec.limits(), executor.memory_policy());
        if self.options.limit_scope == LimitScope::Process {
            limiter.install_current_process()?;
            become_subreaper()?;
        }

        let sandbox = Sandbox::new(
            env,
            &limiter,
            self.options.limit_scope,
            spec.limits().max_output(),
            self.options.drain_grace,
        );
        let mut usage = UsageReporter::start();

        if let Some(build) = executor.compile_command(&source) {
            debug!("Compiling: {}", build);
            let report = sandbox.execute(&build, self.options.compile_timeout).await?;
            usage.record_compile(report.elapsed);

            let failed = match report.outcome {
                StageOutcome::TimedOut => Some(PipelineOutcome::CompileTimedOut(report)),
                outcome if !outcome.succeeded() => Some(PipelineOutcome::CompileFailed(report)),
                _ => None,
            };
            if let Some(outcome) = failed {
                let result = outcome.into_result(usage.finish());
                info!(status = %result.status, "Compilation did not produce an artifact");
                return Ok(result);
            }
        }

        let run = executor.run_command(&source, spec.args());
        debug!("Running: {}", run);
        let report = sandbox.execute(&run, spec.limits().timeout()).await?;
        usage.record_execute(report.elapsed);

        let result = PipelineOutcome::Executed(report).into_result(usage.finish());
        info!(
            status = %result.status,
            exit_code = ?result.exit_code,
            wall_ms = ?result.usage.wall_ms,
            "Execution finished"
        );
        Ok(result)
    }

    /// Write inline source under the language's file name; a staged file is
    /// used where it is.
    async fn stage_source(
        &self,
        spec: &ExecutionSpec,
        executor: &dyn LanguageExecutor,
    ) -> Result<PathBuf> {
        match spec.source() {
            SourceRef::Inline(code) => {
                let relative = PathBuf::from(executor.source_file());
                fs::write(self.options.workdir.join(&relative), code)
                    .await
                    .map_err(|e| Error::infra(format!("Failed to stage source file: {}", e)))?;
                Ok(relative)
            }
            SourceRef::File(path) => Ok(path.clone()),
        }
    }
}
