pub mod defaults {
    use crate::{
        environment::SandboxEnvironment, executor_for, CodeExecutor, ExecutionResult,
        ExecutionSpec, LimitScope, Result, ResourceLimiter, RunnerOptions, Sandbox, SpecLoader,
    };
    use serde_json::Value;
    use std::path::Path;
    use tempfile::TempDir;
    use tokio::time::Duration;

    pub fn default_test_options(workdir: &Path) -> RunnerOptions {
        RunnerOptions::new(workdir)
            .with_limit_scope(LimitScope::PerChild)
            .with_drain_grace(Duration::from_millis(200))
    }

    pub fn load_spec(workdir: &Path, request: &Value) -> Result<ExecutionSpec> {
        SpecLoader::new(workdir).parse(request.to_string().as_bytes())
    }

    /// Run `request` through the full pipeline in a fresh working directory.
    pub async fn run_request(request: Value) -> Result<(TempDir, ExecutionResult)> {
        let dir = TempDir::new()?;
        let spec = load_spec(dir.path(), &request)?;
        let result = CodeExecutor::new(default_test_options(dir.path()))
            .execute(&spec)
            .await?;
        Ok((dir, result))
    }

    /// A sandbox over a fresh working directory with the limits in `request`.
    pub async fn setup_test_sandbox(request: Value) -> Result<(TempDir, Sandbox)> {
        let dir = TempDir::new()?;
        let spec = load_spec(dir.path(), &request)?;
        let executor = executor_for(spec.language());
        let env = SandboxEnvironment::prepare(&spec, executor.as_ref(), dir.path()).await?;
        let limiter = ResourceLimiter::new(spec.limits(), executor.memory_policy());
        let sandbox = Sandbox::new(
            env,
            &limiter,
            LimitScope::PerChild,
            spec.limits().max_output(),
            Duration::from_millis(200),
        );
        Ok((dir, sandbox))
    }

    pub fn default_timeout() -> Duration {
        Duration::from_secs(5)
    }
}
