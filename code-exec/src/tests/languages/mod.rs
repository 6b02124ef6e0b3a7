use super::utils::defaults::*;
pub use super::*;
use crate::{
    languages::skip_if_not_available, CodeExecutor, ExecutionResult, ExecutionStatus, Language,
    Result,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::time::Duration;

pub mod cpp;
pub mod golang;
pub mod javascript;
pub mod php;
pub mod python;
pub mod ruby;
pub mod rust;

/// Compilers get more room than the request defaults so a cold toolchain
/// cache does not turn into a spurious failure.
fn compiled_request(language: Language, code: &str) -> Value {
    json!({
        "language": language.as_str(),
        "code": code,
        "limits": {"memory_mb": 1024, "cpu_ms": 60000, "timeout_ms": 10000}
    })
}

/// Run `request` with a custom compile budget.
pub(crate) async fn run_with_compile_timeout(
    request: Value,
    compile_timeout: Duration,
) -> Result<(TempDir, ExecutionResult)> {
    let dir = TempDir::new()?;
    let spec = load_spec(dir.path(), &request)?;
    let options = default_test_options(dir.path()).with_compile_timeout(compile_timeout);
    let result = CodeExecutor::new(options).execute(&spec).await?;
    Ok((dir, result))
}

// Common test utilities for language tests
pub(crate) async fn test_language_execution(language: Language, code: &str) -> Result<()> {
    if skip_if_not_available(language) {
        return Ok(());
    }
    let (_dir, result) = run_with_compile_timeout(
        compiled_request(language, code),
        Duration::from_secs(120),
    )
    .await?;

    assert_eq!(result.status, ExecutionStatus::Succeeded, "{:?}", result);
    assert!(result.stdout_lossy().contains("Hello from"));
    assert!(result.stderr.is_empty(), "stderr: {}", result.stderr_lossy());
    assert!(result.usage.wall_ms.is_some());
    Ok(())
}

pub(crate) async fn test_language_timeout(language: Language, code: &str) -> Result<()> {
    if skip_if_not_available(language) {
        return Ok(());
    }
    let mut request = compiled_request(language, code);
    request["limits"]["timeout_ms"] = json!(300);
    let (_dir, result) = run_with_compile_timeout(request, Duration::from_secs(120)).await?;

    assert_eq!(result.status, ExecutionStatus::Timeout);
    assert_eq!(result.exit_code, None);
    assert_eq!(result.message.as_deref(), Some("execution timed out"));
    Ok(())
}

pub(crate) async fn test_compile_error(language: Language, code: &str) -> Result<()> {
    if skip_if_not_available(language) {
        return Ok(());
    }
    let (dir, result) = run_with_compile_timeout(
        compiled_request(language, code),
        Duration::from_secs(120),
    )
    .await?;

    assert_eq!(result.status, ExecutionStatus::CompileError);
    assert_eq!(result.status.exit_code(), crate::EXIT_FAILURE);
    assert!(!result.stderr.is_empty());
    assert_eq!(result.message.as_deref(), Some("compilation failed"));
    assert!(result.usage.compile_ms.is_some());
    assert!(result.usage.wall_ms.is_none());
    assert!(!dir.path().join("main").exists());
    Ok(())
}

pub(crate) async fn test_compile_timeout(language: Language, code: &str) -> Result<()> {
    if skip_if_not_available(language) {
        return Ok(());
    }
    let (_dir, result) =
        run_with_compile_timeout(compiled_request(language, code), Duration::from_millis(1))
            .await?;

    assert_eq!(result.status, ExecutionStatus::Timeout);
    assert_eq!(result.status.exit_code(), crate::EXIT_TIMEOUT);
    assert_eq!(result.message.as_deref(), Some("compilation timed out"));
    assert!(result.usage.wall_ms.is_none());
    Ok(())
}
