use super::{fixtures::code_samples::JS_HELLO, *};
use crate::Error;

const JS_INFINITE_LOOP: &str = "while (true) {}";

#[tokio::test]
async fn test_javascript_basic() -> std::result::Result<(), Error> {
    test_language_execution(Language::JavaScript, JS_HELLO).await
}

#[tokio::test]
async fn test_javascript_timeout() -> std::result::Result<(), Error> {
    test_language_timeout(Language::JavaScript, JS_INFINITE_LOOP).await
}

#[tokio::test]
async fn test_javascript_uncaught_error() -> Result<()> {
    if skip_if_not_available(Language::JavaScript) {
        return Ok(());
    }
    let (_dir, result) = run_request(json!({
        "language": "node",
        "code": "throw new Error('kaboom')",
        "limits": {"memory_mb": 1024}
    }))
    .await?;
    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.exit_code, Some(1));
    assert!(result.stderr_lossy().contains("kaboom"));
    Ok(())
}

#[tokio::test]
async fn test_javascript_heap_ceiling_exported() -> Result<()> {
    if skip_if_not_available(Language::JavaScript) {
        return Ok(());
    }
    let (_dir, result) = run_request(json!({
        "language": "js",
        "code": "console.log(process.env.NODE_OPTIONS)",
        "limits": {"memory_mb": 512}
    }))
    .await?;
    assert_eq!(result.stdout_lossy(), "--max-old-space-size=512\n");
    Ok(())
}
