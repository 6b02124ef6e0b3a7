use super::{
    fixtures::{broken_code::GO_BROKEN, code_samples::GO_HELLO, test_scenarios::GO_INFINITE_LOOP},
    *,
};
use crate::Error;

#[tokio::test]
async fn test_go_basic() -> std::result::Result<(), Error> {
    test_language_execution(Language::Go, GO_HELLO).await
}

#[tokio::test]
async fn test_go_timeout() -> std::result::Result<(), Error> {
    test_language_timeout(Language::Go, GO_INFINITE_LOOP).await
}

#[tokio::test]
async fn test_go_compile_error() -> std::result::Result<(), Error> {
    test_compile_error(Language::Go, GO_BROKEN).await
}

#[tokio::test]
async fn test_go_compile_timeout() -> std::result::Result<(), Error> {
    test_compile_timeout(Language::Go, GO_HELLO).await
}

#[tokio::test]
async fn test_go_arguments_and_outputs() -> Result<()> {
    if skip_if_not_available(Language::Go) {
        return Ok(());
    }
    let mut request = compiled_request(Language::Go, GO_HELLO);
    request["args"] = json!(["arg1", "arg2"]);
    let (dir, result) = run_with_compile_timeout(request, Duration::from_secs(120)).await?;

    assert_eq!(result.status, ExecutionStatus::Succeeded);
    let stdout = result.stdout_lossy();
    assert!(stdout.contains("Hello from Go!"));
    assert!(stdout.contains("Arguments received: [arg1 arg2]"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("outputs/test.txt"))?,
        "Go can write files!"
    );
    assert!(result.usage.compile_ms.is_some());
    // Build cache stays inside the working directory
    assert!(dir.path().join("tmp/go-cache").exists());
    Ok(())
}
