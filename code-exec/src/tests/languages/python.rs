use super::{
    fixtures::{code_samples::PYTHON_HELLO, test_scenarios::*},
    *,
};
use crate::{executor_for, Error, LanguageExecutor};

#[tokio::test]
async fn test_python_basic() -> std::result::Result<(), Error> {
    test_language_execution(Language::Python, PYTHON_HELLO).await
}

#[tokio::test]
async fn test_python_timeout() -> std::result::Result<(), Error> {
    test_language_timeout(Language::Python, PYTHON_INFINITE_LOOP).await
}

#[tokio::test]
async fn test_python_writes_into_outputs() -> Result<()> {
    if skip_if_not_available(Language::Python) {
        return Ok(());
    }
    let (dir, result) = run_request(json!({
        "language": "python3",
        "code": "open('outputs/result.txt', 'w').write('done')"
    }))
    .await?;
    assert_eq!(result.status, ExecutionStatus::Succeeded);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("outputs/result.txt"))?,
        "done"
    );
    Ok(())
}

#[tokio::test]
async fn test_python_unbuffered_output_survives_crash() -> Result<()> {
    if skip_if_not_available(Language::Python) {
        return Ok(());
    }
    let (_dir, result) = run_request(json!({
        "language": "python",
        "code": "import os\nprint('flushed')\nos.abort()"
    }))
    .await?;
    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.stdout, b"flushed\n");
    assert!(result.signal.is_some());
    Ok(())
}

#[test]
fn test_python_is_interpreted() {
    let executor = executor_for(Language::Python);
    assert!(executor
        .compile_command(std::path::Path::new("main.py"))
        .is_none());
    assert_eq!(executor.source_file(), "main.py");
}
