use super::{fixtures::code_samples::PHP_HELLO, *};
use crate::Error;

#[tokio::test]
async fn test_php_basic() -> std::result::Result<(), Error> {
    test_language_execution(Language::Php, PHP_HELLO).await
}

#[tokio::test]
async fn test_php_exit_code() -> Result<()> {
    if skip_if_not_available(Language::Php) {
        return Ok(());
    }
    let (_dir, result) = run_request(json!({
        "language": "php",
        "code": "<?php echo \"bye\\n\"; exit(4);"
    }))
    .await?;
    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.exit_code, Some(4));
    assert_eq!(result.stdout_lossy(), "bye\n");
    Ok(())
}
