use super::{fixtures::code_samples::RUBY_HELLO, *};
use crate::Error;

#[tokio::test]
async fn test_ruby_basic() -> std::result::Result<(), Error> {
    test_language_execution(Language::Ruby, RUBY_HELLO).await
}

#[tokio::test]
async fn test_ruby_timeout() -> std::result::Result<(), Error> {
    test_language_timeout(Language::Ruby, "loop { }").await
}

#[tokio::test]
async fn test_ruby_arguments() -> Result<()> {
    if skip_if_not_available(Language::Ruby) {
        return Ok(());
    }
    let (_dir, result) = run_request(json!({
        "language": "ruby",
        "code": "puts ARGV.join(',')",
        "args": ["x", "y"]
    }))
    .await?;
    assert_eq!(result.stdout_lossy(), "x,y\n");
    Ok(())
}
