use super::{
    fixtures::{broken_code::RUST_BROKEN, code_samples::RUST_HELLO},
    *,
};
use crate::Error;

const RUST_INFINITE_LOOP: &str = "fn main() { loop { std::hint::spin_loop(); } }";

#[tokio::test]
async fn test_rust_basic() -> std::result::Result<(), Error> {
    test_language_execution(Language::Rust, RUST_HELLO).await
}

#[tokio::test]
async fn test_rust_timeout() -> std::result::Result<(), Error> {
    test_language_timeout(Language::Rust, RUST_INFINITE_LOOP).await
}

#[tokio::test]
async fn test_rust_compile_error() -> std::result::Result<(), Error> {
    test_compile_error(Language::Rust, RUST_BROKEN).await
}

#[tokio::test]
async fn test_rust_panic_is_failure() -> Result<()> {
    if skip_if_not_available(Language::Rust) {
        return Ok(());
    }
    let (_dir, result) = run_with_compile_timeout(
        compiled_request(Language::Rust, r#"fn main() { panic!("oh no"); }"#),
        Duration::from_secs(120),
    )
    .await?;
    assert_eq!(result.status, ExecutionStatus::Failed);
    assert_eq!(result.exit_code, Some(101));
    assert!(result.stderr_lossy().contains("oh no"));
    Ok(())
}
