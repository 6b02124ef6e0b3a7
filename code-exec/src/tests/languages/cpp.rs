use super::{
    fixtures::{broken_code::CPP_BROKEN, code_samples::CPP_HELLO},
    *,
};
use crate::Error;

#[tokio::test]
async fn test_cpp_basic() -> std::result::Result<(), Error> {
    test_language_execution(Language::Cpp, CPP_HELLO).await
}

#[tokio::test]
async fn test_cpp_compile_error() -> std::result::Result<(), Error> {
    test_compile_error(Language::Cpp, CPP_BROKEN).await
}

#[tokio::test]
async fn test_cpp_timeout() -> std::result::Result<(), Error> {
    test_language_timeout(Language::Cpp, "int main() { volatile int x = 0; for (;;) { x++; } }")
        .await
}
