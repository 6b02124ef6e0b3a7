//! Language-specific executor implementations

mod cpp;
mod go;
mod javascript;
mod php;
mod python;
mod ruby;
mod rust;

pub use cpp::CppExecutor;
pub use go::GoExecutor;
pub use javascript::JavaScriptExecutor;
pub use php::PhpExecutor;
pub use python::PythonExecutor;
pub use ruby::RubyExecutor;
pub use rust::RustExecutor;

use std::path::Path;
use which::which_in;

use crate::{error::Error, executor::LanguageExecutor, types::Language, Result};

/// Name of the artifact produced by every compile stage.
pub(crate) const ARTIFACT: &str = "main";

pub trait ToolCheck {
    fn required_tools(&self) -> Vec<&str>;

    /// Every required tool must resolve on the sandbox search path, not the host's.
    fn check_tools(&self, search_path: &str, cwd: &Path) -> Result<()> {
        let missing: Vec<_> = self
            .required_tools()
            .iter()
            .filter(|tool| which_in(tool, Some(search_path), cwd).is_err())
            .map(|s| (*s).to_string())
            .collect();

        if !missing.is_empty() {
            return Err(Error::infra(format!(
                "Missing required tools: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

pub fn executor_for(language: Language) -> Box<dyn LanguageExecutor> {
    match language {
        Language::Python => Box::new(PythonExecutor::new()),
        Language::JavaScript => Box::new(JavaScriptExecutor::new()),
        Language::Ruby => Box::new(RubyExecutor::new()),
        Language::Php => Box::new(PhpExecutor::new()),
        Language::Go => Box::new(GoExecutor::new()),
        Language::Rust => Box::new(RustExecutor::new()),
        Language::Cpp => Box::new(CppExecutor::new()),
    }
}

pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
pub(crate) fn skip_if_not_available(language: Language) -> bool {
    let executor = executor_for(language);
    let search_path = crate::environment::search_path_for(executor.as_ref());
    if let Err(e) = executor.check_tools(&search_path, Path::new("/")) {
        eprintln!("Skipping test: {}", e);
        return true;
    }
    false
}
