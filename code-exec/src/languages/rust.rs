use std::path::Path;

use crate::{
    executor::LanguageExecutor,
    languages::{path_arg, ToolCheck, ARTIFACT},
    limits::MemoryPolicy,
    types::{CommandLine, Language},
};

pub struct RustExecutor;

impl RustExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCheck for RustExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["rustc"]
    }
}

impl LanguageExecutor for RustExecutor {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn source_file(&self) -> &str {
        "main.rs"
    }

    fn search_paths(&self) -> Vec<&str> {
        vec!["/usr/local/cargo/bin"]
    }

    /// rustc maps LLVM's arenas well past the resident size it needs.
    fn memory_policy(&self) -> MemoryPolicy {
        MemoryPolicy::DataSegment
    }

    fn compile_command(&self, source: &Path) -> Option<CommandLine> {
        Some(CommandLine::new(
            "rustc",
            [
                "-O".to_string(),
                "-o".to_string(),
                ARTIFACT.to_string(),
                path_arg(source),
            ],
        ))
    }

    fn run_command(&self, _source: &Path, args: &[String]) -> CommandLine {
        CommandLine::new(&format!("./{}", ARTIFACT), args.iter().cloned())
    }
}
