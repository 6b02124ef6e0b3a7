use std::path::Path;

use crate::{
    executor::LanguageExecutor,
    languages::{path_arg, ToolCheck, ARTIFACT},
    types::{CommandLine, Language},
};

pub struct CppExecutor;

impl CppExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCheck for CppExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["g++"]
    }
}

impl LanguageExecutor for CppExecutor {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn source_file(&self) -> &str {
        "main.cpp"
    }

    fn compile_command(&self, source: &Path) -> Option<CommandLine> {
        Some(CommandLine::new(
            "g++",
            [
                "-O2".to_string(),
                "-std=c++17".to_string(),
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
