use std::path::Path;

use crate::{
    executor::{LanguageExecutor, ToolchainContext},
    languages::{path_arg, ToolCheck},
    types::{CommandLine, Language},
};

pub struct PythonExecutor;

impl PythonExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCheck for PythonExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["python3"]
    }
}

impl LanguageExecutor for PythonExecutor {
    fn language(&self) -> Language {
        Language::Python
    }

    fn source_file(&self) -> &str {
        "main.py"
    }

    fn environment(&self, _ctx: &ToolchainContext<'_>) -> Vec<(String, String)> {
        vec![
            ("PYTHONDONTWRITEBYTECODE".to_string(), "1".to_string()),
            ("PYTHONUNBUFFERED".to_string(), "1".to_string()),
        ]
    }

    fn run_command(&self, source: &Path, args: &[String]) -> CommandLine {
        let mut argv = vec![path_arg(source)];
        argv.extend(args.iter().cloned());
        CommandLine::new("python3", argv)
    }
}
