use std::path::Path;

use crate::{
    executor::LanguageExecutor,
    languages::{path_arg, ToolCheck},
    types::{CommandLine, Language},
};

pub struct PhpExecutor;

impl PhpExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCheck for PhpExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["php"]
    }
}

impl LanguageExecutor for PhpExecutor {
    fn language(&self) -> Language {
        Language::Php
    }

    fn source_file(&self) -> &str {
        "main.php"
    }

    fn run_command(&self, source: &Path, args: &[String]) -> CommandLine {
        // -n: ignore php.ini so host configuration cannot loosen limits
        let mut argv = vec!["-n".to_string(), path_arg(source)];
        argv.extend(args.iter().cloned());
        CommandLine::new("php", argv)
    }
}
