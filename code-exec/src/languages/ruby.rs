use std::path::Path;

use crate::{
    executor::LanguageExecutor,
    languages::{path_arg, ToolCheck},
    types::{CommandLine, Language},
};

pub struct RubyExecutor;

impl RubyExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCheck for RubyExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["ruby"]
    }
}

impl LanguageExecutor for RubyExecutor {
    fn language(&self) -> Language {
        Language::Ruby
    }

    fn source_file(&self) -> &str {
        "main.rb"
    }

    fn run_command(&self, source: &Path, args: &[String]) -> CommandLine {
        let mut argv = vec![path_arg(source)];
        argv.extend(args.iter().cloned());
        CommandLine::new("ruby", argv)
    }
}
