use std::path::Path;

use crate::{
    executor::{LanguageExecutor, ToolchainContext},
    languages::{path_arg, ToolCheck},
    limits::MemoryPolicy,
    types::{CommandLine, Language},
};

pub struct JavaScriptExecutor;

impl JavaScriptExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCheck for JavaScriptExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["node"]
    }
}

impl LanguageExecutor for JavaScriptExecutor {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn source_file(&self) -> &str {
        "main.js"
    }

    /// V8 reserves far more address space than it commits.
    fn memory_policy(&self) -> MemoryPolicy {
        MemoryPolicy::DataSegment
    }

    fn environment(&self, ctx: &ToolchainContext<'_>) -> Vec<(String, String)> {
        vec![(
            "NODE_OPTIONS".to_string(),
            format!("--max-old-space-size={}", ctx.limits.memory_mb),
        )]
    }

    fn run_command(&self, source: &Path, args: &[String]) -> CommandLine {
        let mut argv = vec![path_arg(source)];
        argv.extend(args.iter().cloned());
        CommandLine::new("node", argv)
    }
}
