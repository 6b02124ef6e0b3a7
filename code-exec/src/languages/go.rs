use std::path::Path;

use crate::{
    executor::{LanguageExecutor, ToolchainContext},
    languages::{path_arg, ToolCheck, ARTIFACT},
    limits::MemoryPolicy,
    types::{CommandLine, Language},
};

pub struct GoExecutor;

impl GoExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl ToolCheck for GoExecutor {
    fn required_tools(&self) -> Vec<&str> {
        vec!["go"]
    }
}

impl LanguageExecutor for GoExecutor {
    fn language(&self) -> Language {
        Language::Go
    }

    fn source_file(&self) -> &str {
        "main.go"
    }

    fn search_paths(&self) -> Vec<&str> {
        vec!["/usr/local/go/bin"]
    }

    /// The Go allocator maps large arenas up front and fails under RLIMIT_AS;
    /// GOMEMLIMIT keeps the heap near the ceiling instead.
    fn memory_policy(&self) -> MemoryPolicy {
        MemoryPolicy::DataSegment
    }

    fn environment(&self, ctx: &ToolchainContext<'_>) -> Vec<(String, String)> {
        vec![
            (
                "GOPATH".to_string(),
                path_arg(&ctx.tmp_dir.join("go")),
            ),
            (
                "GOCACHE".to_string(),
                path_arg(&ctx.tmp_dir.join("go-cache")),
            ),
            (
                "GOMEMLIMIT".to_string(),
                format!("{}B", ctx.limits.memory_bytes()),
            ),
            ("GOGC".to_string(), "50".to_string()),
        ]
    }

    fn compile_command(&self, source: &Path) -> Option<CommandLine> {
        Some(CommandLine::new(
            "go",
            [
                "build".to_string(),
                "-ldflags".to_string(),
                "-s -w".to_string(),
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
