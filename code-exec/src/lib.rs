//! # Code Execution Runner
//!
//! Runs one piece of untrusted source code inside an already provisioned
//! sandbox: validates the request, builds an explicit environment, installs
//! resource ceilings, optionally compiles, executes under a wall-clock
//! budget, and reports bounded output together with kernel-side usage.

mod capture;
mod environment;
mod error;
mod executor;
mod languages;
mod limits;
mod sandbox;
mod spec;
mod status;
mod types;
mod usage;

#[cfg(test)]
mod tests;

pub use capture::Captured;
pub use environment::{SandboxEnvironment, BASE_SEARCH_PATH, PROTECTED_VARS, SCRATCH_DIRS};
pub use error::Error;
pub use executor::{
    CodeExecutor, LanguageExecutor, RunnerOptions, ToolchainContext, DEFAULT_COMPILE_TIMEOUT,
    DEFAULT_DRAIN_GRACE,
};
pub use languages::{executor_for, ToolCheck};
pub use limits::{
    LimitScope, MemoryPolicy, ResourceLimiter, Rule, FILE_SIZE_LIMIT, OPEN_FILES_LIMIT,
    PROCESS_LIMIT,
};
pub use sandbox::{ChildReport, Sandbox, StageOutcome};
pub use spec::SpecLoader;
pub use status::{PipelineOutcome, EXIT_FAILURE, EXIT_SUCCESS, EXIT_TIMEOUT};
pub use types::{
    CommandLine, ExecutionResult, ExecutionSpec, ExecutionStatus, Language, ResourceLimits,
    SourceRef, Usage,
};
pub use usage::{ChildrenUsage, UsageReporter};

/// Result type for code execution operations
pub type Result<T> = std::result::Result<T, Error>;
