//! Exit/Status Mapper: turns stage outcomes into the result and the runner's
//! own exit code.
//!
//! The exit-code vocabulary is fixed. Orchestrators classify runs from it
//! without parsing output, so it must not grow.

use nix::errno::Errno;
use nix::sys::signal::Signal;

use crate::{
    sandbox::{ChildReport, StageOutcome},
    types::{ExecutionResult, ExecutionStatus, Usage},
};

/// Execution completed with a zero exit
pub const EXIT_SUCCESS: u8 = 0;
/// Compile or execution failure, or any fatal runner error
pub const EXIT_FAILURE: u8 = 1;
/// Compile or execute stage ran out of wall-clock time
pub const EXIT_TIMEOUT: u8 = 124;

impl ExecutionStatus {
    pub fn exit_code(&self) -> u8 {
        match self {
            ExecutionStatus::Succeeded => EXIT_SUCCESS,
            ExecutionStatus::Failed | ExecutionStatus::CompileError => EXIT_FAILURE,
            ExecutionStatus::Timeout => EXIT_TIMEOUT,
        }
    }
}

/// Tagged result of the whole pipeline; the last stage that ran decides it
#[derive(Debug)]
pub enum PipelineOutcome {
    CompileFailed(ChildReport),
    CompileTimedOut(ChildReport),
    Executed(ChildReport),
}

impl PipelineOutcome {
    pub fn into_result(self, usage: Usage) -> ExecutionResult {
        let (status, exit_code, signal, message, report) = match self {
            PipelineOutcome::CompileTimedOut(report) => (
                ExecutionStatus::Timeout,
                None,
                None,
                Some("compilation timed out".to_string()),
                report,
            ),
            PipelineOutcome::CompileFailed(report) => {
                let (exit_code, signal) = exit_and_signal(report.outcome);
                (
                    ExecutionStatus::CompileError,
                    exit_code,
                    signal,
                    Some("compilation failed".to_string()),
                    report,
                )
            }
            PipelineOutcome::Executed(report) => match report.outcome {
                StageOutcome::Exited(0) => (ExecutionStatus::Succeeded, Some(0), None, None, report),
                StageOutcome::Exited(code) => {
                    (ExecutionStatus::Failed, Some(code), None, None, report)
                }
                StageOutcome::Signaled(signal) => (
                    ExecutionStatus::Failed,
                    None,
                    Some(signal),
                    Some(describe_signal(signal)),
                    report,
                ),
                StageOutcome::TimedOut => (
                    ExecutionStatus::Timeout,
                    None,
                    None,
                    Some("execution timed out".to_string()),
                    report,
                ),
                StageOutcome::SpawnRefused(errno) => (
                    ExecutionStatus::Failed,
                    None,
                    None,
                    Some(describe_refusal(errno)),
                    report,
                ),
            },
        };

        ExecutionResult {
            status,
            stdout: report.stdout.bytes,
            stderr: report.stderr.bytes,
            stdout_truncated: report.stdout.truncated,
            stderr_truncated: report.stderr.truncated,
            exit_code,
            signal,
            message,
            usage,
        }
    }
}

fn exit_and_signal(outcome: StageOutcome) -> (Option<i32>, Option<i32>) {
    match outcome {
        StageOutcome::Exited(code) => (Some(code), None),
        StageOutcome::Signaled(signal) => (None, Some(signal)),
        StageOutcome::TimedOut | StageOutcome::SpawnRefused(_) => (None, None),
    }
}

fn describe_refusal(errno: i32) -> String {
    format!(
        "program could not start under the memory limit ({})",
        Errno::from_raw(errno).desc()
    )
}

fn describe_signal(signal: i32) -> String {
    match Signal::try_from(signal) {
        Ok(Signal::SIGXCPU) => "cpu time limit exceeded (SIGXCPU)".to_string(),
        Ok(Signal::SIGXFSZ) => "file size limit exceeded (SIGXFSZ)".to_string(),
        Ok(sig) => format!("terminated by signal {} ({})", signal, sig.as_str()),
        Err(_) => format!("terminated by signal {}", signal),
    }
}
