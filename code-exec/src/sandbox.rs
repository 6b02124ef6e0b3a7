use nix::errno::Errno;
use nix::sys::signal::{kill, killpg, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::fs;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;
use tokio::{
    process::Command,
    time::{self, Duration},
};
use tracing::{debug, warn};
use which::which_in;

use crate::{
    capture::{Captured, StreamCapture},
    environment::SandboxEnvironment,
    error::Error,
    limits::{LimitScope, ResourceLimiter, Rule},
    types::CommandLine,
    Result,
};

/// How a spawned child ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Ran to completion with this exit code
    Exited(i32),
    /// Killed by a signal the runner did not send (CPU or memory ceiling, crash)
    Signaled(i32),
    /// The wall-clock budget ran out and the process tree was killed
    TimedOut,
    /// The program could not be started under the memory ceiling; carries
    /// the errno exec failed with
    SpawnRefused(i32),
}

impl StageOutcome {
    fn from_status(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => StageOutcome::Exited(code),
            (None, Some(signal)) => StageOutcome::Signaled(signal),
            (None, None) => StageOutcome::Exited(-1),
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, StageOutcome::Exited(0))
    }
}

/// Everything observed about one child process
#[derive(Debug, Clone)]
pub struct ChildReport {
    pub outcome: StageOutcome,
    pub stdout: Captured,
    pub stderr: Captured,
    pub elapsed: Duration,
}

/// Spawns children inside the prepared working directory with the explicit
/// environment and ceilings of one invocation
pub struct Sandbox {
    env: SandboxEnvironment,
    rules: Vec<Rule>,
    scope: LimitScope,
    max_output: usize,
    drain_grace: Duration,
}

impl Sandbox {
    pub fn new(
        env: SandboxEnvironment,
        limiter: &ResourceLimiter,
        scope: LimitScope,
        max_output: usize,
        drain_grace: Duration,
    ) -> Self {
        Self {
            env,
            rules: limiter.child_rules(scope),
            scope,
            max_output,
            drain_grace,
        }
    }

    pub fn environment(&self) -> &SandboxEnvironment {
        &self.env
    }

    fn limits_memory(&self) -> bool {
        self.rules.iter().any(Rule::is_memory)
    }

    fn resolve(&self, program: &str) -> Result<PathBuf> {
        if program.starts_with("./") {
            return Ok(self.env.workdir().join(program));
        }
        which_in(program, Some(self.env.search_path()), self.env.workdir())
            .map_err(|_| Error::infra(format!("Command not found: {}", program)))
    }

    /// Run `command` to completion or until `timeout` elapses.
    ///
    /// Both output streams are drained while waiting. On timeout the child's
    /// whole process tree is killed and reaped, and whatever it wrote up to
    /// that point is still returned.
    pub async fn execute(&self, command: &CommandLine, timeout: Duration) -> Result<ChildReport> {
        let program = self.resolve(&command.program)?;
        debug!("Sandbox execute - Command: {}", command);
        debug!("Sandbox execute - Root dir: {:?}", self.env.workdir());

        let mut cmd = Command::new(&program);
        cmd.args(&command.args)
            .env_clear()
            .envs(self.env.vars())
            .current_dir(self.env.workdir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            // Own group, so the whole tree can be signalled at once
            .process_group(0);

        if !self.rules.is_empty() {
            let rules = self.rules.clone();
            unsafe {
                cmd.pre_exec(move || ResourceLimiter::apply_in_child(&rules));
            }
        }

        let started = Instant::now();
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.raw_os_error() == Some(Errno::ENOMEM as i32) && self.limits_memory() => {
                warn!("{} could not start under the memory ceiling: {}", command.program, e);
                return Ok(ChildReport {
                    outcome: StageOutcome::SpawnRefused(Errno::ENOMEM as i32),
                    stdout: Captured::default(),
                    stderr: Captured::default(),
                    elapsed: started.elapsed(),
                });
            }
            Err(e) => {
                return Err(Error::infra(format!(
                    "Failed to spawn {}: {}",
                    command.program, e
                )))
            }
        };
        let root = child.id().map(|id| Pid::from_raw(id as i32));

        let stdout = StreamCapture::spawn("stdout", child.stdout.take(), self.max_output);
        let stderr = StreamCapture::spawn("stderr", child.stderr.take(), self.max_output);

        let outcome = match time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => StageOutcome::from_status(status),
            Ok(Err(e)) => {
                if let Some(root) = root {
                    kill_tree(root);
                    terminate_group(root);
                }
                return Err(Error::infra(format!("Failed to wait for child: {}", e)));
            }
            Err(_) => {
                warn!("{} exceeded {:?}, killing process tree", command.program, timeout);
                if let Some(root) = root {
                    // The root is still alive, so descendants that left its
                    // group or session are still reachable through it.
                    let _ = kill(root, Signal::SIGSTOP);
                    let killed = kill_tree(root);
                    debug!("Killed {} descendants of {}", killed, root);
                    terminate_group(root);
                }
                child
                    .wait()
                    .await
                    .map_err(|e| Error::infra(format!("Failed to reap child: {}", e)))?;
                StageOutcome::TimedOut
            }
        };
        let elapsed = started.elapsed();

        // Background work left behind by a finished child is killed as well.
        if let Some(group) = root {
            terminate_group(group);
            reap_group(group).await;
        }
        // Every other descendant of a dedicated runner belongs to this run.
        if self.scope == LimitScope::Process {
            sweep_orphans().await;
        }

        let stdout = stdout.finish(self.drain_grace).await;
        let stderr = stderr.finish(self.drain_grace).await;
        debug!(?outcome, ?elapsed, "Child finished");

        Ok(ChildReport {
            outcome,
            stdout,
            stderr,
            elapsed,
        })
    }
}

fn terminate_group(group: Pid) {
    match killpg(group, Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!("Failed to kill process group {}: {}", group, e),
    }
}

/// Reap any member of `group` that became our child. Members only end up
/// here when the runner is a child subreaper; otherwise this returns at once
/// with ECHILD.
async fn reap_group(group: Pid) {
    let members = Pid::from_raw(-group.as_raw());
    let reaped = tokio::task::spawn_blocking(move || {
        let mut count = 0usize;
        loop {
            match waitpid(members, None) {
                Ok(_) => count += 1,
                Err(Errno::EINTR) => continue,
                Err(_) => break,
            }
        }
        count
    })
    .await;

    match reaped {
        Ok(0) => {}
        Ok(n) => debug!("Reaped {} orphaned descendants of group {}", n, group),
        Err(e) => warn!("Reaper task failed: {}", e),
    }
}

/// Kill and reap every remaining descendant of the runner. Orphans of a
/// finished child are re-parented here once the runner is a subreaper, even
/// when they left the child's process group and session.
async fn sweep_orphans() {
    let swept = tokio::task::spawn_blocking(|| {
        let killed = kill_tree(Pid::this());
        let deadline = Instant::now() + Duration::from_secs(1);
        let mut reaped = 0usize;
        loop {
            match waitpid(None, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(5));
                }
                Ok(WaitStatus::StillAlive) => break,
                Ok(_) => reaped += 1,
                Err(Errno::EINTR) => continue,
                Err(_) => break,
            }
        }
        (killed, reaped)
    })
    .await;

    match swept {
        Ok((0, 0)) => {}
        Ok((killed, reaped)) => debug!("Swept {} orphans, reaped {}", killed, reaped),
        Err(e) => warn!("Orphan sweep failed: {}", e),
    }
}

/// Upper bound on freeze passes, so a runaway fork loop cannot keep the
/// walk going forever.
const MAX_FREEZE_PASSES: usize = 64;

/// SIGKILL every descendant of `root`, not `root` itself.
///
/// Descendants are stopped first and the tree is walked again until it stops
/// growing, since a stopped process cannot fork. Returns how many were killed.
fn kill_tree(root: Pid) -> usize {
    let mut stopped: Vec<Pid> = Vec::new();
    for _ in 0..MAX_FREEZE_PASSES {
        let fresh: Vec<Pid> = descendants_of(root)
            .into_iter()
            .filter(|pid| !stopped.contains(pid))
            .collect();
        if fresh.is_empty() {
            break;
        }
        for pid in fresh {
            let _ = kill(pid, Signal::SIGSTOP);
            stopped.push(pid);
        }
    }
    for pid in &stopped {
        match kill(*pid, Signal::SIGKILL) {
            Ok(()) | Err(Errno::ESRCH) => {}
            Err(e) => warn!("Failed to kill descendant {}: {}", pid, e),
        }
    }
    stopped.len()
}

/// Live descendants of `root`, read from `/proc/<pid>/task/*/children`.
fn descendants_of(root: Pid) -> Vec<Pid> {
    let mut found = Vec::new();
    let mut queue = vec![root];
    while let Some(pid) = queue.pop() {
        for child in children_of(pid) {
            if child != root && !found.contains(&child) {
                found.push(child);
                queue.push(child);
            }
        }
    }
    found
}

fn children_of(pid: Pid) -> Vec<Pid> {
    let Ok(tasks) = fs::read_dir(format!("/proc/{}/task", pid)) else {
        return Vec::new();
    };
    tasks
        .flatten()
        .filter_map(|task| fs::read_to_string(task.path().join("children")).ok())
        .flat_map(|list| {
            list.split_whitespace()
                .filter_map(|id| id.parse::<i32>().ok())
                .map(Pid::from_raw)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Make this process adopt orphaned descendants so they can be reaped and
/// accounted for.
pub fn become_subreaper() -> Result<()> {
    nix::sys::prctl::set_child_subreaper(true)
        .map_err(|e| Error::infra(format!("Failed to become child subreaper: {}", e)))
}
