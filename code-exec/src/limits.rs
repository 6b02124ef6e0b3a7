//! Resource Limiter: OS ceilings installed before any untrusted code runs.

use nix::sys::resource::{getrlimit, setrlimit, Resource};
use serde::{Deserialize, Serialize};
use std::io;
use tracing::debug;

use crate::{error::Error, types::ResourceLimits, Result};

/// Largest file any descendant may write
pub const FILE_SIZE_LIMIT: u64 = 50 * 1024 * 1024; // 50MB
/// Processes and threads per user
pub const PROCESS_LIMIT: u64 = 256;
/// Open descriptors per process
pub const OPEN_FILES_LIMIT: u64 = 256;

/// How memory is enforced for a given language runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryPolicy {
    /// Hard address-space and data-segment ceilings.
    AddressSpace,
    /// Data-segment ceiling only. Used for runtimes whose allocators reserve
    /// large virtual ranges; those runtimes also get their own soft limit
    /// through the environment.
    DataSegment,
}

/// Where the ceilings are installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitScope {
    /// On the runner process itself, inherited by every descendant.
    Process,
    /// In each spawned child between fork and exec. Leaves the calling
    /// process untouched, so several invocations can share one process.
    PerChild,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub resource: Resource,
    pub value: u64,
}

impl Rule {
    pub fn is_memory(&self) -> bool {
        matches!(self.resource, Resource::RLIMIT_AS | Resource::RLIMIT_DATA)
    }
}

/// The set of rlimits derived from one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLimiter {
    rules: Vec<Rule>,
}

impl ResourceLimiter {
    pub fn new(limits: &ResourceLimits, policy: MemoryPolicy) -> Self {
        let memory = limits.memory_bytes();
        let mut rules = Vec::with_capacity(6);

        if policy == MemoryPolicy::AddressSpace {
            rules.push(Rule {
                resource: Resource::RLIMIT_AS,
                value: memory,
            });
        }
        rules.extend([
            Rule {
                resource: Resource::RLIMIT_DATA,
                value: memory,
            },
            Rule {
                resource: Resource::RLIMIT_FSIZE,
                value: FILE_SIZE_LIMIT,
            },
            Rule {
                resource: Resource::RLIMIT_NPROC,
                value: PROCESS_LIMIT,
            },
            Rule {
                resource: Resource::RLIMIT_NOFILE,
                value: OPEN_FILES_LIMIT,
            },
            Rule {
                resource: Resource::RLIMIT_CPU,
                value: limits.cpu_seconds(),
            },
        ]);

        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, resource: Resource) -> Option<u64> {
        self.rules
            .iter()
            .find(|r| r.resource == resource)
            .map(|r| r.value)
    }

    /// Ceilings the runner installs on itself under [`LimitScope::Process`].
    ///
    /// Memory ceilings are excluded. The runner's own mappings can already
    /// exceed a small ceiling, after which it could no longer fork; those go
    /// to each child instead.
    pub fn process_rules(&self) -> Vec<Rule> {
        self.rules.iter().filter(|r| !r.is_memory()).copied().collect()
    }

    /// Ceilings each child installs between fork and exec.
    pub fn child_rules(&self, scope: LimitScope) -> Vec<Rule> {
        match scope {
            LimitScope::PerChild => self.rules.clone(),
            LimitScope::Process => self.rules.iter().filter(|r| r.is_memory()).copied().collect(),
        }
    }

    /// Install the process-wide ceilings on the calling process. Soft and
    /// hard values are equal, so the limits can never be raised again by this
    /// process or any descendant.
    pub fn install_current_process(&self) -> Result<()> {
        for rule in &self.process_rules() {
            let value = install(rule).map_err(|e| {
                Error::infra(format!(
                    "Failed to set {:?} to {}: {}",
                    rule.resource, rule.value, e
                ))
            })?;
            debug!(resource = ?rule.resource, value, "Installed rlimit");
        }
        Ok(())
    }

    /// Install every ceiling from inside a freshly forked child.
    ///
    /// Runs between fork and exec, so it must not allocate.
    pub(crate) fn apply_in_child(rules: &[Rule]) -> io::Result<()> {
        for rule in rules {
            install(rule).map_err(|errno| io::Error::from_raw_os_error(errno as i32))?;
        }
        Ok(())
    }
}

/// An unprivileged process cannot raise its hard limit, so a ceiling that is
/// already tighter than requested is kept as is.
fn install(rule: &Rule) -> nix::Result<u64> {
    let (_, hard) = getrlimit(rule.resource)?;
    let value = rule.value.min(hard);
    setrlimit(rule.resource, value, value)?;
    Ok(value)
}
