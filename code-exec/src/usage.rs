//! Usage Reporter: resource accounting taken from the kernel, never from the
//! child itself.

use nix::sys::resource::{getrusage, UsageWho};
use nix::sys::time::TimeVal;
use std::time::Duration;
use tracing::warn;

use crate::types::Usage;

/// Cumulative `RUSAGE_CHILDREN` counters at one instant.
///
/// The kernel only folds a child into these counters once it has been
/// reaped, so a snapshot taken after the last wait covers every descendant
/// of the invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildrenUsage {
    pub cpu: Duration,
    pub max_rss_kb: u64,
}

impl ChildrenUsage {
    pub fn snapshot() -> Self {
        match getrusage(UsageWho::RUSAGE_CHILDREN) {
            Ok(usage) => {
                Self {
                    cpu: to_duration(usage.user_time()) + to_duration(usage.system_time()),
                    max_rss_kb: usage.max_rss().max(0) as u64,
                }
            }
            Err(e) => {
                warn!("Failed to read children resource usage: {}", e);
                Self::default()
            }
        }
    }
}

/// Accumulates stage timings for one invocation
#[derive(Debug)]
pub struct UsageReporter {
    baseline: ChildrenUsage,
    compile: Option<Duration>,
    execute: Option<Duration>,
}

impl UsageReporter {
    /// Start accounting. CPU time is reported relative to this point, so
    /// children reaped before it (by an embedding process) are not counted.
    pub fn start() -> Self {
        Self {
            baseline: ChildrenUsage::snapshot(),
            compile: None,
            execute: None,
        }
    }

    pub fn record_compile(&mut self, elapsed: Duration) {
        self.compile = Some(elapsed);
    }

    pub fn record_execute(&mut self, elapsed: Duration) {
        self.execute = Some(elapsed);
    }

    pub fn finish(&self) -> Usage {
        self.report(ChildrenUsage::snapshot())
    }

    fn report(&self, now: ChildrenUsage) -> Usage {
        Usage {
            wall_ms: self.execute.map(as_millis),
            compile_ms: self.compile.map(as_millis),
            cpu_ms: as_millis(now.cpu.saturating_sub(self.baseline.cpu)),
            // ru_maxrss is a high-water mark and cannot be diffed
            max_rss_mb: now.max_rss_kb / 1024,
        }
    }
}

fn to_duration(tv: TimeVal) -> Duration {
    let micros = tv.tv_sec() as i64 * 1_000_000 + tv.tv_usec() as i64;
    Duration::from_micros(micros.max(0) as u64)
}

fn as_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
