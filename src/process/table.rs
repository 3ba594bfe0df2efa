//! # Per-pid process accounting seam.
//!
//! [`ProcessTable`] is the query engine the sanity evaluator reads OS
//! statistics from: one [`ProcessRow`] per pid, or `None` when the pid is
//! gone. The supervisor also uses the table to resolve its own executable
//! path before launching a worker.

/// One process accounting row, keyed by pid.
#[derive(Debug, Clone, Default)]
pub struct ProcessRow {
    /// Parent pid. Compared against the supervisor's pid to detect reuse.
    pub parent: i64,
    /// Cumulative user CPU ticks.
    pub user_time: u64,
    /// Cumulative system CPU ticks.
    pub system_time: u64,
    /// Resident set size in bytes.
    pub resident_size: u64,
    /// Executable path; may be empty when the OS withholds it.
    pub path: String,
}

/// Read access to per-pid OS process statistics.
pub trait ProcessTable: Send + Sync + 'static {
    /// Returns the accounting row for `pid`, or `None` if no such process.
    fn row(&self, pid: u32) -> Option<ProcessRow>;
}
