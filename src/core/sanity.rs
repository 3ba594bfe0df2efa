//! # Child sanity evaluator.
//!
//! One pure function, [`evaluate`], turns a process accounting row and the
//! child's prior [`PerformanceState`] into a [`Verdict`]:
//!
//! - [`Verdict::Healthy`]: no action needed.
//! - [`Verdict::Unhealthy`]: the child tripped a limit; the loop kills and
//!   respawns (worker) or drops (extension) it.
//! - [`Verdict::Foreign`]: the pid's parent is no longer this process; the
//!   OS reused the pid, the handle must be released, and the process is never
//!   signaled.
//!
//! ## Algorithm
//! ```text
//! iv = max(Interval limit, 1)
//! u  = user_ticks / iv         (coarse per-interval average; intentionally
//! s  = system_ticks / iv        not a delta over real elapsed time)
//! (u - prev.u > Utilization) || (s - prev.s > Utilization)
//!     → sustained_latency += 1, else sustained_latency = 0
//! first non-zero resident → initial_footprint baseline
//! footprint = resident - initial_footprint (floored at 0)
//! parent ≠ supervisor pid             → Foreign
//! sustained_latency * iv ≥ Latency    → Unhealthy (cpu)
//! footprint > MemoryLimit MiB         → Unhealthy (memory)
//! otherwise                           → Healthy
//! ```
//!
//! ## Rules
//! - The two-dimensional limit (sustained CPU *for* the latency window, and
//!   private growth past the launch baseline) tolerates transient spikes
//!   while bounding steady-state cost.
//! - State writes happen before the foreign check, so even a released pid's
//!   final observation lands in the counters it is about to abandon.
//! - The evaluator knows nothing about the registry; the caller holds the
//!   lock, passes the state in, and performs the release on `Foreign`.

use crate::core::registry::PerformanceState;
use crate::policies::limits::{worker_limit, LimitKind};
use crate::process::ProcessRow;

/// Outcome of one sanity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Within limits; no action needed.
    Healthy,
    /// A limit tripped; the child must be stopped.
    Unhealthy(Trip),
    /// The pid belongs to someone else now; release the handle, do nothing.
    Foreign,
}

/// Which limit an unhealthy child tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trip {
    /// No accounting row for the pid; the child vanished mid-check.
    Vanished,
    /// Sustained CPU utilization past the latency window.
    Cpu {
        /// Seconds of sustained over-utilization at trip time.
        sustained_secs: u64,
    },
    /// Private memory growth past the launch baseline.
    Memory {
        /// Bytes allocated above the baseline.
        footprint: u64,
    },
}

impl Trip {
    /// Human-readable reason for event payloads.
    pub fn reason(&self) -> String {
        match self {
            Trip::Vanished => "process row missing".to_string(),
            Trip::Cpu { sustained_secs } => {
                format!("cpu utilization limit exceeded for {sustained_secs}s")
            }
            Trip::Memory { footprint } => {
                format!("memory limit exceeded: {footprint} bytes above baseline")
            }
        }
    }
}

/// Evaluates one sanity check for the child whose accounting row is `row`.
///
/// `state` is the child's counter record (mutated in place under the caller's
/// lock), `supervisor_pid` the pid the row's parent must match, and `level`
/// the watchdog level selecting the limit column.
///
/// The CPU figures are coarse: cumulative ticks divided by the check interval
/// rather than a delta over the real elapsed time. The approximation is part
/// of the observable behavior and is kept as-is.
pub fn evaluate(
    state: &mut PerformanceState,
    row: &ProcessRow,
    supervisor_pid: u32,
    level: u8,
) -> Verdict {
    let iv = worker_limit(LimitKind::Interval, level).max(1);
    let utilization = worker_limit(LimitKind::UtilizationLimit, level);

    let user = row.user_time / iv;
    let system = row.system_time / iv;

    // Difference of per-second CPU averages since the last check.
    if user.wrapping_sub(state.user_time) > utilization
        || system.wrapping_sub(state.system_time) > utilization
    {
        state.sustained_latency += 1;
    } else {
        state.sustained_latency = 0;
    }
    state.user_time = user;
    state.system_time = system;

    // The footprint is the resident growth since the process image was
    // created (an estimate; writable-region accounting would be tighter).
    if state.initial_footprint == 0 {
        state.initial_footprint = row.resident_size;
    }
    let footprint = row.resident_size.saturating_sub(state.initial_footprint);

    // Only judge the child if it is still ours. A dead child's pid can be
    // reused by an unrelated process.
    if row.parent != i64::from(supervisor_pid) {
        return Verdict::Foreign;
    }

    if state.sustained_latency > 0
        && state.sustained_latency * iv >= worker_limit(LimitKind::LatencyLimit, level)
    {
        return Verdict::Unhealthy(Trip::Cpu {
            sustained_secs: state.sustained_latency * iv,
        });
    }

    if footprint > worker_limit(LimitKind::MemoryLimit, level) * 1024 * 1024 {
        return Verdict::Unhealthy(Trip::Memory { footprint });
    }

    Verdict::Healthy
}
