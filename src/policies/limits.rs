//! # Watchdog limit table.
//!
//! A read-only table mapping each [`LimitKind`] to four numeric thresholds,
//! one per watchdog level (0=loose, 1=normal, 2=restrictive, 3=debug).
//! [`worker_limit`] is the single query function; levels above 3 clamp to the
//! debug column.
//!
//! | Kind               | L0 | L1 | L2 | L3   |
//! |--------------------|----|----|----|------|
//! | `MemoryLimit` (MB) | 80 | 50 | 30 | 1000 |
//! | `UtilizationLimit` (%) | 90 | 80 | 60 | 1000 |
//! | `RespawnLimit` (s) | 20 | 20 | 20 | 5    |
//! | `RespawnDelay` (s) | 5  | 5  | 5  | 1    |
//! | `LatencyLimit` (s) | 12 | 6  | 3  | 1    |
//! | `Interval` (s)     | 3  | 3  | 3  | 1    |

/// Number of limit columns (watchdog levels 0 through 3).
pub const LEVELS: usize = 4;

/// Kinds of sanity thresholds applied to supervised children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKind {
    /// Maximum MB a child may privately allocate past its launch baseline.
    MemoryLimit,
    /// Percent of user or system CPU a child may utilize, per second, for
    /// [`LimitKind::LatencyLimit`] seconds.
    UtilizationLimit,
    /// Number of seconds a child should run, else consider the exit rapid.
    RespawnLimit,
    /// Base delay before respawning a worker that restarted too recently.
    RespawnDelay,
    /// Seconds of tolerable sustained over-utilization.
    LatencyLimit,
    /// How often to poll for performance limit violations.
    Interval,
}

impl LimitKind {
    /// Every kind, in table order.
    pub const ALL: [LimitKind; 6] = [
        LimitKind::MemoryLimit,
        LimitKind::UtilizationLimit,
        LimitKind::RespawnLimit,
        LimitKind::RespawnDelay,
        LimitKind::LatencyLimit,
        LimitKind::Interval,
    ];

    /// The four per-level thresholds for this kind.
    const fn thresholds(self) -> [u64; LEVELS] {
        match self {
            LimitKind::MemoryLimit => [80, 50, 30, 1000],
            LimitKind::UtilizationLimit => [90, 80, 60, 1000],
            LimitKind::RespawnLimit => [20, 20, 20, 5],
            LimitKind::RespawnDelay => [5, 5, 5, 1],
            LimitKind::LatencyLimit => [12, 6, 3, 1],
            LimitKind::Interval => [3, 3, 3, 1],
        }
    }
}

/// Looks up the threshold for `kind` at `level`.
///
/// Levels above 3 clamp to the last (debug) column, so a misconfigured flag
/// value degrades to the loosest debug limits instead of panicking.
pub fn worker_limit(kind: LimitKind, level: u8) -> u64 {
    let row = kind.thresholds();
    row[(level as usize).min(LEVELS - 1)]
}
