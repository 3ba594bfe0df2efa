//! # Supervision events emitted by the watch loop.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Spawn events**: a worker or extension child was launched
//! - **Sanity events**: limit trips, foreign pids, harvested exits
//! - **Control events**: respawn back-off, extension drops, parent death,
//!   shutdown requests
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! child identity (the worker role or an extension path), pid, exit code,
//! back-off delay, and error text.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. This guarantees that events can be ordered correctly even
//! when delivered out-of-order through async channels.
//!
//! ## Event flow examples
//!
//! ### Worker sanity trip
//! ```text
//! ChildUnhealthy (cpu or memory reason)
//!   → [kill + reap]
//!   → WorkerSpawned (replacement)
//! ```
//!
//! ### Flapping worker
//! ```text
//! ChildExited (non-zero code)
//!   → RespawnBackoff (delay grows with the restart count)
//!   → WorkerSpawned
//! ```
//!
//! ### Extension give-up
//! ```text
//! ChildExited → ExtensionSpawned → ChildExited (within the respawn limit)
//!   → ExtensionDropped
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervision events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Spawn events ===
    /// A worker child was launched and is now monitored.
    WorkerSpawned,
    /// An extension child was launched and is now monitored.
    ExtensionSpawned,

    // === Sanity events ===
    /// A child tripped a sanity limit and will be terminated.
    ChildUnhealthy,
    /// A child's exit code was harvested.
    ChildExited,
    /// A tracked pid turned out to belong to someone else (pid reuse);
    /// the handle was released without signaling the process.
    ChildForeign,

    // === Control events ===
    /// The worker respawned too quickly; the loop sleeps before relaunching.
    RespawnBackoff,
    /// An extension failed to respawn and was removed from management.
    ExtensionDropped,
    /// The worker-side watcher detected that the supervisor died.
    ParentGone,
    /// Shutdown requested (OS signal received); fates are bound.
    ShutdownRequested,
}

/// Supervision event with optional metadata.
///
/// Carries information about child lifecycle, limit trips, exit codes, and
/// back-off delays.
///
/// ## Fields
///
/// - `seq`: Unique sequence number for ordering (monotonically increasing)
/// - `at`: Wall-clock timestamp (may go backwards due to NTP, use for logging only)
/// - `kind`: Event classification
/// - `child`, `pid`, `code`, `delay`, `restarts`, `error`: Optional metadata
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    /// Used to determine event ordering across async boundaries.
    pub seq: u64,
    /// Wall-clock timestamp (may go backwards, use for logging only).
    pub at: SystemTime,
    /// The kind of event.
    pub kind: EventKind,
    /// Child identity: the worker role name or the extension path.
    pub child: Option<String>,
    /// OS pid of the child, if known.
    pub pid: Option<u32>,
    /// Harvested exit code (for [`EventKind::ChildExited`]).
    pub code: Option<i32>,
    /// Back-off delay before the next launch (for [`EventKind::RespawnBackoff`]).
    pub delay: Option<Duration>,
    /// Restart counter value (for [`EventKind::RespawnBackoff`]).
    pub restarts: Option<u32>,
    /// Error or reason text, if the event represents a failure.
    pub error: Option<String>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            child: None,
            pid: None,
            code: None,
            delay: None,
            restarts: None,
            error: None,
        }
    }

    /// Attaches a child identity (worker role name or extension path).
    pub fn with_child(mut self, name: impl Into<String>) -> Self {
        self.child = Some(name.into());
        self
    }

    /// Attaches a pid.
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches a harvested exit code.
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches a back-off delay.
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay = Some(d);
        self
    }

    /// Attaches a restart counter value.
    pub fn with_restarts(mut self, n: u32) -> Self {
        self.restarts = Some(n);
        self
    }

    /// Attaches an error or reason message.
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }
}
