//! Policies parameterising child supervision:
//!  - [`limits`] the level-indexed sanity threshold table;
//!  - [`backoff`] the delay inserted before respawning a flapping worker.
//!
//! ## Overview
//! - [`limits`]: one read-only table maps each [`LimitKind`] to four numeric
//!   thresholds indexed by watchdog level; [`worker_limit`] is the single
//!   query function.
//! - [`backoff`]: compute the respawn delay for a worker that restarted too
//!   recently: a fixed base plus an exponential term in the restart count.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use procvisor::{LimitKind, RespawnBackoff, worker_limit};
//!
//! // Level 1 tolerates 6 seconds of sustained CPU latency.
//! assert_eq!(worker_limit(LimitKind::LatencyLimit, 1), 6);
//!
//! // A worker on its third rapid restart sleeps 5s + 2^3 s.
//! let backoff = RespawnBackoff::from_level(1);
//! assert_eq!(backoff.next(3), Duration::from_secs(13));
//! ```

pub mod backoff;
pub mod limits;

pub use backoff::RespawnBackoff;
pub use limits::{worker_limit, LimitKind};
