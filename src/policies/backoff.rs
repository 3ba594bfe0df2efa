//! # Respawn back-off for flapping workers.
//!
//! [`RespawnBackoff`] controls how long the supervisor sleeps before
//! relaunching a worker that restarted within the respawn-limit window.
//! It is parameterized by:
//! - [`RespawnBackoff::delay`] the configured base delay;
//! - the restart count, contributing an exponential `2^restarts` term.
//!
//! Extensions never back off: one rapid respawn and they are dropped, so this
//! policy applies to the worker only.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use procvisor::RespawnBackoff;
//!
//! let backoff = RespawnBackoff::new(Duration::from_secs(5));
//!
//! // First rapid restart - base plus 2^1 seconds.
//! assert_eq!(backoff.next(1), Duration::from_secs(7));
//!
//! // Third rapid restart - base plus 2^3 seconds.
//! assert_eq!(backoff.next(3), Duration::from_secs(13));
//! ```

use std::time::Duration;

use crate::policies::limits::{worker_limit, LimitKind};

/// Worker respawn back-off policy.
///
/// The computed delay is `delay + 2^restarts` seconds; the exponential term
/// saturates instead of overflowing for absurd restart counts.
#[derive(Clone, Copy, Debug)]
pub struct RespawnBackoff {
    /// Configured base delay inserted before every throttled respawn.
    pub delay: Duration,
}

impl RespawnBackoff {
    /// Creates a back-off policy with an explicit base delay.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Creates a back-off policy with the base delay of the given watchdog
    /// level ([`LimitKind::RespawnDelay`]).
    pub fn from_level(level: u8) -> Self {
        Self::new(Duration::from_secs(worker_limit(
            LimitKind::RespawnDelay,
            level,
        )))
    }

    /// Computes the sleep before the next worker launch.
    ///
    /// `restarts` is the monotonic restart counter after it was incremented
    /// for the current rapid respawn, so consecutive flaps sleep strictly
    /// longer each time.
    pub fn next(&self, restarts: u32) -> Duration {
        let expo = 2u64
            .saturating_pow(restarts)
            .saturating_mul(1000);
        self.delay + Duration::from_millis(expo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_exponentially_with_restart_count() {
        let backoff = RespawnBackoff::new(Duration::from_secs(5));
        assert_eq!(backoff.next(0), Duration::from_secs(6));
        assert_eq!(backoff.next(1), Duration::from_secs(7));
        assert_eq!(backoff.next(2), Duration::from_secs(9));
        assert_eq!(backoff.next(3), Duration::from_secs(13));
        assert_eq!(backoff.next(10), Duration::from_secs(5 + 1024));
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let backoff = RespawnBackoff::new(Duration::from_secs(1));
        let huge = backoff.next(u32::MAX);
        assert!(huge >= backoff.next(62));
    }

    #[test]
    fn level_selects_base_delay() {
        assert_eq!(RespawnBackoff::from_level(1).delay, Duration::from_secs(5));
        assert_eq!(RespawnBackoff::from_level(3).delay, Duration::from_secs(1));
    }
}
