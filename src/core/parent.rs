//! # Worker-side parent watcher.
//!
//! A companion loop that runs **inside a worker process** when the agent is
//! supervised. Each tick it asks the host whether the supervisor (its
//! launcher) is still alive; if the supervisor died, the worker must not
//! linger, so the watcher requests self-shutdown and exits.
//!
//! ## Architecture
//! ```text
//! worker process
//!   └── ParentWatcher::run(token)
//!         loop {
//!           launcher dead? ──► request_shutdown(SUCCESS) + ParentGone, break
//!           sleep(Interval)   (cancellable)
//!         }
//! ```
//!
//! ## Rules
//! - Detection happens within one `Interval` tick of the supervisor dying.
//! - The watcher honors the same cancellation token as the rest of the
//!   worker and exits promptly on shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::exit_code;
use crate::policies::{worker_limit, LimitKind};
use crate::process::{ChildHandle, Host};

/// Watches the supervisor process from inside a worker.
pub struct ParentWatcher {
    /// Platform primitives of the worker process.
    host: Arc<dyn Host>,
    /// Handle of the supervisor that launched this worker.
    launcher: ChildHandle,
    /// Watchdog level selecting the tick interval.
    level: u8,
    /// Worker-local event bus.
    bus: Bus,
}

impl ParentWatcher {
    /// Creates a watcher over the given launcher handle.
    pub fn new(host: Arc<dyn Host>, launcher: ChildHandle, level: u8, bus: Bus) -> Self {
        Self {
            host,
            launcher,
            level,
            bus,
        }
    }

    /// Runs until the supervisor dies or the token cancels.
    pub async fn run(self, token: CancellationToken) {
        let interval = Duration::from_secs(worker_limit(LimitKind::Interval, self.level));

        loop {
            if token.is_cancelled() {
                break;
            }
            if self.host.is_launcher_dead(&self.launcher) {
                // The supervisor died; the worker must follow.
                self.bus.publish(
                    Event::now(EventKind::ParentGone)
                        .with_pid(self.launcher.pid().unwrap_or_default()),
                );
                self.host.request_shutdown(exit_code::SUCCESS);
                break;
            }

            let sleep = time::sleep(interval);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = token.cancelled() => break,
            }
        }
    }
}
