//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints supervision events to stdout in a human-readable
//! format. This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [worker-spawned] pid=4242
//! [unhealthy] child=worker pid=4242 reason="cpu utilization limit exceeded for 6s"
//! [exited] child=worker code=1
//! [backoff] restarts=3 delay=13s
//! [extension-spawned] path=/opt/ext/metrics pid=4243
//! [extension-dropped] path=/opt/ext/metrics
//! [foreign] pid=4242
//! [parent-gone] pid=4100
//! [shutdown-requested]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Prints human-readable event descriptions to stdout for debugging and
/// demonstration purposes. Not intended for production use - implement a
/// custom [`Subscribe`] for structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::WorkerSpawned => {
                if let Some(pid) = e.pid {
                    println!("[worker-spawned] pid={pid}");
                }
            }
            EventKind::ExtensionSpawned => {
                println!(
                    "[extension-spawned] path={:?} pid={:?}",
                    e.child, e.pid
                );
            }
            EventKind::ChildUnhealthy => {
                println!(
                    "[unhealthy] child={:?} pid={:?} reason={:?}",
                    e.child, e.pid, e.error
                );
            }
            EventKind::ChildExited => {
                println!("[exited] child={:?} code={:?}", e.child, e.code);
            }
            EventKind::ChildForeign => {
                println!("[foreign] pid={:?}", e.pid);
            }
            EventKind::RespawnBackoff => {
                println!(
                    "[backoff] restarts={:?} delay={:?}",
                    e.restarts, e.delay
                );
            }
            EventKind::ExtensionDropped => {
                println!("[extension-dropped] path={:?}", e.child);
            }
            EventKind::ParentGone => {
                println!("[parent-gone] pid={:?}", e.pid);
            }
            EventKind::ShutdownRequested => {
                println!("[shutdown-requested]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "status-log"
    }
}
