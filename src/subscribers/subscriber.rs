//! # Event subscriber trait.
//!
//! Provides [`Subscribe`] — the extension point for plugging custom event
//! handlers into the supervisor: status-log sinks, metrics exporters, or
//! alerting hooks.
//!
//! ## Rules
//! - `on_event()` runs in the supervisor's listener task, not in the watch
//!   loop itself; slow handlers delay other subscribers but never the loop.
//! - Handle errors internally; do not panic.
//! - Events arrive in publish order (FIFO) with monotonic sequence numbers.

use async_trait::async_trait;

use crate::events::Event;

/// Event subscriber for supervisor observability.
///
/// Receives every event the watch loop and parent watcher publish.
///
/// ### Implementation notes
/// - Use async I/O; avoid blocking operations
/// - Handle errors internally (don't panic)
/// - Keep processing short; subscribers share one listener task
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Processes a single event.
    async fn on_event(&self, event: &Event);

    /// Returns the subscriber name for logging and metrics.
    ///
    /// Keep short and descriptive (e.g., "status-log", "metrics").
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
