//! Supervision events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the watch loop and the
//! worker-side parent watcher.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor` (spawns, sanity trips, exit harvests,
//!   back-off, drops), `ParentWatcher` (parent death), the fates-binding
//!   signal listener (shutdown).
//! - **Consumers**: the supervisor's subscriber listener, which forwards every
//!   event to each registered [`Subscribe`](crate::Subscribe) implementation.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
