//! # Event subscribers for the supervisor.
//!
//! This module provides the [`Subscribe`] trait and a built-in stdout
//! implementation for handling supervision events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Supervisor ── publish(Event) ──► Bus ──► subscriber listener
//!                                              │
//!                                              └──► Subscribe::on_event(&Event)
//!                                                        │
//!                                                   ┌────┴─────┬────────┐
//!                                                   ▼          ▼        ▼
//!                                                LogWriter  Metrics  Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use procvisor::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct MetricsSubscriber;
//!
//! #[async_trait]
//! impl Subscribe for MetricsSubscriber {
//!     async fn on_event(&self, event: &Event) {
//!         match event.kind {
//!             EventKind::ChildUnhealthy => {
//!                 // increment limit-trip counter
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

mod log;
mod subscriber;

pub use log::LogWriter;
pub use subscriber::Subscribe;
