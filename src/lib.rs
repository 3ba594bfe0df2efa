//! # procvisor
//!
//! **Procvisor** is the supervisor core of a host-instrumentation agent.
//!
//! It provides the watch loop a long-lived parent process runs over one
//! privileged *worker* child and any number of *extension* children:
//! per-child CPU/memory budgets with hysteresis, restart-rate back-off,
//! pid-reuse detection, and a worker-side companion loop that ties the
//! worker's life to its supervisor.
//!
//! ## Features
//!
//! | Area             | Description                                                       | Key types / traits                    |
//! |------------------|-------------------------------------------------------------------|---------------------------------------|
//! | **Watch loop**   | Probe, kill, respawn, or drop children once per interval.         | [`Supervisor`]                        |
//! | **Registry**     | Process-wide store of handles, counters, and the fates flag.      | [`Registry`], [`PerformanceState`]    |
//! | **Sanity**       | Pure evaluator over per-pid accounting rows.                      | [`evaluate`], [`Verdict`], [`Trip`]   |
//! | **Policies**     | Level-indexed limit table and worker respawn back-off.            | [`LimitKind`], [`worker_limit`], [`RespawnBackoff`] |
//! | **Seams**        | Platform process primitives and the accounting table.             | [`Host`], [`ProcessTable`]            |
//! | **Worker side**  | Self-shutdown when the supervisor dies.                           | [`ParentWatcher`]                     |
//! | **Observability**| Broadcast events and pluggable sinks.                             | [`Event`], [`Bus`], [`Subscribe`], [`LogWriter`] |
//!
//! ## Sketch
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use procvisor::{bind_fates, Config, LogWriter, Registry, Subscribe, Supervisor};
//! # use std::path::Path;
//! # use async_trait::async_trait;
//! # use procvisor::{ChildHandle, ChildStatus, ExtensionLaunch, Host, ProcessRow, ProcessTable, SpawnError};
//! # struct Agent;
//! # #[async_trait]
//! # impl Host for Agent {
//! #     fn current_pid(&self) -> u32 { 1 }
//! #     fn check_child(&self, _: &ChildHandle) -> ChildStatus { ChildStatus::Error }
//! #     async fn launch_worker(&self, _: &Path) -> Result<ChildHandle, SpawnError> { Ok(ChildHandle::invalid()) }
//! #     async fn launch_extension(&self, _: &ExtensionLaunch) -> Result<ChildHandle, SpawnError> { Ok(ChildHandle::invalid()) }
//! #     fn kill(&self, _: &ChildHandle) {}
//! #     fn reap_defunct(&self) {}
//! #     fn is_launcher_dead(&self, _: &ChildHandle) -> bool { false }
//! #     fn safe_permissions(&self, _: &Path, _: &Path, _: bool) -> bool { true }
//! #     fn unix_time(&self) -> u64 { 0 }
//! #     fn get_env(&self, _: &str) -> Option<String> { None }
//! #     fn set_env(&self, _: &str, _: &str) {}
//! #     fn relay_status_logs(&self) {}
//! #     fn request_shutdown(&self, _: i32) {}
//! #     fn shutdown(&self, _: i32) {}
//! # }
//! # impl ProcessTable for Agent {
//! #     fn row(&self, _: u32) -> Option<ProcessRow> { None }
//! # }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let agent = Arc::new(Agent);
//!     let registry = Registry::new();
//!     registry.add_extension("/opt/ext/metrics");
//!
//!     let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//!     let supervisor = Supervisor::new(
//!         Config::default(),
//!         Arc::clone(&registry),
//!         agent.clone(),
//!         agent,
//!         subscribers,
//!     );
//!
//!     let token = CancellationToken::new();
//!     bind_fates(registry, supervisor.bus(), token.clone());
//!     supervisor.run(token).await;
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod policies;
mod process;
mod subscribers;

/// Process exit codes with project-wide meaning.
pub mod exit_code {
    /// Graceful worker exit; the supervisor terminates too.
    pub const SUCCESS: i32 = 0;
    /// Generic fatal failure.
    pub const FAILURE: i32 = 1;
    /// The worker tells the supervisor to give up entirely.
    pub const CATASTROPHIC: i32 = 78;
}

// ---- Public re-exports ----

pub use crate::config::Config;
pub use crate::core::{
    bind_fates, evaluate, wait_for_shutdown_signal, ParentWatcher, PerformanceState, Registry,
    Supervisor, Trip, Verdict, MANAGED_EXTENSIONS_ENV,
};
pub use crate::error::{SpawnError, SupervisorError};
pub use crate::events::{Bus, Event, EventKind};
pub use crate::policies::{worker_limit, LimitKind, RespawnBackoff};
pub use crate::process::{ChildHandle, ChildStatus, ExtensionLaunch, Host, ProcessRow, ProcessTable};
pub use crate::subscribers::{LogWriter, Subscribe};
