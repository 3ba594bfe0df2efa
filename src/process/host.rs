//! # Platform host seam.
//!
//! [`Host`] is the trait the embedding agent implements to give the watch loop
//! its process primitives: non-blocking child probes, worker/extension
//! launches, kill and zombie reaping, env vars, wall-clock time, the binary
//! permissions predicate, status-log relay, and shutdown requests.
//!
//! ## Rules
//! - [`Host::check_child`] must be non-blocking (`WNOHANG` semantics); the
//!   watch loop must never stall on a still-alive child.
//! - [`Host::request_shutdown`] only records the request; it must not exit the
//!   calling thread. [`Host::shutdown`] is the immediate variant for
//!   non-recoverable launch failures.
//! - Launches are async: process creation may block on the OS and must not
//!   hold up a concurrent logging thread consulting the registry.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::SpawnError;
use crate::process::handle::ChildHandle;

/// Result of a non-blocking child probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    /// The child is alive.
    Running,
    /// The child exited with the given code and was reaped.
    Exited(i32),
    /// The child does not exist or the probe failed.
    Error,
}

/// Argument bundle for an extension launch.
///
/// `path` doubles as the extension's stable identity; the remaining fields are
/// the current flag values relayed to the new process.
#[derive(Debug, Clone)]
pub struct ExtensionLaunch {
    /// Filesystem path of the extension binary (also its identity).
    pub path: PathBuf,
    /// Local socket the extension registers its plugins on.
    pub socket: String,
    /// Seconds the extension may take to register.
    pub timeout: u64,
    /// Seconds between extension health exchanges.
    pub interval: u64,
    /// Verbosity switch forwarded to the extension.
    pub verbose: bool,
}

/// Platform process primitives the supervisor core runs against.
///
/// Implementations wrap the real OS on the agent side and a scripted double
/// in tests. All methods other than the launches are expected to return
/// promptly; the loop calls them between registry lock scopes.
#[async_trait]
pub trait Host: Send + Sync + 'static {
    /// Pid of the calling process (the supervisor, or the worker when used by
    /// the parent watcher).
    fn current_pid(&self) -> u32;

    /// Probes a child without blocking.
    ///
    /// An invalid handle reports [`ChildStatus::Error`].
    fn check_child(&self, child: &ChildHandle) -> ChildStatus;

    /// Launches a worker from the supervisor's own executable.
    ///
    /// The implementation re-executes `exec` with the supervisor's original
    /// arguments plus whatever marker it uses to put the new process into
    /// worker mode.
    async fn launch_worker(&self, exec: &Path) -> Result<ChildHandle, SpawnError>;

    /// Launches an extension child with the given flag values.
    async fn launch_extension(&self, launch: &ExtensionLaunch) -> Result<ChildHandle, SpawnError>;

    /// Sends the terminate signal to a child. Invalid handles are ignored.
    fn kill(&self, child: &ChildHandle);

    /// Reaps any defunct (zombie) children without blocking.
    fn reap_defunct(&self);

    /// Whether the launcher (supervisor) process behind `launcher` has died.
    ///
    /// Used from inside a worker by the parent watcher.
    fn is_launcher_dead(&self, launcher: &ChildHandle) -> bool;

    /// Whether `file` inside `dir` is safe to execute as a privileged child
    /// (ownership and write-permission checks).
    fn safe_permissions(&self, dir: &Path, file: &Path, require_owner: bool) -> bool;

    /// Seconds since the Unix epoch.
    fn unix_time(&self) -> u64;

    /// Reads an environment variable.
    fn get_env(&self, name: &str) -> Option<String>;

    /// Sets an environment variable inherited by subsequently launched
    /// children.
    fn set_env(&self, name: &str, value: &str);

    /// Flushes buffered status logs toward a healthy worker.
    fn relay_status_logs(&self);

    /// Requests a graceful agent shutdown with the given exit code.
    fn request_shutdown(&self, code: i32);

    /// Shuts the agent down immediately with the given exit code.
    ///
    /// Reserved for non-recoverable launch failures.
    fn shutdown(&self, code: i32);
}
