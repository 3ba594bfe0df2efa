//! # Error types used by the supervisor core.
//!
//! This module defines two main error enums:
//!
//! - [`SupervisorError`] errors raised by the watch loop and its child-creation policies.
//! - [`SpawnError`] launch failures reported by the platform host.
//!
//! Both types provide helper methods `as_label` for logs/metrics.
//! [`SupervisorError`] has an additional `is_fatal()` predicate separating
//! failures that end the whole agent from failures that only drop one child.

use thiserror::Error;

/// # Errors produced by the watch loop.
///
/// These represent policy decisions of the supervisor itself: a child that may
/// not be (re)launched, or a precondition for launching that no longer holds.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SupervisorError {
    /// The supervisor could not resolve its own executable path, so no worker
    /// can be launched. Fatal for the agent.
    #[error("cannot resolve the supervisor executable path for worker launch")]
    WorkerPathUnresolved,

    /// The binary (or its containing directory) failed the safe-permissions
    /// check. Fatal for a worker; drops the child when it is an extension.
    #[error("unsafe permissions on '{path}'")]
    UnsafePermissions {
        /// Path of the offending binary.
        path: String,
    },

    /// An extension respawned within the respawn-limit window and is given up
    /// on permanently.
    #[error("extension '{path}' respawning too quickly")]
    RespawnThrottled {
        /// Path identity of the abandoned extension.
        path: String,
    },

    /// The platform host failed to launch the child.
    #[error("launch failed: {0}")]
    Launch(#[from] SpawnError),
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::WorkerPathUnresolved => "worker_path_unresolved",
            SupervisorError::UnsafePermissions { .. } => "unsafe_permissions",
            SupervisorError::RespawnThrottled { .. } => "respawn_throttled",
            SupervisorError::Launch(_) => "launch_failed",
        }
    }

    /// Indicates whether this failure must take the whole agent down.
    ///
    /// Launch failures are non-recoverable for worker and extension alike;
    /// a throttled extension respawn only drops that extension.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SupervisorError::WorkerPathUnresolved | SupervisorError::Launch(_)
        )
    }
}

/// # Launch failures reported by the platform host.
///
/// Returned by [`Host::launch_worker`](crate::Host::launch_worker) and
/// [`Host::launch_extension`](crate::Host::launch_extension) when the child
/// process could not be created.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SpawnError {
    /// The executable does not exist at the given path.
    #[error("executable not found: {path}")]
    NotFound {
        /// Path that failed to resolve.
        path: String,
    },

    /// The OS refused to create the process.
    #[error("process creation failed: {reason}")]
    Failed {
        /// Host-provided failure description.
        reason: String,
    },
}

impl SpawnError {
    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            SpawnError::NotFound { .. } => "spawn_not_found",
            SpawnError::Failed { .. } => "spawn_failed",
        }
    }
}
