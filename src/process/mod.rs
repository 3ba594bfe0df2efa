//! Platform process seams consumed by the supervisor core.
//!
//! The core never talks to the OS directly; everything process-shaped goes
//! through two trait objects the embedding agent provides:
//!
//! - [`Host`]: spawn/kill/probe primitives, env vars, time, permissions,
//!   status-log relay, and shutdown requests.
//! - [`ProcessTable`]: per-pid accounting rows (parent pid, CPU times,
//!   resident size, executable path).
//!
//! ## Contents
//! - [`ChildHandle`] opaque identity of a launched child
//! - [`ChildStatus`] non-blocking probe result
//! - [`ExtensionLaunch`] argument bundle for extension spawns
//! - [`ProcessRow`] one accounting row
//!
//! Keeping the seams as traits means the whole watch loop runs against
//! scripted doubles in tests, with no real processes involved.

mod handle;
mod host;
mod table;

pub use handle::ChildHandle;
pub use host::{ChildStatus, ExtensionLaunch, Host};
pub use table::{ProcessRow, ProcessTable};
