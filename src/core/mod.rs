//! Supervision core: the watch loop and its shared state.
//!
//! This module contains the embedded implementation of the supervisor. The
//! public API re-exported from here is [`Supervisor`], [`Registry`] (with
//! [`PerformanceState`]), the [`sanity`] verdict types, [`ParentWatcher`],
//! and the [`shutdown`] helpers. Everything is wired by the supervisor.
//!
//! ## Files & responsibilities
//! - **supervisor.rs**: the watch loop; probes each child once per interval,
//!   kills and respawns unhealthy children, applies worker respawn back-off,
//!   drops flapping extensions, harvests exit codes, decides when to exit.
//! - **registry.rs**: process-wide store of the worker handle, extension
//!   maps, performance counters, worker exit status, restart counter, and
//!   the fates flag; one mutex serialises all mutation.
//! - **sanity.rs**: pure evaluator turning a process accounting row plus the
//!   prior counters into healthy / unhealthy / foreign.
//! - **parent.rs**: worker-side companion loop that requests self-shutdown
//!   when the supervisor dies.
//! - **shutdown.rs**: OS signal handling and the fates-binding listener.
//!
//! ## Wiring (module-level flow)
//! ```text
//! Embedding agent
//!   └─ builds Config, Registry, Host/ProcessTable impls, subscribers
//!
//! Supervisor::run(token)
//!   ├─ spawn subscriber_listener()           (Bus → Subscribe impls)
//!   ├─ (caller) shutdown::bind_fates()       (signal → fates + cancel)
//!   └─ loop:
//!        watch(worker) ──false──► create_worker()
//!        for each extension:
//!          watch(ext) ──false──► create_extension() ──Err──► remove + drop
//!        sleep(Interval); continue while !interrupted && ok()
//!
//! watch(child)
//!   ├─ Host::check_child (non-blocking)
//!   ├─ fates bound?            → false
//!   ├─ invalid / probe error   → false
//!   ├─ alive → sanity::evaluate(ProcessTable row, Registry state)
//!   │     Healthy   → relay status logs → true
//!   │     Foreign   → Registry::reset_child (release, never signal) → true
//!   │     Unhealthy → kill + reap → false
//!   └─ exited → Registry::set_worker_status(code) → true
//!
//! Worker process
//!   └─ ParentWatcher::run(token): launcher dead? → request_shutdown
//! ```
//!
//! ## Per-child state machine
//! ```text
//! absent → launching → alive → {alive, unhealthy, foreign, exited} → absent
//!   unhealthy → absent   always sends terminate + reaps
//!   exited    → absent   only reaps
//!   foreign   → absent   releases the handle, never signals
//! ```

mod parent;
mod registry;
mod sanity;
mod shutdown;
mod supervisor;

pub use parent::ParentWatcher;
pub use registry::{PerformanceState, Registry, MANAGED_EXTENSIONS_ENV};
pub use sanity::{evaluate, Trip, Verdict};
pub use shutdown::{bind_fates, wait_for_shutdown_signal};
pub use supervisor::Supervisor;
