//! # Supervisor registry - the process-wide child and counter store.
//!
//! The registry owns everything the watch loop and its collaborators share:
//! - the worker [`ChildHandle`] and its [`PerformanceState`],
//! - the `path → handle` and `path → state` maps for managed extensions,
//! - the last harvested worker exit status and the restart counter,
//! - the `fates_bound` flag set from the signal path.
//!
//! ## Architecture
//! ```text
//! Supervisor loop ──► Registry (one mutex)
//!                        ├── worker handle + PerformanceState
//!                        ├── extensions:       path → ChildHandle
//!                        ├── extension_states: path → PerformanceState
//!                        ├── worker_status, restart_count
//!                        └── fates_bound (atomic, lock-free reads)
//! ```
//!
//! ## Rules
//! - `extensions` and `extension_states` keep **identical key sets**: both are
//!   inserted and removed under the same lock acquisition.
//! - The mutex is held for in-memory reads/writes only, never across process
//!   launches, kill/wait syscalls, table queries, or sleeps.
//! - The registry is the **sole owner** of child lifetimes; callers receive
//!   handle copies for observation and must route kills through the loop.
//! - State access is closure-based ([`Registry::with_state_of`]) so borrowed
//!   state never outlives the lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::process::ChildHandle;

/// Environment variable advertising managed extensions to a worker.
///
/// The supervisor sets it to `"true"` before spawning a worker when it manages
/// at least one extension, so a dependent worker waits for extension plugins
/// to broadcast before accepting queries.
pub const MANAGED_EXTENSIONS_ENV: &str = "OSQUERY_EXTENSIONS";

/// Per-child performance counters updated on every sanity check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceState {
    /// Consecutive checks the child exceeded the utilization limit.
    pub sustained_latency: u64,
    /// Last observed per-second user CPU average.
    pub user_time: u64,
    /// Last observed per-second system CPU average.
    pub system_time: u64,
    /// Resident bytes at the first non-zero observation; the footprint
    /// baseline for the memory limit.
    pub initial_footprint: u64,
    /// Unix time of the child's last (re)launch.
    pub last_respawn_time: u64,
}

impl PerformanceState {
    /// Clears the counters and stamps a new respawn time.
    ///
    /// A cleared state reports `initial_footprint == 0`, so the next sanity
    /// check re-baselines the footprint of the fresh process image.
    pub fn reset(&mut self, respawn_time: u64) {
        *self = PerformanceState {
            last_respawn_time: respawn_time,
            ..PerformanceState::default()
        };
    }
}

#[derive(Default)]
struct Inner {
    worker: ChildHandle,
    worker_state: PerformanceState,
    worker_status: Option<i32>,
    restart_count: u32,
    extensions: HashMap<String, ChildHandle>,
    extension_states: HashMap<String, PerformanceState>,
}

/// Process-wide store of supervised children and their counters.
///
/// Constructed explicitly ([`Registry::new`] returns an `Arc`); there is no
/// global static, so tests and the embedding agent control its lifetime.
pub struct Registry {
    inner: Mutex<Inner>,
    fates_bound: AtomicBool,
}

impl Registry {
    /// Creates an empty registry: no worker, no extensions, fates unbound.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner::default()),
            fates_bound: AtomicBool::new(false),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // === Worker ===

    /// Returns a copy of the worker handle (invalid when no worker runs).
    pub fn worker(&self) -> ChildHandle {
        self.lock().worker
    }

    /// Installs a freshly launched worker handle.
    pub fn set_worker(&self, handle: ChildHandle) {
        self.lock().worker = handle;
    }

    /// Releases the worker: invalid handle, counters cleared.
    pub fn reset_worker(&self) {
        let mut inner = self.lock();
        inner.worker = ChildHandle::invalid();
        inner.worker_state.reset(0);
    }

    /// Clears the worker counters and stamps the given respawn time.
    pub fn reset_worker_counters(&self, respawn_time: u64) {
        self.lock().worker_state.reset(respawn_time);
    }

    /// Last harvested worker exit status; `None` until a child exit has been
    /// observed.
    pub fn worker_status(&self) -> Option<i32> {
        self.lock().worker_status
    }

    /// Stores a harvested exit code.
    pub fn set_worker_status(&self, code: i32) {
        self.lock().worker_status = Some(code);
    }

    /// Monotonic count of rapid worker restarts.
    pub fn restart_count(&self) -> u32 {
        self.lock().restart_count
    }

    /// Records one rapid worker restart and returns the new count.
    pub fn note_worker_restart(&self) -> u32 {
        let mut inner = self.lock();
        inner.restart_count += 1;
        inner.restart_count
    }

    // === Extensions ===

    /// Registers an extension path for management with an invalid handle and
    /// zeroed counters. The loop launches it on its next iteration.
    pub fn add_extension(&self, path: &str) {
        let mut inner = self.lock();
        inner
            .extensions
            .insert(path.to_string(), ChildHandle::invalid());
        inner
            .extension_states
            .insert(path.to_string(), PerformanceState::default());
    }

    /// Replaces the stored handle for `path`; the state entry stays in place.
    pub fn set_extension(&self, path: &str, handle: ChildHandle) {
        self.lock().extensions.insert(path.to_string(), handle);
    }

    /// Removes both the handle and the state entry for `path`.
    pub fn remove_extension(&self, path: &str) {
        let mut inner = self.lock();
        inner.extensions.remove(path);
        inner.extension_states.remove(path);
    }

    /// Clears the counters of `path` and stamps the given respawn time.
    pub fn reset_extension_counters(&self, path: &str, respawn_time: u64) {
        self.lock()
            .extension_states
            .entry(path.to_string())
            .or_default()
            .reset(respawn_time);
    }

    /// Snapshot of `(path, handle)` pairs for one loop iteration.
    pub fn extensions(&self) -> Vec<(String, ChildHandle)> {
        self.lock()
            .extensions
            .iter()
            .map(|(path, handle)| (path.clone(), *handle))
            .collect()
    }

    /// Whether any extension is currently registered.
    pub fn has_extensions(&self) -> bool {
        !self.lock().extensions.is_empty()
    }

    /// Whether this process manages extensions.
    ///
    /// True when the map is non-empty, **or** when `env_hint` says the
    /// supervisor advertised extensions through [`MANAGED_EXTENSIONS_ENV`];
    /// that lets a worker, which cannot see the map, wait for extension
    /// plugins anyway.
    pub fn has_managed_extensions(&self, env_hint: bool) -> bool {
        self.has_extensions() || env_hint
    }

    // === Shared state access ===

    /// Runs `f` on the state of the child behind `handle`, under the lock.
    ///
    /// Resolution order: the worker's state if the handle equals the worker
    /// (two invalid handles match, so a fresh registry resolves to the worker
    /// slot); otherwise the extension whose stored handle equals `handle`.
    /// With no match the empty-path sink entry is used; callers must not
    /// rely on persistence in that case.
    pub fn with_state_of<R>(
        &self,
        handle: &ChildHandle,
        f: impl FnOnce(&mut PerformanceState) -> R,
    ) -> R {
        let mut inner = self.lock();
        if *handle == inner.worker {
            return f(&mut inner.worker_state);
        }
        let path = inner
            .extensions
            .iter()
            .find(|(_, stored)| *stored == handle)
            .map(|(path, _)| path.clone())
            .unwrap_or_default();
        f(inner.extension_states.entry(path).or_default())
    }

    /// Runs `f` on the state of the extension at `path`, under the lock.
    pub fn with_extension_state<R>(
        &self,
        path: &str,
        f: impl FnOnce(&mut PerformanceState) -> R,
    ) -> R {
        let mut inner = self.lock();
        f(inner.extension_states.entry(path.to_string()).or_default())
    }

    /// Releases whatever child sits behind `handle` after a foreign-pid
    /// observation: the worker slot is cleared, or the matching extension
    /// handle is swapped for an invalid one with zeroed counters. The pid is
    /// never signaled.
    pub fn reset_child(&self, handle: &ChildHandle) {
        let mut inner = self.lock();
        if *handle == inner.worker {
            inner.worker = ChildHandle::invalid();
            inner.worker_state.reset(0);
            return;
        }
        let paths: Vec<String> = inner
            .extensions
            .iter()
            .filter(|(_, stored)| *stored == handle)
            .map(|(path, _)| path.clone())
            .collect();
        for path in paths {
            inner.extensions.insert(path.clone(), ChildHandle::invalid());
            inner.extension_states.entry(path).or_default().reset(0);
        }
    }

    // === Fates ===

    /// Binds the children's fates to this process: the loop terminates on its
    /// next boundary and launches nothing new. Called from the signal path.
    pub fn bind_fates(&self) {
        self.fates_bound.store(true, AtomicOrdering::SeqCst);
    }

    /// Whether a shutdown signal bound the fates. Lock-free.
    pub fn fates_bound(&self) -> bool {
        self.fates_bound.load(AtomicOrdering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_maps_keep_identical_key_sets() {
        let registry = Registry::new();
        registry.add_extension("/opt/ext/a");
        registry.add_extension("/opt/ext/b");
        registry.set_extension("/opt/ext/a", ChildHandle::from_pid(10));

        let paths: Vec<String> = registry
            .extensions()
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        assert_eq!(paths.len(), 2);
        for path in &paths {
            // Every handle entry has a state entry and vice versa.
            let state = registry.with_extension_state(path, |s| *s);
            assert_eq!(state.sustained_latency, 0);
        }

        registry.remove_extension("/opt/ext/a");
        assert_eq!(registry.extensions().len(), 1);
        assert!(registry.has_extensions());
        registry.remove_extension("/opt/ext/b");
        assert!(!registry.has_extensions());
    }

    #[test]
    fn state_resolution_prefers_worker_then_extension_then_sink() {
        let registry = Registry::new();
        registry.set_worker(ChildHandle::from_pid(100));
        registry.add_extension("/opt/ext/a");
        registry.set_extension("/opt/ext/a", ChildHandle::from_pid(200));

        registry.with_state_of(&ChildHandle::from_pid(100), |s| s.user_time = 11);
        registry.with_state_of(&ChildHandle::from_pid(200), |s| s.user_time = 22);

        assert_eq!(
            registry.with_state_of(&ChildHandle::from_pid(100), |s| s.user_time),
            11
        );
        assert_eq!(
            registry.with_extension_state("/opt/ext/a", |s| s.user_time),
            22
        );

        // Unknown handle lands in the benign empty-path sink.
        registry.with_state_of(&ChildHandle::from_pid(999), |s| s.user_time = 33);
        assert_eq!(
            registry.with_extension_state("", |s| s.user_time),
            33
        );
    }

    #[test]
    fn reset_child_releases_worker_without_touching_extensions() {
        let registry = Registry::new();
        let worker = ChildHandle::from_pid(100);
        registry.set_worker(worker);
        registry.reset_worker_counters(500);
        registry.add_extension("/opt/ext/a");
        registry.set_extension("/opt/ext/a", ChildHandle::from_pid(200));

        registry.reset_child(&worker);
        assert!(!registry.worker().is_valid());
        let state = registry.with_state_of(&registry.worker(), |s| *s);
        assert_eq!(state.initial_footprint, 0);
        assert_eq!(state.sustained_latency, 0);
        assert_eq!(state.last_respawn_time, 0);
        assert_eq!(registry.extensions()[0].1, ChildHandle::from_pid(200));
    }

    #[test]
    fn reset_child_invalidates_matching_extension_handle() {
        let registry = Registry::new();
        registry.set_worker(ChildHandle::from_pid(100));
        registry.add_extension("/opt/ext/a");
        registry.set_extension("/opt/ext/a", ChildHandle::from_pid(200));
        registry.reset_extension_counters("/opt/ext/a", 500);

        registry.reset_child(&ChildHandle::from_pid(200));
        let (path, handle) = registry.extensions().pop().unwrap();
        assert_eq!(path, "/opt/ext/a");
        assert!(!handle.is_valid());
        assert_eq!(
            registry.with_extension_state("/opt/ext/a", |s| s.last_respawn_time),
            0
        );
    }

    #[test]
    fn restart_count_is_monotonic() {
        let registry = Registry::new();
        assert_eq!(registry.note_worker_restart(), 1);
        assert_eq!(registry.note_worker_restart(), 2);
        assert_eq!(registry.restart_count(), 2);
    }

    #[test]
    fn managed_extensions_honors_env_hint() {
        let registry = Registry::new();
        assert!(!registry.has_managed_extensions(false));
        assert!(registry.has_managed_extensions(true));
        registry.add_extension("/opt/ext/a");
        assert!(registry.has_managed_extensions(false));
    }

    #[test]
    fn fates_start_unbound() {
        let registry = Registry::new();
        assert!(!registry.fates_bound());
        registry.bind_fates();
        assert!(registry.fates_bound());
    }
}
