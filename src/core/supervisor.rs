//! # Supervisor: the watch loop over worker and extension children.
//!
//! The [`Supervisor`] owns the runtime components (registry, event bus,
//! subscribers, collaborator seams) and drives child supervision from launch
//! to termination.
//!
//! - Probe each child's liveness and sanity once per interval
//! - Kill and respawn a worker that trips a limit, with respawn back-off
//! - Drop an extension that fails twice within the respawn window
//! - Harvest exit codes and decide when the supervisor itself should exit
//! - Fan events out to subscribers for observability
//!
//! ## Architecture
//! ```text
//! Supervisor::run(token)
//!     │
//!     ├──► subscriber_listener()     (Bus → each Subscribe impl)
//!     │
//!     └──► loop {
//!           ├──► watch(worker)       ── unhealthy/dead ──► create_worker()
//!           ├──► watch(extension)*   ── unhealthy/dead ──► create_extension()
//!           │                                 └── failed ──► remove + drop
//!           ├──► sleep(Interval)     (cancellable)
//!           └──► continue while !interrupted && ok()
//!          }
//! ```
//!
//! ## Rules
//! - The worker is evaluated **before** extensions within one iteration.
//! - The registry lock is never held across launches, kill/wait, table
//!   queries, or sleeps; the back-off sleep runs with the lock released.
//! - Once fates are bound (signal), the loop terminates at its next boundary
//!   and launches **no** new children.
//! - A graceful (`exit_code::SUCCESS`) or catastrophic
//!   (`exit_code::CATASTROPHIC`) worker exit ends the supervisor; any other
//!   exit respawns, subject to back-off.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::registry::{Registry, MANAGED_EXTENSIONS_ENV};
use crate::core::sanity::{self, Trip, Verdict};
use crate::error::SupervisorError;
use crate::events::{Bus, Event, EventKind};
use crate::exit_code;
use crate::policies::{worker_limit, LimitKind, RespawnBackoff};
use crate::process::{ChildHandle, ChildStatus, ExtensionLaunch, Host, ProcessTable};
use crate::subscribers::Subscribe;

/// Drives the watch loop over one worker and any number of extensions.
pub struct Supervisor {
    /// Flag values the loop consumes.
    cfg: Config,
    /// Shared child and counter store.
    registry: Arc<Registry>,
    /// Platform process primitives.
    host: Arc<dyn Host>,
    /// Per-pid accounting rows.
    table: Arc<dyn ProcessTable>,
    /// Event bus shared with the subscriber listener.
    bus: Bus,
    /// Observability sinks; forwarded every published event.
    subscribers: Vec<Arc<dyn Subscribe>>,
    /// Worker respawn back-off policy for the configured level.
    backoff: RespawnBackoff,
    /// Whether a worker child is supervised at all.
    use_worker: bool,
}

impl Supervisor {
    /// Creates a supervisor over the given registry and collaborator seams.
    ///
    /// `subscribers` may be empty; events are then dropped silently.
    pub fn new(
        cfg: Config,
        registry: Arc<Registry>,
        host: Arc<dyn Host>,
        table: Arc<dyn ProcessTable>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let backoff = RespawnBackoff::from_level(cfg.level());
        let use_worker = !cfg.disable_watchdog;
        Self {
            cfg,
            registry,
            host,
            table,
            bus,
            subscribers,
            backoff,
            use_worker,
        }
    }

    /// A clone of the event bus, for additional subscriptions.
    pub fn bus(&self) -> Bus {
        self.bus.clone()
    }

    /// The registry this supervisor mutates.
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Runs the watch loop until fates are bound, the token cancels, or
    /// [`ok`](Self::ok) reports there is nothing left to supervise.
    pub async fn run(&self, token: CancellationToken) {
        self.subscriber_listener(&token);

        // Worker counters start from a clean slate.
        self.registry.reset_worker_counters(0);

        'watch: loop {
            if self.use_worker && !self.watch(&self.registry.worker()) {
                if self.registry.fates_bound() {
                    // A signal has interrupted the supervisor.
                    break;
                }
                let _ = self.create_worker().await;
            }

            // Check sanity of every managed extension.
            let mut failing: Vec<String> = Vec::new();
            for (path, handle) in self.registry.extensions() {
                if !self.watch(&handle) {
                    if self.registry.fates_bound() {
                        break 'watch;
                    }
                    if self.create_extension(&path).await.is_err() {
                        failing.push(path);
                    }
                }
            }
            // Stop managing the extensions that failed to respawn.
            for path in failing {
                self.registry.remove_extension(&path);
                self.publish(Event::now(EventKind::ExtensionDropped).with_child(path.as_str()));
            }

            let interval =
                Duration::from_secs(worker_limit(LimitKind::Interval, self.cfg.level()));
            let sleep = time::sleep(interval);
            tokio::pin!(sleep);
            select! {
                _ = &mut sleep => {}
                _ = token.cancelled() => {}
            }

            if token.is_cancelled() || !self.ok() {
                break;
            }
        }
    }

    /// Whether the loop should keep running.
    ///
    /// A harvested `SUCCESS` or `CATASTROPHIC` worker exit ends it; otherwise
    /// it continues while a worker or at least one managed extension exists.
    fn ok(&self) -> bool {
        match self.registry.worker_status() {
            Some(code) if code == exit_code::SUCCESS || code == exit_code::CATASTROPHIC => false,
            _ => self.registry.worker().is_valid() || self.managed_extensions(),
        }
    }

    /// Probes one child and applies the sanity verdict.
    ///
    /// Returns `false` when the caller must (re)create the child: the handle
    /// is invalid, the probe errored, or a limit tripped and the child was
    /// stopped. A harvested exit returns `true` so the next iteration decides
    /// between respawn and quitting.
    fn watch(&self, child: &ChildHandle) -> bool {
        let status = self.host.check_child(child);
        if self.registry.fates_bound() {
            // A signal was handled while the loop was probing.
            return false;
        }
        if !child.is_valid() {
            return false;
        }

        match status {
            ChildStatus::Error => false,
            ChildStatus::Running => match self.check_sanity(child) {
                Verdict::Healthy => {
                    // Flush buffered status logs toward the well-behaved worker.
                    if self.use_worker {
                        self.host.relay_status_logs();
                    }
                    true
                }
                // Not our child; nothing to do.
                Verdict::Foreign => true,
                Verdict::Unhealthy(trip) => {
                    self.publish(
                        Event::now(EventKind::ChildUnhealthy)
                            .with_child(self.identify(child))
                            .with_pid(child.pid().unwrap_or_default())
                            .with_error(trip.reason()),
                    );
                    self.stop_child(child);
                    false
                }
            },
            ChildStatus::Exited(code) => {
                // Store the exit code; the next iteration decides whether to
                // respawn or quit.
                self.registry.set_worker_status(code);
                self.publish(
                    Event::now(EventKind::ChildExited)
                        .with_child(self.identify(child))
                        .with_code(code),
                );
                true
            }
        }
    }

    /// Runs the sanity evaluator for `child` and applies a foreign verdict.
    fn check_sanity(&self, child: &ChildHandle) -> Verdict {
        let Some(pid) = child.pid() else {
            return Verdict::Unhealthy(Trip::Vanished);
        };
        let Some(row) = self.table.row(pid) else {
            return Verdict::Unhealthy(Trip::Vanished);
        };

        let supervisor_pid = self.host.current_pid();
        let level = self.cfg.level();
        let verdict = self.registry.with_state_of(child, |state| {
            sanity::evaluate(state, &row, supervisor_pid, level)
        });

        if verdict == Verdict::Foreign {
            // The pid was reused; release the handle, never signal it.
            self.registry.reset_child(child);
            self.publish(Event::now(EventKind::ChildForeign).with_pid(pid));
        }
        verdict
    }

    /// Terminates a child and reaps the zombie.
    fn stop_child(&self, child: &ChildHandle) {
        self.host.kill(child);
        self.host.reap_defunct();
    }

    /// Launches a replacement worker, backing off when it flaps.
    ///
    /// Unresolvable executable path, unsafe permissions, and launch failure
    /// are all non-recoverable for the agent: a shutdown is requested and the
    /// error returned for observability.
    pub async fn create_worker(&self) -> Result<(), SupervisorError> {
        let level = self.cfg.level();
        let now = self.host.unix_time();
        let respawn_limit = worker_limit(LimitKind::RespawnLimit, level);
        let last_respawn = self
            .registry
            .with_state_of(&self.registry.worker(), |state| state.last_respawn_time);

        if last_respawn > now.saturating_sub(respawn_limit) {
            // The worker is respawning too quickly.
            let restarts = self.registry.note_worker_restart();
            let delay = self.backoff.next(restarts);
            self.publish(
                Event::now(EventKind::RespawnBackoff)
                    .with_child("worker")
                    .with_restarts(restarts)
                    .with_delay(delay),
            );
            // The back-off sleep runs with the registry lock released.
            time::sleep(delay).await;
        }

        // Resolve this process's executable from the accounting table.
        let exec = self
            .table
            .row(self.host.current_pid())
            .map(|row| row.path)
            .filter(|path| !path.is_empty());
        let Some(exec) = exec else {
            self.host.request_shutdown(exit_code::FAILURE);
            return Err(SupervisorError::WorkerPathUnresolved);
        };

        // Tell a plugin-dependent worker to wait for extension broadcasts.
        if self.managed_extensions() {
            self.host.set_env(MANAGED_EXTENSIONS_ENV, "true");
        }

        let exec_path = Path::new(&exec);
        let dir = exec_path.parent().unwrap_or_else(|| Path::new("/"));
        if !self.host.safe_permissions(dir, exec_path, true) {
            // The agent binary has become unsafe.
            self.host.request_shutdown(exit_code::FAILURE);
            return Err(SupervisorError::UnsafePermissions { path: exec });
        }

        match self.host.launch_worker(exec_path).await {
            Ok(handle) => {
                self.registry.set_worker(handle);
                self.registry.reset_worker_counters(self.host.unix_time());
                self.publish(
                    Event::now(EventKind::WorkerSpawned)
                        .with_child("worker")
                        .with_pid(handle.pid().unwrap_or_default()),
                );
                Ok(())
            }
            Err(e) => {
                // Cannot create a worker process at all.
                self.host.shutdown(exit_code::FAILURE);
                Err(SupervisorError::Launch(e))
            }
        }
    }

    /// Launches the extension registered at `path`.
    ///
    /// A rapid respawn or unsafe binary drops the extension (the caller
    /// removes it); a launch failure is catastrophic like the worker's.
    pub async fn create_extension(&self, path: &str) -> Result<(), SupervisorError> {
        let level = self.cfg.level();
        let now = self.host.unix_time();
        let respawn_limit = worker_limit(LimitKind::RespawnLimit, level);
        let last_respawn = self
            .registry
            .with_extension_state(path, |state| state.last_respawn_time);

        if last_respawn > now.saturating_sub(respawn_limit) {
            // Unlike a worker, a rapidly respawning extension is given up on.
            return Err(SupervisorError::RespawnThrottled {
                path: path.to_string(),
            });
        }

        let exec_path = Path::new(path);
        let dir = exec_path.parent().unwrap_or_else(|| Path::new("/"));
        if !self.host.safe_permissions(dir, exec_path, true) {
            // The extension binary has become unsafe.
            return Err(SupervisorError::UnsafePermissions {
                path: path.to_string(),
            });
        }

        let launch = ExtensionLaunch {
            path: exec_path.to_path_buf(),
            socket: self.cfg.extensions_socket.clone(),
            timeout: self.cfg.extensions_timeout,
            interval: self.cfg.extensions_interval,
            verbose: self.cfg.verbose,
        };
        match self.host.launch_extension(&launch).await {
            Ok(handle) => {
                self.registry.set_extension(path, handle);
                self.registry
                    .reset_extension_counters(path, self.host.unix_time());
                self.publish(
                    Event::now(EventKind::ExtensionSpawned)
                        .with_child(path)
                        .with_pid(handle.pid().unwrap_or_default()),
                );
                Ok(())
            }
            Err(e) => {
                // Cannot create an extension process at all.
                self.host.shutdown(exit_code::FAILURE);
                Err(SupervisorError::Launch(e))
            }
        }
    }

    /// Whether this process manages extensions, counting the env hint a
    /// supervisor leaves for its worker.
    fn managed_extensions(&self) -> bool {
        let hinted = self.host.get_env(MANAGED_EXTENSIONS_ENV).is_some();
        self.registry.has_managed_extensions(hinted)
    }

    /// Resolves a handle to its identity label for event payloads.
    fn identify(&self, child: &ChildHandle) -> String {
        if *child == self.registry.worker() {
            return "worker".to_string();
        }
        self.registry
            .extensions()
            .into_iter()
            .find(|(_, handle)| handle == child)
            .map(|(path, _)| path)
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Spawns the background forwarder from the bus to the subscribers.
    fn subscriber_listener(&self, token: &CancellationToken) {
        if self.subscribers.is_empty() {
            return;
        }
        let mut rx = self.bus.subscribe();
        let subs = self.subscribers.clone();
        let token = token.clone();

        tokio::spawn(async move {
            loop {
                select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => {
                            for sub in &subs {
                                sub.on_event(&ev).await;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => continue,
                    },
                }
            }
        });
    }

    fn publish(&self, ev: Event) {
        self.bus.publish(ev);
    }
}
