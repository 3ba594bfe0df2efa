//! Scripted `Host` and `ProcessTable` doubles for watch-loop tests.
//!
//! [`World`] simulates the OS side of supervision: launched children, their
//! accounting rows, kills, reaps, env vars, and shutdown requests. Children
//! are scripted, not real: each carries a sequence of accounting rows that is
//! consumed one entry per sanity check (the last entry repeats), and a probe
//! status that transitions `Exited → Error` once the exit was delivered,
//! mirroring a reaped pid.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use procvisor::{
    ChildHandle, ChildStatus, ExtensionLaunch, Host, ProcessRow, ProcessTable, SpawnError,
};

/// Pid the scripted supervisor process runs under.
pub const SUPERVISOR_PID: u32 = 1000;

/// Executable path reported for the supervisor's own pid.
pub const AGENT_PATH: &str = "/usr/local/bin/agentd";

/// One simulated child process.
pub struct Proc {
    /// Probe status returned by `check_child`.
    pub status: ChildStatus,
    /// Accounting rows consumed one per `row()` call; the last repeats.
    pub rows: Vec<ProcessRow>,
    row_cursor: usize,
}

impl Proc {
    fn next_row(&mut self) -> Option<ProcessRow> {
        if self.rows.is_empty() {
            return None;
        }
        let idx = self.row_cursor.min(self.rows.len() - 1);
        self.row_cursor += 1;
        Some(self.rows[idx].clone())
    }
}

#[derive(Default)]
pub struct WorldState {
    pub procs: HashMap<u32, Proc>,
    pub env: HashMap<String, String>,
    /// Pids that received the terminate signal.
    pub kills: Vec<u32>,
    pub reaps: u32,
    pub relays: u32,
    pub shutdown_requests: Vec<i32>,
    pub shutdowns: Vec<i32>,
    pub worker_launches: u32,
    pub extension_launches: Vec<String>,
    /// Whether the next launch fails.
    pub fail_next_launch: bool,
    /// Newly launched children immediately exit with this code.
    pub exit_on_spawn: Option<i32>,
    /// Result of the safe-permissions predicate.
    pub safe: bool,
    /// Whether the launcher process is reported dead to a parent watcher.
    pub launcher_dead: bool,
}

/// Scripted OS double implementing both collaborator seams.
pub struct World {
    now: AtomicU64,
    next_pid: AtomicU32,
    state: Mutex<WorldState>,
}

impl World {
    pub fn new() -> Arc<Self> {
        let world = Arc::new(Self {
            now: AtomicU64::new(100_000),
            next_pid: AtomicU32::new(4000),
            state: Mutex::new(WorldState {
                safe: true,
                ..WorldState::default()
            }),
        });
        // The supervisor's own accounting row, used to resolve the worker
        // executable.
        world.lock().procs.insert(
            SUPERVISOR_PID,
            Proc {
                status: ChildStatus::Running,
                rows: vec![ProcessRow {
                    parent: 1,
                    path: AGENT_PATH.to_string(),
                    ..ProcessRow::default()
                }],
                row_cursor: 0,
            },
        );
        world
    }

    pub fn lock(&self) -> MutexGuard<'_, WorldState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current scripted Unix time.
    pub fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    /// Advances the scripted Unix time.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// A healthy accounting row parented to the supervisor.
    pub fn healthy_row(user_ticks: u64, resident: u64) -> ProcessRow {
        ProcessRow {
            parent: i64::from(SUPERVISOR_PID),
            user_time: user_ticks,
            system_time: 0,
            resident_size: resident,
            path: AGENT_PATH.to_string(),
        }
    }

    /// Registers a scripted child and returns its handle.
    pub fn add_proc(&self, status: ChildStatus, rows: Vec<ProcessRow>) -> ChildHandle {
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.lock().procs.insert(
            pid,
            Proc {
                status,
                rows,
                row_cursor: 0,
            },
        );
        ChildHandle::from_pid(pid)
    }

    fn spawn_child(&self) -> Result<ChildHandle, SpawnError> {
        let mut state = self.lock();
        if state.fail_next_launch {
            state.fail_next_launch = false;
            return Err(SpawnError::Failed {
                reason: "scripted launch failure".to_string(),
            });
        }
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        let status = match state.exit_on_spawn {
            Some(code) => ChildStatus::Exited(code),
            None => ChildStatus::Running,
        };
        state.procs.insert(
            pid,
            Proc {
                status,
                // Fresh children idle at a small footprint.
                rows: vec![Self::healthy_row(9, 10 << 20)],
                row_cursor: 0,
            },
        );
        Ok(ChildHandle::from_pid(pid))
    }
}

#[async_trait]
impl Host for World {
    fn current_pid(&self) -> u32 {
        SUPERVISOR_PID
    }

    fn check_child(&self, child: &ChildHandle) -> ChildStatus {
        let Some(pid) = child.pid() else {
            return ChildStatus::Error;
        };
        let mut state = self.lock();
        let Some(entry) = state.procs.get_mut(&pid) else {
            return ChildStatus::Error;
        };
        let status = entry.status;
        if let ChildStatus::Exited(_) = status {
            // The exit is delivered once; afterwards the pid is reaped.
            entry.status = ChildStatus::Error;
        }
        status
    }

    async fn launch_worker(&self, _exec: &Path) -> Result<ChildHandle, SpawnError> {
        let handle = self.spawn_child()?;
        self.lock().worker_launches += 1;
        Ok(handle)
    }

    async fn launch_extension(&self, launch: &ExtensionLaunch) -> Result<ChildHandle, SpawnError> {
        let handle = self.spawn_child()?;
        self.lock()
            .extension_launches
            .push(launch.path.display().to_string());
        Ok(handle)
    }

    fn kill(&self, child: &ChildHandle) {
        if let Some(pid) = child.pid() {
            let mut state = self.lock();
            state.kills.push(pid);
            if let Some(proc) = state.procs.get_mut(&pid) {
                proc.status = ChildStatus::Error;
            }
        }
    }

    fn reap_defunct(&self) {
        self.lock().reaps += 1;
    }

    fn is_launcher_dead(&self, _launcher: &ChildHandle) -> bool {
        self.lock().launcher_dead
    }

    fn safe_permissions(&self, _dir: &Path, _file: &Path, _require_owner: bool) -> bool {
        self.lock().safe
    }

    fn unix_time(&self) -> u64 {
        self.now()
    }

    fn get_env(&self, name: &str) -> Option<String> {
        self.lock().env.get(name).cloned()
    }

    fn set_env(&self, name: &str, value: &str) {
        self.lock().env.insert(name.to_string(), value.to_string());
    }

    fn relay_status_logs(&self) {
        self.lock().relays += 1;
    }

    fn request_shutdown(&self, code: i32) {
        self.lock().shutdown_requests.push(code);
    }

    fn shutdown(&self, code: i32) {
        self.lock().shutdowns.push(code);
    }
}

impl ProcessTable for World {
    fn row(&self, pid: u32) -> Option<ProcessRow> {
        self.lock().procs.get_mut(&pid).and_then(Proc::next_row)
    }
}
