//! Minimal wiring of the supervisor against a stub host.
//!
//! The stub's worker probe always errors, so the loop launches one "worker",
//! prints the event stream through [`LogWriter`], and is cancelled after a
//! few intervals. Run with: `cargo run --example watchdog`

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use procvisor::{
    bind_fates, ChildHandle, ChildStatus, Config, ExtensionLaunch, Host, LogWriter, ProcessRow,
    ProcessTable, Registry, SpawnError, Subscribe, Supervisor,
};

struct StubHost;

#[async_trait]
impl Host for StubHost {
    fn current_pid(&self) -> u32 {
        std::process::id()
    }

    fn check_child(&self, child: &ChildHandle) -> ChildStatus {
        match child.pid() {
            Some(_) => ChildStatus::Running,
            None => ChildStatus::Error,
        }
    }

    async fn launch_worker(&self, exec: &Path) -> Result<ChildHandle, SpawnError> {
        println!("(stub) would re-exec {} as worker", exec.display());
        Ok(ChildHandle::from_pid(4242))
    }

    async fn launch_extension(&self, launch: &ExtensionLaunch) -> Result<ChildHandle, SpawnError> {
        println!("(stub) would launch extension {}", launch.path.display());
        Ok(ChildHandle::from_pid(4243))
    }

    fn kill(&self, _child: &ChildHandle) {}
    fn reap_defunct(&self) {}

    fn is_launcher_dead(&self, _launcher: &ChildHandle) -> bool {
        false
    }

    fn safe_permissions(&self, _dir: &Path, _file: &Path, _require_owner: bool) -> bool {
        true
    }

    fn unix_time(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }

    fn get_env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn set_env(&self, name: &str, value: &str) {
        std::env::set_var(name, value);
    }

    fn relay_status_logs(&self) {}

    fn request_shutdown(&self, code: i32) {
        println!("(stub) shutdown requested with code {code}");
    }

    fn shutdown(&self, code: i32) {
        println!("(stub) immediate shutdown with code {code}");
    }
}

impl ProcessTable for StubHost {
    fn row(&self, pid: u32) -> Option<ProcessRow> {
        Some(ProcessRow {
            parent: i64::from(std::process::id()),
            user_time: 30,
            system_time: 10,
            resident_size: 10 << 20,
            path: std::env::current_exe()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        })
        .filter(|_| pid != 0)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let host = Arc::new(StubHost);
    let registry = Registry::new();

    let mut cfg = Config::default();
    cfg.watchdog_level = 3; // debug column: 1s interval

    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let supervisor = Supervisor::new(
        cfg,
        Arc::clone(&registry),
        host.clone(),
        host,
        subscribers,
    );

    let token = CancellationToken::new();
    bind_fates(registry, supervisor.bus(), token.clone());

    // Stop the demo after a few intervals.
    tokio::spawn({
        let token = token.clone();
        async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            token.cancel();
        }
    });

    supervisor.run(token).await;
    println!("demo finished");
}
