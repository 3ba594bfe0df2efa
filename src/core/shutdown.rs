//! # Cross-platform OS signal handling and fates binding.
//!
//! Provides [`wait_for_shutdown_signal`] an async helper that completes when
//! the process receives a termination signal, and [`bind_fates`] the listener
//! that couples a signal to the supervisor: it marks the registry, announces
//! the shutdown on the bus, and cancels the loop token so no new children are
//! launched.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::registry::Registry;
use crate::events::{Bus, Event, EventKind};

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal
/// registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal
/// registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Spawns the listener that binds the children's fates to this process.
///
/// On the first termination signal it sets the registry's fates flag,
/// publishes [`EventKind::ShutdownRequested`], and cancels `token`, after
/// which the watch loop exits at its next boundary without launching new
/// children. The listener itself exits when `token` cancels for any reason.
pub fn bind_fates(registry: Arc<Registry>, bus: Bus, token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_shutdown_signal() => {
                registry.bind_fates();
                bus.publish(Event::now(EventKind::ShutdownRequested));
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}
