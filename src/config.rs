//! # Global supervisor configuration.
//!
//! Provides [`Config`] the command-line flag values the supervisor core
//! consumes, plus runtime settings for the event system.
//!
//! Config is used in two ways:
//! 1. **Supervisor creation**: `Supervisor::new(config, ...)`
//! 2. **Extension launches**: socket/timeout/interval/verbose flag values are
//!    forwarded verbatim to every extension child.
//!
//! ## Sentinel values
//! - `watchdog_level > 3` → clamped to the last (debug) limit column
//! - `disable_watchdog = true` → the loop supervises extensions only; no
//!   worker is launched or watched

use crate::policies::limits::LEVELS;

/// Command-line flag storage for the supervisor core.
///
/// Defines:
/// - **Limit selection**: which column of the limit table applies
/// - **Worker supervision switch**: whether a worker child is managed at all
/// - **Extension flags**: values relayed to each launched extension
/// - **Event system**: bus capacity for event delivery
///
/// ## Field semantics
/// - `watchdog_level`: limit column (0=loose, 1=normal, 2=restrictive, 3=debug)
/// - `disable_watchdog`: `true` = run without a worker child
/// - `extensions_socket`: local socket path extensions register on
/// - `extensions_timeout`: seconds an extension may take to register
/// - `extensions_interval`: seconds between extension health exchanges
/// - `verbose`: forwarded verbosity switch for children
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Performance limit level selecting the limit-table column.
    ///
    /// Values above 3 behave like level 3 (the debug column).
    pub watchdog_level: u8,

    /// When `true` the loop does not launch or watch a worker child and the
    /// agent's primary work happens in this process.
    pub disable_watchdog: bool,

    /// Path of the local socket extensions register their plugins on.
    pub extensions_socket: String,

    /// Seconds an extension may take to register before it is considered hung.
    pub extensions_timeout: u64,

    /// Seconds between extension health exchanges.
    pub extensions_interval: u64,

    /// Verbosity switch forwarded to launched children.
    pub verbose: bool,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the watchdog level clamped to a valid limit-table column.
    #[inline]
    pub fn level(&self) -> u8 {
        self.watchdog_level.min((LEVELS - 1) as u8)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    ///
    /// The `Bus` should use this value to avoid constructing an invalid channel.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `watchdog_level = 0` (loose limits)
    /// - `disable_watchdog = false` (worker supervision on)
    /// - `extensions_socket = ""` (set by the embedding agent)
    /// - `extensions_timeout = 3`
    /// - `extensions_interval = 3`
    /// - `verbose = false`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            watchdog_level: 0,
            disable_watchdog: false,
            extensions_socket: String::new(),
            extensions_timeout: 3,
            extensions_interval: 3,
            verbose: false,
            bus_capacity: 1024,
        }
    }
}
