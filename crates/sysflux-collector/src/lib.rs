//! Metric sources for the sysflux agent.
//!
//! Each [`Source`] implementation reads one metric domain (CPU, memory,
//! network, disk, ...) and returns raw [`Sample`]s. Sources that report
//! cumulative kernel counters declare themselves [`Source::cumulative`];
//! the scheduler routes their samples through the diff engine.

pub mod cpu;
pub mod disk;
pub mod load;
pub mod memory;
pub mod mount;
pub mod network;
pub mod swap;
pub mod uptime;

use anyhow::Result;
use sysflux_common::types::Sample;

/// A system metric source, invoked once per collection round.
///
/// Implementations run concurrently on the blocking thread pool, so the
/// trait requires `Send + Sync`; sources that hold probe state use
/// interior mutability.
pub trait Source: Send + Sync {
    /// The source name (e.g. `"cpu"`, `"network"`), used for logging and
    /// configuration.
    fn name(&self) -> &'static str;

    /// Whether this source reports cumulative counters that must be
    /// converted to per-interval deltas before emission.
    fn cumulative(&self) -> bool {
        false
    }

    /// Read the current values for this metric domain.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying counter file or system API is
    /// unavailable. The scheduler logs the error and retries the round.
    fn collect(&self) -> Result<Vec<Sample>>;
}
