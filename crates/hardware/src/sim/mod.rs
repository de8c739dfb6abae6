//! Trace-driven simulation.
//!
//! Provides the driver around the cache model: replaying a trace through a
//! single configuration, and sweeping one cache parameter across a range of
//! values.

/// Trace replay against a single cache configuration.
pub mod runner;

/// Parameter sweeps over cache size, block size or associativity.
pub mod sweep;

pub use runner::{RunReport, TraceRunner, simulate, simulate_file};
pub use sweep::{Metric, Sweep, SweepAxis, SweepPoint, SweepSeries};
