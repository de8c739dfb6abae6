//! Trace replay against a single cache configuration.

use std::io::BufRead;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::cache::CacheModel;
use crate::common::{Address, SimError};
use crate::config::{CacheConfig, CacheGeometry};
use crate::stats::{AccessStats, RateSummary};
use crate::trace::{Trace, TraceReader, display_name};

/// Result of replaying one trace through one cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Trace name (file name for traces loaded from disk).
    pub trace: String,
    /// Geometry the cache was built with.
    pub geometry: CacheGeometry,
    /// Hit/miss tally and rates.
    #[serde(flatten)]
    pub rates: RateSummary,
}

impl RunReport {
    /// Raw counters of this run.
    pub const fn stats(&self) -> &AccessStats {
        &self.rates.stats
    }
}

/// Drives one cache model over a trace.
///
/// The runner owns its cache; state never leaks between runners, so
/// independent runners may be moved to separate threads.
#[derive(Debug, Clone)]
pub struct TraceRunner {
    cache: CacheModel,
    stats: AccessStats,
}

impl TraceRunner {
    /// Creates a runner with a cold cache.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] when the configuration is rejected.
    pub fn new(config: &CacheConfig) -> Result<Self, SimError> {
        Ok(Self {
            cache: CacheModel::new(config)?,
            stats: AccessStats::default(),
        })
    }

    /// The cache being driven.
    pub const fn cache(&self) -> &CacheModel {
        &self.cache
    }

    /// Tally so far.
    pub const fn stats(&self) -> &AccessStats {
        &self.stats
    }

    /// Replays one reference.
    #[inline]
    pub fn step(&mut self, address: Address) {
        let outcome = self.cache.access(address);
        self.stats.record(outcome);
    }

    /// Replays every address in order.
    pub fn replay<I>(&mut self, addresses: I)
    where
        I: IntoIterator<Item = Address>,
    {
        for address in addresses {
            self.step(address);
        }
    }

    /// Streams a trace from `reader`, stopping at the first malformed record.
    ///
    /// References before the bad record have already been counted.
    ///
    /// # Errors
    ///
    /// Returns the read failure or malformed record that stopped the replay.
    pub fn replay_reader(&mut self, reader: impl BufRead, source: &str) -> Result<(), SimError> {
        for address in TraceReader::new(reader, source) {
            self.step(address?);
        }
        Ok(())
    }

    /// Cold-starts the cache and clears the tally.
    pub fn reset(&mut self) {
        self.cache.reset();
        self.stats = AccessStats::default();
    }

    /// Finishes the run, naming it `trace`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EmptyTrace`] when no reference was replayed.
    pub fn finish(self, trace: impl Into<String>) -> Result<RunReport, SimError> {
        let trace = trace.into();
        if self.stats.accesses == 0 {
            warn!(trace = %trace, "empty trace");
            return Err(SimError::EmptyTrace(trace));
        }

        info!(
            trace = %trace,
            accesses = self.stats.accesses,
            hits = self.stats.hits,
            misses = self.stats.misses,
            hit_rate = self.stats.hit_rate(),
            "trace replayed"
        );
        Ok(RunReport {
            trace,
            geometry: *self.cache.geometry(),
            rates: self.stats.into(),
        })
    }
}

/// Replays an in-memory trace through a fresh cache.
///
/// # Errors
///
/// Fails on a rejected configuration or an empty trace.
pub fn simulate(config: &CacheConfig, trace: &Trace) -> Result<RunReport, SimError> {
    let mut runner = TraceRunner::new(config)?;
    runner.replay(trace.addresses().iter().copied());
    runner.finish(trace.name())
}

/// Streams a trace file through a fresh cache without holding it in memory.
///
/// # Errors
///
/// Fails on a rejected configuration, an unreadable file, a malformed record,
/// or an empty trace.
pub fn simulate_file(config: &CacheConfig, path: impl AsRef<Path>) -> Result<RunReport, SimError> {
    let path = path.as_ref();
    let mut runner = TraceRunner::new(config)?;
    for address in TraceReader::open(path)? {
        runner.step(address?);
    }
    runner.finish(display_name(path))
}
