//! Hit/miss statistics collection and reporting.
//!
//! This module tallies the outcome of every reference in a run. It provides:
//! 1. **Counters:** Accesses, hits and misses.
//! 2. **Rates:** Hit rate and miss rate (`1 - hit_rate`).
//! 3. **Reporting:** A one-line summary in the form the sweep tables use.

use std::fmt;

use serde::Serialize;

use crate::cache::AccessOutcome;

/// Hit and miss counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccessStats {
    /// Total references replayed.
    pub accesses: u64,
    /// References that hit.
    pub hits: u64,
    /// References that missed.
    pub misses: u64,
}

impl AccessStats {
    /// Counts one reference.
    #[inline]
    pub const fn record(&mut self, outcome: AccessOutcome) {
        self.accesses += 1;
        match outcome {
            AccessOutcome::Hit => self.hits += 1,
            AccessOutcome::Miss => self.misses += 1,
        }
    }

    /// Fraction of references that hit, or 0 when nothing was recorded.
    pub fn hit_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64
        }
    }

    /// Fraction of references that missed, defined as `1 - hit_rate()`.
    pub fn miss_rate(&self) -> f64 {
        1.0 - self.hit_rate()
    }

    /// Adds another tally into this one.
    pub const fn merge(&mut self, other: &Self) {
        self.accesses += other.accesses;
        self.hits += other.hits;
        self.misses += other.misses;
    }
}

impl Extend<AccessOutcome> for AccessStats {
    fn extend<I: IntoIterator<Item = AccessOutcome>>(&mut self, iter: I) {
        for outcome in iter {
            self.record(outcome);
        }
    }
}

impl FromIterator<AccessOutcome> for AccessStats {
    fn from_iter<I: IntoIterator<Item = AccessOutcome>>(iter: I) -> Self {
        let mut stats = Self::default();
        stats.extend(iter);
        stats
    }
}

impl fmt::Display for AccessStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hit Rate {:.4}, Miss Rate: {:.4}",
            self.hit_rate(),
            self.miss_rate()
        )
    }
}

/// Serializable view of [`AccessStats`] with the derived rates filled in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateSummary {
    /// Raw counters.
    #[serde(flatten)]
    pub stats: AccessStats,
    /// `hits / accesses`.
    pub hit_rate: f64,
    /// `1 - hit_rate`.
    pub miss_rate: f64,
}

impl From<AccessStats> for RateSummary {
    fn from(stats: AccessStats) -> Self {
        Self {
            stats,
            hit_rate: stats.hit_rate(),
            miss_rate: stats.miss_rate(),
        }
    }
}
