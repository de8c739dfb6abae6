//! Parameter sweeps over one cache dimension.
//!
//! A sweep replays the same trace through a family of caches that differ in
//! exactly one parameter (capacity, block size or associativity) and collects
//! one tally per parameter value. Every point gets its own cold cache, so
//! points are independent of each other and of the order they run in.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::info;

use super::runner::{RunReport, simulate};
use crate::common::{ConfigError, SimError};
use crate::config::{CacheConfig, defaults, kib_to_bytes};
use crate::stats::RateSummary;
use crate::trace::Trace;

/// The cache parameter a sweep varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepAxis {
    /// Total capacity, in KiB.
    CacheSize,
    /// Block (line) size, in bytes.
    BlockSize,
    /// Ways per set.
    Associativity,
}

/// Which rate a sweep is usually charted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Fraction of references that hit.
    HitRate,
    /// Fraction of references that missed.
    MissRate,
}

impl SweepAxis {
    /// Every axis, in report order.
    pub const ALL: [Self; 3] = [Self::CacheSize, Self::BlockSize, Self::Associativity];

    /// Values swept when none are given.
    pub const fn default_values(self) -> &'static [usize] {
        match self {
            Self::CacheSize => defaults::SWEEP_CACHE_SIZES_KB,
            Self::BlockSize => defaults::SWEEP_BLOCK_SIZES,
            Self::Associativity => defaults::SWEEP_WAYS,
        }
    }

    /// Returns `base` with this axis set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SizeOverflow`] when a cache size in KiB does not
    /// fit in `usize` bytes.
    pub const fn apply(
        self,
        base: CacheConfig,
        value: usize,
    ) -> Result<CacheConfig, ConfigError> {
        match self {
            Self::CacheSize => match kib_to_bytes(value) {
                Ok(size_bytes) => Ok(CacheConfig { size_bytes, ..base }),
                Err(e) => Err(e),
            },
            Self::BlockSize => Ok(CacheConfig {
                line_bytes: value,
                ..base
            }),
            Self::Associativity => Ok(CacheConfig { ways: value, ..base }),
        }
    }

    /// Reads this axis back out of a configuration.
    pub const fn value_of(self, config: &CacheConfig) -> usize {
        match self {
            Self::CacheSize => config.size_bytes / defaults::KIB,
            Self::BlockSize => config.line_bytes,
            Self::Associativity => config.ways,
        }
    }

    /// Axis label, with unit.
    pub const fn label(self) -> &'static str {
        match self {
            Self::CacheSize => "Cache Size (KB)",
            Self::BlockSize => "Block Size (Bytes)",
            Self::Associativity => "Associativity (ways)",
        }
    }

    /// Formats one value of this axis the way result tables print it.
    pub fn format_value(self, value: usize) -> String {
        match self {
            Self::CacheSize => format!("Cache Size: {value}KB"),
            Self::BlockSize => format!("Block Size: {value} bytes"),
            Self::Associativity => format!("Associativity: {value}-way"),
        }
    }

    /// Associativity is charted by hit rate, the other axes by miss rate.
    pub const fn plotted_metric(self) -> Metric {
        match self {
            Self::Associativity => Metric::HitRate,
            Self::CacheSize | Self::BlockSize => Metric::MissRate,
        }
    }
}

impl fmt::Display for SweepAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CacheSize => "cache-size",
            Self::BlockSize => "block-size",
            Self::Associativity => "associativity",
        })
    }
}

/// One point of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    /// Value of the swept parameter.
    pub value: usize,
    /// Tally and rates at that value.
    #[serde(flatten)]
    pub rates: RateSummary,
}

/// All points of one sweep over one trace, ordered by parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepSeries {
    /// Trace the sweep replayed.
    pub trace: String,
    /// Parameter varied.
    pub axis: SweepAxis,
    /// Rate the series is charted by.
    pub metric: Metric,
    /// Points in ascending parameter order.
    pub points: Vec<SweepPoint>,
}

impl SweepSeries {
    /// The charted rate at every point, in order.
    pub fn plotted(&self) -> Vec<(usize, f64)> {
        self.points
            .iter()
            .map(|point| {
                let rate = match self.metric {
                    Metric::HitRate => point.rates.hit_rate,
                    Metric::MissRate => point.rates.miss_rate,
                };
                (point.value, rate)
            })
            .collect()
    }

    /// The point for `value`, if it was swept.
    pub fn point(&self, value: usize) -> Option<&SweepPoint> {
        self.points.iter().find(|point| point.value == value)
    }
}

/// A sweep definition: base configuration, axis, and the values to try.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sweep {
    base: CacheConfig,
    axis: SweepAxis,
    values: Vec<usize>,
}

impl Sweep {
    /// Sweeps `axis` over its default values around `base`.
    pub fn new(base: CacheConfig, axis: SweepAxis) -> Self {
        Self::with_values(base, axis, axis.default_values().to_vec())
    }

    /// Sweeps `axis` over `values` around `base`.
    pub const fn with_values(base: CacheConfig, axis: SweepAxis, values: Vec<usize>) -> Self {
        Self { base, axis, values }
    }

    /// The axis this sweep varies.
    pub const fn axis(&self) -> SweepAxis {
        self.axis
    }

    /// Values that will be tried.
    pub fn values(&self) -> &[usize] {
        &self.values
    }

    /// Every configuration the sweep will build, in value order.
    ///
    /// A value that cannot be applied to the base configuration yields its
    /// error in place.
    pub fn configs(
        &self,
    ) -> impl Iterator<Item = Result<(usize, CacheConfig), ConfigError>> + '_ {
        self.values.iter().map(|&value| {
            self.axis
                .apply(self.base, value)
                .map(|config| (value, config))
        })
    }

    /// Replays `trace` at every value.
    ///
    /// # Errors
    ///
    /// Fails on the first value whose configuration overflows or is rejected,
    /// or when the trace is empty.
    pub fn run(&self, trace: &Trace) -> Result<SweepSeries, SimError> {
        let mut by_value: BTreeMap<usize, RateSummary> = BTreeMap::new();

        for point in self.configs() {
            let (value, config) = point?;
            let RunReport { rates, .. } = simulate(&config, trace)?;
            info!(
                trace = trace.name(),
                axis = %self.axis,
                value,
                miss_rate = rates.miss_rate,
                "sweep point"
            );
            let _ = by_value.insert(value, rates);
        }

        Ok(SweepSeries {
            trace: trace.name().to_owned(),
            axis: self.axis,
            metric: self.axis.plotted_metric(),
            points: by_value
                .into_iter()
                .map(|(value, rates)| SweepPoint { value, rates })
                .collect(),
        })
    }

    /// Runs the sweep once per trace.
    ///
    /// # Errors
    ///
    /// Stops at the first trace whose sweep fails.
    pub fn run_all<'a>(
        &self,
        traces: impl IntoIterator<Item = &'a Trace>,
    ) -> Result<Vec<SweepSeries>, SimError> {
        traces.into_iter().map(|trace| self.run(trace)).collect()
    }
}
