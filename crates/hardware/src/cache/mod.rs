//! Set-Associative Cache Model.
//!
//! This module implements the trace-driven cache model. It provides:
//! 1. **Decoding:** Splitting 32-bit addresses into tag, set index and offset.
//! 2. **Storage:** One flat array of lines; set `i` owns lines `i * ways .. (i + 1) * ways`.
//! 3. **Replacement:** True LRU via a bounded recency counter per line.
//!
//! The model answers one question per reference: hit or miss. It has no
//! notion of data, dirtiness or timing.

/// Address decoding into tag, set index and block offset.
pub mod decoder;

/// Cache sets and their LRU bookkeeping.
pub mod set;

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use self::decoder::{AddressDecoder, DecodedAddress};
use self::set::{CacheLine, CacheSet};
use crate::common::{Address, AddressWidthError, ConfigError};
use crate::config::{CacheConfig, CacheGeometry};

/// Result of a single cache reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AccessOutcome {
    /// The block was resident.
    Hit,
    /// The block was not resident and has been installed.
    Miss,
}

impl AccessOutcome {
    /// Returns `true` for [`AccessOutcome::Hit`].
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Hit)
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => f.write_str("Hit"),
            Self::Miss => f.write_str("Miss"),
        }
    }
}

/// Everything a single access did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRecord {
    /// Hit or miss.
    pub outcome: AccessOutcome,
    /// Set the address mapped to.
    pub set: usize,
    /// Way that now holds the block.
    pub way: usize,
    /// Block address that was evicted to make room, if any.
    pub evicted: Option<Address>,
}

/// Set-associative cache with true LRU replacement.
///
/// Built from a validated geometry, so every access is infallible.
///
/// # Examples
///
/// ```
/// use cachesim_core::cache::{AccessOutcome, CacheModel};
/// use cachesim_core::common::Address;
/// use cachesim_core::config::CacheConfig;
///
/// let mut cache = CacheModel::new(&CacheConfig::from_kib(1, 16, 2).unwrap()).unwrap();
/// assert_eq!(cache.access(Address(0x40)), AccessOutcome::Miss);
/// assert_eq!(cache.access(Address(0x44)), AccessOutcome::Hit);
/// ```
#[derive(Debug, Clone)]
pub struct CacheModel {
    geometry: CacheGeometry,
    decoder: AddressDecoder,
    lines: Box<[CacheLine]>,
}

impl CacheModel {
    /// Creates a cold cache from a configuration.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`CacheConfig::validate`]; no partially
    /// built cache is ever returned.
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate().map(Self::from_geometry)
    }

    /// Creates a cold cache from an already validated geometry.
    pub fn from_geometry(geometry: CacheGeometry) -> Self {
        debug!(
            size_bytes = geometry.size_bytes,
            line_bytes = geometry.line_bytes,
            ways = geometry.ways,
            sets = geometry.num_sets,
            tag_bits = geometry.tag_bits,
            index_bits = geometry.index_bits,
            offset_bits = geometry.offset_bits,
            "cache model constructed"
        );

        Self {
            decoder: AddressDecoder::new(&geometry),
            lines: vec![CacheLine::default(); geometry.blocks()].into_boxed_slice(),
            geometry,
        }
    }

    /// Geometry this cache was built with.
    pub const fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Decoder used to split addresses.
    pub const fn decoder(&self) -> &AddressDecoder {
        &self.decoder
    }

    /// The set at `index`, if it exists.
    pub fn set(&self, index: usize) -> Option<CacheSet<&[CacheLine]>> {
        let ways = self.geometry.ways;
        let start = index.checked_mul(ways)?;
        let end = start.checked_add(ways)?;
        self.lines.get(start..end).map(CacheSet::from_lines)
    }

    /// Number of sets.
    pub const fn num_sets(&self) -> usize {
        self.geometry.num_sets
    }

    /// Mutable view of set `index`; the decoder only yields in-range indices.
    fn set_mut(&mut self, index: usize) -> CacheSet<&mut [CacheLine]> {
        let ways = self.geometry.ways;
        let start = index * ways;
        CacheSet::from_lines(&mut self.lines[start..start + ways])
    }

    /// Performs one reference and reports hit or miss.
    ///
    /// On a hit the line becomes most recently used. On a miss the set's
    /// replacement target (an empty way, else the LRU way) receives the block
    /// and becomes most recently used.
    #[inline]
    pub fn access(&mut self, address: Address) -> AccessOutcome {
        self.access_detailed(address).outcome
    }

    /// Like [`CacheModel::access`], for callers holding a wider integer.
    ///
    /// # Errors
    ///
    /// Returns [`AddressWidthError`] when `address` does not fit in 32 bits;
    /// the value is never truncated and the cache is left untouched.
    pub fn access_raw(&mut self, address: u64) -> Result<AccessOutcome, AddressWidthError> {
        Address::try_from(address).map(|address| self.access(address))
    }

    /// Performs one reference and reports where the block landed.
    pub fn access_detailed(&mut self, address: Address) -> AccessRecord {
        let decoder = self.decoder;
        let DecodedAddress { tag, index, .. } = decoder.decode(address);
        let mut set = self.set_mut(index);

        if let Some(way) = set.probe(tag) {
            set.touch(way);
            trace!(%address, set = index, way, "hit");
            return AccessRecord {
                outcome: AccessOutcome::Hit,
                set: index,
                way,
                evicted: None,
            };
        }

        let way = set.evict_target();
        let evicted = set.fill(way, tag).map(|old_tag| {
            decoder.compose(DecodedAddress {
                tag: old_tag,
                index,
                offset: 0,
            })
        });
        set.touch(way);

        trace!(%address, set = index, way, evicted = ?evicted, "miss");
        AccessRecord {
            outcome: AccessOutcome::Miss,
            set: index,
            way,
            evicted,
        }
    }

    /// Checks whether the block holding `address` is resident.
    ///
    /// Does not change recency.
    pub fn contains(&self, address: Address) -> bool {
        let DecodedAddress { tag, index, .. } = self.decoder.decode(address);
        self.set(index).is_some_and(|set| set.probe(tag).is_some())
    }

    /// Invalidates every line, returning the cache to its cold state.
    pub fn reset(&mut self) {
        self.lines.fill(CacheLine::default());
    }
}
