//! Configuration system for the cache simulator.
//!
//! This module defines the cache configuration and its validated geometry. It provides:
//! 1. **Defaults:** The baseline cache (1024 KiB, 4-byte blocks, 4-way).
//! 2. **Structures:** `CacheConfig` as supplied by the user or a JSON file.
//! 3. **Validation:** `CacheGeometry`, the derived set count and address bit split.
//!
//! Configuration is supplied as JSON (`--config`), through command line flags, or
//! via `CacheConfig::default()`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{ADDRESS_BITS, ConfigError, SimError};

/// Default configuration constants for the simulator.
///
/// These values define the baseline cache when a field is not explicitly
/// supplied in a configuration file or on the command line.
pub mod defaults {
    /// Bytes per KiB; the command line takes cache sizes in KiB.
    pub const KIB: usize = 1024;

    /// Default total cache capacity in bytes (1024 KiB).
    pub const CACHE_SIZE: usize = 1024 * KIB;

    /// Default block (line) size in bytes.
    pub const BLOCK_SIZE: usize = 4;

    /// Default associativity (4-way set-associative).
    pub const WAYS: usize = 4;

    /// Cache sizes in KiB swept by the cache-size experiment.
    pub const SWEEP_CACHE_SIZES_KB: &[usize] = &[128, 256, 512, 1024, 2048, 4096];

    /// Block sizes in bytes swept by the block-size experiment.
    pub const SWEEP_BLOCK_SIZES: &[usize] = &[1, 2, 4, 8, 16, 32, 64, 128];

    /// Associativities swept by the associativity experiment.
    pub const SWEEP_WAYS: &[usize] = &[1, 2, 4, 8, 16, 32, 64];
}

/// Converts a capacity in KiB to bytes.
///
/// # Errors
///
/// Returns [`ConfigError::SizeOverflow`] instead of wrapping.
pub const fn kib_to_bytes(kib: usize) -> Result<usize, ConfigError> {
    match kib.checked_mul(defaults::KIB) {
        Some(bytes) => Ok(bytes),
        None => Err(ConfigError::SizeOverflow { kib }),
    }
}

/// User-facing cache configuration.
///
/// Every field is optional when deserializing; missing fields take the
/// values in [`defaults`].
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use cachesim_core::config::CacheConfig;
///
/// let config = CacheConfig::default();
/// assert_eq!(config.size_bytes, 1024 * 1024);
/// assert_eq!(config.line_bytes, 4);
/// assert_eq!(config.ways, 4);
/// ```
///
/// Deserializing from JSON and validating:
///
/// ```
/// use cachesim_core::config::CacheConfig;
///
/// let json = r#"{ "size_bytes": 32768, "line_bytes": 64 }"#;
/// let config: CacheConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.ways, 4);
///
/// let geometry = config.validate().unwrap();
/// assert_eq!(geometry.num_sets, 128);
/// assert_eq!(geometry.offset_bits, 6);
/// assert_eq!(geometry.index_bits, 7);
/// assert_eq!(geometry.tag_bits, 19);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Total capacity in bytes.
    #[serde(default = "CacheConfig::default_size_bytes")]
    pub size_bytes: usize,

    /// Block (line) size in bytes; must be a power of two.
    #[serde(default = "CacheConfig::default_line_bytes")]
    pub line_bytes: usize,

    /// Number of ways per set.
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,
}

impl CacheConfig {
    fn default_size_bytes() -> usize {
        defaults::CACHE_SIZE
    }

    fn default_line_bytes() -> usize {
        defaults::BLOCK_SIZE
    }

    fn default_ways() -> usize {
        defaults::WAYS
    }

    /// Builds a configuration with the capacity given in KiB.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SizeOverflow`] when the capacity in bytes does
    /// not fit in `usize`.
    pub const fn from_kib(
        size_kb: usize,
        line_bytes: usize,
        ways: usize,
    ) -> Result<Self, ConfigError> {
        match kib_to_bytes(size_kb) {
            Ok(size_bytes) => Ok(Self {
                size_bytes,
                line_bytes,
                ways,
            }),
            Err(e) => Err(e),
        }
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] when the file cannot be read and
    /// [`SimError::ConfigFormat`] when it is not a valid configuration.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SimError::ConfigFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks the configuration and derives the cache geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when any size is zero, the block size is not a
    /// power of two, the capacity is not a whole number of blocks, the
    /// associativity does not divide the block count, the set count is not a
    /// power of two, or the offset and index bits do not fit in the address.
    pub fn validate(&self) -> Result<CacheGeometry, ConfigError> {
        if self.size_bytes == 0 {
            return Err(ConfigError::Zero { field: "size_bytes" });
        }
        if self.line_bytes == 0 {
            return Err(ConfigError::Zero { field: "line_bytes" });
        }
        if self.ways == 0 {
            return Err(ConfigError::Zero { field: "ways" });
        }
        if !self.line_bytes.is_power_of_two() {
            return Err(ConfigError::BlockSizeNotPowerOfTwo(self.line_bytes));
        }
        if self.size_bytes % self.line_bytes != 0 {
            return Err(ConfigError::SizeNotBlockMultiple {
                size: self.size_bytes,
                block: self.line_bytes,
            });
        }

        let blocks = self.size_bytes / self.line_bytes;
        if blocks % self.ways != 0 {
            return Err(ConfigError::WaysDoNotDivideBlocks {
                ways: self.ways,
                blocks,
            });
        }

        let num_sets = blocks / self.ways;
        if !num_sets.is_power_of_two() {
            return Err(ConfigError::SetCountNotPowerOfTwo(num_sets));
        }

        let offset_bits = self.line_bytes.trailing_zeros();
        let index_bits = num_sets.trailing_zeros();
        let tag_bits = ADDRESS_BITS
            .checked_sub(offset_bits + index_bits)
            .ok_or(ConfigError::AddressTooNarrow {
                offset_bits,
                index_bits,
                width: ADDRESS_BITS,
            })?;

        Ok(CacheGeometry {
            size_bytes: self.size_bytes,
            line_bytes: self.line_bytes,
            ways: self.ways,
            num_sets,
            offset_bits,
            index_bits,
            tag_bits,
        })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::BLOCK_SIZE,
            ways: defaults::WAYS,
        }
    }
}

/// Validated cache geometry.
///
/// Only produced by [`CacheConfig::validate`], so every instance satisfies
/// `num_sets * ways * line_bytes == size_bytes` and
/// `tag_bits + index_bits + offset_bits == 32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheGeometry {
    /// Total capacity in bytes.
    pub size_bytes: usize,
    /// Block size in bytes.
    pub line_bytes: usize,
    /// Ways per set.
    pub ways: usize,
    /// Number of sets.
    pub num_sets: usize,
    /// `log2(line_bytes)`.
    pub offset_bits: u32,
    /// `log2(num_sets)`.
    pub index_bits: u32,
    /// Address bits left for the tag.
    pub tag_bits: u32,
}

impl CacheGeometry {
    /// Total number of blocks the cache holds.
    pub const fn blocks(&self) -> usize {
        self.num_sets * self.ways
    }

    /// Capacity recomputed from the derived geometry.
    pub const fn capacity(&self) -> usize {
        self.num_sets * self.ways * self.line_bytes
    }

    /// Returns the configuration this geometry was derived from.
    pub const fn config(&self) -> CacheConfig {
        CacheConfig {
            size_bytes: self.size_bytes,
            line_bytes: self.line_bytes,
            ways: self.ways,
        }
    }
}
