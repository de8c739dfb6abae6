//! Set-associative cache simulator library.
//!
//! This crate replays memory-access traces through a configurable cache to
//! study how capacity, block size and associativity affect the hit rate:
//! 1. **Cache:** Address decoding, set-associative storage and true LRU replacement.
//! 2. **Configuration:** Validated cache geometry, deserializable from JSON.
//! 3. **Traces:** Parsing of whitespace-delimited trace files with hexadecimal addresses.
//! 4. **Simulation:** Single-configuration runs and one-dimensional parameter sweeps.
//! 5. **Statistics:** Hit/miss tallies and rates.

/// Set-associative cache model (decoder, sets, LRU replacement).
pub mod cache;
/// Common types (addresses, errors).
pub mod common;
/// Cache configuration and validated geometry.
pub mod config;
/// Trace replay and parameter sweeps.
pub mod sim;
/// Hit/miss statistics.
pub mod stats;
/// Memory-access trace parsing.
pub mod trace;

/// Main cache type; construct with `CacheModel::new`.
pub use crate::cache::{AccessOutcome, CacheModel};
/// 32-bit byte address.
pub use crate::common::Address;
/// Cache configuration; use `CacheConfig::default()` or deserialize from JSON.
pub use crate::config::CacheConfig;
