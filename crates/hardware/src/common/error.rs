//! Error definitions for the cache simulator.
//!
//! This module defines every failure the simulator can report. It provides:
//! 1. **Configuration Errors:** Rejected cache geometries, raised before any access runs.
//! 2. **Address Width Errors:** Values that do not fit the 32-bit byte address space.
//! 3. **Trace Errors:** Malformed trace records, tagged with their line number.
//! 4. **Driver Errors:** The umbrella type returned by trace runs and sweeps.
//!
//! Cache-model errors and trace-format errors are kept in separate types so a
//! caller can tell a bad geometry from a bad input file.

use std::path::PathBuf;

use thiserror::Error;

/// Cache geometry rejected at construction time.
///
/// A `CacheModel` is never built from a configuration that produces one of
/// these; construction fails closed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A size parameter was zero.
    #[error("{field} must be positive")]
    Zero {
        /// Name of the offending configuration field.
        field: &'static str,
    },

    /// A capacity given in KiB does not fit in `usize` bytes.
    #[error("cache size {kib} KiB overflows the addressable byte count")]
    SizeOverflow {
        /// Requested capacity in KiB.
        kib: usize,
    },

    /// The block (line) size is not a power of two, so offset bits are undefined.
    #[error("block size {0} bytes is not a power of two")]
    BlockSizeNotPowerOfTwo(usize),

    /// The total capacity does not hold a whole number of blocks.
    #[error("cache size {size} bytes is not a multiple of the {block}-byte block size")]
    SizeNotBlockMultiple {
        /// Total cache capacity in bytes.
        size: usize,
        /// Block size in bytes.
        block: usize,
    },

    /// The associativity does not evenly divide the number of blocks.
    #[error("associativity {ways} does not divide the block count {blocks}")]
    WaysDoNotDivideBlocks {
        /// Requested associativity.
        ways: usize,
        /// Number of blocks the cache holds.
        blocks: usize,
    },

    /// The derived set count is not a power of two, so index bits are undefined.
    #[error("set count {0} is not a power of two")]
    SetCountNotPowerOfTwo(usize),

    /// Offset and index bits together exceed the address width.
    #[error(
        "{offset_bits} offset bits + {index_bits} index bits exceed the {width}-bit address"
    )]
    AddressTooNarrow {
        /// Bits consumed by the block offset.
        offset_bits: u32,
        /// Bits consumed by the set index.
        index_bits: u32,
        /// Fixed address width in bits.
        width: u32,
    },
}

/// A value needs more significant bits than the fixed 32-bit address holds.
///
/// The simulator rejects such values rather than silently truncating them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("address {value:#x} does not fit in {width} bits")]
pub struct AddressWidthError {
    /// The rejected value.
    pub value: u64,
    /// Fixed address width in bits.
    pub width: u32,
}

/// The reason a single trace record could not be turned into an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceErrorKind {
    /// The record has fewer than two whitespace-delimited fields.
    #[error("missing address field")]
    MissingAddress,

    /// The address field is not a hexadecimal number.
    #[error("invalid hexadecimal address '{0}'")]
    InvalidHex(String),

    /// The address does not fit the 32-bit address space.
    #[error(transparent)]
    Width(#[from] AddressWidthError),
}

/// A malformed record in a memory-access trace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("trace line {line}: {kind}")]
pub struct TraceFormatError {
    /// 1-based line number of the offending record.
    pub line: usize,
    /// What was wrong with it.
    pub kind: TraceErrorKind,
}

/// Errors surfaced by trace runs and parameter sweeps.
#[derive(Debug, Error)]
pub enum SimError {
    /// The cache configuration was rejected.
    #[error("invalid cache configuration: {0}")]
    Config(#[from] ConfigError),

    /// The trace contained a malformed record.
    #[error(transparent)]
    Trace(#[from] TraceFormatError),

    /// A trace or configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file was not valid JSON for `CacheConfig`.
    #[error("failed to parse configuration {}: {source}", path.display())]
    ConfigFormat {
        /// Path that failed.
        path: PathBuf,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The trace held no records, so no rate can be computed.
    #[error("trace '{0}' contains no memory references")]
    EmptyTrace(String),
}
