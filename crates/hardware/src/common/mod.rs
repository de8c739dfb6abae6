//! Common types used throughout the cache simulator.
//!
//! This module provides the building blocks shared by the cache model and the
//! trace driver. It includes:
//! 1. **Address Type:** A strong type for fixed-width 32-bit byte addresses.
//! 2. **Error Handling:** Configuration, address-width, trace and driver errors.

/// Address type definition and hexadecimal parsing.
pub mod addr;

/// Error types for configuration, addresses, traces and runs.
pub mod error;

pub use addr::{ADDRESS_BITS, Address};
pub use error::{
    AddressWidthError, ConfigError, SimError, TraceErrorKind, TraceFormatError,
};
