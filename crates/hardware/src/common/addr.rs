//! Byte address type.
//!
//! This module defines the strong type for simulated memory addresses. It provides:
//! 1. **Fixed Width:** Addresses are 32-bit byte addresses; wider values are rejected.
//! 2. **Parsing:** Conversion from hexadecimal text as found in trace files.
//! 3. **Formatting:** Zero-padded hexadecimal display for diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{AddressWidthError, TraceErrorKind};

/// Width in bits of every simulated address.
pub const ADDRESS_BITS: u32 = u32::BITS;

/// A byte address in the simulated 32-bit address space.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Address(pub u32);

impl Address {
    /// Width of an address in bits.
    pub const BITS: u32 = ADDRESS_BITS;

    /// Creates a new address from a raw 32-bit value.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw 32-bit address value.
    #[inline(always)]
    pub const fn val(self) -> u32 {
        self.0
    }

    /// Parses a hexadecimal address, with or without a `0x`/`0X` prefix.
    ///
    /// Leading zeros are accepted, so `"0000001f"` and `"0x1F"` are the same
    /// address. A value with significant bits above bit 31 is rejected with
    /// [`TraceErrorKind::Width`].
    ///
    /// # Examples
    ///
    /// ```
    /// use cachesim_core::common::Address;
    ///
    /// assert_eq!(Address::from_hex("0x7fff0010").unwrap(), Address(0x7fff_0010));
    /// assert_eq!(Address::from_hex("1f").unwrap(), Address(0x1f));
    /// assert!(Address::from_hex("0x100000000").is_err());
    /// ```
    pub fn from_hex(text: &str) -> Result<Self, TraceErrorKind> {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TraceErrorKind::InvalidHex(text.to_owned()));
        }

        let significant = digits.trim_start_matches('0');
        // Past 16 significant digits the value overflows u64; report it saturated.
        if significant.len() > 16 {
            return Err(AddressWidthError {
                value: u64::MAX,
                width: ADDRESS_BITS,
            }
            .into());
        }

        let value = u64::from_str_radix(if significant.is_empty() { "0" } else { significant }, 16)
            .map_err(|_| TraceErrorKind::InvalidHex(text.to_owned()))?;
        Ok(Self::try_from(value)?)
    }
}

impl From<u32> for Address {
    fn from(addr: u32) -> Self {
        Self(addr)
    }
}

impl TryFrom<u64> for Address {
    type Error = AddressWidthError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        u32::try_from(value).map(Self).map_err(|_| AddressWidthError {
            value,
            width: ADDRESS_BITS,
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
