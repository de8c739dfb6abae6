//! Address decoding into tag, set index and block offset.
//!
//! A 32-bit address is split, most-significant bits first, into
//! `tag_bits | index_bits | offset_bits`. Decoding is pure shift/mask
//! arithmetic on the integer value.

use crate::common::Address;
use crate::config::CacheGeometry;

/// The three fields of a decoded address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedAddress {
    /// High-order bits identifying the block within its set.
    pub tag: u32,
    /// Set the block maps to.
    pub index: usize,
    /// Byte within the block. Not used for hit/miss decisions.
    pub offset: u32,
}

/// Splits addresses according to a fixed cache geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDecoder {
    offset_bits: u32,
    index_bits: u32,
    offset_mask: u32,
    index_mask: u32,
}

impl AddressDecoder {
    /// Creates a decoder for the given geometry.
    ///
    /// The geometry has already been validated, so the bit widths are known
    /// to fit the address.
    pub const fn new(geometry: &CacheGeometry) -> Self {
        Self {
            offset_bits: geometry.offset_bits,
            index_bits: geometry.index_bits,
            offset_mask: low_mask(geometry.offset_bits),
            index_mask: low_mask(geometry.index_bits),
        }
    }

    /// Number of block-offset bits.
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Number of set-index bits.
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Number of tag bits.
    pub const fn tag_bits(&self) -> u32 {
        Address::BITS - self.offset_bits - self.index_bits
    }

    /// Splits `address` into tag, index and offset.
    #[inline]
    pub const fn decode(&self, address: Address) -> DecodedAddress {
        let raw = address.val();
        DecodedAddress {
            tag: shr(raw, self.offset_bits + self.index_bits),
            index: (shr(raw, self.offset_bits) & self.index_mask) as usize,
            offset: raw & self.offset_mask,
        }
    }

    /// Rebuilds the address a decoded triple came from.
    ///
    /// Used to report the address of an evicted block (with offset 0).
    #[inline]
    pub const fn compose(&self, decoded: DecodedAddress) -> Address {
        let tag = shl(decoded.tag, self.offset_bits + self.index_bits);
        let index = shl(decoded.index as u32 & self.index_mask, self.offset_bits);
        Address::new(tag | index | (decoded.offset & self.offset_mask))
    }
}

/// Mask of the low `bits` bits; `bits` may be the full address width.
const fn low_mask(bits: u32) -> u32 {
    match 1u32.checked_shl(bits) {
        Some(bit) => bit - 1,
        None => u32::MAX,
    }
}

// A shift by the full width yields 0 instead of overflowing.
const fn shr(value: u32, bits: u32) -> u32 {
    match value.checked_shr(bits) {
        Some(v) => v,
        None => 0,
    }
}

const fn shl(value: u32, bits: u32) -> u32 {
    match value.checked_shl(bits) {
        Some(v) => v,
        None => 0,
    }
}
