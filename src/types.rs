// ABOUTME: Defines CBOR header layout, major types, and the output byte order.
// ABOUTME: Header classification maps one initial byte to its decoding parameters.

use serde::{Deserialize, Serialize};

/// Raw major type values (bits 7-5 of the initial byte).
pub mod major_type {
    pub const UNSIGNED: u8 = 0;
    pub const NEGATIVE: u8 = 1;
    pub const BYTES: u8 = 2;
    pub const TEXT: u8 = 3;
    pub const ARRAY: u8 = 4;
    pub const MAP: u8 = 5;
    pub const TAG: u8 = 6;
    pub const SIMPLE: u8 = 7;

    /// Mask for the additional-info field (bits 4-0).
    pub const ADDITIONAL_INFO_MASK: u8 = 0x1f;

    /// Extract the major type from an initial byte.
    #[inline]
    pub const fn of(byte: u8) -> u8 {
        byte >> 5
    }

    /// Extract the additional info from an initial byte.
    #[inline]
    pub const fn additional_info(byte: u8) -> u8 {
        byte & ADDITIONAL_INFO_MASK
    }
}

/// Additional-info values with a fixed meaning.
pub mod additional_info {
    /// Values below this are stored inline in the header.
    pub const INLINE_LIMIT: u8 = 24;
    /// One following byte.
    pub const ONE_BYTE: u8 = 24;
    /// Eight following bytes. Values above this, other than
    /// [`INDEFINITE`], are reserved.
    pub const EIGHT_BYTES: u8 = 27;
    /// Indefinite length, or break for major type 7.
    pub const INDEFINITE: u8 = 31;
}

/// Simple values of major type 7 and their flattened codes.
pub mod simple {
    pub const FALSE: u8 = 20;
    pub const TRUE: u8 = 21;
    pub const NULL: u8 = 22;
    pub const UNDEFINED: u8 = 23;

    /// The complete break byte (major type 7, additional info 31).
    pub const BREAK: u8 = 0xff;

    /// Map a simple value to the byte written to the output.
    ///
    /// `false` and `null` both flatten to 0 and `true` to 1. Every other code,
    /// `undefined` included, is written unchanged.
    #[inline]
    pub const fn flatten(value: u8) -> u8 {
        match value {
            FALSE | NULL => 0,
            TRUE => 1,
            _ => value,
        }
    }
}

/// Default resource limits.
pub mod limits {
    /// Default maximum nesting depth of the decode loop, top level included.
    /// Kept below 256 so the depth fits the one-byte counter of small targets.
    pub const MAX_DEPTH: usize = 16;
}

/// The eight CBOR major types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MajorType {
    Unsigned,
    Negative,
    Bytes,
    Text,
    Array,
    Map,
    Tag,
    Simple,
}

impl MajorType {
    /// Classify the major type of an initial byte.
    #[inline]
    pub const fn of(byte: u8) -> Self {
        match major_type::of(byte) {
            major_type::UNSIGNED => Self::Unsigned,
            major_type::NEGATIVE => Self::Negative,
            major_type::BYTES => Self::Bytes,
            major_type::TEXT => Self::Text,
            major_type::ARRAY => Self::Array,
            major_type::MAP => Self::Map,
            major_type::TAG => Self::Tag,
            _ => Self::Simple,
        }
    }
}

/// How many bytes after the header carry the item's length or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowingBytes {
    /// 0, 1, 2, 4 or 8 bytes. Zero means the value is the additional info.
    Fixed(usize),
    /// Length is given by a terminating break marker.
    Indefinite,
    /// Additional info 28-30; never valid.
    Reserved,
}

impl FollowingBytes {
    /// The value lives in the header byte itself.
    pub const INLINE: Self = Self::Fixed(0);

    /// Resolve an additional-info value.
    #[inline]
    pub const fn from_additional_info(info: u8) -> Self {
        if info < additional_info::INLINE_LIMIT {
            Self::INLINE
        } else if info <= additional_info::EIGHT_BYTES {
            Self::Fixed(1usize << (info - additional_info::ONE_BYTE))
        } else if info == additional_info::INDEFINITE {
            Self::Indefinite
        } else {
            Self::Reserved
        }
    }
}

/// A classified initial byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
    pub major: MajorType,
    pub info: u8,
    pub following: FollowingBytes,
}

impl Header {
    /// Split an initial byte into major type, additional info and the
    /// following-bytes descriptor.
    #[inline]
    pub const fn classify(byte: u8) -> Self {
        let info = major_type::additional_info(byte);
        Self {
            major: MajorType::of(byte),
            info,
            following: FollowingBytes::from_additional_info(info),
        }
    }
}

/// Byte order of multi-byte values written to the output buffer.
///
/// The wire is always big-endian; this only selects how integers, floats and
/// simple values are laid out in the flattened output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// The byte order of the target platform.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::Little;
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::Big;

    /// Copy a big-endian wire payload into `dst` in this byte order.
    /// Both slices must have the same length.
    #[inline]
    pub fn transcribe(self, src: &[u8], dst: &mut [u8]) {
        match self {
            Self::Big => dst.copy_from_slice(src),
            Self::Little => {
                for (d, s) in dst.iter_mut().zip(src.iter().rev()) {
                    *d = *s;
                }
            }
        }
    }

    /// Read up to 8 bytes laid out in this byte order as an unsigned value.
    #[inline]
    pub fn read_uint(self, bytes: &[u8]) -> u64 {
        let len = bytes.len();
        let mut buf = [0u8; 8];
        match self {
            Self::Little => {
                buf[..len].copy_from_slice(bytes);
                u64::from_le_bytes(buf)
            }
            Self::Big => {
                buf[8 - len..].copy_from_slice(bytes);
                u64::from_be_bytes(buf)
            }
        }
    }

    /// Write the low `dst.len()` bytes of `value` in this byte order.
    #[inline]
    pub fn write_uint(self, value: u64, dst: &mut [u8]) {
        let len = dst.len();
        match self {
            Self::Little => dst.copy_from_slice(&value.to_le_bytes()[..len]),
            Self::Big => dst.copy_from_slice(&value.to_be_bytes()[8 - len..]),
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::NATIVE
    }
}

/// Read a big-endian wire payload of up to 8 bytes.
#[inline]
pub fn read_be_uint(bytes: &[u8]) -> u64 {
    ByteOrder::Big.read_uint(bytes)
}
