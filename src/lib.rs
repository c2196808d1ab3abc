// ABOUTME: Allocation-free CBOR decoder that flattens data items into a caller buffer.
// ABOUTME: Provides the decode entry points and re-exports the decoder building blocks.

//! # cbor_flat
//!
//! A single-pass decoder for CBOR (RFC 8949) data items, built for constrained
//! environments. A message is decoded in one call into a caller-supplied,
//! fixed-size output buffer. There is no heap allocation and no intermediate
//! tree: every scalar is written straight to the output as it is read.
//!
//! ## Output layout
//!
//! - Unsigned integers, floats and simple values are written at their encoded
//!   width (1, 2, 4 or 8 bytes; inline values take 1 byte) in the configured
//!   [`ByteOrder`].
//! - Negative integers are written in two's complement at their encoded width,
//!   or twice that width when the value would not fit as signed.
//! - `false` and `null` become `0`, `true` becomes `1`.
//! - Byte and text strings are copied verbatim.
//! - Arrays and maps contribute only their items.
//!
//! ## Quick Start
//!
//! ```rust
//! use cbor_flat::decode;
//!
//! // [1, -1, "hi"]
//! let input = [0x83, 0x01, 0x20, 0x62, b'h', b'i'];
//! let mut output = [0u8; 4];
//! decode(&input, &mut output).unwrap();
//! assert_eq!(output, [0x01, 0xff, b'h', b'i']);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use cbor_flat::{decode_with_config, ByteOrder, DecoderConfig};
//!
//! let input = [0x19, 0x12, 0x34]; // 0x1234
//! let mut output = [0u8; 2];
//! let config = DecoderConfig::default().with_byte_order(ByteOrder::Big);
//! decode_with_config(&input, &mut output, config).unwrap();
//! assert_eq!(output, [0x12, 0x34]);
//! ```
//!
//! ## Errors
//!
//! A decode succeeds only if the whole input is consumed and the output is
//! exactly filled. Otherwise one [`Error`] kind is returned and the output
//! contents should not be trusted.
//!
//! ## Limits
//!
//! - Nesting depth: [`limits::MAX_DEPTH`] levels by default, top level included
//! - Tags (major type 6) are rejected as [`Error::Unsupported`]

mod cursor;
pub mod decoder;
pub mod error;
pub mod types;

pub use decoder::{Decoder, DecoderConfig};
pub use error::{Error, Result};
pub use types::{limits, simple, ByteOrder, FollowingBytes, Header, MajorType};

use log::debug;

/// Decode a CBOR message into `output` with the default configuration.
///
/// # Example
///
/// ```rust
/// use cbor_flat::{decode, Error};
///
/// let mut output = [0u8; 1];
/// assert_eq!(decode(&[0x18, 0xff], &mut output), Ok(()));
/// assert_eq!(output, [0xff]);
///
/// // Reserved additional info
/// assert_eq!(decode(&[0x1c], &mut output), Err(Error::Malformed));
/// ```
pub fn decode(input: &[u8], output: &mut [u8]) -> Result<()> {
    decode_with_config(input, output, DecoderConfig::default())
}

/// Decode a CBOR message into `output` with custom configuration.
pub fn decode_with_config(input: &[u8], output: &mut [u8], config: DecoderConfig) -> Result<()> {
    let mut decoder = Decoder::with_config(input, output, config);
    let result = decoder.decode().and_then(|()| decoder.finish());
    if let Err(err) = result {
        debug!(
            "decode failed: {err} (input offset {} of {}, {} bytes written)",
            decoder.position(),
            input.len(),
            decoder.written()
        );
    }
    result
}
