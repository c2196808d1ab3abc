// ABOUTME: Single-pass CBOR decoder that flattens data items into a fixed output buffer.
// ABOUTME: Dispatches on major type and recurses into containers under a depth bound.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::cursor::{Reader, Writer};
use crate::error::{Error, Result};
use crate::types::{limits, read_be_uint, simple, ByteOrder, FollowingBytes, Header, MajorType};

/// Validate text string content.
/// Uses simdutf8 for SIMD-accelerated validation when the feature is enabled.
#[cfg(feature = "simd-utf8")]
#[inline]
fn validate_utf8(bytes: &[u8]) -> Result<()> {
    simdutf8::basic::from_utf8(bytes)?;
    Ok(())
}

#[cfg(not(feature = "simd-utf8"))]
#[inline]
fn validate_utf8(bytes: &[u8]) -> Result<()> {
    std::str::from_utf8(bytes)?;
    Ok(())
}

/// Configuration options for the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Byte order of integers, floats and simple values in the output
    /// (default: the platform's)
    pub byte_order: ByteOrder,
    /// Maximum nesting depth, counting the top level as 1
    pub max_depth: usize,
    /// Read a map's count as key/value pairs, so a map of `n` entries
    /// decodes `2n` items (default: true)
    pub map_pairs: bool,
    /// Reject text strings that are not valid UTF-8 (default: false)
    pub validate_utf8: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::NATIVE,
            max_depth: limits::MAX_DEPTH,
            map_pairs: true,
            validate_utf8: false,
        }
    }
}

impl DecoderConfig {
    #[must_use]
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_map_pairs(mut self, map_pairs: bool) -> Self {
        self.map_pairs = map_pairs;
        self
    }

    #[must_use]
    pub fn with_validate_utf8(mut self, validate_utf8: bool) -> Self {
        self.validate_utf8 = validate_utf8;
        self
    }
}

/// Outcome of decoding one data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Item,
    /// A break marker was consumed.
    Break,
}

/// How long a decode loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Budget {
    /// Top level: until input or output runs out.
    Unbounded,
    /// A definite-length container.
    Items(usize),
    /// An indefinite-length container.
    UntilBreak,
}

/// A resolved string length or container count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Length {
    Definite(u64),
    Indefinite,
}

/// A CBOR decoder that flattens one input message into one output buffer.
///
/// Scalars are written back to back: integers, floats and simple values in
/// the configured byte order, strings verbatim. Containers leave no trace in
/// the output beyond their items.
pub struct Decoder<'i, 'o> {
    input: Reader<'i>,
    output: Writer<'o>,
    depth: usize,
    config: DecoderConfig,
}

impl<'i, 'o> Decoder<'i, 'o> {
    /// Create a new decoder for the given input and output buffers.
    #[must_use]
    pub fn new(input: &'i [u8], output: &'o mut [u8]) -> Self {
        Self::with_config(input, output, DecoderConfig::default())
    }

    /// Create a new decoder with custom configuration.
    #[must_use]
    pub fn with_config(input: &'i [u8], output: &'o mut [u8], config: DecoderConfig) -> Self {
        Self {
            input: Reader::new(input),
            output: Writer::new(output),
            depth: 0,
            config,
        }
    }

    /// Number of input bytes consumed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.input.position()
    }

    /// Number of output bytes written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.output.position()
    }

    /// Current container nesting. Zero whenever no decode is in progress.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Get the decoder configuration.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode top-level items until the input or the output runs out.
    pub fn decode(&mut self) -> Result<()> {
        self.decode_items(Budget::Unbounded)
    }

    /// Check that decoding consumed all input and filled all output.
    pub fn finish(&self) -> Result<()> {
        if !self.input.is_empty() {
            return Err(Error::Overrun);
        }
        if !self.output.is_full() {
            return Err(Error::OutputExhausted);
        }
        Ok(())
    }

    /// Run the decode loop one nesting level down.
    fn decode_items(&mut self, budget: Budget) -> Result<()> {
        self.depth += 1;
        let result = if self.depth > self.config.max_depth {
            Err(Error::Excessive)
        } else {
            self.run_loop(budget)
        };
        self.depth -= 1;
        result
    }

    fn run_loop(&mut self, budget: Budget) -> Result<()> {
        let mut items = 0usize;

        loop {
            match budget {
                Budget::Items(count) if items >= count => return Ok(()),
                Budget::Unbounded if self.output.is_full() => return Ok(()),
                _ => {}
            }

            let Some(byte) = self.input.peek() else {
                // Only the top level may simply run out of input.
                return match budget {
                    Budget::Unbounded => Ok(()),
                    _ => Err(Error::Malformed),
                };
            };

            let header = Header::classify(byte);
            trace!(
                "offset {}: {:?}, additional info {}",
                self.input.position(),
                header.major,
                header.info
            );
            self.check_bounds(header.following)?;

            match self.dispatch(header)? {
                Step::Item => items += 1,
                Step::Break if budget == Budget::UntilBreak => return Ok(()),
                // Outside an indefinite container a break only counts as an
                // item; ending the message on one is malformed.
                Step::Break if self.input.is_empty() => return Err(Error::Malformed),
                Step::Break => items += 1,
            }
        }
    }

    fn dispatch(&mut self, header: Header) -> Result<Step> {
        match header.major {
            MajorType::Unsigned => self.decode_unsigned(header),
            MajorType::Negative => self.decode_negative(header),
            MajorType::Bytes | MajorType::Text => self.decode_string(header),
            MajorType::Array | MajorType::Map => self.decode_container(header),
            MajorType::Tag => Err(Error::Unsupported),
            MajorType::Simple => self.decode_simple(header),
        }
    }

    /// Check that the header's payload is present in the input and fits the
    /// output. A short input is malformed; a short output is the caller's.
    fn check_bounds(&self, following: FollowingBytes) -> Result<()> {
        match following {
            FollowingBytes::Reserved => Err(Error::Malformed),
            FollowingBytes::Indefinite => Ok(()),
            FollowingBytes::Fixed(len) => {
                if len + 1 > self.input.remaining() {
                    return Err(Error::Malformed);
                }
                if len > self.output.remaining() {
                    return Err(Error::OutputExhausted);
                }
                Ok(())
            }
        }
    }

    /// Major type 0. Also the payload primitive for negative integers,
    /// floats and simple values.
    fn decode_unsigned(&mut self, header: Header) -> Result<Step> {
        let FollowingBytes::Fixed(len) = header.following else {
            return Err(Error::Malformed);
        };

        if len == 0 {
            self.output.put(header.info)?;
        } else {
            let payload = self.input.peek_slice(1, len)?;
            let byte_order = self.config.byte_order;
            byte_order.transcribe(payload, self.output.reserve(len)?);
        }

        self.input.advance(len + 1)?;
        Ok(Step::Item)
    }

    /// Major type 1: the wire carries `n` for the value `-1 - n`.
    ///
    /// The result keeps the width of the encoded `n` unless `n` has its top
    /// bit set, in which case the value does not fit that signed width and is
    /// written at twice the width. A 64-bit `n` cannot be widened.
    fn decode_negative(&mut self, header: Header) -> Result<Step> {
        let start = self.output.position();
        self.decode_unsigned(header)?;

        let byte_order = self.config.byte_order;
        let size = self.output.position() - start;
        let magnitude = byte_order.read_uint(self.output.written_since(start));

        if size < 8 && (magnitude >> (size * 8 - 1)) & 1 == 1 {
            self.output.reserve(size)?;
        }

        byte_order.write_uint(!magnitude, self.output.written_since(start));
        Ok(Step::Item)
    }

    /// Read a string length or container count, consuming the header and
    /// its length bytes.
    fn resolve_length(&mut self, header: Header) -> Result<Length> {
        match header.following {
            FollowingBytes::Indefinite => {
                self.input.advance(1)?;
                Ok(Length::Indefinite)
            }
            FollowingBytes::Fixed(0) => {
                self.input.advance(1)?;
                Ok(Length::Definite(u64::from(header.info)))
            }
            FollowingBytes::Fixed(len) => {
                let bytes = self.input.peek_slice(1, len)?;
                self.input.advance(len + 1)?;
                Ok(Length::Definite(read_be_uint(bytes)))
            }
            FollowingBytes::Reserved => Err(Error::Malformed),
        }
    }

    /// Major types 2 and 3.
    fn decode_string(&mut self, header: Header) -> Result<Step> {
        match self.resolve_length(header)? {
            Length::Definite(len) => self.copy_string(header.major, len)?,
            Length::Indefinite => self.decode_string_chunks(header.major)?,
        }
        Ok(Step::Item)
    }

    fn copy_string(&mut self, major: MajorType, len: u64) -> Result<()> {
        let len = usize::try_from(len)
            .ok()
            .filter(|&len| len <= self.input.remaining())
            .ok_or(Error::Malformed)?;
        if len > self.output.remaining() {
            return Err(Error::OutputExhausted);
        }

        let bytes = self.input.take(len)?;
        if major == MajorType::Text && self.config.validate_utf8 {
            validate_utf8(bytes)?;
        }
        self.output.reserve(len)?.copy_from_slice(bytes);
        Ok(())
    }

    /// Indefinite-length string: definite chunks of the same major type,
    /// copied back to back, up to a break marker.
    fn decode_string_chunks(&mut self, major: MajorType) -> Result<()> {
        loop {
            let byte = self.input.peek().ok_or(Error::Malformed)?;
            if byte == simple::BREAK {
                return self.input.advance(1);
            }

            let chunk = Header::classify(byte);
            if chunk.major != major {
                return Err(Error::Malformed);
            }
            self.check_bounds(chunk.following)?;

            match self.resolve_length(chunk)? {
                Length::Definite(len) => self.copy_string(major, len)?,
                Length::Indefinite => return Err(Error::Malformed),
            }
        }
    }

    /// Major types 4 and 5.
    fn decode_container(&mut self, header: Header) -> Result<Step> {
        let budget = match self.resolve_length(header)? {
            Length::Indefinite => Budget::UntilBreak,
            Length::Definite(count) => {
                let mut items = usize::try_from(count).map_err(|_| Error::Malformed)?;
                if header.major == MajorType::Map && self.config.map_pairs {
                    items = items.checked_mul(2).ok_or(Error::Malformed)?;
                }
                // Every item takes at least one input byte.
                if items > self.input.remaining() {
                    return Err(Error::Malformed);
                }
                Budget::Items(items)
            }
        };

        self.decode_items(budget)?;
        Ok(Step::Item)
    }

    /// Major type 7: floats, simple values and the break marker.
    ///
    /// Floats are transcribed as raw bit patterns. Simple values are written
    /// as one byte after flattening.
    fn decode_simple(&mut self, header: Header) -> Result<Step> {
        let header = match header.following {
            FollowingBytes::Indefinite => {
                self.input.advance(1)?;
                return Ok(Step::Break);
            }
            FollowingBytes::Fixed(1) => {
                // Simple value in the extension byte.
                self.input.advance(1)?;
                let value = self.input.peek().ok_or(Error::Malformed)?;
                let extended = Header {
                    info: value,
                    following: FollowingBytes::INLINE,
                    ..header
                };
                self.check_bounds(extended.following)?;
                extended
            }
            _ => header,
        };

        if header.following == FollowingBytes::INLINE {
            return self.decode_unsigned(Header {
                info: simple::flatten(header.info),
                ..header
            });
        }
        self.decode_unsigned(header)
    }
}
