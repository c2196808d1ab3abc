// ABOUTME: Error types for flat CBOR decoding.
// ABOUTME: Each variant is one of the result codes a decode call can end with.

use std::fmt;

/// The result type for decode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can end a decode call.
///
/// The variants are mutually exclusive: a decode reports exactly one of them,
/// and on any error none of the output buffer should be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// The input violates the encoding's own rules: a reserved additional-info
    /// value, a declared length running past the end of the message, a break
    /// marker ending the message outside an indefinite container, or a
    /// truncated container.
    Malformed,

    /// The input is well formed but the output buffer cannot hold the decoded
    /// result, or was left partly unfilled when decoding finished.
    OutputExhausted,

    /// Decoding finished but input bytes were left over.
    Overrun,

    /// Containers are nested deeper than the configured maximum.
    Excessive,

    /// A tag item (major type 6) was encountered.
    Unsupported,
}

impl Error {
    /// Returns the stable error type name used by the conformance vectors.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::Malformed => "malformed",
            Error::OutputExhausted => "output_exhausted",
            Error::Overrun => "overrun",
            Error::Excessive => "excessive",
            Error::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Malformed => write!(f, "malformed input"),
            Error::OutputExhausted => write!(f, "output buffer size does not match decoded data"),
            Error::Overrun => write!(f, "trailing bytes after decoded data"),
            Error::Excessive => write!(f, "maximum nesting depth exceeded"),
            Error::Unsupported => write!(f, "unsupported data item (tag)"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::Malformed
    }
}

#[cfg(feature = "simd-utf8")]
impl From<simdutf8::basic::Utf8Error> for Error {
    fn from(_: simdutf8::basic::Utf8Error) -> Self {
        Error::Malformed
    }
}
