//! Domain-specific error types for the scrcpy protocol client.
//!
//! All fallible operations return `Result<T, ScrcpyError>`.
//! End of a video stream is reported as [`ScrcpyError::StreamEnded`] by the
//! codec layer and consumed by the decoder as a normal termination.

use std::time::Duration;
use thiserror::Error;

/// The canonical error type for the scrcpy protocol client.
#[derive(Debug, Error)]
pub enum ScrcpyError {
    // ── Stream Errors ────────────────────────────────────────────
    /// The byte source closed before a complete record was read.
    #[error("stream ended")]
    StreamEnded,

    /// The codec parameter set could not be parsed.
    #[error("parameter set: {0}")]
    Parse(#[from] ParseError),

    /// The device metadata record was malformed.
    #[error("invalid device metadata: {0}")]
    InvalidMetadata(&'static str),

    /// A numeric value did not map to any known enum variant.
    #[error("unknown {type_name} discriminant: {value:#x}")]
    UnknownVariant { type_name: &'static str, value: u64 },

    // ── Connection Errors ────────────────────────────────────────
    /// No candidate strategy reported itself supported.
    #[error("no supported {kind} strategy among [{candidates}]")]
    UnsupportedStrategy {
        kind: &'static str,
        candidates: String,
    },

    /// The transport layer reported an error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// A tunnel or mpsc channel was closed unexpectedly.
    #[error("channel closed")]
    ChannelClosed,

    /// An operation exceeded its deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// Catch-all for errors that do not fit another variant.
    #[error("{0}")]
    Other(String),
}

impl ScrcpyError {
    /// Returns `true` when the error only signals that the source closed.
    pub fn is_stream_end(&self) -> bool {
        matches!(self, ScrcpyError::StreamEnded)
    }
}

// ── ParseError ───────────────────────────────────────────────────

/// Failure while reading a codec parameter-set bitstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The bit cursor ran past the end of the buffer.
    #[error("bitstream exhausted at bit {position} of {length}")]
    Exhausted { position: usize, length: usize },

    /// An Exp-Golomb prefix had more leading zeros than a `u32` can hold.
    #[error("exp-golomb prefix of {0} leading zeros")]
    ExpGolombOverflow(u32),

    /// A decoded field produced a value outside its representable range.
    #[error("{0} out of range")]
    ValueOutOfRange(&'static str),

    /// Crop offsets exceed the encoded picture size.
    #[error("crop {crop} exceeds encoded {dimension} {size}")]
    InvalidCrop {
        dimension: &'static str,
        crop: u32,
        size: u32,
    },

    /// No sequence parameter set unit was present in the configuration packet.
    #[error("no sequence parameter set found")]
    MissingParameterSet,
}

// ── Convenient From implementations ──────────────────────────────

impl From<String> for ScrcpyError {
    fn from(s: String) -> Self {
        ScrcpyError::Other(s)
    }
}

impl From<&str> for ScrcpyError {
    fn from(s: &str) -> Self {
        ScrcpyError::Other(s.to_string())
    }
}
