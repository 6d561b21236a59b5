//! Error taxonomy for the steganographic codec.
//!
//! Every error is terminal: the codec is deterministic, so retrying the same
//! inputs reproduces the same error. Callers may adjust the key, bit depth or
//! start location and try again.

use thiserror::Error;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Key must not be empty")]
    InvalidKey,

    #[error("Bit depth must be between 1 and 8, got {given}")]
    InvalidBitDepth { given: u8 },

    #[error("Not enough eligible carrier slots from start: need {needed}, have {available}")]
    InsufficientCapacity { needed: usize, available: usize },

    #[error("Payload too large: needs {required} bytes, capacity is {available} bytes")]
    PayloadTooLarge { required: usize, available: usize },

    #[error("No hidden frame found (magic mismatch)")]
    NotAStego,

    #[error("Key signature mismatch: wrong key for this carrier")]
    WrongKey,

    #[error("Corrupt header: {0}")]
    CorruptHeader(&'static str),

    #[error("Carrier exhausted before the expected frame length")]
    Truncated,
}
