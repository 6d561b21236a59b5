//! # Bitcloak - keyed LSB steganography
//!
//! Bitcloak hides an arbitrary byte payload inside the redundant low-order
//! bits of a lossless carrier (image pixel bytes or audio PCM samples). Only
//! a holder of the correct key can reconstruct the sequence of modified
//! positions and recover the payload.
//!
//! ## How it works
//!
//! - The key string is normalized and derived into deterministic seeds and a
//!   4-byte signature ([`key`]).
//! - The seeds drive a reproducible ordering of carrier slots: a
//!   coprime-stride walk over the whole carrier, or a shuffled suffix
//!   starting at a chosen offset ([`sequence`]).
//! - The payload is framed with its sanitized name, lengths and the key
//!   signature ([`frame`]), then streamed LSB-first into the `k` low-order
//!   bits of each selected slot ([`bits`], [`codec`]).
//!
//! The key only selects positions; it does not encrypt the payload. Lossy
//! recompression of the carrier destroys the embedded frame.
//!
//! ## Example
//!
//! ```rust
//! use bitcloak::{decode, encode, CodecOptions};
//!
//! let mut carrier = vec![0u8; 3000];
//! let opts = CodecOptions::default();
//!
//! encode(&mut carrier, b"Hi", "note.txt", "test123", &opts).unwrap();
//!
//! let decoded = decode(&carrier, "test123", &opts).unwrap();
//! assert_eq!(decoded.payload, b"Hi");
//! assert_eq!(decoded.name, "note.txt");
//! ```
//!
//! ## Modules
//!
//! - [`key`]: key normalization and seed derivation
//! - [`sequence`]: deterministic position sequencing
//! - [`bits`]: k-bit slot access and LSB-first bit streaming
//! - [`frame`]: payload framing and fail-fast header parsing
//! - [`codec`]: encode/decode orchestration and capacity checks
//! - [`media`]: image/audio carrier providers (boundary layer)

pub mod bits;
pub mod codec;
pub mod error;
pub mod frame;
pub mod key;
pub mod media;
pub mod sequence;

// Re-export the surface most callers need at the crate root.
pub use bits::Slot;
pub use codec::{decode, encode, CodecOptions, Decoded, DecodeReport, EncodeReport};
pub use error::CodecError;
pub use key::DerivedKey;
pub use media::{AudioCarrier, ImageCarrier, MediaCarrier, MediaError};
pub use sequence::SequenceMode;
