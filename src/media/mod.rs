//! Carrier providers: lossless media files exposed as flat slot buffers.
//!
//! The codec itself never branches on file types; this layer resolves a file
//! into a tagged [`MediaCarrier`] variant by extension and hands the codec a
//! flat buffer plus geometry. Lossy formats are unsupported as carriers
//! because the codec assumes bit-exact persistence of every slot.

pub mod audio;
pub mod image;

use std::path::Path;

use thiserror::Error;

use crate::codec::{CodecOptions, Decoded, EncodeReport};
use crate::error::CodecError;

pub use audio::AudioCarrier;
pub use image::ImageCarrier;

/// Errors raised at the media boundary.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Image load error: {0}")]
    ImageLoad(String),

    #[error("Image save error: {0}")]
    ImageSave(String),

    #[error("Audio load error: {0}")]
    AudioLoad(String),

    #[error("Audio save error: {0}")]
    AudioSave(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported carrier type '{0}': use png, bmp or wav")]
    UnsupportedMedia(String),

    #[error("Invalid start location: {0}")]
    InvalidStart(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A carrier file resolved to its media type.
#[derive(Debug)]
pub enum MediaCarrier {
    Image(ImageCarrier),
    Audio(AudioCarrier),
}

impl MediaCarrier {
    /// Loads a carrier, dispatching on the file extension.
    pub fn from_file(path: &Path) -> Result<Self, MediaError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "png" | "bmp" => Ok(MediaCarrier::Image(ImageCarrier::from_file(path)?)),
            "wav" => Ok(MediaCarrier::Audio(AudioCarrier::from_file(path)?)),
            other => Err(MediaError::UnsupportedMedia(other.to_string())),
        }
    }

    /// Total addressable slots (channel bytes or samples).
    pub fn slot_count(&self) -> usize {
        match self {
            MediaCarrier::Image(c) => c.slot_count(),
            MediaCarrier::Audio(c) => c.slot_count(),
        }
    }

    /// Frame capacity in bytes at bit depth `k`, from geometry alone.
    pub fn capacity_bytes(&self, k: u8) -> usize {
        match self {
            MediaCarrier::Image(c) => c.capacity_bytes(k),
            MediaCarrier::Audio(c) => c.capacity_bytes(k),
        }
    }

    /// Parses a carrier-specific start location into a slot offset:
    /// `"x,y"` or a pixel index for images, a sample offset or `"1.5s"`
    /// seconds for audio.
    pub fn parse_start(&self, input: &str) -> Result<usize, MediaError> {
        match self {
            MediaCarrier::Image(c) => c.parse_start(input),
            MediaCarrier::Audio(c) => c.parse_start(input),
        }
    }

    /// Embeds a payload under the given key and options.
    pub fn encode_payload(
        &mut self,
        payload: &[u8],
        name: &str,
        key: &str,
        opts: &CodecOptions,
    ) -> Result<EncodeReport, MediaError> {
        match self {
            MediaCarrier::Image(c) => c.encode_payload(payload, name, key, opts),
            MediaCarrier::Audio(c) => c.encode_payload(payload, name, key, opts),
        }
    }

    /// Extracts a payload previously embedded with the same key and options.
    pub fn decode_payload(&self, key: &str, opts: &CodecOptions) -> Result<Decoded, MediaError> {
        match self {
            MediaCarrier::Image(c) => c.decode_payload(key, opts),
            MediaCarrier::Audio(c) => c.decode_payload(key, opts),
        }
    }

    /// Saves the carrier losslessly.
    pub fn save(&self, path: &Path) -> Result<(), MediaError> {
        match self {
            MediaCarrier::Image(c) => c.save(path),
            MediaCarrier::Audio(c) => c.save(path),
        }
    }

    /// Extension the stego output should carry to stay lossless.
    pub fn output_extension(&self) -> &'static str {
        match self {
            MediaCarrier::Image(c) => c.output_extension(),
            MediaCarrier::Audio(_) => "wav",
        }
    }
}
