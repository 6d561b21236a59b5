//! Image carrier provider.
//!
//! Loads PNG and BMP covers (lossless formats only), exposes the RGB channel
//! bytes as the flat slot buffer, and saves the stego result in a lossless
//! format: BMP covers stay BMP, everything else becomes PNG.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbImage};

use crate::codec::{self, CodecOptions, Decoded, EncodeReport};
use crate::media::MediaError;

/// RGB channel bytes per pixel.
pub const CHANNELS: usize = 3;

/// An image cover flattened to its RGB channel bytes.
#[derive(Debug)]
pub struct ImageCarrier {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: ImageFormat,
}

impl ImageCarrier {
    /// Loads a carrier from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MediaError> {
        let format = match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("bmp") => ImageFormat::Bmp,
            _ => ImageFormat::Png,
        };
        let img = image::open(path).map_err(|e| MediaError::ImageLoad(e.to_string()))?;
        Ok(Self::from_image(img, format))
    }

    /// Loads a carrier from in-memory encoded bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MediaError> {
        let format = image::guess_format(bytes).unwrap_or(ImageFormat::Png);
        let img = image::load_from_memory(bytes)
            .map_err(|e| MediaError::ImageLoad(e.to_string()))?;
        Ok(Self::from_image(img, format))
    }

    fn from_image(img: DynamicImage, format: ImageFormat) -> Self {
        let rgb = img.to_rgb8();
        let (width, height) = rgb.dimensions();
        Self {
            data: rgb.into_raw(),
            width,
            height,
            format: match format {
                ImageFormat::Bmp => ImageFormat::Bmp,
                _ => ImageFormat::Png,
            },
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Total channel-byte slots: width * height * 3.
    pub fn slot_count(&self) -> usize {
        self.data.len()
    }

    /// Frame capacity in bytes at bit depth `k`.
    pub fn capacity_bytes(&self, k: u8) -> usize {
        self.slot_count() * k as usize / 8
    }

    /// Parses a start location: `"x,y"` pixel coordinates or a single pixel
    /// index, clamped to bounds and converted to a channel-byte offset.
    pub fn parse_start(&self, input: &str) -> Result<usize, MediaError> {
        let s = input.trim();
        if s.is_empty() {
            return Ok(0);
        }

        let pixel_index = if let Some((sx, sy)) = s.split_once(',') {
            let x: u32 = sx
                .trim()
                .parse()
                .map_err(|_| MediaError::InvalidStart(format!("bad x coordinate '{sx}'")))?;
            let y: u32 = sy
                .trim()
                .parse()
                .map_err(|_| MediaError::InvalidStart(format!("bad y coordinate '{sy}'")))?;
            let x = x.min(self.width.saturating_sub(1));
            let y = y.min(self.height.saturating_sub(1));
            y as usize * self.width as usize + x as usize
        } else {
            let index: usize = s
                .parse()
                .map_err(|_| MediaError::InvalidStart(format!("bad pixel index '{s}'")))?;
            let max = (self.width as usize * self.height as usize).saturating_sub(1);
            index.min(max)
        };

        Ok(pixel_index * CHANNELS)
    }

    /// Embeds a payload into the channel bytes.
    pub fn encode_payload(
        &mut self,
        payload: &[u8],
        name: &str,
        key: &str,
        opts: &CodecOptions,
    ) -> Result<EncodeReport, MediaError> {
        Ok(codec::encode(&mut self.data, payload, name, key, opts)?)
    }

    /// Extracts a payload from the channel bytes.
    pub fn decode_payload(&self, key: &str, opts: &CodecOptions) -> Result<Decoded, MediaError> {
        Ok(codec::decode(&self.data, key, opts)?)
    }

    fn to_rgb_image(&self) -> Result<RgbImage, MediaError> {
        RgbImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| MediaError::ImageSave("carrier buffer size mismatch".to_string()))
    }

    /// Saves the carrier in its lossless output format.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), MediaError> {
        self.to_rgb_image()?
            .save_with_format(path, self.format)
            .map_err(|e| MediaError::ImageSave(e.to_string()))
    }

    /// Returns the carrier encoded as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, MediaError> {
        let img = self.to_rgb_image()?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| MediaError::ImageSave(e.to_string()))?;
        Ok(bytes)
    }

    pub fn output_extension(&self) -> &'static str {
        match self.format {
            ImageFormat::Bmp => "bmp",
            _ => "png",
        }
    }
}
