//! Audio carrier provider.
//!
//! Loads 16-bit integer PCM WAV covers (uncompressed only), exposes the
//! interleaved samples as the flat slot buffer, and writes the stego result
//! back as bit-exact WAV.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::codec::{self, CodecOptions, Decoded, EncodeReport};
use crate::media::MediaError;

/// A WAV cover flattened to its interleaved 16-bit samples.
#[derive(Debug)]
pub struct AudioCarrier {
    spec: WavSpec,
    samples: Vec<i16>,
}

impl AudioCarrier {
    /// Loads a carrier from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MediaError> {
        let reader = WavReader::open(path).map_err(|e| MediaError::AudioLoad(e.to_string()))?;
        Self::from_reader(reader)
    }

    /// Loads a carrier from in-memory WAV bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MediaError> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| MediaError::AudioLoad(e.to_string()))?;
        Self::from_reader(reader)
    }

    fn from_reader<R: Read + Seek>(reader: WavReader<R>) -> Result<Self, MediaError> {
        let spec = reader.spec();

        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(MediaError::UnsupportedFormat(format!(
                "only 16-bit integer PCM WAV is supported, got {} bits {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }

        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| MediaError::AudioLoad(e.to_string()))?;

        Ok(Self { spec, samples })
    }

    pub fn spec(&self) -> &WavSpec {
        &self.spec
    }

    /// Total sample slots, all channels interleaved.
    pub fn slot_count(&self) -> usize {
        self.samples.len()
    }

    /// Frame capacity in bytes at bit depth `k`.
    pub fn capacity_bytes(&self, k: u8) -> usize {
        self.slot_count() * k as usize / 8
    }

    /// Duration of the cover in seconds.
    pub fn duration_secs(&self) -> f64 {
        let frames = self.samples.len() / self.spec.channels as usize;
        frames as f64 / self.spec.sample_rate as f64
    }

    /// Parses a start location: a sample offset, or seconds with an `s`
    /// suffix (`"1.5s"`) converted via sample rate and channel count.
    /// Values are clamped to the carrier bounds.
    pub fn parse_start(&self, input: &str) -> Result<usize, MediaError> {
        let s = input.trim();
        if s.is_empty() {
            return Ok(0);
        }

        let max = self.samples.len().saturating_sub(1);
        if let Some(seconds) = s.strip_suffix(['s', 'S']) {
            let secs: f64 = seconds
                .trim()
                .parse()
                .map_err(|_| MediaError::InvalidStart(format!("bad seconds value '{s}'")))?;
            if secs < 0.0 {
                return Err(MediaError::InvalidStart(format!("negative offset '{s}'")));
            }
            let slot =
                (secs * self.spec.sample_rate as f64) as usize * self.spec.channels as usize;
            Ok(slot.min(max))
        } else {
            let offset: usize = s
                .parse()
                .map_err(|_| MediaError::InvalidStart(format!("bad sample offset '{s}'")))?;
            Ok(offset.min(max))
        }
    }

    /// Embeds a payload into the sample LSBs.
    pub fn encode_payload(
        &mut self,
        payload: &[u8],
        name: &str,
        key: &str,
        opts: &CodecOptions,
    ) -> Result<EncodeReport, MediaError> {
        Ok(codec::encode(&mut self.samples, payload, name, key, opts)?)
    }

    /// Extracts a payload from the sample LSBs.
    pub fn decode_payload(&self, key: &str, opts: &CodecOptions) -> Result<Decoded, MediaError> {
        Ok(codec::decode(&self.samples, key, opts)?)
    }

    /// Saves the carrier as a WAV file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), MediaError> {
        let writer =
            WavWriter::create(path, self.spec).map_err(|e| MediaError::AudioSave(e.to_string()))?;
        self.write_into(writer)
    }

    /// Returns the carrier encoded as WAV bytes.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, MediaError> {
        let mut bytes = Vec::new();
        {
            let writer = WavWriter::new(Cursor::new(&mut bytes), self.spec)
                .map_err(|e| MediaError::AudioSave(e.to_string()))?;
            self.write_into(writer)?;
        }
        Ok(bytes)
    }

    fn write_into<W: std::io::Write + Seek>(
        &self,
        mut writer: WavWriter<W>,
    ) -> Result<(), MediaError> {
        for sample in &self.samples {
            writer
                .write_sample(*sample)
                .map_err(|e| MediaError::AudioSave(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| MediaError::AudioSave(e.to_string()))
    }
}

#[cfg(test)]
fn create_test_carrier(sample_count: usize) -> AudioCarrier {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    // A 440 Hz sine keeps the samples nontrivial.
    let samples: Vec<i16> = (0..sample_count)
        .map(|i| {
            let t = i as f64 / 44_100.0;
            (f64::sin(2.0 * std::f64::consts::PI * 440.0 * t) * 16_000.0) as i16
        })
        .collect();

    AudioCarrier { spec, samples }
}
