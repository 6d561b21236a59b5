//! Codec orchestration: framing, position sequencing and bit packing glued
//! into `encode` and `decode` over a flat carrier slice.
//!
//! Both operations are pure functions of their explicit inputs. Encode takes
//! exclusive ownership of the carrier slice for its duration and never
//! resizes it; decode is read-only. Capacity is validated from the slot
//! count alone before any frame or position buffer is allocated.

use serde::Serialize;

use crate::bits::{BitSource, ByteAssembler, Slot};
use crate::error::CodecError;
use crate::frame;
use crate::key::DerivedKey;
use crate::sequence::{self, SequenceMode};

/// Parameters shared by encode and decode. Decoding only succeeds with the
/// exact options used for encoding.
#[derive(Debug, Clone, Copy)]
pub struct CodecOptions {
    /// Writable low-order bits per slot, 1..=8.
    pub bit_depth: u8,
    /// First slot of the position sequence.
    pub start: usize,
    /// Position sequencing algorithm.
    pub mode: SequenceMode,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            bit_depth: 1,
            start: 0,
            mode: SequenceMode::Strided,
        }
    }
}

/// Capacity metrics reported after a successful embed.
#[derive(Debug, Clone, Serialize)]
pub struct EncodeReport {
    /// Payload bytes embedded (excluding frame overhead).
    pub embedded_bytes: usize,
    /// Total frame capacity in bytes for these options.
    pub capacity_bytes: usize,
    /// Carrier slots actually written.
    pub slots_used: usize,
    /// Start offset the sequence began at.
    pub start: usize,
}

/// Metrics reported after a successful extraction.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    /// Recovered payload name.
    pub name: String,
    /// Payload bytes extracted.
    pub extracted_bytes: usize,
    /// Start offset the sequence began at.
    pub start: usize,
}

/// A recovered payload with its frame metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub payload: Vec<u8>,
    pub name: String,
}

impl Decoded {
    pub fn report(&self, start: usize) -> DecodeReport {
        DecodeReport {
            name: self.name.clone(),
            extracted_bytes: self.payload.len(),
            start,
        }
    }
}

/// Embeds `payload` into the low-order bits of `carrier`.
///
/// The carrier keeps its length and geometry; only the selected slots'
/// low-order bits change. Fails with [`CodecError::PayloadTooLarge`] when
/// the frame does not fit the eligible slots, reporting both sizes in bytes.
pub fn encode<S: Slot>(
    carrier: &mut [S],
    payload: &[u8],
    name: &str,
    key: &str,
    opts: &CodecOptions,
) -> Result<EncodeReport, CodecError> {
    validate_bit_depth(opts.bit_depth)?;
    let derived = DerivedKey::derive(key)?;

    let k = opts.bit_depth as usize;
    let total = carrier.len();
    let available_slots = sequence::eligible_slots(opts.mode, total, opts.start);
    let capacity_bytes = available_slots * k / 8;

    // Cheap capacity check from lengths alone, before building the frame.
    let name = frame::sanitize_name(name);
    let frame_bytes = frame::frame_len(name.len(), payload.len());
    if payload.len() > u32::MAX as usize {
        return Err(CodecError::PayloadTooLarge {
            required: frame_bytes,
            available: capacity_bytes,
        });
    }
    let slots_needed = (frame_bytes * 8).div_ceil(k);
    if slots_needed > available_slots {
        return Err(CodecError::PayloadTooLarge {
            required: frame_bytes,
            available: capacity_bytes,
        });
    }

    let blob = frame::build(payload, &name, derived.signature);
    let positions = sequence::positions(opts.mode, &derived, total, opts.start, slots_needed)?;

    let mut bits = BitSource::new(&blob);
    for &idx in &positions {
        let group = bits.next_group(opts.bit_depth);
        carrier[idx] = carrier[idx].write_lsb(opts.bit_depth, group);
    }

    Ok(EncodeReport {
        embedded_bytes: payload.len(),
        capacity_bytes,
        slots_used: positions.len(),
        start: opts.start,
    })
}

/// Extracts a payload previously embedded with the same key and options.
///
/// Fails fast in wire order: magic mismatch is [`CodecError::NotAStego`],
/// signature mismatch is [`CodecError::WrongKey`], and length fields that
/// exceed the theoretical remaining capacity are
/// [`CodecError::CorruptHeader`] before any payload buffer is allocated.
pub fn decode<S: Slot>(
    carrier: &[S],
    key: &str,
    opts: &CodecOptions,
) -> Result<Decoded, CodecError> {
    validate_bit_depth(opts.bit_depth)?;
    let derived = DerivedKey::derive(key)?;

    let k = opts.bit_depth as usize;
    let total = carrier.len();
    let available_slots = sequence::eligible_slots(opts.mode, total, opts.start);
    if available_slots == 0 {
        return Err(CodecError::InsufficientCapacity {
            needed: (frame::HEADER_LEN * 8).div_ceil(k),
            available: 0,
        });
    }
    let capacity_bytes = available_slots * k / 8;

    // The full eligible sequence is the generous upper bound; reads past the
    // frame end never happen because lengths are validated first.
    let positions = sequence::positions(opts.mode, &derived, total, opts.start, available_slots)?;
    let mut reader = SlotReader::new(carrier, &positions, opts.bit_depth);

    let mut header = [0u8; frame::HEADER_LEN];
    reader.read_exact(&mut header)?;
    let parsed = frame::parse_header(&header, &derived.signature)?;

    let remaining = capacity_bytes.saturating_sub(frame::HEADER_LEN);
    let name_len = parsed.name_len as usize;
    if name_len > remaining {
        return Err(CodecError::CorruptHeader("name length exceeds capacity"));
    }
    let payload_len = parsed.payload_len as usize;
    if payload_len > remaining - name_len {
        return Err(CodecError::CorruptHeader("payload length exceeds capacity"));
    }

    let mut name_bytes = vec![0u8; name_len];
    reader.read_exact(&mut name_bytes)?;
    let mut payload = vec![0u8; payload_len];
    reader.read_exact(&mut payload)?;

    Ok(Decoded {
        payload,
        name: frame::decode_name(&name_bytes),
    })
}

fn validate_bit_depth(k: u8) -> Result<(), CodecError> {
    if (1..=8).contains(&k) {
        Ok(())
    } else {
        Err(CodecError::InvalidBitDepth { given: k })
    }
}

/// Byte-oriented reader over the k-bit groups of a position sequence.
struct SlotReader<'a, S: Slot> {
    carrier: &'a [S],
    positions: &'a [usize],
    k: u8,
    cursor: usize,
    assembler: ByteAssembler,
}

impl<'a, S: Slot> SlotReader<'a, S> {
    fn new(carrier: &'a [S], positions: &'a [usize], k: u8) -> Self {
        Self {
            carrier,
            positions,
            k,
            cursor: 0,
            assembler: ByteAssembler::new(),
        }
    }

    /// Fills `buf`, consuming slots as needed. [`CodecError::Truncated`]
    /// when the sequence runs out first.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), CodecError> {
        for out in buf.iter_mut() {
            loop {
                if let Some(byte) = self.assembler.pop_byte() {
                    *out = byte;
                    break;
                }
                let idx = *self
                    .positions
                    .get(self.cursor)
                    .ok_or(CodecError::Truncated)?;
                self.cursor += 1;
                self.assembler
                    .push_group(self.carrier[idx].read_lsb(self.k), self.k);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence;

    fn opts(k: u8, start: usize, mode: SequenceMode) -> CodecOptions {
        CodecOptions {
            bit_depth: k,
            start,
            mode,
        }
    }

    #[test]
    fn test_roundtrip_concrete_scenario() {
        // 3000 zero bytes, key "test123", k = 1, start = 0, payload "Hi".
        let mut carrier = vec![0u8; 3000];
        let o = opts(1, 0, SequenceMode::Strided);

        let report = encode(&mut carrier, b"Hi", "hi.txt", "test123", &o).unwrap();
        assert_eq!(report.embedded_bytes, 2);
        // Frame: 14-byte header + 6-byte name + 2-byte payload = 176 bits,
        // one slot per bit at k = 1.
        assert_eq!(report.slots_used, 176);

        let decoded = decode(&carrier, "test123", &o).unwrap();
        assert_eq!(decoded.payload, b"Hi");
        assert_eq!(decoded.name, "hi.txt");
    }

    #[test]
    fn test_roundtrip_all_bit_depths() {
        let payload: Vec<u8> = (0..=255).collect();
        for k in 1..=8u8 {
            for mode in [SequenceMode::Strided, SequenceMode::Scattered] {
                let mut carrier: Vec<u8> = (0..6000).map(|i| (i * 31 % 251) as u8).collect();
                let o = opts(k, 7, mode);
                encode(&mut carrier, &payload, "data.bin", "correct horse", &o).unwrap();
                let decoded = decode(&carrier, "correct horse", &o).unwrap();
                assert_eq!(decoded.payload, payload, "k={} mode={:?}", k, mode);
                assert_eq!(decoded.name, "data.bin");
            }
        }
    }

    #[test]
    fn test_roundtrip_i16_samples() {
        let mut carrier: Vec<i16> = (0..4000).map(|i| (i as i16).wrapping_mul(-773)).collect();
        let o = opts(2, 100, SequenceMode::Scattered);
        encode(&mut carrier, b"pcm payload", "clip.txt", "audio-key", &o).unwrap();
        let decoded = decode(&carrier, "audio-key", &o).unwrap();
        assert_eq!(decoded.payload, b"pcm payload");
    }

    #[test]
    fn test_wrong_key_is_rejected_by_signature() {
        let mut carrier = vec![0u8; 3000];
        let o = opts(1, 0, SequenceMode::Strided);
        encode(&mut carrier, b"secret", "s.txt", "right", &o).unwrap();

        // A different key changes the position sequence, so the magic
        // usually scrambles (NotAStego); a signature mismatch (WrongKey) is
        // the other valid outcome. The payload must never come back.
        let err = decode(&carrier, "wrong", &o).unwrap_err();
        assert!(matches!(
            err,
            CodecError::NotAStego | CodecError::WrongKey | CodecError::CorruptHeader(_)
        ));
    }

    #[test]
    fn test_same_positions_wrong_signature_is_wrong_key() {
        // A numeric key pins the stride, so "07" and "7" walk identical
        // positions but carry different signatures.
        let mut carrier = vec![0u8; 3000];
        let o = opts(1, 0, SequenceMode::Strided);
        encode(&mut carrier, b"secret", "s.txt", "7", &o).unwrap();

        let k7 = DerivedKey::derive("7").unwrap();
        let k07 = DerivedKey::derive("07").unwrap();
        assert_eq!(k7.seed, k07.seed);
        assert_ne!(k7.signature, k07.signature);

        let err = decode(&carrier, "07", &o).unwrap_err();
        assert!(matches!(err, CodecError::WrongKey));
    }

    #[test]
    fn test_wrong_mode_is_not_a_stego() {
        let mut carrier: Vec<u8> = (0..5000).map(|i| (i % 256) as u8).collect();
        encode(
            &mut carrier,
            b"hidden",
            "h.txt",
            "key",
            &opts(1, 0, SequenceMode::Strided),
        )
        .unwrap();

        let err = decode(&carrier, "key", &opts(1, 0, SequenceMode::Scattered)).unwrap_err();
        assert!(matches!(
            err,
            CodecError::NotAStego | CodecError::WrongKey | CodecError::CorruptHeader(_)
        ));
    }

    #[test]
    fn test_invalid_bit_depth() {
        let mut carrier = vec![0u8; 100];
        for k in [0u8, 9, 255] {
            let err = encode(
                &mut carrier,
                b"x",
                "x",
                "key",
                &opts(k, 0, SequenceMode::Strided),
            )
            .unwrap_err();
            assert!(matches!(err, CodecError::InvalidBitDepth { given } if given == k));
        }
    }

    #[test]
    fn test_payload_too_large_reports_bytes() {
        let mut carrier = vec![0u8; 17];
        let err = encode(
            &mut carrier,
            b"way too big for this",
            "big.bin",
            "key",
            &opts(1, 0, SequenceMode::Strided),
        )
        .unwrap_err();
        match err {
            CodecError::PayloadTooLarge {
                required,
                available,
            } => {
                // Frame: 14 + 7 + 20 = 41 bytes; 17 slots at k=1 hold 2 bytes.
                assert_eq!(required, 41);
                assert_eq!(available, 2);
            }
            other => panic!("expected PayloadTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn test_capacity_boundary_exact_fit() {
        // Frame = 14 + 1 + 1 = 16 bytes = 128 bits; at k = 1 that is
        // exactly 128 slots. The boundary case must succeed.
        let o = opts(1, 0, SequenceMode::Strided);
        let mut exact = vec![0u8; 128];
        let report = encode(&mut exact, b"z", "a", "key", &o).unwrap();
        assert_eq!(report.slots_used, 128);
        let decoded = decode(&exact, "key", &o).unwrap();
        assert_eq!(decoded.payload, b"z");

        let mut short = vec![0u8; 127];
        assert!(matches!(
            encode(&mut short, b"z", "a", "key", &o),
            Err(CodecError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_scattered_respects_start_exactly() {
        let mut carrier = vec![0u8; 4000];
        let before: Vec<u8> = carrier[..1000].to_vec();
        let o = opts(3, 1000, SequenceMode::Scattered);
        encode(&mut carrier, b"suffix only", "s.bin", "key", &o).unwrap();
        assert_eq!(&carrier[..1000], &before[..]);
    }

    #[test]
    fn test_scattered_overflowing_suffix_fails_instead_of_wrapping() {
        let mut carrier = vec![0u8; 4000];
        // 120 eligible slots at k = 1 is 15 bytes, one short of the
        // minimum 16-byte frame.
        let o = opts(1, 3880, SequenceMode::Scattered);
        assert!(matches!(
            encode(&mut carrier, b"z", "a", "key", &o),
            Err(CodecError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_start_past_end_fails_immediately() {
        let mut carrier = vec![0u8; 100];
        for mode in [SequenceMode::Strided, SequenceMode::Scattered] {
            let err = encode(&mut carrier, b"x", "x", "key", &opts(1, 100, mode)).unwrap_err();
            assert!(matches!(err, CodecError::PayloadTooLarge { available: 0, .. }));

            let err = decode(&carrier, "key", &opts(1, 100, mode)).unwrap_err();
            assert!(matches!(
                err,
                CodecError::InsufficientCapacity { available: 0, .. }
            ));
        }
    }

    #[test]
    fn test_decode_tiny_carrier_is_truncated() {
        // 50 slots at k = 1 cannot even hold the 112-bit fixed header.
        let carrier = vec![0u8; 50];
        let err = decode(&carrier, "key", &opts(1, 0, SequenceMode::Strided)).unwrap_err();
        assert!(matches!(err, CodecError::Truncated));
    }

    #[test]
    fn test_corrupt_header_rejected_before_allocation() {
        // Hand-embed a header whose payload length is far beyond capacity.
        let derived = DerivedKey::derive("key").unwrap();
        let mut blob = Vec::new();
        blob.extend_from_slice(&frame::MAGIC);
        blob.extend_from_slice(&derived.signature);
        blob.extend_from_slice(&3u16.to_le_bytes());
        blob.extend_from_slice(&u32::MAX.to_le_bytes());
        blob.extend_from_slice(b"abc");

        let mut carrier = vec![0u8; 400];
        let slots = blob.len() * 8;
        let positions =
            sequence::positions(SequenceMode::Strided, &derived, carrier.len(), 0, slots).unwrap();
        let mut bits = BitSource::new(&blob);
        for &idx in &positions {
            carrier[idx] = carrier[idx].write_lsb(1, bits.next_group(1));
        }

        let err = decode(&carrier, "key", &opts(1, 0, SequenceMode::Strided)).unwrap_err();
        assert!(matches!(err, CodecError::CorruptHeader(_)));
    }

    #[test]
    fn test_encode_touches_only_low_bits() {
        let mut carrier: Vec<u8> = (0..3000).map(|i| (i % 256) as u8).collect();
        let original = carrier.clone();
        let o = opts(2, 0, SequenceMode::Strided);
        encode(&mut carrier, b"low bits only", "l.txt", "key", &o).unwrap();

        assert_eq!(carrier.len(), original.len());
        for (after, before) in carrier.iter().zip(&original) {
            assert_eq!(after & !0b11, before & !0b11);
        }
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        let mut carrier = vec![0u8; 2000];
        let o = opts(1, 0, SequenceMode::Strided);
        encode(&mut carrier, b"", "empty.bin", "key", &o).unwrap();
        let decoded = decode(&carrier, "key", &o).unwrap();
        assert!(decoded.payload.is_empty());
        assert_eq!(decoded.name, "empty.bin");
    }

    #[test]
    fn test_name_sanitized_through_roundtrip() {
        let mut carrier = vec![0u8; 3000];
        let o = opts(1, 0, SequenceMode::Strided);
        encode(&mut carrier, b"pw", "../../etc/passwd", "key", &o).unwrap();
        let decoded = decode(&carrier, "key", &o).unwrap();
        assert_eq!(decoded.name, "passwd");
    }
}
