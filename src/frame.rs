//! Payload framing: serializing a payload plus its metadata into one flat
//! blob, and fail-fast parsing of the header on the way back out.
//!
//! Wire format, version 1 (the version rides in the last magic byte):
//!
//! ```text
//! MAGIC(4) = "ACW1" | KEY_SIG(4) | NAME_LEN(2, LE) | PAYLOAD_LEN(4, LE)
//!   | NAME(NAME_LEN) | PAYLOAD(PAYLOAD_LEN)
//! ```
//!
//! The magic is checked before any length field is trusted, and the key
//! signature is checked before anything is allocated for the name or payload.

use crate::error::CodecError;

/// Frame magic; the trailing byte is the format version.
pub const MAGIC: [u8; 4] = *b"ACW1";

/// Fixed header length: magic + key signature + name length + payload length.
pub const HEADER_LEN: usize = 14;

/// Name length is carried in a u16.
pub const MAX_NAME_LEN: usize = u16::MAX as usize;

/// Replacement for empty or unsafe payload names.
pub const FALLBACK_NAME: &str = "payload.bin";

/// Parsed fixed-size portion of a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub name_len: u16,
    pub payload_len: u32,
}

/// Sanitizes a payload name down to a safe base name.
///
/// Path components are stripped, surrounding whitespace trimmed, and empty
/// or traversal-only results fall back to [`FALLBACK_NAME`]. Overlong names
/// are clamped to [`MAX_NAME_LEN`] bytes at a char boundary.
pub fn sanitize_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        return FALLBACK_NAME.to_string();
    }

    let mut out = base.to_string();
    if out.len() > MAX_NAME_LEN {
        let mut end = MAX_NAME_LEN;
        while !out.is_char_boundary(end) {
            end -= 1;
        }
        out.truncate(end);
    }
    out
}

/// Frame length in bytes for a payload with the given (already sanitized)
/// name, without building the frame. Used for capacity checks.
pub fn frame_len(name_len: usize, payload_len: usize) -> usize {
    HEADER_LEN + name_len + payload_len
}

/// Serializes header + name + payload into one flat blob.
///
/// `name` must already be sanitized; `payload.len()` must fit in a u32
/// (enforced by the codec's capacity check).
pub fn build(payload: &[u8], name: &str, signature: [u8; 4]) -> Vec<u8> {
    let name_bytes = name.as_bytes();
    debug_assert!(name_bytes.len() <= MAX_NAME_LEN);

    let mut frame = Vec::with_capacity(frame_len(name_bytes.len(), payload.len()));
    frame.extend_from_slice(&MAGIC);
    frame.extend_from_slice(&signature);
    frame.extend_from_slice(&(name_bytes.len() as u16).to_le_bytes());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(name_bytes);
    frame.extend_from_slice(payload);
    frame
}

/// Parses the fixed header, failing fast in wire order: magic first, then
/// key signature, then the length fields.
pub fn parse_header(
    header: &[u8; HEADER_LEN],
    expected_signature: &[u8; 4],
) -> Result<FrameHeader, CodecError> {
    if header[0..4] != MAGIC {
        return Err(CodecError::NotAStego);
    }
    if &header[4..8] != expected_signature {
        return Err(CodecError::WrongKey);
    }

    let name_len = u16::from_le_bytes([header[8], header[9]]);
    let payload_len = u32::from_le_bytes([header[10], header[11], header[12], header[13]]);

    Ok(FrameHeader {
        name_len,
        payload_len,
    })
}

/// Decodes the recovered name bytes, re-sanitizing what came off the wire.
pub fn decode_name(name_bytes: &[u8]) -> String {
    sanitize_name(&String::from_utf8_lossy(name_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIG: [u8; 4] = [0xAA, 0xBB, 0xCC, 0xDD];

    #[test]
    fn test_sanitize_strips_path_traversal() {
        assert_eq!(sanitize_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_name("/var/tmp/report.pdf"), "report.pdf");
        assert_eq!(sanitize_name("C:\\Users\\me\\notes.txt"), "notes.txt");
    }

    #[test]
    fn test_sanitize_falls_back_on_unsafe_names() {
        assert_eq!(sanitize_name(""), FALLBACK_NAME);
        assert_eq!(sanitize_name("   "), FALLBACK_NAME);
        assert_eq!(sanitize_name(".."), FALLBACK_NAME);
        assert_eq!(sanitize_name("dir/"), FALLBACK_NAME);
    }

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_name("photo.png"), "photo.png");
        assert_eq!(sanitize_name("  spaced.txt  "), "spaced.txt");
    }

    #[test]
    fn test_sanitize_clamps_overlong_names() {
        let long = "x".repeat(MAX_NAME_LEN + 100);
        assert_eq!(sanitize_name(&long).len(), MAX_NAME_LEN);
    }

    #[test]
    fn test_build_and_parse_roundtrip() {
        let frame = build(b"hello", "greeting.txt", SIG);
        assert_eq!(frame.len(), HEADER_LEN + 12 + 5);

        let header: [u8; HEADER_LEN] = frame[..HEADER_LEN].try_into().unwrap();
        let parsed = parse_header(&header, &SIG).unwrap();
        assert_eq!(parsed.name_len, 12);
        assert_eq!(parsed.payload_len, 5);
        assert_eq!(&frame[HEADER_LEN..HEADER_LEN + 12], b"greeting.txt");
        assert_eq!(&frame[HEADER_LEN + 12..], b"hello");
    }

    #[test]
    fn test_magic_mismatch_is_not_a_stego() {
        let mut frame = build(b"x", "a", SIG);
        frame[0] = b'Z';
        let header: [u8; HEADER_LEN] = frame[..HEADER_LEN].try_into().unwrap();
        assert!(matches!(
            parse_header(&header, &SIG),
            Err(CodecError::NotAStego)
        ));
    }

    #[test]
    fn test_signature_mismatch_is_wrong_key() {
        let frame = build(b"x", "a", SIG);
        let header: [u8; HEADER_LEN] = frame[..HEADER_LEN].try_into().unwrap();
        assert!(matches!(
            parse_header(&header, &[0, 1, 2, 3]),
            Err(CodecError::WrongKey)
        ));
    }

    #[test]
    fn test_decode_name_resanitizes_wire_data() {
        assert_eq!(decode_name(b"../../x"), "x");
        assert_eq!(decode_name(b""), FALLBACK_NAME);
        assert_eq!(decode_name(&[0xFF, 0xFE, b'/', b'o', b'k']), "ok");
    }
}
