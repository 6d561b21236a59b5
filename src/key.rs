//! Key derivation for position sequencing and frame tagging.
//!
//! A key string is normalized (trimmed, lowercased) and turned into a 64-bit
//! master seed: numeric keys parse directly as integers (legacy behavior that
//! must keep round-tripping), anything else goes through SHA-256. All derived
//! components are pure functions of the key, which is the single correctness
//! anchor for encode/decode round trips.

use hkdf::Hkdf;
use sha2::{Digest, Sha256};

use crate::error::CodecError;

/// HKDF salt for expanding the master seed into components.
const SALT_DERIVE: &[u8] = b"BITCLOAK-DERIVE-V1";

/// All key-derived values used by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedKey {
    /// 64-bit master seed (parsed integer or truncated SHA-256).
    pub seed: u64,
    /// Seed for the key-derived default starting position.
    pub position_seed: u32,
    /// Seed for the scattered permutation generator.
    pub permutation_seed: u32,
    /// Derived bit offset in 0..8, part of the key's fingerprint.
    pub bit_offset: u8,
    /// Seed for the strided-walk stride.
    pub stride_seed: u32,
    /// 4-byte signature embedded in the frame header so a decoder can
    /// reject a wrong key before extracting the whole frame.
    pub signature: [u8; 4],
}

impl DerivedKey {
    /// Derives all components from a key string.
    ///
    /// The same key (in any case, with surrounding whitespace) always yields
    /// the same `DerivedKey`.
    pub fn derive(key: &str) -> Result<Self, CodecError> {
        let normalized = key.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(CodecError::InvalidKey);
        }

        let digest = Sha256::digest(normalized.as_bytes());

        // Legacy numeric keys parse directly; overflowing integers fall back
        // to the hash path like any other string.
        let seed = match parse_numeric(&normalized) {
            Some(n) => n as u64,
            None => u64::from_be_bytes(
                digest[..8].try_into().expect("SHA-256 digest is 32 bytes"),
            ),
        };

        let okm = expand_components(seed);

        let mut signature = [0u8; 4];
        signature.copy_from_slice(&digest[..4]);

        Ok(Self {
            seed,
            position_seed: u32::from_be_bytes(okm[0..4].try_into().unwrap()),
            permutation_seed: u32::from_be_bytes(okm[4..8].try_into().unwrap()),
            bit_offset: okm[8] % 8,
            stride_seed: u32::from_be_bytes(okm[12..16].try_into().unwrap()),
            signature,
        })
    }

    /// Key-derived default starting position, used when the caller gives no
    /// explicit start. Lands in the first half of the carrier so a frame has
    /// room to grow past it.
    pub fn starting_position(&self, total_slots: usize) -> usize {
        if total_slots <= 1 {
            return 0;
        }
        self.position_seed as usize % (total_slots / 2).max(1)
    }
}

/// Expands the master seed into component bytes via HKDF-SHA256.
fn expand_components(seed: u64) -> [u8; 32] {
    let hk = Hkdf::<Sha256>::new(Some(SALT_DERIVE), &seed.to_be_bytes());
    let mut okm = [0u8; 32];
    hk.expand(b"components", &mut okm)
        .expect("HKDF expand should not fail");
    okm
}

/// Parses a normalized key as a decimal integer with optional leading sign.
fn parse_numeric(normalized: &str) -> Option<i64> {
    let digits = normalized
        .strip_prefix(['+', '-'])
        .unwrap_or(normalized);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    normalized.parse::<i64>().ok()
}
