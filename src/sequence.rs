//! Deterministic position sequencing over carrier slots.
//!
//! Two interchangeable generators, both pure functions of
//! `(key, start, slot_count, mode)`:
//!
//! - [`SequenceMode::Strided`]: a coprime-stride walk that visits every slot
//!   exactly once, wrapping past the carrier end.
//! - [`SequenceMode::Scattered`]: a seeded permutation of the slots at or
//!   after the start offset. No wraparound: slots before the start are never
//!   touched, and a frame that does not fit in the suffix is a hard failure.
//!
//! The RNG for scattered mode is created fresh per call so concurrent encodes
//! on independent carriers cannot interfere with each other.

use hkdf::Hkdf;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

use crate::error::CodecError;
use crate::key::DerivedKey;

/// HKDF salt for seeding the scattered permutation generator.
const SALT_SCATTER: &[u8] = b"BITCLOAK-SCATTER-V1";

/// How embedding positions are laid out across the carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceMode {
    /// Coprime-stride walk with wraparound; capacity is the whole carrier.
    Strided,
    /// Shuffled suffix starting at the start offset; no wraparound.
    Scattered,
}

/// Number of slots a frame may occupy for the given mode and start.
pub fn eligible_slots(mode: SequenceMode, total: usize, start: usize) -> usize {
    if start >= total {
        return 0;
    }
    match mode {
        SequenceMode::Strided => total,
        SequenceMode::Scattered => total - start,
    }
}

/// Generates exactly `count` slot indices.
///
/// Fails with [`CodecError::InsufficientCapacity`] when fewer than `count`
/// slots are eligible from `start`.
pub fn positions(
    mode: SequenceMode,
    key: &DerivedKey,
    total: usize,
    start: usize,
    count: usize,
) -> Result<Vec<usize>, CodecError> {
    let available = eligible_slots(mode, total, start);
    if count > available {
        return Err(CodecError::InsufficientCapacity {
            needed: count,
            available,
        });
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    match mode {
        SequenceMode::Strided => Ok(strided(key.stride_seed, total, start, count)),
        SequenceMode::Scattered => Ok(scattered(key.permutation_seed, total, start, count)),
    }
}

/// Derives a stride coprime with `total` so the walk visits every slot
/// exactly once before repeating.
pub fn derive_stride(total: usize, stride_seed: u32) -> usize {
    if total <= 1 {
        return 1;
    }
    let mut stride = 1 + (stride_seed as usize % (total - 1));
    while gcd(stride, total) != 1 {
        stride += 1;
        if stride >= total {
            stride = 1;
        }
    }
    stride
}

fn strided(stride_seed: u32, total: usize, start: usize, count: usize) -> Vec<usize> {
    let stride = derive_stride(total, stride_seed);
    let mut out = Vec::with_capacity(count);
    let mut idx = start;
    for _ in 0..count {
        out.push(idx);
        idx = (idx + stride) % total;
    }
    out
}

fn scattered(permutation_seed: u32, total: usize, start: usize, count: usize) -> Vec<usize> {
    let mut rng = ChaCha20Rng::from_seed(scatter_seed(permutation_seed, total, start));

    // Shuffle the full eligible suffix, then take the prefix the frame
    // needs. The full shuffle keeps the prefix identical for any count.
    let mut eligible: Vec<usize> = (start..total).collect();
    eligible.shuffle(&mut rng);
    eligible.truncate(count);
    eligible
}

/// Composite seed over a fixed context tag, the key's permutation seed and
/// the carrier geometry, so different carriers or starts get independent
/// permutations.
fn scatter_seed(permutation_seed: u32, total: usize, start: usize) -> [u8; 32] {
    let mut ikm = Vec::with_capacity(20);
    ikm.extend_from_slice(&permutation_seed.to_be_bytes());
    ikm.extend_from_slice(&(total as u64).to_be_bytes());
    ikm.extend_from_slice(&(start as u64).to_be_bytes());

    let hk = Hkdf::<Sha256>::new(Some(SALT_SCATTER), &ikm);
    let mut seed = [0u8; 32];
    hk.expand(b"positions", &mut seed)
        .expect("HKDF expand should not fail");
    seed
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
