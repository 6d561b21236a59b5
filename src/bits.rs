//! Bit-level access to carrier slots.
//!
//! A slot is one carrier element (an image channel byte or a PCM sample)
//! whose `k` low-order bits are the writable payload channel. Bit order is
//! LSB-first everywhere: within each frame byte, and within each k-bit group
//! written to a slot. Encode and decode share this convention; transposing it
//! on one side silently misaligns every multi-bit round trip.

/// Bit mask covering the `k` low-order bits.
#[inline]
pub fn mask(k: u8) -> u8 {
    debug_assert!((1..=8).contains(&k));
    ((1u16 << k) - 1) as u8
}

/// A carrier element whose low-order bits can be read and overwritten.
pub trait Slot: Copy {
    /// Reads the `k` low-order bits.
    fn read_lsb(self, k: u8) -> u8;
    /// Returns the slot with its `k` low-order bits replaced by `bits`.
    fn write_lsb(self, k: u8, bits: u8) -> Self;
}

impl Slot for u8 {
    #[inline]
    fn read_lsb(self, k: u8) -> u8 {
        self & mask(k)
    }

    #[inline]
    fn write_lsb(self, k: u8, bits: u8) -> Self {
        (self & !mask(k)) | (bits & mask(k))
    }
}

impl Slot for u16 {
    #[inline]
    fn read_lsb(self, k: u8) -> u8 {
        (self & mask(k) as u16) as u8
    }

    #[inline]
    fn write_lsb(self, k: u8, bits: u8) -> Self {
        (self & !(mask(k) as u16)) | (bits & mask(k)) as u16
    }
}

impl Slot for i16 {
    #[inline]
    fn read_lsb(self, k: u8) -> u8 {
        (self as u16).read_lsb(k)
    }

    #[inline]
    fn write_lsb(self, k: u8, bits: u8) -> Self {
        (self as u16).write_lsb(k, bits) as i16
    }
}

/// Streams a byte slice as k-bit groups, LSB-first.
///
/// The tail group is zero-padded when the bit count is not a multiple of `k`.
pub struct BitSource<'a> {
    data: &'a [u8],
    bit: usize,
}

impl<'a> BitSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit: 0 }
    }

    /// Bits not yet consumed.
    pub fn remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit)
    }

    /// Takes the next `k` bits as a group, LSB-first within the group.
    pub fn next_group(&mut self, k: u8) -> u8 {
        let total = self.data.len() * 8;
        let mut group = 0u8;
        for i in 0..k {
            if self.bit < total {
                let bit = (self.data[self.bit / 8] >> (self.bit % 8)) & 1;
                group |= bit << i;
            }
            self.bit += 1;
        }
        group
    }
}

/// Reassembles bytes from k-bit groups, LSB-first.
#[derive(Default)]
pub struct ByteAssembler {
    acc: u16,
    nbits: u8,
}

impl ByteAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a k-bit group to the stream.
    pub fn push_group(&mut self, bits: u8, k: u8) {
        self.acc |= ((bits & mask(k)) as u16) << self.nbits;
        self.nbits += k;
    }

    /// Pops a completed byte, if one is available.
    pub fn pop_byte(&mut self) -> Option<u8> {
        if self.nbits < 8 {
            return None;
        }
        let byte = self.acc as u8;
        self.acc >>= 8;
        self.nbits -= 8;
        Some(byte)
    }
}
