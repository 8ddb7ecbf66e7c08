//! The 32-bit LinoSPAD2 data word
//!
//! Layout (little-endian on disk):
//! - bit 31: validity flag
//! - bits 28..=29: address field (always zero with current firmware)
//! - bits 0..=27: raw timestamp count in TDC bins

use super::timestamp::Timestamp;

/// Packet layout and timing constants
pub mod constants {
    pub const WORD_SIZE: usize = 4;

    pub const VALID_SHIFT: u32 = 31;
    pub const VALID_BIT: u32 = 1 << VALID_SHIFT;
    pub const RAW_COUNT_MASK: u32 = 0x0FFF_FFFF;
    pub const ADDRESS_SHIFT: u32 = 28;
    pub const ADDRESS_MASK: u32 = 0x3;

    /// Average TDC bin width: 2.5 ns clock period over 140 delay-line taps
    pub const BIN_WIDTH_PS: f64 = 17.857;
    /// Delay-line taps per 2.5 ns clock period
    pub const BINS_PER_CLOCK: usize = 140;
    /// Fixed sensor geometry
    pub const PIXEL_COUNT: usize = 256;
    /// Dense-matrix marker for a slot without a valid hit
    pub const SENTINEL: f64 = -1.0;
}

use constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Packet(u32);

impl Packet {
    pub const fn new(word: u32) -> Self {
        Self(word)
    }

    #[inline]
    pub fn from_le_bytes(bytes: [u8; WORD_SIZE]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }

    /// Build a word from its fields. Out-of-range bits are masked off.
    pub fn encode(valid: bool, raw_count: u32, address: u8) -> Self {
        let mut word = raw_count & RAW_COUNT_MASK;
        word |= (address as u32 & ADDRESS_MASK) << ADDRESS_SHIFT;
        if valid {
            word |= VALID_BIT;
        }
        Self(word)
    }

    #[inline]
    pub fn word(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 >> VALID_SHIFT == 1
    }

    #[inline]
    pub fn raw_count(self) -> u32 {
        self.0 & RAW_COUNT_MASK
    }

    #[inline]
    pub fn address(self) -> u8 {
        ((self.0 >> ADDRESS_SHIFT) & ADDRESS_MASK) as u8
    }

    /// Decoded arrival time, `Invalid` whenever the validity bit is clear
    #[inline]
    pub fn timestamp(self) -> Timestamp {
        if self.is_valid() {
            Timestamp::Valid(self.raw_count() as f64 * BIN_WIDTH_PS)
        } else {
            Timestamp::Invalid
        }
    }

    /// Timestamp in ps, or the `-1` sentinel
    #[inline]
    pub fn timestamp_ps(self) -> f64 {
        self.timestamp().to_sentinel()
    }

    /// Unscaled bin count, or the `-1` sentinel
    #[inline]
    pub fn raw_count_or_sentinel(self) -> f64 {
        if self.is_valid() {
            self.raw_count() as f64
        } else {
            SENTINEL
        }
    }
}

impl From<u32> for Packet {
    fn from(word: u32) -> Self {
        Self(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_word() {
        let p = Packet::new(0x8000_0001);
        assert!(p.is_valid());
        assert_eq!(p.raw_count(), 1);
        assert_eq!(p.address(), 0);
        assert_eq!(p.timestamp(), Timestamp::Valid(17.857));
    }

    #[test]
    fn test_invalid_word_ignores_other_bits() {
        for word in [0x0000_0000, 0x7FFF_FFFF, 0x0000_0001, 0x3000_0000, 0x4ABC_DEF0] {
            let p = Packet::new(word);
            assert!(!p.is_valid());
            assert_eq!(p.timestamp_ps(), -1.0);
            assert_eq!(p.raw_count_or_sentinel(), -1.0);
        }
    }

    #[test]
    fn test_address_extraction() {
        assert_eq!(Packet::new(0x9000_0000).address(), 1);
        assert_eq!(Packet::new(0xA000_0000).address(), 2);
        assert_eq!(Packet::new(0xB000_0000).address(), 3);
        // bit 30 is outside the address field
        assert_eq!(Packet::new(0xC000_0000).address(), 0);
    }

    #[test]
    fn test_encode_roundtrips_raw_count() {
        for raw in [0, 1, 139, 140, 12_345, RAW_COUNT_MASK] {
            let p = Packet::encode(true, raw, 0);
            assert!(p.is_valid());
            assert_eq!(p.raw_count(), raw);
            assert_eq!(Packet::encode(p.is_valid(), p.raw_count(), p.address()), p);
        }
    }

    #[test]
    fn test_max_raw_count_scaling() {
        let p = Packet::new(0x8FFF_FFFF);
        assert_eq!(p.raw_count(), 0x0FFF_FFFF);
        assert_eq!(p.timestamp_ps(), 0x0FFF_FFFF as f64 * 17.857);
    }

    #[test]
    fn test_from_le_bytes() {
        let p = Packet::from_le_bytes([0x01, 0x00, 0x00, 0x80]);
        assert_eq!(p.word(), 0x8000_0001);
    }
}
