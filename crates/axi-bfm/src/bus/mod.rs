//! Bus geometry constants and the fixed-width data beat type.

/// Handshake signal bundles for the AXI and APB ports.
pub mod signals;

pub use signals::{ApbRequest, MasterSignals, SlaveSignals};

/// Number of 32-bit words carried by one data beat (256-bit bus).
pub const DATA_WORDS: usize = 8;

/// Width in bytes of one data-bus word.
pub const WORD_BYTES: u64 = 4;

/// Width in bytes of one full data beat.
pub const BEAT_BYTES: u64 = DATA_WORDS as u64 * WORD_BYTES;

const WORD_LEN: usize = std::mem::size_of::<u32>();
const BEAT_LEN: usize = DATA_WORDS * WORD_LEN;

/// Write strobe with every byte lane enabled.
pub const STROBE_ALL: u32 = u32::MAX;

/// AXI `OKAY` response code.
pub const RESP_OKAY: u8 = 0b00;

/// AXI `SLVERR` response code. Never driven by the slave emulator.
pub const RESP_SLVERR: u8 = 0b10;

/// APB strobe with all four byte lanes enabled.
pub const APB_STROBE_ALL: u8 = 0xF;

/// One beat of the wide data bus, stored as little-endian 32-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct DataBeat([u32; DATA_WORDS]);

impl DataBeat {
    /// All-zero beat used while a data channel is idle.
    pub const ZERO: Self = Self([0; DATA_WORDS]);

    /// Wraps a raw word array.
    #[must_use]
    pub const fn new(words: [u32; DATA_WORDS]) -> Self {
        Self(words)
    }

    /// Builds a beat by evaluating `f` for every word index.
    #[must_use]
    pub fn from_fn(f: impl FnMut(usize) -> u32) -> Self {
        Self(std::array::from_fn(f))
    }

    /// Returns word `index`, or `None` past the bus width.
    #[must_use]
    pub fn word(&self, index: usize) -> Option<u32> {
        self.0.get(index).copied()
    }

    /// Borrows the raw word array.
    #[must_use]
    pub const fn words(&self) -> &[u32; DATA_WORDS] {
        &self.0
    }

    /// Serializes the beat into bus byte order.
    #[must_use]
    pub fn to_le_bytes(&self) -> [u8; BEAT_LEN] {
        let mut bytes = [0; BEAT_LEN];
        for (chunk, word) in bytes.chunks_exact_mut(WORD_LEN).zip(self.0) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }
}

impl From<[u32; DATA_WORDS]> for DataBeat {
    fn from(words: [u32; DATA_WORDS]) -> Self {
        Self(words)
    }
}

/// Number of beats needed to move `length` bytes, rounded up to whole beats.
#[must_use]
pub const fn beats_for_length(length: u64) -> u64 {
    length.div_ceil(BEAT_BYTES)
}

/// Strobe for a beat that carries only `valid_bytes` leading bytes.
#[must_use]
pub const fn strobe_for_bytes(valid_bytes: u64) -> u32 {
    if valid_bytes >= BEAT_BYTES {
        STROBE_ALL
    } else {
        (1u32 << valid_bytes) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::{
        beats_for_length, strobe_for_bytes, DataBeat, BEAT_BYTES, BEAT_LEN, STROBE_ALL, WORD_BYTES,
        WORD_LEN,
    };

    #[test]
    fn beat_geometry_is_256_bits() {
        assert_eq!(BEAT_BYTES, 32);
        assert_eq!(DataBeat::ZERO.to_le_bytes().len(), 32);
        assert_eq!(u64::try_from(BEAT_LEN), Ok(BEAT_BYTES));
        assert_eq!(u64::try_from(WORD_LEN), Ok(WORD_BYTES));
    }

    #[test]
    fn le_bytes_follow_word_order() {
        let beat = DataBeat::from_fn(|w| 0x0403_0201 + u32::try_from(w).unwrap() * 0x0404_0404);
        let bytes = beat.to_le_bytes();
        assert_eq!(&bytes[0..4], &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(&bytes[4..8], &[0x05, 0x06, 0x07, 0x08]);
        assert_eq!(bytes[31], 0x20);
    }

    #[test]
    fn word_lookup_is_bounded() {
        let beat = DataBeat::new([7; 8]);
        assert_eq!(beat.word(7), Some(7));
        assert_eq!(beat.word(8), None);
    }

    #[test]
    fn lengths_round_up_to_whole_beats() {
        assert_eq!(beats_for_length(0), 0);
        assert_eq!(beats_for_length(1), 1);
        assert_eq!(beats_for_length(48), 2);
        assert_eq!(beats_for_length(64), 2);
        assert_eq!(beats_for_length(65), 3);
    }

    #[test]
    fn tail_strobes_cover_leading_bytes_only() {
        assert_eq!(strobe_for_bytes(32), STROBE_ALL);
        assert_eq!(strobe_for_bytes(40), STROBE_ALL);
        assert_eq!(strobe_for_bytes(16), 0x0000_FFFF);
        assert_eq!(strobe_for_bytes(1), 0x1);
    }
}
