use crate::bus::{DataBeat, BEAT_BYTES, WORD_BYTES};

/// Byte address of beat `beat_index` in an incrementing burst from `base`.
#[must_use]
pub fn beat_address(base: u64, beat_index: u32) -> u64 {
    base.wrapping_add(u64::from(beat_index) * BEAT_BYTES)
}

/// Deterministic read data for one beat of a burst starting at `base`.
///
/// Word `w` of beat `i` is the low 32 bits of
/// `base + i * BEAT_BYTES + w * WORD_BYTES`, so any consumer can recompute the
/// expected data from the address alone.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn read_payload(base: u64, beat_index: u32) -> DataBeat {
    let beat_base = beat_address(base, beat_index);
    DataBeat::from_fn(|word| beat_base.wrapping_add(word as u64 * WORD_BYTES) as u32)
}

#[cfg(test)]
mod tests {
    use super::{beat_address, read_payload};

    #[test]
    fn first_beat_counts_up_by_word_size() {
        let beat = read_payload(0x1000, 0);
        assert_eq!(
            beat.words(),
            &[0x1000, 0x1004, 0x1008, 0x100C, 0x1010, 0x1014, 0x1018, 0x101C]
        );
    }

    #[test]
    fn later_beats_advance_by_beat_size() {
        let beat = read_payload(0x3000, 1);
        assert_eq!(beat.word(0), Some(0x3020));
        assert_eq!(beat.word(7), Some(0x303C));
        assert_eq!(beat_address(0x3000, 3), 0x3060);
    }

    #[test]
    fn payload_keeps_only_low_32_bits() {
        let beat = read_payload(0x1_FFFF_FFF8, 0);
        assert_eq!(beat.word(0), Some(0xFFFF_FFF8));
        assert_eq!(beat.word(2), Some(0x0000_0000));
    }
}
