/// One read or write burst tracked by the slave emulator.
///
/// `declared_length_beats` is the normalized beat count (wire `len + 1`).
/// `current_beat_index` never exceeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BurstTransaction {
    /// Start address captured from the address handshake.
    pub base_address: u64,
    /// Total beats in the burst.
    pub declared_length_beats: u32,
    /// Zero-based index of the next beat to transfer.
    pub current_beat_index: u32,
    /// Whether the burst is in flight.
    pub active: bool,
}

impl BurstTransaction {
    /// Starts a burst from an address-phase `len` field (beats minus one).
    #[must_use]
    pub fn start(base_address: u64, wire_len: u8) -> Self {
        Self {
            base_address,
            declared_length_beats: u32::from(wire_len) + 1,
            current_beat_index: 0,
            active: true,
        }
    }

    /// Beats still to be transferred.
    #[must_use]
    pub const fn remaining_beats(&self) -> u32 {
        self.declared_length_beats - self.current_beat_index
    }

    /// Returns `true` when the next beat is the last declared one.
    #[must_use]
    pub const fn is_final_beat(&self) -> bool {
        self.current_beat_index + 1 == self.declared_length_beats
    }

    /// Returns `true` while the burst is active and beats remain.
    #[must_use]
    pub const fn has_remaining(&self) -> bool {
        self.active && self.current_beat_index < self.declared_length_beats
    }

    /// Records one completed beat, saturating at the declared length.
    ///
    /// Returns `true` when this beat exhausted the burst.
    pub const fn complete_beat(&mut self) -> bool {
        if self.current_beat_index < self.declared_length_beats {
            self.current_beat_index += 1;
        }
        self.current_beat_index == self.declared_length_beats
    }
}
