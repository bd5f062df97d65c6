use thiserror::Error;

/// Channel groups used to classify protocol violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ViolationClass {
    /// Data beat presented without a matching address phase.
    Ordering,
    /// Beat count disagrees with the declared burst length.
    BurstLength,
}

impl ViolationClass {
    /// Lower-case label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ordering => "ordering",
            Self::BurstLength => "burst-length",
        }
    }
}

/// Master-side protocol violations detected by the slave emulator.
///
/// In tolerant mode these are absorbed and reported; in strict mode they fail
/// the cycle that observed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ProtocolViolation {
    /// Write data handshake with no write burst in flight.
    #[error("write data beat presented with no active write burst")]
    WriteDataWithoutAddress,
    /// The declared beat count was reached without WLAST.
    #[error("write burst reached its {declared} declared beats without WLAST")]
    WriteBurstOverrun {
        /// Beat count declared by the address phase.
        declared: u32,
    },
    /// WLAST arrived before the declared beat count.
    #[error("WLAST after {received} of {declared} declared beats")]
    EarlyWriteLast {
        /// Beat count declared by the address phase.
        declared: u32,
        /// Beats received including the WLAST beat.
        received: u32,
    },
}

impl ProtocolViolation {
    /// Stable numeric code used in trace output.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::WriteDataWithoutAddress => 0x01,
            Self::WriteBurstOverrun { .. } => 0x02,
            Self::EarlyWriteLast { .. } => 0x03,
        }
    }

    /// Returns the classification for this violation.
    #[must_use]
    pub const fn class(self) -> ViolationClass {
        match self {
            Self::WriteDataWithoutAddress => ViolationClass::Ordering,
            Self::WriteBurstOverrun { .. } | Self::EarlyWriteLast { .. } => {
                ViolationClass::BurstLength
            }
        }
    }
}
