//! Host-facing configuration and trace contracts.

use crate::slave::{AddressPhase, ReadResponse, WriteBeat};
use crate::ProtocolViolation;

/// How the slave emulator reacts to master-side protocol violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ProtocolPolicy {
    /// Absorb violations, report them, and keep stalling or accepting.
    #[default]
    Tolerant,
    /// Fail the cycle on the first violation.
    Strict,
}

/// Configuration for an [`crate::AxiSlave`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SlaveConfig {
    /// Violation handling policy.
    pub policy: ProtocolPolicy,
}

/// Deterministic trace events emitted by the testbench in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    /// Read address handshake.
    ReadAddress {
        /// Cycle the handshake completed on.
        cycle: u64,
        /// Accepted address phase.
        phase: AddressPhase,
    },
    /// Read data handshake.
    ReadBeat {
        /// Cycle the handshake completed on.
        cycle: u64,
        /// Beat delivered to the master.
        beat: ReadResponse,
    },
    /// Write address handshake.
    WriteAddress {
        /// Cycle the handshake completed on.
        cycle: u64,
        /// Accepted address phase.
        phase: AddressPhase,
    },
    /// Write data handshake.
    WriteBeat {
        /// Cycle the handshake completed on.
        cycle: u64,
        /// Beat accepted from the master.
        beat: WriteBeat,
    },
    /// Write response handshake.
    WriteResponse {
        /// Cycle the handshake completed on.
        cycle: u64,
    },
    /// Violation absorbed by a tolerant slave.
    Violation {
        /// Cycle the violation was observed on.
        cycle: u64,
        /// Detected violation.
        violation: ProtocolViolation,
    },
    /// Periodic sample of the DUT status outputs.
    StatusSample {
        /// Sample cycle.
        cycle: u64,
        /// Busy flag.
        busy: bool,
        /// FIFO occupancy.
        level: u32,
    },
    /// Busy dropped and the status register was read back.
    TransferFinished {
        /// Cycle busy was seen low.
        cycle: u64,
        /// `REG_STATUS` value read after completion.
        status: u32,
        /// FIFO occupancy at read-back.
        level: u32,
    },
}

impl TraceEvent {
    /// Cycle the event belongs to.
    #[must_use]
    pub const fn cycle(&self) -> u64 {
        match self {
            Self::ReadAddress { cycle, .. }
            | Self::ReadBeat { cycle, .. }
            | Self::WriteAddress { cycle, .. }
            | Self::WriteBeat { cycle, .. }
            | Self::WriteResponse { cycle }
            | Self::Violation { cycle, .. }
            | Self::StatusSample { cycle, .. }
            | Self::TransferFinished { cycle, .. } => *cycle,
        }
    }

    /// Returns `true` for bus handshake events.
    #[must_use]
    pub const fn is_handshake(&self) -> bool {
        matches!(
            self,
            Self::ReadAddress { .. }
                | Self::ReadBeat { .. }
                | Self::WriteAddress { .. }
                | Self::WriteBeat { .. }
                | Self::WriteResponse { .. }
        )
    }
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in cycle order.
    fn on_event(&mut self, event: TraceEvent);
}

/// Sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn on_event(&mut self, _event: TraceEvent) {}
}

/// Sink that keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingTraceSink {
    events: Vec<TraceEvent>,
}

impl RecordingTraceSink {
    /// Creates an empty recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Recorded events in arrival order.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Consumes the recorder, returning its events.
    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }
}

impl TraceSink for RecordingTraceSink {
    fn on_event(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

impl<T: TraceSink + ?Sized> TraceSink for &mut T {
    fn on_event(&mut self, event: TraceEvent) {
        (**self).on_event(event);
    }
}
