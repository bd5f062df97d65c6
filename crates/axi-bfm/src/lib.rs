//! AXI4 slave bus-functional model and lock-step testbench for the DMA/SM4
//! controller.

/// Bus geometry, data beats, and signal bundles.
pub mod bus;
pub use bus::{
    beats_for_length, strobe_for_bytes, ApbRequest, DataBeat, MasterSignals, SlaveSignals,
    APB_STROBE_ALL, BEAT_BYTES, DATA_WORDS, RESP_OKAY, RESP_SLVERR, STROBE_ALL, WORD_BYTES,
};

/// Master-side protocol violation taxonomy.
pub mod violation;
pub use violation::{ProtocolViolation, ViolationClass};

/// Host-facing configuration and trace hooks.
pub mod api;
pub use api::{
    NullTraceSink, ProtocolPolicy, RecordingTraceSink, SlaveConfig, TraceEvent, TraceSink,
};

/// AXI slave emulator.
pub mod slave;
pub use slave::{
    read_payload, AddressPhase, AxiSlave, BurstTransaction, ChannelActivity, ReadResponse,
    WriteBeat,
};

/// Device-under-test signal interface.
pub mod dut;
pub use dut::{DeviceUnderTest, DutInputs, DutOutputs, TraceError};

/// Software device models.
pub mod peripherals;
pub use peripherals::{BehavioralDma, Descriptor};

/// Lock-step driver composing a DUT with the slave emulator.
pub mod testbench;
pub use testbench::scenario::{
    run_scenario, Scenario, ScenarioReport, ScenarioStep, SimConfig, TransferConfig,
    TransferReport,
};
pub use testbench::{SimError, Testbench};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
