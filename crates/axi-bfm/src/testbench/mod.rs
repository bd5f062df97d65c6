//! Lock-step testbench composing a device under test with the AXI slave.
//!
//! Each [`Testbench::cycle`] runs one full clock period:
//!
//! 1. project slave state onto the AXI inputs of the DUT,
//! 2. raise the clock and evaluate (rising edge),
//! 3. sample the DUT outputs and lower the clock,
//! 4. advance the slave from the sampled master signals.

/// Register configuration bus driver.
pub mod apb;
/// Reference scenario script and runner.
pub mod scenario;

use thiserror::Error;

use crate::api::{NullTraceSink, SlaveConfig, TraceEvent, TraceSink};
use crate::bus::{ApbRequest, SlaveSignals};
use crate::dut::{DeviceUnderTest, TraceError};
use crate::slave::{AxiSlave, ChannelActivity};
use crate::ProtocolViolation;

/// Failures surfaced by the testbench.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// The DUT stayed busy past the allowed cycle budget.
    #[error("DUT still busy after {waited} cycles (cycle {cycle})")]
    Timeout {
        /// Cycles spent waiting.
        waited: u64,
        /// Absolute cycle at which the wait gave up.
        cycle: u64,
    },
    /// The slave rejected a master-side protocol violation (strict mode).
    #[error("protocol violation at cycle {cycle}: {source}")]
    Protocol {
        /// Cycle on which the violation was observed.
        cycle: u64,
        /// Detected violation.
        source: ProtocolViolation,
    },
    /// Waveform tracing could not be configured.
    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// DUT, slave emulator, and trace sink driven in lock step.
#[derive(Debug)]
pub struct Testbench<D, S = NullTraceSink> {
    dut: D,
    slave: AxiSlave,
    sink: S,
    cycle: u64,
    prev_busy: bool,
    idle_transitions: Vec<u64>,
}

impl<D: DeviceUnderTest> Testbench<D> {
    /// Creates a testbench that discards trace events.
    pub fn new(dut: D, config: SlaveConfig) -> Self {
        Self::with_sink(dut, config, NullTraceSink)
    }
}

impl<D: DeviceUnderTest, S: TraceSink> Testbench<D, S> {
    /// Creates a testbench reporting events to `sink`.
    pub fn with_sink(dut: D, config: SlaveConfig, sink: S) -> Self {
        let prev_busy = dut.outputs().busy;
        Self {
            dut,
            slave: AxiSlave::new(config),
            sink,
            cycle: 0,
            prev_busy,
            idle_transitions: Vec::new(),
        }
    }

    /// Full clock cycles simulated so far, including reset.
    #[must_use]
    pub const fn cycle_count(&self) -> u64 {
        self.cycle
    }

    /// Device under test.
    #[must_use]
    pub const fn dut(&self) -> &D {
        &self.dut
    }

    /// Mutable device under test.
    pub const fn dut_mut(&mut self) -> &mut D {
        &mut self.dut
    }

    /// Slave emulator state.
    #[must_use]
    pub const fn slave(&self) -> &AxiSlave {
        &self.slave
    }

    /// Trace sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable trace sink.
    pub const fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Splits the testbench into its DUT and trace sink.
    pub fn into_parts(self) -> (D, S) {
        (self.dut, self.sink)
    }

    /// Starts a waveform dump on the DUT.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Trace`] when the DUT cannot trace.
    pub fn start_tracing(&mut self, path: &str) -> Result<(), SimError> {
        self.dut.start_tracing(path)?;
        Ok(())
    }

    /// Stops any waveform dump on the DUT.
    pub fn stop_tracing(&mut self) {
        self.dut.stop_tracing();
    }

    /// Holds reset for `cycles` full clock cycles with idle inputs, then
    /// releases it and returns the slave to idle.
    pub fn reset(&mut self, cycles: u32) {
        {
            let inputs = self.dut.inputs_mut();
            inputs.reset = true;
            inputs.apb = ApbRequest::default();
            inputs.axi = SlaveSignals::IDLE;
        }
        for _ in 0..cycles {
            self.set_clock(true);
            self.set_clock(false);
            self.cycle += 1;
        }
        self.dut.inputs_mut().reset = false;
        self.slave.reset();
        self.prev_busy = self.dut.outputs().busy;
        self.idle_transitions.clear();
    }

    /// Simulates one full clock cycle.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Protocol`] when a strict slave rejects the cycle.
    pub fn cycle(&mut self) -> Result<ChannelActivity, SimError> {
        self.dut.inputs_mut().axi = self.slave.compute_outputs();
        self.set_clock(true);
        self.cycle += 1;

        let outputs = *self.dut.outputs();
        self.set_clock(false);

        let activity = self
            .slave
            .advance_after_clock(&outputs.axi)
            .map_err(|source| SimError::Protocol {
                cycle: self.cycle,
                source,
            })?;
        self.record(&activity);

        if self.prev_busy && !outputs.busy {
            self.idle_transitions.push(self.cycle);
        }
        self.prev_busy = outputs.busy;
        Ok(activity)
    }

    /// Runs `cycles` full clock cycles.
    ///
    /// # Errors
    ///
    /// Propagates the first [`SimError`] from [`Self::cycle`].
    pub fn run(&mut self, cycles: u64) -> Result<(), SimError> {
        for _ in 0..cycles {
            self.cycle()?;
        }
        Ok(())
    }

    /// Cycles until the DUT reports not busy, returning the cycles spent.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Timeout`] when busy is still high after
    /// `max_cycles`.
    pub fn wait_for_idle(&mut self, max_cycles: u64) -> Result<u64, SimError> {
        let mut waited = 0;
        while self.dut.outputs().busy {
            if waited == max_cycles {
                return Err(SimError::Timeout {
                    waited,
                    cycle: self.cycle,
                });
            }
            self.cycle()?;
            waited += 1;
        }
        Ok(waited)
    }

    /// Drains the cycles on which busy fell since the last call.
    pub fn take_idle_transitions(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.idle_transitions)
    }

    /// Emits a trace event stamped by the caller.
    pub fn emit(&mut self, event: TraceEvent) {
        self.sink.on_event(event);
    }

    fn set_clock(&mut self, level: bool) {
        self.dut.inputs_mut().clock = level;
        self.dut.eval();
    }

    fn record(&mut self, activity: &ChannelActivity) {
        let cycle = self.cycle;
        if let Some(phase) = activity.read_address {
            self.sink.on_event(TraceEvent::ReadAddress { cycle, phase });
        }
        if let Some(beat) = activity.read_beat {
            self.sink.on_event(TraceEvent::ReadBeat { cycle, beat });
        }
        if let Some(phase) = activity.write_address {
            self.sink.on_event(TraceEvent::WriteAddress { cycle, phase });
        }
        if let Some(beat) = activity.write_beat {
            self.sink.on_event(TraceEvent::WriteBeat { cycle, beat });
        }
        if activity.write_response {
            self.sink.on_event(TraceEvent::WriteResponse { cycle });
        }
        if let Some(violation) = activity.violation {
            self.sink.on_event(TraceEvent::Violation { cycle, violation });
        }
    }
}
