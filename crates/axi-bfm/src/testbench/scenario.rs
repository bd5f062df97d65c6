//! Reference scenario: two back-to-back DMA transfers, then a bounded run.

use crate::api::{SlaveConfig, TraceEvent, TraceSink};
use crate::dut::DeviceUnderTest;
pub use crate::peripherals::dma::{
    CTRL_CRYPTO_EN, CTRL_START, REG_CTRL, REG_DST_ADDR, REG_LENGTH, REG_SRC_ADDR, REG_STATUS,
};

use super::{SimError, Testbench};

/// Reset cycles in the reference scenario.
pub const DEFAULT_RESET_CYCLES: u32 = 5;
/// Idle cycles between programming the two reference transfers.
pub const DEFAULT_SETTLE_CYCLES: u64 = 2;
/// Length of the bounded main run.
pub const DEFAULT_RUN_CYCLES: u64 = 10_000;
/// Cycles between status samples.
pub const DEFAULT_REPORT_INTERVAL: u64 = 32;

/// One DMA transfer programmed through the register map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TransferConfig {
    /// Source byte address.
    pub src: u32,
    /// Destination byte address.
    pub dst: u32,
    /// Bytes to move.
    pub length: u32,
    /// Route the data through the SM4 engine.
    #[cfg_attr(feature = "serde", serde(default))]
    pub crypto: bool,
}

impl TransferConfig {
    /// `REG_CTRL` value that starts this transfer.
    #[must_use]
    pub const fn ctrl_word(&self) -> u32 {
        if self.crypto {
            CTRL_START | CTRL_CRYPTO_EN
        } else {
            CTRL_START
        }
    }

    /// Register writes that program and start this transfer, in bus order.
    #[must_use]
    pub const fn register_writes(&self) -> [(u32, u32); 4] {
        [
            (REG_SRC_ADDR, self.src),
            (REG_DST_ADDR, self.dst),
            (REG_LENGTH, self.length),
            (REG_CTRL, self.ctrl_word()),
        ]
    }
}

/// Simulation run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Cycles reset is held after power-up.
    pub reset_cycles: u32,
    /// Idle cycles between consecutive transfer programs.
    pub settle_cycles: u64,
    /// Cycles in the bounded main run.
    pub run_cycles: u64,
    /// Cycles between status samples; zero disables sampling.
    pub report_interval: u64,
    /// Slave emulator configuration.
    pub slave: SlaveConfig,
    /// Transfers programmed before the main run.
    pub transfers: Vec<TransferConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            reset_cycles: DEFAULT_RESET_CYCLES,
            settle_cycles: DEFAULT_SETTLE_CYCLES,
            run_cycles: DEFAULT_RUN_CYCLES,
            report_interval: DEFAULT_REPORT_INTERVAL,
            slave: SlaveConfig::default(),
            transfers: vec![
                TransferConfig {
                    src: 0x1000,
                    dst: 0x2000,
                    length: 64,
                    crypto: false,
                },
                TransferConfig {
                    src: 0x3000,
                    dst: 0x4000,
                    length: 48,
                    crypto: true,
                },
            ],
        }
    }
}

/// One scripted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ScenarioStep {
    /// APB register write.
    WriteRegister {
        /// Register address.
        addr: u32,
        /// Value written.
        value: u32,
    },
    /// Clock with no bus requests.
    Idle {
        /// Cycles to spend.
        cycles: u64,
    },
    /// Clock until busy drops; fails after `max_cycles`.
    WaitForIdle {
        /// Cycle budget.
        max_cycles: u64,
    },
    /// Bounded run with periodic status samples.
    Run {
        /// Cycles to run.
        cycles: u64,
    },
}

/// Ordered list of scripted actions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Scenario {
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Wraps an explicit step list.
    #[must_use]
    pub const fn new(steps: Vec<ScenarioStep>) -> Self {
        Self { steps }
    }

    /// Builds the reference script: each transfer is programmed and
    /// started, separated by `settle_cycles` of idle, then the main run.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        let mut steps = Vec::new();
        for (index, transfer) in config.transfers.iter().enumerate() {
            if index > 0 && config.settle_cycles > 0 {
                steps.push(ScenarioStep::Idle {
                    cycles: config.settle_cycles,
                });
            }
            steps.extend(
                transfer
                    .register_writes()
                    .into_iter()
                    .map(|(addr, value)| ScenarioStep::WriteRegister { addr, value }),
            );
        }
        steps.push(ScenarioStep::Run {
            cycles: config.run_cycles,
        });
        Self { steps }
    }

    /// Steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[ScenarioStep] {
        &self.steps
    }
}

/// Status read back after a busy to idle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TransferReport {
    /// Cycle busy was first seen low.
    pub cycle: u64,
    /// `REG_STATUS` value.
    pub status: u32,
    /// FIFO occupancy after the status read.
    pub level: u32,
}

/// Outcome of a completed scenario.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ScenarioReport {
    /// Completed transfers in order.
    pub transfers: Vec<TransferReport>,
    /// Testbench cycle count when the script ended.
    pub final_cycle: u64,
}

/// Executes `scenario` on an already reset testbench.
///
/// Status samples are emitted after every `report_interval`-th cycle of each
/// [`ScenarioStep::Run`], counting from its first cycle. Every busy to idle
/// transition, whatever step it happens in, triggers a `REG_STATUS` read and
/// a [`TraceEvent::TransferFinished`].
///
/// # Errors
///
/// Returns the first [`SimError`] raised by the testbench.
pub fn run_scenario<D: DeviceUnderTest, S: TraceSink>(
    testbench: &mut Testbench<D, S>,
    scenario: &Scenario,
    report_interval: u64,
) -> Result<ScenarioReport, SimError> {
    let mut report = ScenarioReport::default();
    for step in scenario.steps() {
        match *step {
            ScenarioStep::WriteRegister { addr, value } => {
                testbench.write_register(addr, value)?;
            }
            ScenarioStep::Idle { cycles } => testbench.run(cycles)?,
            ScenarioStep::WaitForIdle { max_cycles } => {
                testbench.wait_for_idle(max_cycles)?;
            }
            ScenarioStep::Run { cycles } => {
                for index in 0..cycles {
                    testbench.cycle()?;
                    if report_interval != 0 && index % report_interval == 0 {
                        sample_status(testbench);
                    }
                    collect_finished(testbench, &mut report)?;
                }
            }
        }
        collect_finished(testbench, &mut report)?;
    }
    report.final_cycle = testbench.cycle_count();
    Ok(report)
}

fn sample_status<D: DeviceUnderTest, S: TraceSink>(testbench: &mut Testbench<D, S>) {
    let outputs = *testbench.dut().outputs();
    let cycle = testbench.cycle_count();
    testbench.emit(TraceEvent::StatusSample {
        cycle,
        busy: outputs.busy,
        level: outputs.level,
    });
}

fn collect_finished<D: DeviceUnderTest, S: TraceSink>(
    testbench: &mut Testbench<D, S>,
    report: &mut ScenarioReport,
) -> Result<(), SimError> {
    // The status read itself clocks the DUT, so drain until quiet.
    loop {
        let transitions = testbench.take_idle_transitions();
        if transitions.is_empty() {
            return Ok(());
        }
        for cycle in transitions {
            let status = testbench.read_register(REG_STATUS)?;
            let level = testbench.dut().outputs().level;
            testbench.emit(TraceEvent::TransferFinished {
                cycle,
                status,
                level,
            });
            report.transfers.push(TransferReport {
                cycle,
                status,
                level,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        run_scenario, Scenario, ScenarioStep, SimConfig, TransferConfig, CTRL_CRYPTO_EN,
        CTRL_START, REG_CTRL, REG_LENGTH, REG_SRC_ADDR,
    };
    use crate::api::{RecordingTraceSink, TraceEvent};
    use crate::peripherals::dma::{BehavioralDma, STATUS_CRYPTO, STATUS_DONE};
    use crate::testbench::{SimError, Testbench};

    #[test]
    fn default_config_matches_reference_constants() {
        let config = SimConfig::default();
        assert_eq!(config.reset_cycles, 5);
        assert_eq!(config.settle_cycles, 2);
        assert_eq!(config.run_cycles, 10_000);
        assert_eq!(config.report_interval, 32);
        assert_eq!(config.transfers.len(), 2);
        assert_eq!(config.transfers[0].ctrl_word(), CTRL_START);
        assert_eq!(config.transfers[1].ctrl_word(), CTRL_START | CTRL_CRYPTO_EN);
    }

    #[test]
    fn reference_script_programs_then_settles_then_runs() {
        let scenario = Scenario::from_config(&SimConfig::default());
        let steps = scenario.steps();
        assert_eq!(steps.len(), 10);
        assert_eq!(
            steps[0],
            ScenarioStep::WriteRegister {
                addr: REG_SRC_ADDR,
                value: 0x1000
            }
        );
        assert_eq!(
            steps[3],
            ScenarioStep::WriteRegister {
                addr: REG_CTRL,
                value: CTRL_START
            }
        );
        assert_eq!(steps[4], ScenarioStep::Idle { cycles: 2 });
        assert_eq!(
            steps[7],
            ScenarioStep::WriteRegister {
                addr: REG_LENGTH,
                value: 48
            }
        );
        assert_eq!(steps[9], ScenarioStep::Run { cycles: 10_000 });
    }

    #[test]
    fn reference_scenario_reports_both_transfers_in_order() {
        let config = SimConfig {
            run_cycles: 200,
            ..SimConfig::default()
        };
        let mut tb = Testbench::with_sink(
            BehavioralDma::new(),
            config.slave,
            RecordingTraceSink::new(),
        );
        tb.reset(config.reset_cycles);
        let report = run_scenario(&mut tb, &Scenario::from_config(&config), 32)
            .expect("reference scenario");

        assert_eq!(report.transfers.len(), 2);
        assert!(report.transfers[0].cycle < report.transfers[1].cycle);
        assert_eq!(report.transfers[0].status & STATUS_DONE, STATUS_DONE);
        assert_eq!(report.transfers[0].status & STATUS_CRYPTO, 0);
        assert_eq!(report.transfers[1].status & STATUS_CRYPTO, STATUS_CRYPTO);
        assert_eq!(tb.dut().completed_transfers(), 2);

        let samples = tb
            .sink()
            .events()
            .iter()
            .filter(|event| matches!(event, TraceEvent::StatusSample { .. }))
            .count();
        assert_eq!(samples, 7);
    }

    #[test]
    fn wait_for_idle_step_fails_on_stuck_dma() {
        let transfer = TransferConfig {
            src: 0,
            dst: 0x100,
            length: 32,
            crypto: false,
        };
        let mut steps: Vec<_> = transfer
            .register_writes()
            .into_iter()
            .map(|(addr, value)| ScenarioStep::WriteRegister { addr, value })
            .collect();
        steps.push(ScenarioStep::WaitForIdle { max_cycles: 1 });

        let mut tb = Testbench::new(BehavioralDma::new(), SimConfig::default().slave);
        tb.reset(2);
        let error = run_scenario(&mut tb, &Scenario::new(steps), 0).expect_err("too short");
        assert!(matches!(error, SimError::Timeout { waited: 1, .. }));
    }
}
