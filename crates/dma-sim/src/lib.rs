//! Simulation driver behind the `dma-sim` binary.
//!
//! Loads a [`SimConfig`], builds the selected device model, runs the
//! reference scenario, and renders trace events as the console report.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use axi_bfm::{
    run_scenario, BehavioralDma, DeviceUnderTest, Scenario, ScenarioReport, SimConfig, SimError,
    Testbench, TraceEvent, TraceSink,
};
use dma_verilated::DmaVerilated;
use serde::Serialize;
use thiserror::Error;

#[cfg(test)]
use tempfile as _;

/// Failures while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be opened or read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The file is not a valid JSON configuration.
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
    /// The requested model is not compiled in.
    #[error("the {0} model requires building with --features verilator")]
    ModelUnavailable(ModelKind),
}

/// Failures during a simulation run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The run could not be set up.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The testbench stopped the run.
    #[error(transparent)]
    Sim(#[from] SimError),
    /// Report output failed.
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
    /// The run summary could not be encoded.
    #[error("failed to encode summary: {0}")]
    Summary(#[from] serde_json::Error),
}

/// Reads a JSON [`SimConfig`]. Missing fields take their defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<SimConfig, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Device model driven by the testbench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Built-in software model.
    #[default]
    Behavioral,
    /// Verilator build of the RTL.
    Verilated,
}

impl ModelKind {
    /// Parses a `--model` value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "behavioral" => Some(Self::Behavioral),
            "verilated" => Some(Self::Verilated),
            _ => None,
        }
    }

    /// Returns `true` when the model can be constructed in this build.
    #[must_use]
    pub const fn is_available(self) -> bool {
        match self {
            Self::Behavioral => true,
            Self::Verilated => cfg!(feature = "verilator"),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Behavioral => f.write_str("behavioral"),
            Self::Verilated => f.write_str("verilated"),
        }
    }
}

/// Per-run options that are not part of [`SimConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOptions {
    /// Device model to simulate.
    pub model: ModelKind,
    /// VCD output path.
    pub trace: Option<String>,
    /// Print every bus handshake to the diagnostic stream.
    pub verbose: bool,
}

/// Machine-readable record of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Model that was simulated.
    pub model: ModelKind,
    /// Transfers and final cycle.
    pub report: ScenarioReport,
}

impl RunSummary {
    /// Writes the summary as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] when encoding or writing fails.
    pub fn write_json(&self, mut out: impl Write) -> Result<(), RunError> {
        serde_json::to_writer_pretty(&mut out, self)?;
        writeln!(out)?;
        Ok(())
    }
}

/// Trace sink printing the reference console report.
#[derive(Debug)]
pub struct ConsoleReporter<W, E> {
    out: W,
    err: E,
    verbose: bool,
    error: Option<io::Error>,
}

impl<W: Write, E: Write> ConsoleReporter<W, E> {
    /// Creates a reporter writing the report to `out` and handshakes to `err`.
    pub const fn new(out: W, err: E, verbose: bool) -> Self {
        Self {
            out,
            err,
            verbose,
            error: None,
        }
    }

    /// Writes one report line outside the event stream.
    pub fn line(&mut self, text: &str) {
        let result = writeln!(self.out, "{text}");
        self.keep_first_error(result);
    }

    /// Flushes both streams and returns the first write error, if any.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error seen while reporting.
    pub fn finish(mut self) -> io::Result<()> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.out.flush()?;
        self.err.flush()
    }

    fn keep_first_error(&mut self, result: io::Result<()>) {
        if let (Err(error), None) = (result, &self.error) {
            self.error = Some(error);
        }
    }

    fn render(&mut self, event: &TraceEvent) -> io::Result<()> {
        match *event {
            TraceEvent::StatusSample { cycle, busy, level } => {
                writeln!(self.out, "cycle={cycle} busy={} level={level:x}", u8::from(busy))
            }
            TraceEvent::TransferFinished {
                cycle,
                status,
                level,
            } => {
                writeln!(self.out, "Transfer finished at cycle={cycle}")?;
                writeln!(self.out, "  REG_STATUS=0x{status:x}")?;
                writeln!(self.out, "  FIFO level={level}")
            }
            TraceEvent::Violation { cycle, violation } => writeln!(
                self.err,
                "[{cycle}] violation {:#04x} ({}): {violation}",
                violation.code(),
                violation.class().label()
            ),
            _ if event.is_handshake() && !self.verbose => Ok(()),
            TraceEvent::ReadAddress { cycle, phase } => writeln!(
                self.err,
                "[{cycle}] AR addr={:#x} beats={}",
                phase.address, phase.beats
            ),
            TraceEvent::ReadBeat { cycle, beat } => writeln!(
                self.err,
                "[{cycle}] R  addr={:#x} beat={} last={}",
                beat.address,
                beat.beat_index,
                u8::from(beat.last)
            ),
            TraceEvent::WriteAddress { cycle, phase } => writeln!(
                self.err,
                "[{cycle}] AW addr={:#x} beats={}",
                phase.address, phase.beats
            ),
            TraceEvent::WriteBeat { cycle, beat } => writeln!(
                self.err,
                "[{cycle}] W  addr={:#x} beat={} strb={:#010x} last={}",
                beat.address,
                beat.beat_index,
                beat.strobe,
                u8::from(beat.last)
            ),
            TraceEvent::WriteResponse { cycle } => writeln!(self.err, "[{cycle}] B"),
        }
    }
}

impl<W: Write, E: Write> TraceSink for ConsoleReporter<W, E> {
    fn on_event(&mut self, event: TraceEvent) {
        let result = self.render(&event);
        self.keep_first_error(result);
    }
}

/// Runs the reference scenario for `config` on `dut`, reporting to `out`
/// and `err`.
///
/// # Errors
///
/// Returns [`RunError`] when the testbench fails or the report cannot be
/// written.
pub fn simulate<D: DeviceUnderTest>(
    dut: D,
    config: &SimConfig,
    options: &RunOptions,
    out: impl Write,
    err: impl Write,
) -> Result<ScenarioReport, RunError> {
    let reporter = ConsoleReporter::new(out, err, options.verbose);
    let mut testbench = Testbench::with_sink(dut, config.slave, reporter);
    if let Some(path) = &options.trace {
        testbench.start_tracing(path)?;
    }
    testbench.reset(config.reset_cycles);

    let scenario = Scenario::from_config(config);
    let result = run_scenario(&mut testbench, &scenario, config.report_interval);
    if options.trace.is_some() {
        testbench.stop_tracing();
    }
    let report = result?;

    let (_, mut reporter) = testbench.into_parts();
    reporter.line("Simulation finished");
    reporter.finish()?;
    Ok(report)
}

/// Builds the model selected in `options` and runs [`simulate`] on it.
///
/// # Errors
///
/// Returns [`ConfigError::ModelUnavailable`] (as [`RunError::Config`]) when
/// the selected model is not compiled in, otherwise [`RunError`] from the run.
pub fn simulate_model(
    config: &SimConfig,
    options: &RunOptions,
    out: impl Write,
    err: impl Write,
) -> Result<ScenarioReport, RunError> {
    if !options.model.is_available() {
        return Err(ConfigError::ModelUnavailable(options.model).into());
    }
    match options.model {
        ModelKind::Behavioral => simulate(BehavioralDma::new(), config, options, out, err),
        ModelKind::Verilated => {
            let dut = DmaVerilated::from_env().map_err(SimError::from)?;
            simulate(dut, config, options, out, err)
        }
    }
}
