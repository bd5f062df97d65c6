//! CLI entry point for the DMA controller simulation.

use std::env;
use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use axi_bfm::{ProtocolPolicy, SimConfig};
use dma_sim as _;
use dma_sim::{load_config, simulate_model, ModelKind, RunError, RunOptions, RunSummary};
use dma_verilated as _;
use serde as _;
use serde_json as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;

const USAGE_TEXT: &str = "\
Usage: dma-sim [run] [options]

Runs the reference DMA scenario: two transfers programmed over APB, then a
bounded run servicing AXI traffic with the built-in memory slave.

Options:
  --cycles <n>           Cycles in the main run (default: 10000)
  --report-interval <n>  Cycles between status lines, 0 disables (default: 32)
  --config <file>        JSON simulation config; flags override its values
  --model <name>         behavioral | verilated (default: behavioral)
  --trace <file>         Dump a VCD waveform (verilated model only)
  --summary <file>       Write a JSON run summary
  --strict               Fail on the first AXI protocol violation
  -v, --verbose          Print every bus handshake to stderr
  -h, --help             Show this help message

Examples:
  dma-sim
  dma-sim run --cycles 500 --verbose
  dma-sim --model verilated --trace sim.vcd
";

const EXIT_USAGE: i32 = 1;
const EXIT_SIMULATION: i32 = 2;

#[derive(Debug, Default, PartialEq, Eq)]
struct RunArgs {
    cycles: Option<u64>,
    report_interval: Option<u64>,
    config: Option<PathBuf>,
    model: ModelKind,
    trace: Option<String>,
    summary: Option<PathBuf>,
    strict: bool,
    verbose: bool,
}

#[derive(Debug)]
enum ParseResult {
    Run(RunArgs),
    Help,
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String, String> {
    args.next()
        .map(|value| value.to_string_lossy().into_owned())
        .ok_or_else(|| format!("missing value for {flag}"))
}

fn parse_count(value: &str, flag: &str) -> Result<u64, String> {
    value
        .parse()
        .map_err(|_| format!("invalid value for {flag}: {value}"))
}

#[allow(clippy::while_let_on_iterator)]
fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let mut parsed = RunArgs::default();
    let mut first = true;

    while let Some(arg) = args.next() {
        let is_first = std::mem::replace(&mut first, false);
        let arg = arg.to_string_lossy().into_owned();
        match arg.as_str() {
            "run" if is_first => {}
            "--help" | "-h" => return Ok(ParseResult::Help),
            "--verbose" | "-v" => parsed.verbose = true,
            "--strict" => parsed.strict = true,
            "--cycles" => {
                let value = next_value(&mut args, &arg)?;
                parsed.cycles = Some(parse_count(&value, &arg)?);
            }
            "--report-interval" => {
                let value = next_value(&mut args, &arg)?;
                parsed.report_interval = Some(parse_count(&value, &arg)?);
            }
            "--config" => parsed.config = Some(PathBuf::from(next_value(&mut args, &arg)?)),
            "--model" => {
                let value = next_value(&mut args, &arg)?;
                parsed.model =
                    ModelKind::parse(&value).ok_or_else(|| format!("unknown model: {value}"))?;
            }
            "--trace" => parsed.trace = Some(next_value(&mut args, &arg)?),
            "--summary" => parsed.summary = Some(PathBuf::from(next_value(&mut args, &arg)?)),
            other if other.starts_with('-') => return Err(format!("unknown option: {other}")),
            other => return Err(format!("unknown command: {other}")),
        }
    }

    Ok(ParseResult::Run(parsed))
}

fn resolve_config(args: &RunArgs) -> Result<SimConfig, String> {
    let mut config = match &args.config {
        Some(path) => load_config(path).map_err(|e| e.to_string())?,
        None => SimConfig::default(),
    };
    if let Some(cycles) = args.cycles {
        config.run_cycles = cycles;
    }
    if let Some(interval) = args.report_interval {
        config.report_interval = interval;
    }
    if args.strict {
        config.slave.policy = ProtocolPolicy::Strict;
    }
    Ok(config)
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), RunError> {
    let file = File::create(path)?;
    summary.write_json(file)
}

fn run(args: RunArgs) -> Result<(), i32> {
    let config = resolve_config(&args).map_err(|error| {
        eprintln!("error: {error}");
        EXIT_USAGE
    })?;
    let options = RunOptions {
        model: args.model,
        trace: args.trace,
        verbose: args.verbose,
    };
    let report = simulate_model(&config, &options, io::stdout().lock(), io::stderr().lock())
        .map_err(|error| {
            eprintln!("error: {error}");
            match error {
                RunError::Config(_) => EXIT_USAGE,
                _ => EXIT_SIMULATION,
            }
        })?;

    if let Some(path) = &args.summary {
        let summary = RunSummary {
            model: options.model,
            report,
        };
        write_summary(path, &summary).map_err(|error| {
            eprintln!("error: {error}");
            EXIT_USAGE
        })?;
    }
    Ok(())
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Run(args)) => match run(args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!("{USAGE_TEXT}");
            EXIT_USAGE
        }
    };

    std::process::exit(exit_code);
}
