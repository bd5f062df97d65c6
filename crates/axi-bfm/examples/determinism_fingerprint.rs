//! Deterministic bus-trace fingerprint used for cross-host comparison.

use axi_bfm::{
    run_scenario, BehavioralDma, RecordingTraceSink, Scenario, SimConfig, Testbench, TraceEvent,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> String {
    let config = SimConfig {
        run_cycles: 512,
        ..SimConfig::default()
    };
    let mut tb = Testbench::with_sink(BehavioralDma::new(), config.slave, RecordingTraceSink::new());
    tb.reset(config.reset_cycles);
    let report = run_scenario(&mut tb, &Scenario::from_config(&config), config.report_interval)
        .expect("reference scenario should complete");

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for event in tb.sink().events() {
        hash_bytes(&mut hash, &event.cycle().to_le_bytes());
        match event {
            TraceEvent::ReadAddress { phase, .. } => {
                hash_bytes(&mut hash, &[0x10]);
                hash_bytes(&mut hash, &phase.address.to_le_bytes());
                hash_bytes(&mut hash, &phase.beats.to_le_bytes());
            }
            TraceEvent::ReadBeat { beat, .. } => {
                hash_bytes(&mut hash, &[0x11, u8::from(beat.last)]);
                hash_bytes(&mut hash, &beat.data.to_le_bytes());
            }
            TraceEvent::WriteAddress { phase, .. } => {
                hash_bytes(&mut hash, &[0x12]);
                hash_bytes(&mut hash, &phase.address.to_le_bytes());
                hash_bytes(&mut hash, &phase.beats.to_le_bytes());
            }
            TraceEvent::WriteBeat { beat, .. } => {
                hash_bytes(&mut hash, &[0x13, u8::from(beat.last)]);
                hash_bytes(&mut hash, &beat.strobe.to_le_bytes());
                hash_bytes(&mut hash, &beat.data.to_le_bytes());
            }
            TraceEvent::WriteResponse { .. } => hash_bytes(&mut hash, &[0x14]),
            TraceEvent::Violation { violation, .. } => {
                hash_bytes(&mut hash, &[0x15, violation.code()]);
            }
            TraceEvent::StatusSample { busy, level, .. } => {
                hash_bytes(&mut hash, &[0x16, u8::from(*busy)]);
                hash_bytes(&mut hash, &level.to_le_bytes());
            }
            TraceEvent::TransferFinished { status, level, .. } => {
                hash_bytes(&mut hash, &[0x17]);
                hash_bytes(&mut hash, &status.to_le_bytes());
                hash_bytes(&mut hash, &level.to_le_bytes());
            }
        }
    }
    hash_bytes(&mut hash, &report.final_cycle.to_le_bytes());

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
