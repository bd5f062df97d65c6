#![no_main]

use axi_bfm::{AxiSlave, DataBeat, MasterSignals, ProtocolPolicy, SlaveConfig};
use libfuzzer_sys::fuzz_target;

const FRAME_LEN: usize = 4;

fn decode_frame(frame: &[u8]) -> MasterSignals {
    let flags = frame[0];
    let bit = |n: u8| flags & (1 << n) != 0;
    MasterSignals {
        arvalid: bit(0),
        araddr: u64::from(frame[1]) << 5,
        arlen: frame[2] & 0x0F,
        rready: bit(1),
        awvalid: bit(2),
        awaddr: u64::from(frame[3]) << 5,
        awlen: frame[2] >> 4,
        wvalid: bit(3),
        wdata: DataBeat::from_fn(|word| u32::from(frame[1]) ^ word as u32),
        wstrb: u32::MAX,
        wlast: bit(4),
        bready: bit(5),
    }
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let policy = if data[0] & 1 == 0 {
        ProtocolPolicy::Tolerant
    } else {
        ProtocolPolicy::Strict
    };
    let mut slave = AxiSlave::new(SlaveConfig { policy });

    for frame in data[1..].chunks_exact(FRAME_LEN) {
        let observed = decode_frame(frame);
        let before = slave;
        let drive = slave.compute_outputs();

        assert_eq!(drive.arready, !slave.read_burst().active);
        assert_eq!(drive.awready, !slave.write_burst().active);
        assert!(drive.wready);

        match slave.advance_after_clock(&observed) {
            Ok(activity) => {
                if let Some(beat) = activity.read_beat {
                    assert!(beat.beat_index < before.read_burst().declared_length_beats);
                }
            }
            Err(_) => {
                assert_eq!(policy, ProtocolPolicy::Strict);
                assert_eq!(slave, before);
            }
        }

        for burst in [slave.read_burst(), slave.write_burst()] {
            assert!(burst.current_beat_index <= burst.declared_length_beats);
        }
    }
});
