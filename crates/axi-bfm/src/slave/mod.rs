//! Single-outstanding AXI4 memory slave emulator.
//!
//! The emulator is split into two phases per clock cycle: a pure projection
//! of state onto the slave-driven signals ([`AxiSlave::compute_outputs`]) and
//! a state transition driven by the master signals sampled after the clock
//! edge ([`AxiSlave::advance_after_clock`]). All mutation happens in the
//! second phase.

/// Burst bookkeeping for one channel direction.
pub mod burst;
/// Deterministic read data generation.
pub mod payload;

pub use burst::BurstTransaction;
pub use payload::{beat_address, read_payload};

use crate::api::{ProtocolPolicy, SlaveConfig};
use crate::bus::{DataBeat, MasterSignals, SlaveSignals, RESP_OKAY};
use crate::ProtocolViolation;

/// Beat currently presented on the read data channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ReadResponse {
    /// Zero-based beat index within the burst.
    pub beat_index: u32,
    /// Byte address of the beat.
    pub address: u64,
    /// Generated payload.
    pub data: DataBeat,
    /// Whether this is the final beat of the burst.
    pub last: bool,
}

/// Address phase accepted on AR or AW.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AddressPhase {
    /// Burst start address.
    pub address: u64,
    /// Normalized beat count.
    pub beats: u32,
}

/// Write data beat accepted on W.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct WriteBeat {
    /// Zero-based beat index within the burst.
    pub beat_index: u32,
    /// Byte address of the beat.
    pub address: u64,
    /// Payload presented by the master.
    pub data: DataBeat,
    /// Byte strobes presented by the master.
    pub strobe: u32,
    /// WLAST as presented by the master.
    pub last: bool,
}

/// Handshakes completed during one call to [`AxiSlave::advance_after_clock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelActivity {
    /// Read address handshake, if one fired.
    pub read_address: Option<AddressPhase>,
    /// Read data handshake, if one fired.
    pub read_beat: Option<ReadResponse>,
    /// Write address handshake, if one fired.
    pub write_address: Option<AddressPhase>,
    /// Write data handshake, if one fired.
    pub write_beat: Option<WriteBeat>,
    /// Whether the write response handshake fired.
    pub write_response: bool,
    /// Violation absorbed in tolerant mode.
    pub violation: Option<ProtocolViolation>,
}

impl ChannelActivity {
    /// Returns `true` when no handshake fired and nothing was absorbed.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        self.read_address.is_none()
            && self.read_beat.is_none()
            && self.write_address.is_none()
            && self.write_beat.is_none()
            && !self.write_response
            && self.violation.is_none()
    }
}

/// AXI slave emulator servicing one read burst and one write burst at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxiSlave {
    config: SlaveConfig,
    read: BurstTransaction,
    write: BurstTransaction,
    write_response_pending: bool,
}

impl AxiSlave {
    /// Creates an idle emulator.
    #[must_use]
    pub fn new(config: SlaveConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the configuration this emulator was built with.
    #[must_use]
    pub const fn config(&self) -> &SlaveConfig {
        &self.config
    }

    /// Drops any in-flight bursts and pending responses.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Current read burst, active or last retired.
    #[must_use]
    pub const fn read_burst(&self) -> &BurstTransaction {
        &self.read
    }

    /// Current write burst, active or last retired.
    #[must_use]
    pub const fn write_burst(&self) -> &BurstTransaction {
        &self.write
    }

    /// Whether a write response is waiting for BREADY.
    #[must_use]
    pub const fn write_response_pending(&self) -> bool {
        self.write_response_pending
    }

    /// Beat to present on the read data channel this cycle, if any.
    #[must_use]
    pub fn read_response(&self) -> Option<ReadResponse> {
        let burst = &self.read;
        burst.has_remaining().then(|| ReadResponse {
            beat_index: burst.current_beat_index,
            address: beat_address(burst.base_address, burst.current_beat_index),
            data: read_payload(burst.base_address, burst.current_beat_index),
            last: burst.is_final_beat(),
        })
    }

    /// Projects current state onto the slave-driven signals. Does not mutate.
    #[must_use]
    pub fn compute_outputs(&self) -> SlaveSignals {
        let response = self.read_response();
        SlaveSignals {
            arready: !self.read.active,
            rvalid: response.is_some(),
            rdata: response.map_or(DataBeat::ZERO, |r| r.data),
            rresp: RESP_OKAY,
            rlast: response.is_some_and(|r| r.last),
            awready: !self.write.active,
            wready: true,
            bvalid: self.write_response_pending,
            bresp: RESP_OKAY,
        }
    }

    /// Applies the handshakes implied by `observed` and this cycle's drive.
    ///
    /// Channels are evaluated in AR, R, AW, W, B order.
    ///
    /// # Errors
    ///
    /// In [`ProtocolPolicy::Strict`] mode returns the first violation seen;
    /// the emulator state is left exactly as it was before the call.
    pub fn advance_after_clock(
        &mut self,
        observed: &MasterSignals,
    ) -> Result<ChannelActivity, ProtocolViolation> {
        let driven = self.compute_outputs();
        let mut next = *self;
        let mut activity = ChannelActivity::default();
        let mut response_raised = false;

        if observed.arvalid && driven.arready && !next.read.active {
            next.read = BurstTransaction::start(observed.araddr, observed.arlen);
            activity.read_address = Some(AddressPhase {
                address: observed.araddr,
                beats: next.read.declared_length_beats,
            });
        }

        if next.read.active && driven.rvalid && observed.rready {
            activity.read_beat = self.read_response();
            if next.read.complete_beat() {
                next.read.active = false;
            }
        }

        if observed.awvalid && driven.awready && !next.write.active {
            next.write = BurstTransaction::start(observed.awaddr, observed.awlen);
            next.write_response_pending = false;
            activity.write_address = Some(AddressPhase {
                address: observed.awaddr,
                beats: next.write.declared_length_beats,
            });
        }

        if observed.wvalid && driven.wready {
            if next.write.active {
                let beat = WriteBeat {
                    beat_index: next.write.current_beat_index,
                    address: beat_address(next.write.base_address, next.write.current_beat_index),
                    data: observed.wdata,
                    strobe: observed.wstrb,
                    last: observed.wlast,
                };
                activity.violation = write_length_violation(&next.write, observed.wlast);
                next.write.complete_beat();
                if observed.wlast {
                    next.write.active = false;
                    next.write_response_pending = true;
                    response_raised = true;
                }
                activity.write_beat = Some(beat);
            } else {
                activity.violation = Some(ProtocolViolation::WriteDataWithoutAddress);
            }
        }

        // A response raised by this cycle's WLAST is not visible until the
        // next cycle, so a B handshake here always retires the older one.
        if driven.bvalid && observed.bready {
            if !response_raised {
                next.write_response_pending = false;
            }
            activity.write_response = true;
        }

        if let (ProtocolPolicy::Strict, Some(violation)) = (self.config.policy, activity.violation)
        {
            return Err(violation);
        }

        *self = next;
        Ok(activity)
    }
}

const fn write_length_violation(
    burst: &BurstTransaction,
    wlast: bool,
) -> Option<ProtocolViolation> {
    let declared = burst.declared_length_beats;
    let received = burst.current_beat_index + 1;
    if wlast && received < declared {
        Some(ProtocolViolation::EarlyWriteLast { declared, received })
    } else if !wlast && received >= declared {
        Some(ProtocolViolation::WriteBurstOverrun { declared })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{AxiSlave, ProtocolViolation};
    use crate::api::{ProtocolPolicy, SlaveConfig};
    use crate::bus::{DataBeat, MasterSignals, STROBE_ALL};

    fn read_request(addr: u64, len: u8) -> MasterSignals {
        MasterSignals {
            arvalid: true,
            araddr: addr,
            arlen: len,
            ..MasterSignals::default()
        }
    }

    fn write_request(addr: u64, len: u8) -> MasterSignals {
        MasterSignals {
            awvalid: true,
            awaddr: addr,
            awlen: len,
            ..MasterSignals::default()
        }
    }

    fn write_data(last: bool) -> MasterSignals {
        MasterSignals {
            wvalid: true,
            wdata: DataBeat::new([0xA5; 8]),
            wstrb: STROBE_ALL,
            wlast: last,
            ..MasterSignals::default()
        }
    }

    #[test]
    fn idle_slave_accepts_addresses_and_drives_nothing() {
        let slave = AxiSlave::default();
        let out = slave.compute_outputs();
        assert!(out.arready);
        assert!(out.awready);
        assert!(out.wready);
        assert!(!out.rvalid);
        assert!(!out.bvalid);
    }

    #[test]
    fn read_address_handshake_starts_burst_and_blocks_arready() {
        let mut slave = AxiSlave::default();
        let activity = slave
            .advance_after_clock(&read_request(0x1000, 1))
            .expect("tolerant slave never fails");

        let phase = activity.read_address.expect("AR should fire");
        assert_eq!(phase.address, 0x1000);
        assert_eq!(phase.beats, 2);
        assert!(activity.read_beat.is_none());

        let out = slave.compute_outputs();
        assert!(!out.arready);
        assert!(out.rvalid);
        assert!(!out.rlast);
        assert_eq!(out.rdata.word(0), Some(0x1000));
    }

    #[test]
    fn read_burst_retires_on_final_beat() {
        let mut slave = AxiSlave::default();
        slave.advance_after_clock(&read_request(0x2000, 1)).unwrap();

        let ready = MasterSignals {
            rready: true,
            ..MasterSignals::default()
        };
        let first = slave.advance_after_clock(&ready).unwrap();
        assert_eq!(first.read_beat.map(|b| b.last), Some(false));
        assert!(slave.compute_outputs().rlast);
        assert_eq!(slave.compute_outputs().rdata.word(0), Some(0x2020));

        let second = slave.advance_after_clock(&ready).unwrap();
        assert_eq!(second.read_beat.map(|b| b.last), Some(true));
        assert!(!slave.read_burst().active);

        let out = slave.compute_outputs();
        assert!(out.arready);
        assert!(!out.rvalid);
        assert!(!out.rlast);
    }

    #[test]
    fn stalled_read_data_holds_the_current_beat() {
        let mut slave = AxiSlave::default();
        slave.advance_after_clock(&read_request(0x40, 3)).unwrap();
        let before = slave.compute_outputs();

        let activity = slave.advance_after_clock(&MasterSignals::default()).unwrap();
        assert!(activity.is_idle());
        assert_eq!(slave.compute_outputs(), before);
    }

    #[test]
    fn second_read_address_does_not_disturb_active_burst() {
        let mut slave = AxiSlave::default();
        slave.advance_after_clock(&read_request(0x1000, 3)).unwrap();
        let snapshot = *slave.read_burst();

        let activity = slave.advance_after_clock(&read_request(0x9000, 0)).unwrap();
        assert!(activity.read_address.is_none());
        assert_eq!(*slave.read_burst(), snapshot);
    }

    #[test]
    fn second_write_address_does_not_disturb_active_burst() {
        let mut slave = AxiSlave::default();
        slave.advance_after_clock(&write_request(0x2000, 3)).unwrap();
        slave.advance_after_clock(&write_data(false)).unwrap();
        let snapshot = *slave.write_burst();

        let activity = slave.advance_after_clock(&write_request(0x9000, 0)).unwrap();
        assert!(activity.write_address.is_none());
        assert_eq!(*slave.write_burst(), snapshot);
        assert!(!slave.compute_outputs().awready);
    }

    #[test]
    fn write_response_follows_last_beat_after_one_cycle() {
        let mut slave = AxiSlave::default();
        slave.advance_after_clock(&write_request(0x2000, 1)).unwrap();
        assert!(!slave.compute_outputs().awready);

        slave.advance_after_clock(&write_data(false)).unwrap();
        assert!(!slave.compute_outputs().bvalid);

        let mut last = write_data(true);
        last.bready = true;
        let activity = slave.advance_after_clock(&last).unwrap();
        assert!(activity.write_beat.is_some_and(|b| b.last));
        assert!(!activity.write_response);
        assert!(slave.write_response_pending());
        assert!(slave.compute_outputs().bvalid);
        assert!(slave.compute_outputs().awready);

        let idle = slave.advance_after_clock(&MasterSignals::default()).unwrap();
        assert!(!idle.write_response);
        assert!(slave.compute_outputs().bvalid);

        let response = slave
            .advance_after_clock(&MasterSignals {
                bready: true,
                ..MasterSignals::default()
            })
            .unwrap();
        assert!(response.write_response);
        assert!(!slave.compute_outputs().bvalid);
    }

    #[test]
    fn address_and_first_data_beat_may_share_a_cycle() {
        let mut slave = AxiSlave::default();
        let mut signals = write_request(0x5000, 0);
        signals.wvalid = true;
        signals.wlast = true;
        let activity = slave.advance_after_clock(&signals).unwrap();
        assert!(activity.write_address.is_some());
        assert_eq!(activity.write_beat.map(|b| b.address), Some(0x5000));
        assert!(slave.write_response_pending());
    }

    #[test]
    fn new_write_address_clears_stale_response() {
        let mut slave = AxiSlave::default();
        let mut signals = write_request(0x5000, 0);
        signals.wvalid = true;
        signals.wlast = true;
        slave.advance_after_clock(&signals).unwrap();
        assert!(slave.write_response_pending());

        slave.advance_after_clock(&write_request(0x6000, 0)).unwrap();
        assert!(!slave.write_response_pending());
        assert!(slave.write_burst().active);
    }

    #[test]
    fn response_raised_alongside_older_b_handshake_stays_pending() {
        let mut slave = AxiSlave::default();
        let mut first = write_request(0x5000, 0);
        first.wvalid = true;
        first.wlast = true;
        slave.advance_after_clock(&first).unwrap();

        let mut second = write_request(0x6000, 0);
        second.wvalid = true;
        second.wlast = true;
        second.bready = true;
        let activity = slave.advance_after_clock(&second).unwrap();
        assert!(activity.write_response);
        assert_eq!(activity.write_beat.map(|b| b.address), Some(0x6000));
        assert!(slave.write_response_pending());
    }

    #[test]
    fn tolerant_mode_absorbs_orphan_write_data() {
        let mut slave = AxiSlave::default();
        let activity = slave.advance_after_clock(&write_data(true)).unwrap();
        assert_eq!(
            activity.violation,
            Some(ProtocolViolation::WriteDataWithoutAddress)
        );
        assert!(activity.write_beat.is_none());
        assert!(!slave.write_response_pending());
    }

    #[test]
    fn strict_mode_rejects_early_wlast_without_mutating() {
        let mut slave = AxiSlave::new(SlaveConfig {
            policy: ProtocolPolicy::Strict,
        });
        slave.advance_after_clock(&write_request(0x100, 3)).unwrap();
        let before = slave;

        let error = slave
            .advance_after_clock(&write_data(true))
            .expect_err("early WLAST must fail in strict mode");
        assert_eq!(
            error,
            ProtocolViolation::EarlyWriteLast {
                declared: 4,
                received: 1
            }
        );
        assert_eq!(slave, before);
    }

    #[test]
    fn tolerant_overrun_saturates_beat_index() {
        let mut slave = AxiSlave::default();
        slave.advance_after_clock(&write_request(0x100, 0)).unwrap();

        let first = slave.advance_after_clock(&write_data(false)).unwrap();
        assert_eq!(
            first.violation,
            Some(ProtocolViolation::WriteBurstOverrun { declared: 1 })
        );
        slave.advance_after_clock(&write_data(false)).unwrap();
        assert_eq!(slave.write_burst().current_beat_index, 1);
        assert!(slave.write_burst().active);

        slave.advance_after_clock(&write_data(true)).unwrap();
        assert!(!slave.write_burst().active);
        assert!(slave.write_response_pending());
    }

    #[test]
    fn reset_returns_to_idle_but_keeps_policy() {
        let mut slave = AxiSlave::new(SlaveConfig {
            policy: ProtocolPolicy::Strict,
        });
        slave.advance_after_clock(&read_request(0, 7)).unwrap();
        slave.reset();
        assert!(!slave.read_burst().active);
        assert_eq!(slave.config().policy, ProtocolPolicy::Strict);
    }
}
