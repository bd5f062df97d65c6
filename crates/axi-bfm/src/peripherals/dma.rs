//! Behavioral model of the DMA controller's bus-master side.
//!
//! Stands in for the generated RTL when no Verilator build is available. It
//! copies `length` bytes from `src` to `dst` with one read burst followed by
//! one write burst. The SM4 transform and scatter-gather engine are not
//! modeled; the crypto enable bit is latched and reported only.
//!
//! Handshakes follow the testbench sampling convention: a transfer happens on
//! a rising edge when the valid and ready levels visible after that edge's
//! evaluation are both high.

use std::collections::VecDeque;

use crate::bus::{
    beats_for_length, strobe_for_bytes, DataBeat, MasterSignals, BEAT_BYTES, RESP_OKAY,
};
use crate::dut::{DeviceUnderTest, DutInputs, DutOutputs};

/// Source address register.
pub const REG_SRC_ADDR: u32 = 0x00;
/// Destination address register.
pub const REG_DST_ADDR: u32 = 0x04;
/// Transfer length register, in bytes.
pub const REG_LENGTH: u32 = 0x08;
/// Control register.
pub const REG_CTRL: u32 = 0x0C;
/// Status register (read-only).
pub const REG_STATUS: u32 = 0x10;

/// `REG_CTRL`: start the programmed transfer.
pub const CTRL_START: u32 = 1 << 0;
/// `REG_CTRL`: route data through the SM4 engine.
pub const CTRL_CRYPTO_EN: u32 = 1 << 3;

/// `REG_STATUS`: a transfer is in flight.
pub const STATUS_BUSY: u32 = 1 << 0;
/// `REG_STATUS`: a transfer retired since the last status read.
pub const STATUS_DONE: u32 = 1 << 1;
/// `REG_STATUS`: a bad descriptor or non-OKAY response was seen.
pub const STATUS_ERROR: u32 = 1 << 2;
/// `REG_STATUS`: a transfer retired since the last status read had crypto
/// enabled.
pub const STATUS_CRYPTO: u32 = 1 << 3;

/// Longest burst the AXI length field can encode.
pub const MAX_BURST_BEATS: u64 = 256;

/// One programmed transfer, latched when `CTRL_START` is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    /// Source byte address.
    pub src: u64,
    /// Destination byte address.
    pub dst: u64,
    /// Bytes to move.
    pub length: u32,
    /// Crypto enable bit at start time.
    pub crypto: bool,
}

impl Descriptor {
    /// Beats needed on each bus direction.
    #[must_use]
    pub fn beats(&self) -> u64 {
        beats_for_length(u64::from(self.length))
    }

    /// AXI length field for this descriptor, or `None` if it cannot be issued.
    #[must_use]
    pub fn wire_len(&self) -> Option<u8> {
        let beats = self.beats();
        if beats == 0 || beats > MAX_BURST_BEATS {
            return None;
        }
        u8::try_from(beats - 1).ok()
    }

    fn strobe_for_beat(&self, beat_index: u64) -> u32 {
        let consumed = beat_index * BEAT_BYTES;
        strobe_for_bytes(u64::from(self.length).saturating_sub(consumed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    ReadAddress,
    ReadData,
    WriteAddress,
    WriteData,
    WriteResponse,
}

#[derive(Debug, Clone, Copy, Default)]
struct RegisterFile {
    src: u32,
    dst: u32,
    length: u32,
    ctrl: u32,
}

/// Behavioral DMA controller implementing [`DeviceUnderTest`].
#[derive(Debug, Clone, Default)]
pub struct BehavioralDma {
    inputs: DutInputs,
    outputs: DutOutputs,
    prev_clock: bool,
    regs: RegisterFile,
    sticky_status: u32,
    phase: Phase,
    active: Option<Descriptor>,
    pending: Option<Descriptor>,
    fifo: VecDeque<DataBeat>,
    beats_read: u64,
    beats_written: u64,
    completed: u32,
}

impl BehavioralDma {
    /// Creates a model in its post-reset state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transfer currently on the bus.
    #[must_use]
    pub const fn active_transfer(&self) -> Option<&Descriptor> {
        self.active.as_ref()
    }

    /// Transfer started while busy and waiting for the bus.
    #[must_use]
    pub const fn pending_transfer(&self) -> Option<&Descriptor> {
        self.pending.as_ref()
    }

    /// Number of transfers retired since reset.
    #[must_use]
    pub const fn completed_transfers(&self) -> u32 {
        self.completed
    }

    /// Current value of `REG_STATUS`.
    #[must_use]
    pub const fn status(&self) -> u32 {
        let busy = if self.active.is_some() { STATUS_BUSY } else { 0 };
        self.sticky_status | busy
    }

    const fn read_register(&self, addr: u32) -> u32 {
        match addr {
            REG_SRC_ADDR => self.regs.src,
            REG_DST_ADDR => self.regs.dst,
            REG_LENGTH => self.regs.length,
            REG_CTRL => self.regs.ctrl,
            REG_STATUS => self.status(),
            _ => 0,
        }
    }

    fn write_register(&mut self, addr: u32, value: u32) {
        match addr {
            REG_SRC_ADDR => self.regs.src = value,
            REG_DST_ADDR => self.regs.dst = value,
            REG_LENGTH => self.regs.length = value,
            REG_CTRL => {
                self.regs.ctrl = value;
                if value & CTRL_START != 0 {
                    self.pending = Some(Descriptor {
                        src: u64::from(self.regs.src),
                        dst: u64::from(self.regs.dst),
                        length: self.regs.length,
                        crypto: value & CTRL_CRYPTO_EN != 0,
                    });
                }
            }
            _ => {}
        }
    }

    fn apb_access(&mut self) {
        let apb = self.inputs.apb;
        if apb.is_write_access() {
            self.write_register(apb.paddr, apb.pwdata);
        } else if apb.is_read_access() {
            self.outputs.prdata = self.read_register(apb.paddr);
            if apb.paddr == REG_STATUS {
                self.sticky_status &= !(STATUS_DONE | STATUS_CRYPTO);
            }
        }
    }

    fn begin(&mut self, desc: Descriptor) {
        if desc.wire_len().is_none() {
            self.sticky_status = STATUS_DONE | STATUS_ERROR;
            return;
        }
        self.active = Some(desc);
        self.phase = Phase::ReadAddress;
        self.fifo.clear();
        self.beats_read = 0;
        self.beats_written = 0;
    }

    const fn retire(&mut self, desc: Descriptor) {
        self.sticky_status |= STATUS_DONE;
        if desc.crypto {
            self.sticky_status |= STATUS_CRYPTO;
        }
        self.active = None;
        self.phase = Phase::Idle;
        self.completed += 1;
    }

    fn step_transfer(&mut self) {
        let axi_in = self.inputs.axi;
        self.outputs.axi = MasterSignals::default();

        if self.phase == Phase::Idle {
            if let Some(desc) = self.pending.take() {
                self.begin(desc);
            }
        }
        let Some(desc) = self.active else {
            return;
        };
        let Some(wire_len) = desc.wire_len() else {
            return;
        };
        let beats = desc.beats();
        let out = &mut self.outputs.axi;

        match self.phase {
            Phase::Idle => {}
            Phase::ReadAddress => {
                out.arvalid = true;
                out.araddr = desc.src;
                out.arlen = wire_len;
                if axi_in.arready {
                    self.phase = Phase::ReadData;
                }
            }
            Phase::ReadData => {
                out.rready = true;
                if axi_in.rvalid {
                    if axi_in.rresp != RESP_OKAY {
                        self.sticky_status |= STATUS_ERROR;
                    }
                    self.fifo.push_back(axi_in.rdata);
                    self.beats_read += 1;
                    if self.beats_read == beats {
                        self.phase = Phase::WriteAddress;
                    }
                }
            }
            Phase::WriteAddress => {
                out.awvalid = true;
                out.awaddr = desc.dst;
                out.awlen = wire_len;
                if axi_in.awready {
                    self.phase = Phase::WriteData;
                }
            }
            Phase::WriteData => {
                let last = self.beats_written + 1 == beats;
                out.wvalid = true;
                out.wdata = self.fifo.front().copied().unwrap_or_default();
                out.wstrb = desc.strobe_for_beat(self.beats_written);
                out.wlast = last;
                if axi_in.wready {
                    self.fifo.pop_front();
                    self.beats_written += 1;
                    if last {
                        self.phase = Phase::WriteResponse;
                    }
                }
            }
            Phase::WriteResponse => {
                out.bready = true;
                if axi_in.bvalid {
                    if axi_in.bresp != RESP_OKAY {
                        self.sticky_status |= STATUS_ERROR;
                    }
                    self.retire(desc);
                }
            }
        }
    }

    fn on_rising_edge(&mut self) {
        if self.inputs.reset {
            *self = Self {
                inputs: self.inputs,
                prev_clock: self.prev_clock,
                ..Self::default()
            };
            return;
        }
        self.apb_access();
        self.step_transfer();
        self.outputs.busy = self.active.is_some();
        self.outputs.level = u32::try_from(self.fifo.len()).unwrap_or(u32::MAX);
    }
}

impl DeviceUnderTest for BehavioralDma {
    fn inputs(&self) -> &DutInputs {
        &self.inputs
    }

    fn inputs_mut(&mut self) -> &mut DutInputs {
        &mut self.inputs
    }

    fn outputs(&self) -> &DutOutputs {
        &self.outputs
    }

    fn eval(&mut self) {
        let rising = self.inputs.clock && !self.prev_clock;
        self.prev_clock = self.inputs.clock;
        if rising {
            self.on_rising_edge();
        }
    }
}
