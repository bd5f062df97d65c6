use super::{DataBeat, RESP_OKAY};

/// AXI signals driven by the bus master (the DMA controller) and observed by
/// the slave emulator after each clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct MasterSignals {
    /// Read address valid.
    pub arvalid: bool,
    /// Read burst start address.
    pub araddr: u64,
    /// Read burst length, encoded as beats minus one.
    pub arlen: u8,
    /// Read data ready.
    pub rready: bool,
    /// Write address valid.
    pub awvalid: bool,
    /// Write burst start address.
    pub awaddr: u64,
    /// Write burst length, encoded as beats minus one.
    pub awlen: u8,
    /// Write data valid.
    pub wvalid: bool,
    /// Write data payload.
    pub wdata: DataBeat,
    /// Write byte strobes, one bit per byte lane.
    pub wstrb: u32,
    /// Final beat marker of the write burst.
    pub wlast: bool,
    /// Write response ready.
    pub bready: bool,
}

/// AXI signals driven by the slave emulator into the bus master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct SlaveSignals {
    /// Read address ready.
    pub arready: bool,
    /// Read data valid.
    pub rvalid: bool,
    /// Read data payload.
    pub rdata: DataBeat,
    /// Read response code.
    pub rresp: u8,
    /// Final beat marker of the read burst.
    pub rlast: bool,
    /// Write address ready.
    pub awready: bool,
    /// Write data ready.
    pub wready: bool,
    /// Write response valid.
    pub bvalid: bool,
    /// Write response code.
    pub bresp: u8,
}

impl SlaveSignals {
    /// Drive applied while reset is asserted: every handshake line low.
    pub const IDLE: Self = Self {
        arready: false,
        rvalid: false,
        rdata: DataBeat::ZERO,
        rresp: RESP_OKAY,
        rlast: false,
        awready: false,
        wready: false,
        bvalid: false,
        bresp: RESP_OKAY,
    };
}

impl Default for SlaveSignals {
    fn default() -> Self {
        Self::IDLE
    }
}

/// Single-beat APB request lines driven by the register configuration driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ApbRequest {
    /// Register address.
    pub paddr: u32,
    /// Write data.
    pub pwdata: u32,
    /// Byte strobes.
    pub pstrb: u8,
    /// Protection bits.
    pub pprot: u8,
    /// Peripheral select.
    pub psel: bool,
    /// Access phase enable.
    pub penable: bool,
    /// Write (`true`) or read (`false`) access.
    pub pwrite: bool,
}

impl ApbRequest {
    /// Returns `true` during the access phase of a write.
    #[must_use]
    pub const fn is_write_access(&self) -> bool {
        self.psel && self.penable && self.pwrite
    }

    /// Returns `true` during the access phase of a read.
    #[must_use]
    pub const fn is_read_access(&self) -> bool {
        self.psel && self.penable && !self.pwrite
    }
}
