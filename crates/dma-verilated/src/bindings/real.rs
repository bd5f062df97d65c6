// Mirrors the structs declared in dma_verilated.h. Field order and widths
// must match the C side exactly.

#![allow(non_camel_case_types)]

/// Opaque handle to the C++ model.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct dma_verilated {
    _unused: [u8; 0],
}

/// Input ports of `DmaSM4SGTop`.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct dma_verilated_sig_in {
    /// `clock`
    pub clock: bool,
    /// `reset`
    pub reset: bool,

    /// `io_apb_PADDR`
    pub apb_paddr: u32,
    /// `io_apb_PPROT`
    pub apb_pprot: u8,
    /// `io_apb_PSEL`
    pub apb_psel: bool,
    /// `io_apb_PENABLE`
    pub apb_penable: bool,
    /// `io_apb_PWRITE`
    pub apb_pwrite: bool,
    /// `io_apb_PWDATA`
    pub apb_pwdata: u32,
    /// `io_apb_PSTRB`
    pub apb_pstrb: u8,

    /// `io_axi_arready`
    pub axi_arready: bool,
    /// `io_axi_rdata`, least significant word first.
    pub axi_rdata: [u32; 8usize],
    /// `io_axi_rresp`
    pub axi_rresp: u8,
    /// `io_axi_rlast`
    pub axi_rlast: bool,
    /// `io_axi_rvalid`
    pub axi_rvalid: bool,
    /// `io_axi_awready`
    pub axi_awready: bool,
    /// `io_axi_wready`
    pub axi_wready: bool,
    /// `io_axi_bresp`
    pub axi_bresp: u8,
    /// `io_axi_bvalid`
    pub axi_bvalid: bool,
}

/// Output ports of `DmaSM4SGTop`.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct dma_verilated_sig_out {
    /// `io_apb_PRDATA`
    pub apb_prdata: u32,

    /// `io_axi_arvalid`
    pub axi_arvalid: bool,
    /// `io_axi_araddr`
    pub axi_araddr: u64,
    /// `io_axi_arlen`
    pub axi_arlen: u8,
    /// `io_axi_rready`
    pub axi_rready: bool,
    /// `io_axi_awvalid`
    pub axi_awvalid: bool,
    /// `io_axi_awaddr`
    pub axi_awaddr: u64,
    /// `io_axi_awlen`
    pub axi_awlen: u8,
    /// `io_axi_wvalid`
    pub axi_wvalid: bool,
    /// `io_axi_wdata`, least significant word first.
    pub axi_wdata: [u32; 8usize],
    /// `io_axi_wstrb`
    pub axi_wstrb: u32,
    /// `io_axi_wlast`
    pub axi_wlast: bool,
    /// `io_axi_bready`
    pub axi_bready: bool,

    /// `io_busy`
    pub busy: bool,
    /// `io_level`
    pub level: u32,
}

extern "C" {
    pub fn dma_verilated_new() -> *mut dma_verilated;
}
extern "C" {
    pub fn dma_verilated_destroy(model: *mut dma_verilated);
}
extern "C" {
    pub fn dma_verilated_trace(
        model: *mut dma_verilated,
        vcd_out_path: *const ::std::os::raw::c_char,
        depth: ::std::os::raw::c_int,
    );
}
extern "C" {
    pub fn dma_verilated_eval(
        model: *mut dma_verilated,
        in_: *const dma_verilated_sig_in,
        out: *mut dma_verilated_sig_out,
    );
}
