//! Verilator model of the `DmaSM4SGTop` controller, exposed through the
//! testbench's [`DeviceUnderTest`] interface.
//!
//! Without the `verilator` feature every model operation panics with
//! "Built without verilator support".

mod bindings;

use std::ffi::CString;
use std::ptr::null;

use axi_bfm::{
    ApbRequest, DataBeat, DeviceUnderTest, DutInputs, DutOutputs, MasterSignals, TraceError,
};

pub use bindings::dma_verilated_sig_in as SigIn;
pub use bindings::dma_verilated_sig_out as SigOut;

/// Environment variable naming a VCD file to dump to from construction.
pub const TRACE_PATH_ENV: &str = "DMA_TRACE_PATH";

/// Module depth used when tracing through [`DeviceUnderTest::start_tracing`].
pub const DEFAULT_TRACE_DEPTH: i32 = 5;

/// Packs testbench inputs into the C port struct.
#[must_use]
pub fn drive(inputs: &DutInputs) -> SigIn {
    let ApbRequest {
        paddr,
        pwdata,
        pstrb,
        pprot,
        psel,
        penable,
        pwrite,
    } = inputs.apb;
    let axi = inputs.axi;
    SigIn {
        clock: inputs.clock,
        reset: inputs.reset,
        apb_paddr: paddr,
        apb_pprot: pprot,
        apb_psel: psel,
        apb_penable: penable,
        apb_pwrite: pwrite,
        apb_pwdata: pwdata,
        apb_pstrb: pstrb,
        axi_arready: axi.arready,
        axi_rdata: *axi.rdata.words(),
        axi_rresp: axi.rresp,
        axi_rlast: axi.rlast,
        axi_rvalid: axi.rvalid,
        axi_awready: axi.awready,
        axi_wready: axi.wready,
        axi_bresp: axi.bresp,
        axi_bvalid: axi.bvalid,
    }
}

/// Unpacks the C port struct into testbench outputs.
#[must_use]
pub fn observe(out: &SigOut) -> DutOutputs {
    DutOutputs {
        prdata: out.apb_prdata,
        axi: MasterSignals {
            arvalid: out.axi_arvalid,
            araddr: out.axi_araddr,
            arlen: out.axi_arlen,
            rready: out.axi_rready,
            awvalid: out.axi_awvalid,
            awaddr: out.axi_awaddr,
            awlen: out.axi_awlen,
            wvalid: out.axi_wvalid,
            wdata: DataBeat::new(out.axi_wdata),
            wstrb: out.axi_wstrb,
            wlast: out.axi_wlast,
            bready: out.axi_bready,
        },
        busy: out.busy,
        level: out.level,
    }
}

/// Handle to a Verilator-compiled `DmaSM4SGTop` instance.
pub struct DmaVerilated {
    v: *mut bindings::dma_verilated,
    inputs: DutInputs,
    outputs: DutOutputs,
    output: SigOut,
}

impl DmaVerilated {
    /// Constructs a new model with all inputs low.
    #[must_use]
    pub fn new() -> Self {
        unsafe {
            Self {
                v: bindings::dma_verilated_new(),
                inputs: DutInputs::default(),
                outputs: DutOutputs::default(),
                output: SigOut::default(),
            }
        }
    }

    /// Constructs a model and starts tracing to `$DMA_TRACE_PATH` if set.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::InvalidPath`] if the path contains a NUL byte.
    pub fn from_env() -> Result<Self, TraceError> {
        let mut model = Self::new();
        if let Some(path) = std::env::var_os(TRACE_PATH_ENV) {
            let path = path.to_string_lossy().into_owned();
            model.start_tracing_with_depth(&path, DEFAULT_TRACE_DEPTH)?;
        }
        Ok(model)
    }

    /// Starts tracing to VCD file `path`, with SystemVerilog module depth
    /// `depth`. If tracing was previously started to another file, that file
    /// will be closed and all new traces will be written to this file.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::InvalidPath`] if `path` contains a NUL byte.
    pub fn start_tracing_with_depth(&mut self, path: &str, depth: i32) -> Result<(), TraceError> {
        let c_path = CString::new(path).map_err(|_| TraceError::InvalidPath(path.to_owned()))?;
        unsafe {
            bindings::dma_verilated_trace(self.v, c_path.as_ptr(), depth);
        }
        Ok(())
    }
}

impl Default for DmaVerilated {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DmaVerilated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DmaVerilated")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

impl DeviceUnderTest for DmaVerilated {
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
        let input = drive(&self.inputs);
        unsafe { bindings::dma_verilated_eval(self.v, &input, &mut self.output) }
        self.outputs = observe(&self.output);
    }

    fn start_tracing(&mut self, path: &str) -> Result<(), TraceError> {
        self.start_tracing_with_depth(path, DEFAULT_TRACE_DEPTH)
    }

    fn stop_tracing(&mut self) {
        unsafe {
            bindings::dma_verilated_trace(self.v, null(), 0);
        }
    }
}

impl Drop for DmaVerilated {
    fn drop(&mut self) {
        unsafe { bindings::dma_verilated_destroy(self.v) }
    }
}
