#[allow(dead_code)]
mod real;

pub use real::{dma_verilated, dma_verilated_sig_in, dma_verilated_sig_out};

#[cfg(not(feature = "verilator"))]
mod disabled {
    use super::{dma_verilated, dma_verilated_sig_in, dma_verilated_sig_out};

    const MSG: &str = "Built without verilator support; use --features=verilator to enable";

    pub unsafe fn dma_verilated_new() -> *mut dma_verilated {
        panic!("{}", MSG);
    }
    pub unsafe fn dma_verilated_destroy(_model: *mut dma_verilated) {
        panic!("{}", MSG);
    }
    pub unsafe fn dma_verilated_trace(
        _model: *mut dma_verilated,
        _vcd_out_path: *const ::std::os::raw::c_char,
        _depth: ::std::os::raw::c_int,
    ) {
        panic!("{}", MSG);
    }
    pub unsafe fn dma_verilated_eval(
        _model: *mut dma_verilated,
        _in_: *const dma_verilated_sig_in,
        _out: *mut dma_verilated_sig_out,
    ) {
        panic!("{}", MSG);
    }
}

#[cfg(feature = "verilator")]
pub use real::{dma_verilated_destroy, dma_verilated_eval, dma_verilated_new, dma_verilated_trace};

#[cfg(not(feature = "verilator"))]
pub use disabled::{
    dma_verilated_destroy, dma_verilated_eval, dma_verilated_new, dma_verilated_trace,
};
