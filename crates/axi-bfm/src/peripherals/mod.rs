/// Behavioral DMA controller used when no RTL model is available.
pub mod dma;

pub use dma::{BehavioralDma, Descriptor};
