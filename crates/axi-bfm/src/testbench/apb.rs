//! Two-cycle APB register accesses driven through the testbench clock.
//!
//! A transfer spends one full cycle in the setup phase (`psel` high,
//! `penable` low) and one in the access phase (`penable` high). The bus is
//! released afterwards. The AXI slave keeps being serviced on both cycles.

use crate::api::TraceSink;
use crate::bus::{ApbRequest, APB_STROBE_ALL};
use crate::dut::DeviceUnderTest;

use super::{SimError, Testbench};

impl<D: DeviceUnderTest, S: TraceSink> Testbench<D, S> {
    /// Writes `value` to the register at `addr`.
    ///
    /// # Errors
    ///
    /// Propagates [`SimError`] from either bus cycle.
    pub fn write_register(&mut self, addr: u32, value: u32) -> Result<(), SimError> {
        self.apb_transfer(ApbRequest {
            paddr: addr,
            pwdata: value,
            pstrb: APB_STROBE_ALL,
            pwrite: true,
            ..ApbRequest::default()
        })
        .map(|_| ())
    }

    /// Reads the register at `addr`, returning `prdata` after the access
    /// edge.
    ///
    /// # Errors
    ///
    /// Propagates [`SimError`] from either bus cycle.
    pub fn read_register(&mut self, addr: u32) -> Result<u32, SimError> {
        self.apb_transfer(ApbRequest {
            paddr: addr,
            ..ApbRequest::default()
        })
    }

    fn apb_transfer(&mut self, request: ApbRequest) -> Result<u32, SimError> {
        self.dut_mut().inputs_mut().apb = ApbRequest {
            psel: true,
            penable: false,
            ..request
        };
        let result = self.apb_phases();
        self.dut_mut().inputs_mut().apb = ApbRequest::default();
        result
    }

    fn apb_phases(&mut self) -> Result<u32, SimError> {
        self.cycle()?;
        self.dut_mut().inputs_mut().apb.penable = true;
        self.cycle()?;
        Ok(self.dut().outputs().prdata)
    }
}
