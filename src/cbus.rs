//! CBUS clock gates for the USB block.
//!
//! The PHYs stay unclocked unless the USB clock and bridge gates in the CBUS
//! clock controller are open, whatever the PHY registers say. Those gates sit
//! outside the PHY block mapping, so they get their own process-wide mapping.
//!
//! ```text
//! 0xc1104144 GATE0: USB0_CLK [21], USB1_CLK [22], USB_GENERAL [26]
//! 0xc1104148 GATE1: USB1_BRIDGE [8], USB0_BRIDGE [9]
//! ```

use core::ptr::NonNull;

use spin::Once;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::register_structs;
use tock_registers::registers::ReadWrite;

use crate::consts::{CBUS_GATE_PADDR, CBUS_GATE_SIZE};
use crate::osal::Kernel;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CbusGate0: u32 {
        const USB0_CLK = 1 << 21;
        const USB1_CLK = 1 << 22;
        const USB_GENERAL = 1 << 26;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CbusGate1: u32 {
        const USB1_BRIDGE = 1 << 8;
        const USB0_BRIDGE = 1 << 9;
    }
}

register_structs! {
    pub CbusGateRegs {
        (0x00 => pub gate0: ReadWrite<u32>),
        (0x04 => pub gate1: ReadWrite<u32>),
        (0x08 => @END),
    }
}

struct GateMapping(NonNull<CbusGateRegs>);

unsafe impl Send for GateMapping {}
unsafe impl Sync for GateMapping {}

/// Lazily mapped handle to the CBUS gate registers.
///
/// A failed mapping is remembered; later calls do not retry it.
pub struct CbusClockGate {
    regs: Once<Option<GateMapping>>,
}

/// The gate every bank uses unless told otherwise.
pub static CBUS_CLOCK_GATE: CbusClockGate = CbusClockGate::new();

impl CbusClockGate {
    pub const fn new() -> Self {
        Self { regs: Once::new() }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.regs.get(), Some(Some(_)))
    }

    /// Open all USB clock and bridge gates.
    ///
    /// Only ever ORs bits in, so concurrent callers cannot undo each other.
    pub fn enable(&self, kernel: &dyn Kernel) {
        let mapping = self.regs.call_once(|| {
            kernel
                .iomap(CBUS_GATE_PADDR, CBUS_GATE_SIZE)
                .map(|base| GateMapping(base.cast()))
        });

        let Some(mapping) = mapping else {
            warn!("CBUS gate @{CBUS_GATE_PADDR:#x}: not mapped, USB clocks left as-is");
            return;
        };
        let regs = unsafe { mapping.0.as_ref() };

        debug!(
            "CBUS gate: regs {:08x}, {:08x} (before)",
            regs.gate0.get(),
            regs.gate1.get()
        );

        regs.gate0.set(regs.gate0.get() | CbusGate0::all().bits());
        regs.gate1.set(regs.gate1.get() | CbusGate1::all().bits());

        debug!(
            "CBUS gate: regs {:08x}, {:08x} (after)",
            regs.gate0.get(),
            regs.gate1.get()
        );
    }
}

impl Default for CbusClockGate {
    fn default() -> Self {
        Self::new()
    }
}
