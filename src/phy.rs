//! Meson USB2 PHY instance and its bring-up sequence.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;
use tock_registers::interfaces::{ReadWriteable, Readable};

use crate::bank::BankCore;
use crate::consts::{ADP_PHY_ID, FSEL_DEFAULT, POR_SETTLE};
use crate::err::{PhyError, Result};
use crate::osal::GpioOp;
use crate::reg::{ADP_BC, CONFIG, CTRL, PHYREG_ADP_BC, PHYREG_CONFIG, PHYREG_CTRL, PhyWindow};
use crate::NodeRef;

/// Operations the PHY consumer framework drives on a registered PHY.
///
/// Calls on one PHY must be serialized by the caller; different PHYs may be
/// driven concurrently.
pub trait PhyOps {
    fn init(&self) -> Result;
    fn power_on(&self) -> Result;
    fn power_off(&self) -> Result;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhyState {
    Uninitialized,
    Initialized,
    PoweredOn,
    PoweredOff,
}

/// One USB2 transceiver of a [`PhyBank`](crate::PhyBank).
pub struct PhyInstance {
    id: u32,
    node: NodeRef,
    window: PhyWindow,
    /// Per-PHY reset GPIO, only ever present on [`ADP_PHY_ID`].
    aux_reset: Option<Box<dyn GpioOp>>,
    parent: Arc<BankCore>,
    state: Mutex<PhyState>,
    clock_detected: AtomicBool,
}

impl PhyInstance {
    pub(crate) fn new(
        id: u32,
        node: NodeRef,
        window: PhyWindow,
        aux_reset: Option<Box<dyn GpioOp>>,
        parent: Arc<BankCore>,
    ) -> Self {
        if let Some(gpio) = &aux_reset {
            gpio.set_value(false);
        }

        Self {
            id,
            node,
            window,
            aux_reset,
            parent,
            state: Mutex::new(PhyState::Uninitialized),
            clock_detected: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn node(&self) -> NodeRef {
        self.node
    }

    pub fn state(&self) -> PhyState {
        *self.state.lock()
    }

    /// Whether the last `init` saw CTRL.CLK_DETECTED set.
    pub fn clock_detected(&self) -> bool {
        self.clock_detected.load(Ordering::Acquire)
    }

    pub fn has_aux_reset(&self) -> bool {
        self.aux_reset.is_some()
    }

    pub fn window(&self) -> &PhyWindow {
        &self.window
    }

    /// Hold time after a POR edge. The write must land before the wait starts.
    fn por_settle(&self) {
        mbarrier::wmb();
        self.parent.kernel.delay(POR_SETTLE);
    }

    // No power gating distinct from init on current silicon.
    fn set_power(&self, on: bool) -> Result {
        *self.state.lock() = if on {
            PhyState::PoweredOn
        } else {
            PhyState::PoweredOff
        };
        Ok(())
    }

    pub fn dump_registers(&self) {
        info!("=== phy{} registers @{:#x} ===", self.id, self.window.base());

        let config = self.window.read32(PHYREG_CONFIG);
        info!("CONFIG (0x00) = 0x{:08x}", config);
        info!("  CLK_32KALT (bit 15)     = {}", (config >> 15) & 0x1);
        info!("  POWEROFF (bits 13:12)   = {}", (config >> 12) & 0x3);
        info!("  CLK_EN (bit 0)          = {}", config & 0x1);

        let ctrl = self.window.read32(PHYREG_CTRL);
        info!("CTRL (0x04) = 0x{:08x}", ctrl);
        info!("  FSEL (bits 24:22)       = {}", (ctrl >> 22) & 0x7);
        info!("  POR (bit 15)            = {}", (ctrl >> 15) & 0x1);
        info!("  CLK_DETECTED (bit 8)    = {}", (ctrl >> 8) & 0x1);

        let adp_bc = self.window.read32(PHYREG_ADP_BC);
        info!("ADP_BC (0x0c) = 0x{:08x}", adp_bc);
        info!("  ADP_ENABLE (bit 16)     = {}", (adp_bc >> 16) & 0x1);
    }
}

impl PhyOps for PhyInstance {
    /// Bring the transceiver out of power-off and pulse its POR.
    ///
    /// Every write is absolute, so running this again on an initialized PHY
    /// lands on the same register state. A missing clock-detect is only
    /// warned about unless `strict-clock-detect` is enabled.
    fn init(&self) -> Result {
        let regs = self.window.regs();
        info!("phy{}: initialising phy", self.id);

        self.parent.clock_gate.enable(&*self.parent.kernel);

        // CLK_SEL/CLK_DIV keep their reset values.
        regs.config
            .modify(CONFIG::CLK_32KALT::SET + CONFIG::POWEROFF::CLEAR);
        debug!("phy{}: config={:08x}", self.id, regs.config.get());

        regs.ctrl.modify(CTRL::FSEL.val(FSEL_DEFAULT) + CTRL::POR::SET);
        self.por_settle();
        regs.ctrl.modify(CTRL::POR::CLEAR);
        self.por_settle();
        debug!("phy{}: ctrl={:08x}", self.id, regs.ctrl.get());

        if self.id == ADP_PHY_ID {
            regs.adp_bc.modify(ADP_BC::ADP_ENABLE::SET);
            debug!("phy{}: adp_bc={:08x}", self.id, regs.adp_bc.get());
        }

        let detected = regs.ctrl.is_set(CTRL::CLK_DETECTED);
        self.clock_detected.store(detected, Ordering::Release);
        if !detected {
            warn!("phy{}: no clock detected", self.id);
            if cfg!(feature = "strict-clock-detect") {
                return Err(PhyError::ClockNotDetected(self.id));
            }
        }

        *self.state.lock() = PhyState::Initialized;
        Ok(())
    }

    fn power_on(&self) -> Result {
        info!("phy{}: power-on", self.id);
        if self.state() == PhyState::Uninitialized {
            warn!("phy{}: power-on before init", self.id);
        }
        self.set_power(true)
    }

    fn power_off(&self) -> Result {
        info!("phy{}: power-off", self.id);
        self.set_power(false)
    }
}
