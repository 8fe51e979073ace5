//! PHY bank: the shared clock/reset owner and consumer-facing resolver.
//!
//! The block carries more than one PHY but a single clock and reset control,
//! so one bank owns both and every [`PhyInstance`] only back-references them.

use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::cbus::{CBUS_CLOCK_GATE, CbusClockGate};
use crate::consts::{ADP_PHY_ID, AUX_RESET_GPIO, MAX_PHYS, WINDOW_SIZE};
use crate::err::{ConfigError, PhyError, Result};
use crate::osal::{ClockOp, Kernel, Platform, ResetOp};
use crate::phy::PhyInstance;
use crate::reg::PhyWindow;
use crate::{Mmio, NodeRef};

/// One child entry of the PHY block configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhyEntry {
    pub node: NodeRef,
    /// prop `reg`, `None` when it could not be read
    pub reg: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingReg,
    OutOfRange(u32),
    Duplicate(u32),
}

/// A configuration entry that did not produce a PHY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedEntry {
    pub node: NodeRef,
    pub reason: SkipReason,
}

/// Who keeps the shared gate clock running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    /// The bank holds the clock and enabled it.
    Managed,
    /// No clock was supplied; gating is left to firmware and the CBUS gate.
    External,
}

pub struct PhyBankParam {
    pub kernel: Arc<dyn Kernel>,
    pub clock_gate: &'static CbusClockGate,
}

impl PhyBankParam {
    pub fn new(kernel: Arc<dyn Kernel>) -> Self {
        Self {
            kernel,
            clock_gate: &CBUS_CLOCK_GATE,
        }
    }

    pub fn with_clock_gate(mut self, gate: &'static CbusClockGate) -> Self {
        self.clock_gate = gate;
        self
    }
}

/// Resources shared by every PHY of a bank.
pub(crate) struct BankCore {
    pub(crate) kernel: Arc<dyn Kernel>,
    pub(crate) clock_gate: &'static CbusClockGate,
    pub(crate) reset: Arc<dyn ResetOp>,
    pub(crate) clock: Option<Arc<dyn ClockOp>>,
}

impl Drop for BankCore {
    fn drop(&mut self) {
        if let Some(clock) = &self.clock {
            clock.disable();
        }
    }
}

pub struct PhyBank {
    base: Mmio,
    size: usize,
    core: Arc<BankCore>,
    phys: BTreeMap<u32, PhyInstance>,
    skipped: Vec<SkippedEntry>,
}

// `base` is only kept for diagnostics; register access goes through the
// per-PHY windows.
unsafe impl Send for PhyBank {}
unsafe impl Sync for PhyBank {}

impl PhyBank {
    /// Acquire the block resources and attach one PHY per usable entry.
    ///
    /// Missing registers or reset control, or an empty entry list, abort the
    /// probe. A missing clock or aux reset GPIO does not. Entries without a
    /// usable `reg` are skipped and listed in [`PhyBank::skipped`].
    pub fn new(
        platform: &mut impl Platform,
        entries: &[PhyEntry],
        param: PhyBankParam,
    ) -> Result<Self> {
        if entries.is_empty() {
            error!("no phys specified");
            return Err(ConfigError::NoPhys.into());
        }
        info!("{} phys", entries.len());

        let (base, size) = platform.map_registers().ok_or_else(|| {
            error!("no registers specified");
            ConfigError::NoRegisters
        })?;
        if size < WINDOW_SIZE {
            error!("register window too small: {size:#x}");
            return Err(ConfigError::WindowTooSmall {
                size,
                need: WINDOW_SIZE,
            }
            .into());
        }

        let reset = platform.reset_control().ok_or_else(|| {
            warn!("no reset controller");
            ConfigError::NoResetControl
        })?;

        let clock = platform.clock();
        match &clock {
            Some(clock) => clock.enable(),
            None => warn!("no main clock supplied"),
        }

        let core = Arc::new(BankCore {
            kernel: param.kernel,
            clock_gate: param.clock_gate,
            reset,
            clock,
        });
        core.reset.reset();

        let mut phys = BTreeMap::new();
        let mut skipped = Vec::new();

        for entry in entries {
            let id = match check_entry(entry, size, &phys) {
                Ok(id) => id,
                Err(reason) => {
                    error!("cannot attach phy node {:?}: {:?}", entry.node, reason);
                    skipped.push(SkippedEntry {
                        node: entry.node,
                        reason,
                    });
                    continue;
                }
            };

            info!("attaching phy {id}");

            let aux_reset = if id == ADP_PHY_ID {
                let gpio = platform.gpio(AUX_RESET_GPIO);
                if gpio.is_none() {
                    debug!("phy{id}: no {AUX_RESET_GPIO} gpio");
                }
                gpio
            } else {
                None
            };

            // check_entry keeps the window inside the mapping
            let window = unsafe { PhyWindow::new(base.add(id as usize * WINDOW_SIZE)) };
            phys.insert(
                id,
                PhyInstance::new(id, entry.node, window, aux_reset, core.clone()),
            );
        }

        info!("added phys");

        Ok(Self {
            base,
            size,
            core,
            phys,
            skipped,
        })
    }

    /// Map a consumer's node reference to the PHY created from it.
    pub fn resolve(&self, node: NodeRef) -> Result<&PhyInstance> {
        for (i, phy) in self.phys.values().enumerate() {
            trace!("match {i}: {:?}, {:?}", phy.node(), node);
            if phy.node() == node {
                return Ok(phy);
            }
        }
        Err(PhyError::NotFound)
    }

    pub fn get(&self, id: u32) -> Option<&PhyInstance> {
        self.phys.get(&id)
    }

    /// PHYs in ascending id order.
    pub fn instances(&self) -> impl Iterator<Item = &PhyInstance> {
        self.phys.values()
    }

    pub fn len(&self) -> usize {
        self.phys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phys.is_empty()
    }

    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    pub fn clock_mode(&self) -> ClockMode {
        if self.core.clock.is_some() {
            ClockMode::Managed
        } else {
            ClockMode::External
        }
    }

    pub fn base(&self) -> usize {
        self.base.as_ptr() as usize
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

fn check_entry(
    entry: &PhyEntry,
    size: usize,
    phys: &BTreeMap<u32, PhyInstance>,
) -> core::result::Result<u32, SkipReason> {
    let id = entry.reg.ok_or(SkipReason::MissingReg)?;
    if id >= MAX_PHYS || (id as usize + 1) * WINDOW_SIZE > size {
        return Err(SkipReason::OutOfRange(id));
    }
    if phys.contains_key(&id) {
        return Err(SkipReason::Duplicate(id));
    }
    Ok(id)
}
