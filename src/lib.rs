//! Amlogic Meson USB2.0 PHY bank driver.
//!
//! The PHY block contains more than one transceiver, but they share a single
//! clock and reset control. [`PhyBank`] owns those shared resources and the
//! per-transceiver [`PhyInstance`]s, and resolves consumer lookups to them.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
extern crate log;

pub mod bank;
pub mod cbus;
pub mod consts;
pub mod err;
pub mod osal;
pub mod phy;
pub mod reg;

#[cfg(test)]
mod mock;

use core::ptr::NonNull;

pub use bank::{ClockMode, PhyBank, PhyBankParam, PhyEntry, SkipReason, SkippedEntry};
pub use cbus::{CBUS_CLOCK_GATE, CbusClockGate};
pub use err::{ConfigError, PhyError, Result};
pub use osal::{ClockOp, GpioOp, Kernel, Platform, ResetOp};
pub use phy::{PhyInstance, PhyOps, PhyState};

/// Mapped MMIO region.
pub type Mmio = NonNull<u8>;

/// Opaque identity of the configuration node a PHY was created from.
///
/// Consumers look PHYs up by this token, never by numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(usize);

impl NodeRef {
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> usize {
        self.0
    }
}
