//! Meson USB2 PHY register window
//!
//! ```text
//! Offset 0x00: CONFIG  CLK_EN [0], CLK_SEL [3:1], CLK_DIV [10:4],
//!                      POWEROFF [13:12], CLK_32KALT [15]
//! Offset 0x04: CTRL    CLK_DETECTED [8] (RO), POR [15], FSEL [24:22]
//! Offset 0x0c: ADP_BC  ADP_ENABLE [16]
//! ```
//!
//! PHY `n` starts at `n * WINDOW_SIZE` inside the block mapping.

use core::ptr::NonNull;

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

use crate::consts::WINDOW_SIZE;

pub const PHYREG_CONFIG: usize = 0x00;
pub const PHYREG_CTRL: usize = 0x04;
pub const PHYREG_ADP_BC: usize = 0x0c;

register_bitfields![u32,
    pub CONFIG [
        CLK_32KALT OFFSET(15) NUMBITS(1) [],
        POWEROFF OFFSET(12) NUMBITS(2) [],
        CLK_DIV OFFSET(4) NUMBITS(7) [],
        CLK_SEL OFFSET(1) NUMBITS(3) [],
        CLK_EN OFFSET(0) NUMBITS(1) [],
    ],
    pub CTRL [
        FSEL OFFSET(22) NUMBITS(3) [],
        POR OFFSET(15) NUMBITS(1) [],
        CLK_DETECTED OFFSET(8) NUMBITS(1) [],
    ],
    pub ADP_BC [
        ADP_ENABLE OFFSET(16) NUMBITS(1) [],
    ]
];

register_structs! {
    /// Registers of one PHY.
    pub PhyRegs {
        (0x00 => pub config: ReadWrite<u32, CONFIG::Register>),
        (0x04 => pub ctrl: ReadWrite<u32, CTRL::Register>),
        (0x08 => _reserved0),
        (0x0c => pub adp_bc: ReadWrite<u32, ADP_BC::Register>),
        (0x10 => _reserved1),
        (0x20 => @END),
    }
}

/// One PHY's slice of the block mapping.
///
/// Accesses go straight to the hardware; nothing is cached.
pub struct PhyWindow {
    base: NonNull<PhyRegs>,
}

// The window is plain MMIO; callers serialize per-PHY access.
unsafe impl Send for PhyWindow {}
unsafe impl Sync for PhyWindow {}

impl PhyWindow {
    /// # Safety
    ///
    /// `base` must point at `WINDOW_SIZE` bytes of mapped PHY registers that
    /// stay mapped for the lifetime of the window.
    pub unsafe fn new(base: NonNull<u8>) -> Self {
        Self { base: base.cast() }
    }

    pub fn regs(&self) -> &PhyRegs {
        unsafe { self.base.as_ref() }
    }

    pub fn base(&self) -> usize {
        self.base.as_ptr() as usize
    }

    pub fn read32(&self, offset: usize) -> u32 {
        let addr = self.addr(offset) as *const u32;
        unsafe { addr.read_volatile() }
    }

    pub fn write32(&self, offset: usize, value: u32) {
        let addr = self.addr(offset) as *mut u32;
        unsafe { addr.write_volatile(value) }
    }

    fn addr(&self, offset: usize) -> usize {
        assert!(
            offset % 4 == 0 && offset < WINDOW_SIZE,
            "PHY register offset {offset:#x} outside window"
        );
        self.base() + offset
    }
}
