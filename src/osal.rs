//! Services the hosting OS and platform provide to the driver.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::time::Duration;

use crate::Mmio;

pub trait Kernel: Send + Sync + 'static {
    /// Block the calling thread for at least `duration`.
    fn delay(&self, duration: Duration);

    /// Map `size` bytes of physical address space at `paddr`.
    fn iomap(&self, paddr: usize, size: usize) -> Option<Mmio>;
}

/// Shared reset control of the PHY block.
pub trait ResetOp: Send + Sync + 'static {
    fn reset_assert(&self);
    fn reset_deassert(&self);

    /// Pulse the reset line. Timing is up to the controller.
    fn reset(&self) {
        self.reset_assert();
        self.reset_deassert();
    }
}

/// Shared gate clock of the PHY block.
pub trait ClockOp: Send + Sync + 'static {
    fn enable(&self);
    fn disable(&self);
}

pub trait GpioOp: Send + Sync + 'static {
    fn set_value(&self, high: bool);
}

/// Resource lookup for one PHY block, backed by the platform bus.
///
/// Each method is called at most once per bank construction.
pub trait Platform {
    /// Mapped register window and its length in bytes.
    fn map_registers(&mut self) -> Option<(Mmio, usize)>;

    fn reset_control(&mut self) -> Option<Arc<dyn ResetOp>>;

    fn clock(&mut self) -> Option<Arc<dyn ClockOp>>;

    /// Optional named GPIO, configured as an output.
    fn gpio(&mut self, name: &str) -> Option<Box<dyn GpioOp>>;
}
