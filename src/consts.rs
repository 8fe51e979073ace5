use core::time::Duration;

/// Device-tree compatible string of the PHY block.
pub const COMPATIBLE: &str = "amlogic,meson-usb-phy";

pub const DRIVER_NAME: &str = "amlogic-usbphy";

/// Bytes of register space allotted to each PHY.
pub const WINDOW_SIZE: usize = 0x20;

/// Highest number of PHYs the block is known to carry.
pub const MAX_PHYS: u32 = 2;

/// Reference clock divider selection written during init.
pub const FSEL_DEFAULT: u32 = 5;

/// Hold time on each edge of the POR pulse.
pub const POR_SETTLE: Duration = Duration::from_millis(1);

/// The only PHY carrying the accessory-detect circuit and the aux reset line.
pub const ADP_PHY_ID: u32 = 1;

/// Name of the optional per-PHY reset GPIO of [`ADP_PHY_ID`].
pub const AUX_RESET_GPIO: &str = "reset1";

/// CBUS clock-gate register pair outside the PHY window.
pub const CBUS_GATE_PADDR: usize = 0xc110_4144;
pub const CBUS_GATE_SIZE: usize = 8;
