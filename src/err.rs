/// Mandatory-resource failures. Any of these aborts bank construction.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no phys specified")]
    NoPhys,
    #[error("no registers specified")]
    NoRegisters,
    #[error("no reset controller")]
    NoResetControl,
    #[error("register window too small: {size:#x} bytes, need at least {need:#x}")]
    WindowTooSmall { size: usize, need: usize },
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhyError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error("no such PHY")]
    NotFound,
    #[error("phy{0}: no clock detected")]
    ClockNotDetected(u32),
}

pub type Result<T = ()> = core::result::Result<T, PhyError>;
