//! Binding-time device configuration and control codes

use std::time::Duration;

use crate::reset::DEFAULT_SETTLE;

/// Device node name
pub const DEVICE_NAME: &str = "st54j_se";

/// Platform description compatible string
pub const COMPATIBLE: &str = "st,st54j_se";

/// Driver version reported to clients
pub const DRIVER_VERSION: &str = "1.1.4";

/// Largest SPI transaction the secure element accepts
pub const MAX_BLOCK_SIZE: usize = 258;

/// Bits per SPI word used on the bus
pub const BITS_PER_WORD: u8 = 8;

/// Control code magic for this device
pub const CONTROL_MAGIC: u8 = 0xE5;

/// Raw reset control code, `_IOR(0xE5, 0x01, unsigned int)`
pub const CONTROL_RESET: u32 = ior(CONTROL_MAGIC, 0x01, std::mem::size_of::<u32>());

/// Encode a read-direction control code the way Linux `_IOR` does
const fn ior(magic: u8, nr: u8, size: usize) -> u32 {
    const IOC_READ: u32 = 2;
    (IOC_READ << 30) | ((size as u32) << 16) | ((magic as u32) << 8) | nr as u32
}

/// Out-of-band control requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Pulse the secure element reset line
    Reset,
    /// Code this driver does not handle; accepted and ignored
    Unknown(u32),
}

impl Control {
    /// Decode a raw control code
    pub fn from_raw(code: u32) -> Self {
        match code {
            CONTROL_RESET => Control::Reset,
            other => Control::Unknown(other),
        }
    }

    /// Raw control code
    pub fn raw(self) -> u32 {
        match self {
            Control::Reset => CONTROL_RESET,
            Control::Unknown(code) => code,
        }
    }
}

/// Configuration resolved once when the device is attached
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Device node name
    pub name: String,
    /// Maximum bytes per bus transaction
    pub block_size: usize,
    /// Hold time between the two reset edges
    pub reset_settle: Duration,
    /// Fail attach when the reset line cannot be acquired
    pub require_reset_line: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: DEVICE_NAME.to_string(),
            block_size: MAX_BLOCK_SIZE,
            reset_settle: DEFAULT_SETTLE,
            require_reset_line: true,
        }
    }
}

impl DeviceConfig {
    /// Create a configuration with the default ST54J parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the block size in bytes
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set the reset settle window
    pub fn with_reset_settle(mut self, settle: Duration) -> Self {
        self.reset_settle = settle;
        self
    }

    /// Allow attaching without a reset line
    pub fn with_optional_reset_line(mut self) -> Self {
        self.require_reset_line = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_code_value() {
        // _IOR(0xE5, 0x01, unsigned int) on Linux
        assert_eq!(CONTROL_RESET, 0x8004_E501);
    }

    #[test]
    fn test_control_decode() {
        assert_eq!(Control::from_raw(CONTROL_RESET), Control::Reset);
        assert_eq!(Control::from_raw(0x1234), Control::Unknown(0x1234));
        assert_eq!(Control::Reset.raw(), CONTROL_RESET);
    }

    #[test]
    fn test_default_config() {
        let config = DeviceConfig::default();
        assert_eq!(config.name, "st54j_se");
        assert_eq!(config.block_size, 258);
        assert_eq!(config.reset_settle, Duration::from_millis(5));
        assert!(config.require_reset_line);
    }

    #[test]
    fn test_config_builder() {
        let config = DeviceConfig::new()
            .with_name("st54j_se1")
            .with_block_size(64)
            .with_reset_settle(Duration::from_micros(500))
            .with_optional_reset_line();
        assert_eq!(config.name, "st54j_se1");
        assert_eq!(config.block_size, 64);
        assert_eq!(config.reset_settle, Duration::from_micros(500));
        assert!(!config.require_reset_line);
    }
}
