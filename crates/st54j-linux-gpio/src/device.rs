//! Linux GPIO reset line implementation
//!
//! This module provides the `LinuxGpioReset` struct that implements the
//! `ResetLine` trait using Linux's GPIO character device interface
//! (gpiocdev). The line is requested as an output already driven to its
//! active level, so attaching never glitches the secure element into reset.

use crate::error::{LinuxGpioError, Result};

use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};

use st54j_core::{LineError, ResetLine};

/// Consumer label shown by `gpioinfo`
const CONSUMER: &str = "esereset";

/// Configuration for requesting the reset line
#[derive(Debug, Clone, Default)]
pub struct LinuxGpioResetConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// Reset line offset on the chip
    pub line: Offset,
    /// Physical level is low when the line is logically active
    pub active_low: bool,
}

impl LinuxGpioResetConfig {
    /// Create a new configuration for the given chip and line
    pub fn new(device: impl Into<String>, line: Offset) -> Self {
        Self {
            device: device.into(),
            line,
            ..Default::default()
        }
    }

    /// Invert the line polarity
    pub fn with_active_low(mut self, active_low: bool) -> Self {
        self.active_low = active_low;
        self
    }
}

/// Secure element reset line on a Linux GPIO chip
pub struct LinuxGpioReset {
    /// GPIO line request handle
    request: Request,
    /// Requested line offset
    line: Offset,
}

impl LinuxGpioReset {
    /// Request the reset line, driven active
    pub fn open(config: &LinuxGpioResetConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxGpioError::NoDevice);
        }

        log::debug!(
            "linux_gpio: Requesting line {} on {}",
            config.line,
            config.device
        );

        let mut req_config = Config::default();
        req_config.with_line(config.line).as_output(Value::Active);
        if config.active_low {
            req_config.as_active_low();
        }

        let request = Request::from_config(req_config)
            .on_chip(&config.device)
            .with_consumer(CONSUMER)
            .request()
            .map_err(|source| LinuxGpioError::LineRequestFailed {
                path: config.device.clone(),
                line: config.line,
                source,
            })?;

        log::info!(
            "linux_gpio: Opened {} (line={}{})",
            config.device,
            config.line,
            if config.active_low { ", active_low" } else { "" }
        );

        Ok(Self {
            request,
            line: config.line,
        })
    }

    fn drive(&mut self, value: Value) -> Result<()> {
        log::trace!("linux_gpio: line {} -> {:?}", self.line, value);
        self.request
            .set_value(self.line, value)
            .map_err(LinuxGpioError::SetValueFailed)?;
        Ok(())
    }
}

impl ResetLine for LinuxGpioReset {
    fn set_active(&mut self) -> std::result::Result<(), LineError> {
        self.drive(Value::Active).map_err(LineError::from)
    }

    fn set_inactive(&mut self) -> std::result::Result<(), LineError> {
        self.drive(Value::Inactive).map_err(LineError::from)
    }
}

/// Parse reset line options from a list of key-value pairs
pub fn parse_options(
    options: &[(&str, &str)],
) -> std::result::Result<LinuxGpioResetConfig, String> {
    let mut config = LinuxGpioResetConfig::default();
    let mut have_line = false;
    let mut gpiochip: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "gpiochip" => {
                gpiochip = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid gpiochip value: {}", value))?,
                );
            }
            "line" | "reset" => {
                config.line = value
                    .parse()
                    .map_err(|_| format!("Invalid line value: {}", value))?;
                have_line = true;
            }
            "active_low" => {
                config.active_low = parse_bool(value)
                    .ok_or_else(|| format!("Invalid active_low value: {}", value))?;
            }
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        if let Some(n) = gpiochip {
            config.device = format!("/dev/gpiochip{}", n);
        } else {
            return Err("Either 'dev' or 'gpiochip' must be specified.\n\
                 e.g. linux_gpio:dev=/dev/gpiochip0,line=23"
                .to_string());
        }
    } else if gpiochip.is_some() {
        return Err("Only one of 'dev' or 'gpiochip' can be specified".to_string());
    }

    if !have_line {
        return Err("Missing required parameter: line".to_string());
    }

    Ok(config)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_dev() {
        let config = parse_options(&[("dev", "/dev/gpiochip2"), ("line", "23")]).unwrap();
        assert_eq!(config.device, "/dev/gpiochip2");
        assert_eq!(config.line, 23);
        assert!(!config.active_low);
    }

    #[test]
    fn test_parse_options_gpiochip() {
        let config = parse_options(&[
            ("gpiochip", "0"),
            ("reset", "7"),
            ("active_low", "yes"),
        ])
        .unwrap();
        assert_eq!(config.device, "/dev/gpiochip0");
        assert_eq!(config.line, 7);
        assert!(config.active_low);
    }

    #[test]
    fn test_parse_options_errors() {
        assert!(parse_options(&[("line", "1")]).is_err());
        assert!(parse_options(&[("dev", "/dev/gpiochip0")]).is_err());
        assert!(parse_options(&[("dev", "/dev/gpiochip0"), ("gpiochip", "0"), ("line", "1")])
            .is_err());
        assert!(parse_options(&[("gpiochip", "0"), ("line", "1"), ("active_low", "maybe")])
            .is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = LinuxGpioResetConfig::new("/dev/gpiochip1", 5).with_active_low(true);
        assert_eq!(config.device, "/dev/gpiochip1");
        assert_eq!(config.line, 5);
        assert!(config.active_low);
    }

    #[test]
    fn test_open_without_device() {
        assert!(matches!(
            LinuxGpioReset::open(&LinuxGpioResetConfig::default()),
            Err(LinuxGpioError::NoDevice)
        ));
    }
}
