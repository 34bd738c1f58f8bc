//! st54j-linux-gpio - Linux GPIO reset line
//!
//! This crate drives the secure element reset pin through the Linux GPIO
//! character device interface (gpiocdev).
//!
//! # Example
//!
//! ```no_run
//! use st54j_linux_gpio::{LinuxGpioReset, LinuxGpioResetConfig};
//! use st54j_core::ResetLine;
//!
//! let config = LinuxGpioResetConfig::new("/dev/gpiochip0", 23);
//! let mut line = LinuxGpioReset::open(&config)?;
//!
//! line.set_inactive()?;
//! std::thread::sleep(std::time::Duration::from_millis(5));
//! line.set_active()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with st54j-se CLI
//!
//! ```bash
//! st54j-se --bus linux_spi:dev=/dev/spidev0.0 --reset linux_gpio:gpiochip=0,line=23 reset
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel 4.8+ with GPIO character device support (kernel 5.5+ for v2 API)
//! - Access to `/dev/gpiochipN` devices (may require root or udev rules)

pub mod device;
pub mod error;

pub use device::{parse_options, LinuxGpioReset, LinuxGpioResetConfig};
pub use error::{LinuxGpioError, Result};

/// Request a Linux GPIO reset line and return it boxed
///
/// This is a convenience function for use in the CLI backend dispatch.
///
/// # Example Options
///
/// - `dev=/dev/gpiochip0` - GPIO chip device path (or use gpiochip=N)
/// - `gpiochip=0` - GPIO chip number (alternative to dev)
/// - `line=23` - Reset line offset (required)
/// - `active_low=1` - Optional: invert polarity
pub fn open_linux_gpio_reset(
    options: &[(&str, &str)],
) -> std::result::Result<
    Box<dyn st54j_core::ResetLine + Send>,
    Box<dyn std::error::Error + Send + Sync>,
> {
    let config = parse_options(options)?;
    let line = LinuxGpioReset::open(&config)?;
    Ok(Box::new(line))
}
