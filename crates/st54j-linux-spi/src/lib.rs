//! st54j-linux-spi - Linux spidev bus transport
//!
//! This crate provides the secure element bus transport over the Linux
//! `/dev/spidevX.Y` device interface.
//!
//! # Example
//!
//! ```no_run
//! use st54j_linux_spi::{LinuxSpi, LinuxSpiConfig};
//! use st54j_core::SpiBus;
//!
//! let config = LinuxSpiConfig::new("/dev/spidev0.0")
//!     .with_speed(1_000_000)
//!     .with_mode(0);
//! let mut spi = LinuxSpi::open(&config)?;
//!
//! spi.write(&[0x5A, 0x00])?;
//! let mut status = [0u8; 2];
//! spi.read(&mut status)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with st54j-se CLI
//!
//! ```bash
//! st54j-se --bus linux_spi:dev=/dev/spidev0.0 write --hex 5a0001
//! st54j-se --bus linux_spi:dev=/dev/spidev0.0,spispeed=4000,mode=0 read --len 16
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - Read/write access to `/dev/spidevX.Y`
//! - The spidev `bufsiz` parameter bounds the block size

pub mod device;
pub mod error;

pub use device::{parse_options, LinuxSpi, LinuxSpiConfig};
pub use error::{LinuxSpiError, Result};

/// Open a Linux SPI bus and return it boxed
///
/// This is a convenience function for use in the CLI backend dispatch.
///
/// # Example Options
///
/// - `dev=/dev/spidev0.0` - Required: device path
/// - `spispeed=1000` - Optional: speed in kHz (default: 1000)
/// - `mode=0` - Optional: SPI mode 0-3 (default: 0)
/// - `csdelay=10` - Optional: spidev delay after each block before chip select
///   is released, in microseconds (default: 0)
pub fn open_linux_spi(
    options: &[(&str, &str)],
) -> std::result::Result<
    Box<dyn st54j_core::SpiBus + Send>,
    Box<dyn std::error::Error + Send + Sync>,
> {
    let config = parse_options(options)?;
    let spi = LinuxSpi::open(&config)?;
    Ok(Box::new(spi))
}
