//! Linux SPI device implementation
//!
//! This module provides the `LinuxSpi` struct that implements the `SpiBus`
//! trait using Linux's spidev interface. Every block is one
//! `SPI_IOC_MESSAGE(1)` transaction with chip select held for its duration.

use crate::error::{LinuxSpiError, Result};

use st54j_core::config::BITS_PER_WORD;
use st54j_core::{BusError, SpiBus};

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Path to kernel spidev buffer size parameter
const BUF_SIZE_SYSFS: &str = "/sys/module/spidev/parameters/bufsiz";

/// Default SPI clock speed in Hz (1 MHz)
const DEFAULT_SPEED_HZ: u32 = 1_000_000;

/// Highest SPI mode number (CPOL=1, CPHA=1)
const MAX_MODE: u8 = 3;

/// Linux spidev ioctl constants
mod ioctl {
    use nix::ioctl_write_ptr;

    // SPI ioctl magic number
    const SPI_IOC_MAGIC: u8 = b'k';

    // SPI ioctl type numbers
    const SPI_IOC_TYPE_MODE: u8 = 1;
    const SPI_IOC_TYPE_BITS_PER_WORD: u8 = 3;
    const SPI_IOC_TYPE_MAX_SPEED_HZ: u8 = 4;

    ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_write_ptr!(
        spi_ioc_wr_bits_per_word,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_BITS_PER_WORD,
        u8
    );
    ioctl_write_ptr!(
        spi_ioc_wr_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );

    /// Size of spi_ioc_transfer struct
    pub const SPI_IOC_TRANSFER_SIZE: usize = 32;

    /// Calculate ioctl number for SPI_IOC_MESSAGE(n)
    pub fn spi_ioc_message(n: u8) -> libc::c_ulong {
        let size = (n as usize) * SPI_IOC_TRANSFER_SIZE;
        // _IOW(SPI_IOC_MAGIC, 0, char[size])
        ((1u32 << 30) | ((size as u32) << 16) | ((SPI_IOC_MAGIC as u32) << 8)) as libc::c_ulong
    }
}

/// SPI transfer structure for ioctl
/// This must match the kernel's struct spi_ioc_transfer layout
#[repr(C)]
#[derive(Debug, Default, Clone)]
struct SpiIocTransfer {
    tx_buf: u64,          // __u64 tx_buf
    rx_buf: u64,          // __u64 rx_buf
    len: u32,             // __u32 len
    speed_hz: u32,        // __u32 speed_hz
    delay_usecs: u16,     // __u16 delay_usecs
    bits_per_word: u8,    // __u8 bits_per_word
    cs_change: u8,        // __u8 cs_change
    tx_nbits: u8,         // __u8 tx_nbits
    rx_nbits: u8,         // __u8 rx_nbits
    word_delay_usecs: u8, // __u8 word_delay_usecs
    _pad: u8,             // padding
}

/// Configuration for opening a Linux SPI device
#[derive(Debug, Clone)]
pub struct LinuxSpiConfig {
    /// Device path (e.g., "/dev/spidev0.0")
    pub device: String,
    /// SPI clock speed in Hz (default: 1 MHz)
    pub speed_hz: u32,
    /// SPI mode (0-3, default: 0)
    pub mode: u8,
    /// spidev `delay_usecs`: wait after each block before chip select is
    /// released, in microseconds (default: 0)
    ///
    /// This is not a chip-select-to-clock setup delay. That one is a
    /// controller property set in the device tree and spidev cannot change it.
    pub cs_delay_us: u16,
}

impl Default for LinuxSpiConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            speed_hz: DEFAULT_SPEED_HZ,
            mode: 0,
            cs_delay_us: 0,
        }
    }
}

impl LinuxSpiConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }

    /// Set the SPI clock speed in Hz
    pub fn with_speed(mut self, speed_hz: u32) -> Self {
        self.speed_hz = speed_hz;
        self
    }

    /// Set the SPI mode (0-3)
    pub fn with_mode(mut self, mode: u8) -> Self {
        self.mode = mode;
        self
    }

    /// Set the chip select release delay in microseconds
    pub fn with_cs_delay(mut self, us: u16) -> Self {
        self.cs_delay_us = us;
        self
    }
}

/// Secure element bus over Linux spidev
pub struct LinuxSpi {
    /// File handle for spidev device
    file: File,
    /// Maximum kernel buffer size
    max_kernel_buf_size: usize,
    /// Current speed in Hz
    speed_hz: u32,
    /// Chip select release delay in microseconds
    cs_delay_us: u16,
}

impl LinuxSpi {
    /// Open a Linux SPI device with the given configuration
    pub fn open(config: &LinuxSpiConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxSpiError::NoDevice);
        }

        log::debug!("linux_spi: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxSpiError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let fd = file.as_raw_fd();

        let mode = config.mode;
        unsafe {
            ioctl::spi_ioc_wr_mode(fd, &mode).map_err(|e| LinuxSpiError::SetModeFailed {
                mode,
                source: std::io::Error::from_raw_os_error(e as i32),
            })?;
        }

        let bits: u8 = BITS_PER_WORD;
        unsafe {
            ioctl::spi_ioc_wr_bits_per_word(fd, &bits).map_err(|e| {
                LinuxSpiError::SetBitsPerWordFailed {
                    bits,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        let speed = config.speed_hz;
        unsafe {
            ioctl::spi_ioc_wr_max_speed_hz(fd, &speed).map_err(|e| {
                LinuxSpiError::SetSpeedFailed {
                    speed,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        log::info!(
            "linux_spi: Opened {} (mode={}, speed={} kHz)",
            config.device,
            mode,
            speed / 1000
        );

        let max_kernel_buf_size = get_max_kernel_buf_size();
        log::debug!(
            "linux_spi: Max kernel buffer size: {} bytes",
            max_kernel_buf_size
        );

        Ok(Self {
            file,
            max_kernel_buf_size,
            speed_hz: speed,
            cs_delay_us: config.cs_delay_us,
        })
    }

    /// Run one half-duplex transaction
    ///
    /// Exactly one of `tx` and `rx` is used; the other side of the bus is
    /// left idle for the transaction.
    fn transaction(&mut self, tx: Option<&[u8]>, rx: Option<&mut [u8]>) -> Result<()> {
        let (tx_buf, rx_buf, len) = match (tx, rx) {
            (Some(data), None) => (data.as_ptr() as u64, 0, data.len()),
            (None, Some(buf)) => (0, buf.as_mut_ptr() as u64, buf.len()),
            _ => {
                return Err(LinuxSpiError::InvalidParameter(
                    "transaction needs exactly one buffer".into(),
                ))
            }
        };

        if len > self.max_kernel_buf_size {
            return Err(LinuxSpiError::BlockTooLarge {
                len,
                max: self.max_kernel_buf_size,
            });
        }

        let transfer = SpiIocTransfer {
            tx_buf,
            rx_buf,
            len: len as u32,
            speed_hz: self.speed_hz,
            delay_usecs: self.cs_delay_us,
            bits_per_word: BITS_PER_WORD,
            ..Default::default()
        };

        let fd = self.file.as_raw_fd();
        let ioctl_num = ioctl::spi_ioc_message(1);
        let ret = unsafe { libc::ioctl(fd, ioctl_num, &transfer as *const SpiIocTransfer) };

        if ret < 0 {
            return Err(LinuxSpiError::TransferFailed(
                std::io::Error::last_os_error(),
            ));
        }

        Ok(())
    }
}

impl SpiBus for LinuxSpi {
    fn max_block_size(&self) -> usize {
        self.max_kernel_buf_size
    }

    fn write(&mut self, data: &[u8]) -> std::result::Result<(), BusError> {
        self.transaction(Some(data), None).map_err(BusError::from)
    }

    fn read(&mut self, buf: &mut [u8]) -> std::result::Result<(), BusError> {
        self.transaction(None, Some(buf)).map_err(BusError::from)
    }
}

/// Read the maximum kernel buffer size from sysfs, or use page size as fallback
fn get_max_kernel_buf_size() -> usize {
    if let Ok(content) = std::fs::read_to_string(BUF_SIZE_SYSFS) {
        if let Ok(size) = content.trim().parse::<usize>() {
            if size > 0 {
                log::debug!("linux_spi: Using buffer size {} from sysfs", size);
                return size;
            }
        }
        log::warn!("linux_spi: Invalid buffer size in {}", BUF_SIZE_SYSFS);
    } else {
        log::debug!("linux_spi: Cannot read {}, using page size", BUF_SIZE_SYSFS);
    }

    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
    log::debug!("linux_spi: Using page size {} as buffer size", page_size);
    page_size
}

/// Parse bus options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxSpiConfig, String> {
    let mut config = LinuxSpiConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "spispeed" => {
                // Parse speed in kHz
                let speed_khz: u32 = value
                    .parse()
                    .map_err(|_| format!("Invalid spispeed value: {}", value))?;
                config.speed_hz = speed_khz
                    .checked_mul(1000)
                    .ok_or_else(|| format!("spispeed out of range: {}", value))?;
            }
            "mode" => {
                let mode: u8 = value
                    .parse()
                    .map_err(|_| format!("Invalid mode value: {}", value))?;
                if mode > MAX_MODE {
                    return Err(format!("Invalid SPI mode: {} (must be 0-3)", mode));
                }
                config.mode = mode;
            }
            "csdelay" => {
                config.cs_delay_us = value
                    .parse()
                    .map_err(|_| format!("Invalid csdelay value: {}", value))?;
            }
            _ => {
                log::warn!("linux_spi: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err("No device specified. Use dev=/dev/spidevX.Y".to_string());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_struct_layout() {
        assert_eq!(
            std::mem::size_of::<SpiIocTransfer>(),
            ioctl::SPI_IOC_TRANSFER_SIZE
        );
    }

    #[test]
    fn test_message_ioctl_number() {
        // SPI_IOC_MESSAGE(1) on Linux
        assert_eq!(ioctl::spi_ioc_message(1), 0x4020_6B00);
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[
            ("dev", "/dev/spidev1.0"),
            ("spispeed", "4000"),
            ("mode", "3"),
            ("csdelay", "90"),
        ])
        .unwrap();
        assert_eq!(config.device, "/dev/spidev1.0");
        assert_eq!(config.speed_hz, 4_000_000);
        assert_eq!(config.mode, 3);
        assert_eq!(config.cs_delay_us, 90);
    }

    #[test]
    fn test_parse_options_defaults() {
        let config = parse_options(&[("dev", "/dev/spidev0.0")]).unwrap();
        assert_eq!(config.speed_hz, 1_000_000);
        assert_eq!(config.mode, 0);
        assert_eq!(config.cs_delay_us, 0);
    }

    #[test]
    fn test_parse_options_errors() {
        assert!(parse_options(&[]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("mode", "4")]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", "fast")]).is_err());
    }

    #[test]
    fn test_open_without_device() {
        assert!(matches!(
            LinuxSpi::open(&LinuxSpiConfig::default()),
            Err(LinuxSpiError::NoDevice)
        ));
    }
}
