//! st54j-core - Session and chunked-transfer core for the ST54J secure element
//!
//! This crate implements the part of the driver that has real invariants:
//! exclusive open, splitting arbitrary-length requests into bus-sized blocks,
//! and the single lock serializing transfers against reset pulses. Hardware
//! access is abstracted behind [`SpiBus`] and [`ResetLine`]; backend crates
//! provide the Linux spidev bus, the GPIO reset line and an in-memory emulator.
//!
//! # Example
//!
//! ```ignore
//! use st54j_core::{DeviceConfig, SeDevice};
//!
//! let device = SeDevice::attach(DeviceConfig::default(), bus, Some(reset_line))?;
//! let handle = device.open()?;
//!
//! handle.write(&[0x5A, 0x00, 0x01][..])?;
//! let mut response = [0u8; 4];
//! handle.read(&mut response[..])?;
//! handle.reset()?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bus;
pub mod config;
pub mod copy;
pub mod device;
pub mod error;
pub mod reset;
pub mod transfer;

pub use bus::{NoResetLine, ResetLine, SpiBus};
pub use config::{Control, DeviceConfig};
pub use copy::{UserSink, UserSource};
pub use device::{acquire, Request, Response, SeDevice, SeHandle};
pub use error::{BoxError, BusError, CopyError, Error, LineError, Result};
pub use reset::ResetController;
pub use transfer::{ChunkedTransfer, Direction};
