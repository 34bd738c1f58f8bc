//! Bus transport and reset line traits
//!
//! These are the two hardware seams of the driver. A backend crate provides
//! one implementation of each; the session layer only talks to the traits.

use crate::error::{BusError, LineError};

/// Half-duplex byte transport with a bounded transaction size
///
/// Each call moves one block in a single bus transaction. Callers never pass
/// more than [`max_block_size`](SpiBus::max_block_size) bytes.
pub trait SpiBus {
    /// Largest number of bytes the transport can move in one transaction
    fn max_block_size(&self) -> usize;

    /// Transmit `data` in one transaction
    fn write(&mut self, data: &[u8]) -> Result<(), BusError>;

    /// Fill `buf` from one receive transaction
    fn read(&mut self, buf: &mut [u8]) -> Result<(), BusError>;
}

impl<T: SpiBus + ?Sized> SpiBus for Box<T> {
    fn max_block_size(&self) -> usize {
        (**self).max_block_size()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), BusError> {
        (**self).write(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
        (**self).read(buf)
    }
}

/// Digital output driving the secure element reset pin
///
/// "Active" and "inactive" are logical levels; polarity is the backend's
/// concern. The line is expected to be driven active when acquired.
pub trait ResetLine {
    /// Drive the line to its active level (chip running)
    fn set_active(&mut self) -> Result<(), LineError>;

    /// Drive the line to its inactive level (chip held in reset)
    fn set_inactive(&mut self) -> Result<(), LineError>;
}

impl<T: ResetLine + ?Sized> ResetLine for Box<T> {
    fn set_active(&mut self) -> Result<(), LineError> {
        (**self).set_active()
    }

    fn set_inactive(&mut self) -> Result<(), LineError> {
        (**self).set_inactive()
    }
}

/// Placeholder line type for sessions attached without a reset line
///
/// It can never be constructed, so a session typed with it always reports
/// the line as unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoResetLine {}

impl ResetLine for NoResetLine {
    fn set_active(&mut self) -> Result<(), LineError> {
        match *self {}
    }

    fn set_inactive(&mut self) -> Result<(), LineError> {
        match *self {}
    }
}
