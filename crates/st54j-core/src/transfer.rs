//! Chunked transfer engine
//!
//! The secure element bus accepts at most one block per transaction. The
//! engine splits a caller request into blocks, pushes them through the bus in
//! ascending offset order and reports one outcome for the whole request: the
//! full length on success, or the first error. Bytes already exchanged before
//! a failure stay exchanged; there is no rollback and no partial count.

use std::num::NonZeroUsize;

use crate::bus::SpiBus;
use crate::copy::{UserSink, UserSource};
use crate::error::{Error, Result};

/// Largest request length accepted by [`ChunkedTransfer`]
///
/// Transfer counts are reported through a signed 32-bit value on the device
/// interface.
pub const MAX_TRANSFER_LEN: usize = i32::MAX as usize;

/// Direction of a transfer relative to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Secure element to host
    Read,
    /// Host to secure element
    Write,
}

/// Iterator over `(offset, len)` pairs covering a request in block order
#[derive(Debug, Clone)]
pub struct Blocks {
    offset: usize,
    remaining: usize,
    block_size: usize,
}

impl Blocks {
    /// Split `len` bytes into blocks of at most `block_size` bytes
    pub fn new(len: usize, block_size: NonZeroUsize) -> Self {
        Self {
            offset: 0,
            remaining: len,
            block_size: block_size.get(),
        }
    }
}

impl Iterator for Blocks {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let block = self.remaining.min(self.block_size);
        let item = (self.offset, block);
        self.offset += block;
        self.remaining -= block;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining.div_ceil(self.block_size);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Blocks {}

/// Block splitter with its own scratch buffer
///
/// The scratch buffer is allocated once and reused for every block, so the
/// engine must only ever be driven by one operation at a time. The session
/// keeps it behind the bus access lock for that reason.
#[derive(Debug)]
pub struct ChunkedTransfer {
    block_size: NonZeroUsize,
    scratch: Vec<u8>,
}

impl ChunkedTransfer {
    /// Create an engine moving at most `block_size` bytes per bus transaction
    pub fn new(block_size: NonZeroUsize) -> Self {
        Self {
            block_size,
            scratch: vec![0u8; block_size.get()],
        }
    }

    /// Block size in bytes
    pub fn block_size(&self) -> usize {
        self.block_size.get()
    }

    /// Run a transfer in the given direction
    ///
    /// Convenience dispatcher over [`write`](Self::write) and
    /// [`read`](Self::read) for callers holding a single mutable buffer.
    pub fn transfer<B, U>(
        &mut self,
        bus: &mut B,
        direction: Direction,
        buf: &mut U,
    ) -> Result<usize>
    where
        B: SpiBus + ?Sized,
        U: UserSource + UserSink + ?Sized,
    {
        match direction {
            Direction::Write => self.write(bus, &*buf),
            Direction::Read => self.read(bus, buf),
        }
    }

    /// Send the whole of `src` to the bus
    pub fn write<B, S>(&mut self, bus: &mut B, src: &S) -> Result<usize>
    where
        B: SpiBus + ?Sized,
        S: UserSource + ?Sized,
    {
        let len = check_len(src.len())?;
        log::debug!("st54j: writing {} bytes", len);

        for (offset, block) in Blocks::new(len, self.block_size) {
            let chunk = &mut self.scratch[..block];
            src.copy_out(offset, chunk).map_err(|e| {
                log::debug!("st54j: failed to copy from user at offset {}", offset);
                Error::CopyFault(e)
            })?;

            log::trace!("st54j: tx block offset={} len={}", offset, block);
            bus.write(chunk).map_err(|source| {
                log::debug!("st54j: failed to write to SPI at offset {}", offset);
                Error::BusFault { offset, source }
            })?;
        }

        Ok(len)
    }

    /// Fill the whole of `dst` from the bus
    pub fn read<B, D>(&mut self, bus: &mut B, dst: &mut D) -> Result<usize>
    where
        B: SpiBus + ?Sized,
        D: UserSink + ?Sized,
    {
        let len = check_len(dst.len())?;
        log::debug!("st54j: reading {} bytes", len);

        for (offset, block) in Blocks::new(len, self.block_size) {
            let chunk = &mut self.scratch[..block];

            log::trace!("st54j: rx block offset={} len={}", offset, block);
            bus.read(chunk).map_err(|source| {
                log::error!("st54j: failed to read from SPI at offset {}", offset);
                Error::BusFault { offset, source }
            })?;

            dst.copy_in(offset, chunk).map_err(|e| {
                log::error!("st54j: failed to copy to user at offset {}", offset);
                Error::CopyFault(e)
            })?;
        }

        Ok(len)
    }
}

fn check_len(len: usize) -> Result<usize> {
    if len > MAX_TRANSFER_LEN {
        return Err(Error::InvalidLength {
            len,
            max: MAX_TRANSFER_LEN,
        });
    }
    Ok(len)
}
