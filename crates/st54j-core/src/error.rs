//! Error types for st54j-core
//!
//! Transport backends report failures through [`BusError`] and [`LineError`],
//! caller buffers through [`CopyError`]. The session layer wraps all of them
//! in the per-operation [`Error`] returned to the client.

use thiserror::Error;

/// Boxed error used when a backend hands over its own error type
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a bus transport for a single block
#[derive(Debug, Error)]
pub enum BusError {
    /// The underlying device returned an OS error
    #[error("bus I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The block is larger than the transport can move in one transaction
    #[error("block of {len} bytes exceeds transport limit of {max} bytes")]
    BlockTooLarge {
        /// Requested block length
        len: usize,
        /// Transport limit
        max: usize,
    },

    /// Backend specific failure
    #[error("{0}")]
    Backend(#[source] BoxError),
}

/// Failure reported by a reset line
#[derive(Debug, Error)]
pub enum LineError {
    /// The underlying device returned an OS error
    #[error("line I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend specific failure
    #[error("{0}")]
    Backend(#[source] BoxError),
}

/// Failure moving bytes across the caller buffer boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot copy {len} bytes at offset {offset} of caller buffer")]
pub struct CopyError {
    /// Offset into the caller buffer where the copy started
    pub offset: usize,
    /// Number of bytes that were to be copied
    pub len: usize,
}

/// Errors returned by device operations
#[derive(Debug, Error)]
pub enum Error {
    /// The device already has an owner
    #[error("device is already open")]
    AlreadyOpen,

    /// The handle does not own the device
    #[error("device is not open for this handle")]
    NotOpen,

    /// Request length cannot be represented by the transfer interface
    #[error("invalid transfer length {len} (max {max})")]
    InvalidLength {
        /// Requested length
        len: usize,
        /// Largest accepted length
        max: usize,
    },

    /// Copy between the caller buffer and the scratch buffer failed
    #[error("copy fault: {0}")]
    CopyFault(#[from] CopyError),

    /// The bus transport failed on a block
    #[error("bus fault at offset {offset}: {source}")]
    BusFault {
        /// Offset of the failing block within the request
        offset: usize,
        /// Transport error
        #[source]
        source: BusError,
    },

    /// Reset was requested but the session has no reset line
    #[error("reset line unavailable")]
    LineUnavailable,

    /// Driving the reset line failed
    #[error("reset line fault: {0}")]
    LineFault(#[from] LineError),

    /// Attach could not obtain the bus or the reset line
    #[error("failed to acquire {resource}: {source}")]
    ResourceAcquisitionFailed {
        /// Which resource could not be acquired
        resource: &'static str,
        /// Underlying failure
        #[source]
        source: BoxError,
    },
}

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;
