//! Secure element device and client sessions
//!
//! [`SeDevice`] is one attached secure element. It owns the bus transport and
//! the reset line for its whole lifetime and hands out at most one
//! [`SeHandle`] at a time. All bus and reset traffic goes through a single
//! lock, so a reset never lands in the middle of a transfer and two transfers
//! never interleave their blocks.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::bus::{NoResetLine, ResetLine, SpiBus};
use crate::config::{Control, DeviceConfig};
use crate::copy::{UserSink, UserSource};
use crate::error::{BoxError, Error, Result};
use crate::reset::ResetController;
use crate::transfer::ChunkedTransfer;

/// Everything guarded by the bus access lock
struct BusState<B, L> {
    bus: B,
    reset: ResetController<L>,
    engine: ChunkedTransfer,
}

/// An attached secure element
pub struct SeDevice<B, L = NoResetLine> {
    config: DeviceConfig,
    block_size: usize,
    is_open: AtomicBool,
    session: AtomicU64,
    state: Mutex<BusState<B, L>>,
}

/// Map a backend acquisition result into the attach error
///
/// Backends open their hardware with their own error types; this folds any
/// of them into [`Error::ResourceAcquisitionFailed`].
pub fn acquire<T, E>(resource: &'static str, result: std::result::Result<T, E>) -> Result<T>
where
    E: Into<BoxError>,
{
    result.map_err(|e| {
        let source = e.into();
        log::error!("st54j: unable to acquire {}: {}", resource, source);
        Error::ResourceAcquisitionFailed { resource, source }
    })
}

impl<B: SpiBus, L: ResetLine> SeDevice<B, L> {
    /// Attach to a bus and an optional reset line
    ///
    /// Fails when the configuration requires a reset line and none is given,
    /// or when no usable block size remains. The effective block size is the
    /// configured one clamped to what the bus can move in one transaction.
    pub fn attach(config: DeviceConfig, bus: B, reset: Option<L>) -> Result<Self> {
        log::debug!("st54j: attaching {}", config.name);

        let bus_max = bus.max_block_size();
        let Some(block_size) = NonZeroUsize::new(config.block_size.min(bus_max)) else {
            return Err(Error::ResourceAcquisitionFailed {
                resource: "bus",
                source: format!(
                    "no usable block size (configured {}, bus limit {})",
                    config.block_size, bus_max
                )
                .into(),
            });
        };
        if block_size.get() < config.block_size {
            log::warn!(
                "st54j: bus limit {} bytes is below configured block size {}, clamping",
                bus_max,
                config.block_size
            );
        }

        let reset = match reset {
            Some(line) => ResetController::new(line, config.reset_settle),
            None if config.require_reset_line => {
                log::error!("st54j: unable to request reset line");
                return Err(Error::ResourceAcquisitionFailed {
                    resource: "reset line",
                    source: "no reset line provided".into(),
                });
            }
            None => {
                log::warn!("st54j: attached without reset line, reset requests will fail");
                ResetController::unavailable(config.reset_settle)
            }
        };

        log::debug!(
            "st54j: {} is configured (block size {} bytes)",
            config.name,
            block_size
        );

        Ok(Self {
            block_size: block_size.get(),
            is_open: AtomicBool::new(false),
            session: AtomicU64::new(0),
            state: Mutex::new(BusState {
                bus,
                reset,
                engine: ChunkedTransfer::new(block_size),
            }),
            config,
        })
    }

    /// Detach from the hardware and hand back the bus and reset line
    pub fn detach(self) -> (B, Option<L>) {
        log::debug!("st54j: detaching {}", self.config.name);
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        (state.bus, state.reset.into_line())
    }

    /// Take exclusive ownership of the device
    pub fn open(&self) -> Result<SeHandle<'_, B, L>> {
        if self
            .is_open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::info!("st54j: {} already opened", self.config.name);
            return Err(Error::AlreadyOpen);
        }

        let session = self.session.fetch_add(1, Ordering::AcqRel) + 1;
        log::info!("st54j: {} opened (session {})", self.config.name, session);

        Ok(SeHandle {
            device: self,
            session,
            closed: false,
        })
    }
}

impl<B, L> SeDevice<B, L> {
    /// Binding-time configuration
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Effective bytes per bus transaction
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Whether a client currently holds the device
    pub fn is_open(&self) -> bool {
        self.is_open.load(Ordering::Acquire)
    }

    fn owns(&self, session: u64) -> bool {
        self.is_open.load(Ordering::Acquire) && self.session.load(Ordering::Acquire) == session
    }

    fn release(&self, session: u64) {
        if self.session.load(Ordering::Acquire) == session {
            self.is_open.store(false, Ordering::Release);
        }
        log::debug!("st54j: {} released (session {})", self.config.name, session);
    }

    fn lock(&self) -> MutexGuard<'_, BusState<B, L>> {
        // Poisoning only means a backend panicked mid-call
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A single request on an open handle
#[derive(Debug)]
pub enum Request<'a> {
    /// Send bytes to the secure element
    Write(&'a [u8]),
    /// Fill a buffer from the secure element
    Read(&'a mut [u8]),
    /// Out-of-band control request
    Control(Control),
}

/// Outcome of a successful [`Request`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Number of bytes moved
    Count(usize),
    /// Control request completed
    Done,
}

/// Exclusive client session on a [`SeDevice`]
///
/// Dropping the handle closes it.
pub struct SeHandle<'a, B, L = NoResetLine> {
    device: &'a SeDevice<B, L>,
    session: u64,
    closed: bool,
}

impl<B: SpiBus, L: ResetLine> SeHandle<'_, B, L> {
    /// Session number assigned at open
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Send `data` to the secure element, returning the byte count
    pub fn write<S: UserSource + ?Sized>(&self, data: &S) -> Result<usize> {
        self.check_open()?;
        let mut guard = self.device.lock();
        let state = &mut *guard;
        state.engine.write(&mut state.bus, data)
    }

    /// Fill `buf` from the secure element, returning the byte count
    pub fn read<D: UserSink + ?Sized>(&self, buf: &mut D) -> Result<usize> {
        self.check_open()?;
        let mut guard = self.device.lock();
        let state = &mut *guard;
        state.engine.read(&mut state.bus, buf)
    }

    /// Pulse the secure element reset line
    pub fn reset(&self) -> Result<()> {
        self.control(Control::Reset)
    }

    /// Handle an out-of-band control request
    pub fn control(&self, control: Control) -> Result<()> {
        self.check_open()?;
        log::debug!("st54j: control 0x{:08X}", control.raw());

        match control {
            Control::Reset => {
                log::info!("st54j: reset request received");
                self.device.lock().reset.pulse_reset()
            }
            Control::Unknown(code) => {
                log::debug!("st54j: ignoring control 0x{:08X}", code);
                Ok(())
            }
        }
    }

    /// Dispatch a request to the transfer engine or the reset controller
    pub fn dispatch(&self, request: Request<'_>) -> Result<Response> {
        match request {
            Request::Write(data) => self.write(data).map(Response::Count),
            Request::Read(buf) => self.read(buf).map(Response::Count),
            Request::Control(control) => self.control(control).map(|()| Response::Done),
        }
    }
}

impl<B, L> SeHandle<'_, B, L> {
    /// Whether this handle still owns the device
    pub fn is_open(&self) -> bool {
        !self.closed && self.device.owns(self.session)
    }

    /// Give up ownership of the device
    ///
    /// Calling it again, or dropping the handle afterwards, has no effect.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.device.release(self.session);
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(Error::NotOpen)
        }
    }
}

impl<B, L> Drop for SeHandle<'_, B, L> {
    fn drop(&mut self) {
        self.close();
    }
}
