//! st54j-dummy - In-memory secure element emulator for testing
//!
//! This crate provides a dummy bus and reset line that stand in for a real
//! secure element. The bus records every block it receives and answers reads
//! from a scripted response queue; the reset line records timestamped level
//! changes. Both keep their state in a shared [`DummyLog`] so tests and the
//! CLI can inspect traffic after the backends have been moved into a device.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use st54j_core::{BusError, LineError, ResetLine, SpiBus};

/// Configuration for the dummy secure element
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Largest block accepted per transaction
    pub max_block: usize,
    /// Byte returned by reads once the response queue is empty
    pub idle_byte: u8,
    /// Fail the bus transaction with this zero-based index
    pub fail_at: Option<usize>,
    /// Queue each written frame as the next response
    pub echo: bool,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            max_block: st54j_core::config::MAX_BLOCK_SIZE,
            idle_byte: 0x00,
            fail_at: None,
            echo: false,
        }
    }
}

/// Reset line level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Chip running
    Active,
    /// Chip held in reset
    Inactive,
}

/// One bus transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// Block sent to the secure element
    Write(Vec<u8>),
    /// Block of the given length read from the secure element
    Read(usize),
}

#[derive(Debug, Default)]
struct LogState {
    bus: Vec<BusEvent>,
    line: Vec<(Level, Instant)>,
    responses: VecDeque<u8>,
    transactions: usize,
}

/// Shared record of emulator traffic
#[derive(Debug, Clone, Default)]
pub struct DummyLog {
    state: Arc<Mutex<LogState>>,
}

impl DummyLog {
    fn lock(&self) -> MutexGuard<'_, LogState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every bus transaction seen so far, in order
    pub fn bus_events(&self) -> Vec<BusEvent> {
        self.lock().bus.clone()
    }

    /// Blocks written so far, in order
    pub fn written_blocks(&self) -> Vec<Vec<u8>> {
        self.lock()
            .bus
            .iter()
            .filter_map(|e| match e {
                BusEvent::Write(data) => Some(data.clone()),
                BusEvent::Read(_) => None,
            })
            .collect()
    }

    /// Reset line level changes with their timestamps
    pub fn line_events(&self) -> Vec<(Level, Instant)> {
        self.lock().line.clone()
    }

    /// Number of bus transactions attempted, including failed ones
    pub fn transactions(&self) -> usize {
        self.lock().transactions
    }

    /// Queue bytes to be returned by subsequent reads
    pub fn push_response(&self, bytes: &[u8]) {
        self.lock().responses.extend(bytes.iter().copied());
    }

    /// Bytes still waiting in the response queue
    pub fn pending_response(&self) -> usize {
        self.lock().responses.len()
    }
}

/// Dummy secure element bus
#[derive(Debug)]
pub struct DummySe {
    config: DummyConfig,
    log: DummyLog,
}

impl DummySe {
    /// Create a new dummy bus with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config,
            log: DummyLog::default(),
        }
    }

    /// Shared traffic log
    pub fn log(&self) -> DummyLog {
        self.log.clone()
    }

    fn begin(&self, state: &mut LogState, len: usize) -> Result<(), BusError> {
        let index = state.transactions;
        state.transactions += 1;

        if len > self.config.max_block {
            return Err(BusError::BlockTooLarge {
                len,
                max: self.config.max_block,
            });
        }
        if self.config.fail_at == Some(index) {
            log::debug!("dummy: failing transaction {}", index);
            return Err(BusError::Io(std::io::Error::other(
                "dummy: injected bus failure",
            )));
        }
        Ok(())
    }
}

impl SpiBus for DummySe {
    fn max_block_size(&self) -> usize {
        self.config.max_block
    }

    fn write(&mut self, data: &[u8]) -> Result<(), BusError> {
        let mut state = self.log.lock();
        self.begin(&mut state, data.len())?;

        log::trace!("dummy: tx {:02X?}", data);
        state.bus.push(BusEvent::Write(data.to_vec()));
        if self.config.echo {
            state.responses.extend(data.iter().copied());
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), BusError> {
        let mut state = self.log.lock();
        self.begin(&mut state, buf.len())?;

        for b in buf.iter_mut() {
            *b = state.responses.pop_front().unwrap_or(self.config.idle_byte);
        }
        log::trace!("dummy: rx {:02X?}", buf);
        state.bus.push(BusEvent::Read(buf.len()));
        Ok(())
    }
}

/// Dummy reset line recording its level changes
#[derive(Debug, Default)]
pub struct DummyResetLine {
    log: DummyLog,
}

impl DummyResetLine {
    /// Create a line recording into `log`
    pub fn new(log: DummyLog) -> Self {
        Self { log }
    }

    /// Shared traffic log
    pub fn log(&self) -> DummyLog {
        self.log.clone()
    }

    fn record(&mut self, level: Level) {
        log::trace!("dummy: reset line {:?}", level);
        self.log.lock().line.push((level, Instant::now()));
    }
}

impl ResetLine for DummyResetLine {
    fn set_active(&mut self) -> Result<(), LineError> {
        self.record(Level::Active);
        Ok(())
    }

    fn set_inactive(&mut self) -> Result<(), LineError> {
        self.record(Level::Inactive);
        Ok(())
    }
}

/// Parse dummy bus options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> Result<DummyConfig, String> {
    let mut config = DummyConfig::default();

    for (key, value) in options {
        match *key {
            "maxblock" => {
                config.max_block = value
                    .parse()
                    .map_err(|_| format!("Invalid maxblock value: {}", value))?;
            }
            "idle" => {
                let v = value.trim_start_matches("0x");
                config.idle_byte = u8::from_str_radix(v, 16)
                    .map_err(|_| format!("Invalid idle value: {}", value))?;
            }
            "failat" => {
                config.fail_at = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid failat value: {}", value))?,
                );
            }
            "echo" => {
                config.echo = matches!(*value, "1" | "yes" | "true" | "on");
            }
            _ => {
                log::warn!("dummy: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}

/// Create a dummy bus and return it boxed
///
/// This is a convenience function for use in the CLI backend dispatch.
pub fn open_dummy(
    options: &[(&str, &str)],
) -> Result<Box<dyn SpiBus + Send>, Box<dyn std::error::Error + Send + Sync>> {
    let config = parse_options(options)?;
    log::info!("dummy: emulated secure element (max block {})", config.max_block);
    Ok(Box::new(DummySe::new(config)))
}

/// Create a dummy reset line and return it boxed
pub fn open_dummy_reset(
    _options: &[(&str, &str)],
) -> Result<Box<dyn ResetLine + Send>, Box<dyn std::error::Error + Send + Sync>> {
    Ok(Box::new(DummyResetLine::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use st54j_core::{DeviceConfig, Error, SeDevice};
    use std::time::Duration;

    fn device(config: DummyConfig, block: usize) -> (SeDevice<DummySe, DummyResetLine>, DummyLog) {
        let bus = DummySe::new(config);
        let log = bus.log();
        let line = DummyResetLine::new(log.clone());
        let dev = SeDevice::attach(
            DeviceConfig::new().with_block_size(block),
            bus,
            Some(line),
        )
        .unwrap();
        (dev, log)
    }

    #[test]
    fn test_write_blocks_recorded() {
        let (dev, log) = device(DummyConfig::default(), 4);
        let handle = dev.open().unwrap();

        let data: Vec<u8> = (1..=10).collect();
        assert_eq!(handle.write(&data).unwrap(), 10);

        assert_eq!(
            log.written_blocks(),
            vec![vec![1, 2, 3, 4], vec![5, 6, 7, 8], vec![9, 10]]
        );
    }

    #[test]
    fn test_echo_roundtrip() {
        let config = DummyConfig {
            echo: true,
            ..Default::default()
        };
        let (dev, log) = device(config, 258);
        let handle = dev.open().unwrap();

        let apdu: Vec<u8> = (0..300).map(|i| i as u8).collect();
        handle.write(&apdu).unwrap();
        let mut resp = vec![0u8; 300];
        handle.read(&mut resp).unwrap();

        assert_eq!(resp, apdu);
        assert_eq!(log.pending_response(), 0);
        assert_eq!(
            log.bus_events()[2..],
            [BusEvent::Read(258), BusEvent::Read(42)]
        );
    }

    #[test]
    fn test_idle_byte_after_response() {
        let config = DummyConfig {
            idle_byte: 0xFF,
            ..Default::default()
        };
        let (dev, log) = device(config, 258);
        log.push_response(&[0x90, 0x00]);
        let handle = dev.open().unwrap();

        let mut buf = [0u8; 4];
        handle.read(&mut buf[..]).unwrap();
        assert_eq!(buf, [0x90, 0x00, 0xFF, 0xFF]);
    }

    #[test]
    fn test_injected_failure_stops_transfer() {
        let config = DummyConfig {
            fail_at: Some(1),
            ..Default::default()
        };
        let (dev, log) = device(config, 4);
        let handle = dev.open().unwrap();

        let err = handle.write(&[0u8; 16][..]).unwrap_err();
        assert!(matches!(err, Error::BusFault { offset: 4, .. }));
        assert_eq!(log.transactions(), 2);
        assert_eq!(log.written_blocks().len(), 1);
    }

    #[test]
    fn test_reset_pulse_recorded() {
        let (dev, log) = device(DummyConfig::default(), 258);
        let handle = dev.open().unwrap();

        handle.reset().unwrap();

        let events = log.line_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, Level::Inactive);
        assert_eq!(events[1].0, Level::Active);
        assert!(events[1].1.duration_since(events[0].1) >= Duration::from_millis(5));
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[
            ("maxblock", "64"),
            ("idle", "0xFF"),
            ("failat", "3"),
            ("echo", "1"),
        ])
        .unwrap();
        assert_eq!(config.max_block, 64);
        assert_eq!(config.idle_byte, 0xFF);
        assert_eq!(config.fail_at, Some(3));
        assert!(config.echo);
        assert!(parse_options(&[("maxblock", "big")]).is_err());
    }
}
