//! Reset controller
//!
//! Owns the secure element reset line and produces the timed reset pulse:
//! inactive, hold for the settle window, active again. There is no feedback
//! from the chip; a pulse that drove both edges counts as done.

use std::time::Duration;

use crate::bus::ResetLine;
use crate::error::{Error, Result};

/// Default settle window between deasserting and reasserting reset
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(5);

/// Timed reset pulse generator
#[derive(Debug)]
pub struct ResetController<L> {
    line: Option<L>,
    settle: Duration,
}

impl<L: ResetLine> ResetController<L> {
    /// Create a controller driving `line`
    pub fn new(line: L, settle: Duration) -> Self {
        Self {
            line: Some(line),
            settle,
        }
    }

    /// Create a controller with no line; every pulse reports `LineUnavailable`
    pub fn unavailable(settle: Duration) -> Self {
        Self { line: None, settle }
    }

    /// Whether a reset line is attached
    pub fn is_available(&self) -> bool {
        self.line.is_some()
    }

    /// Settle window held between the two edges
    pub fn settle(&self) -> Duration {
        self.settle
    }

    /// Pulse the reset line
    ///
    /// Blocks for at least the settle window. If driving the inactive edge
    /// fails the line is left untouched; if the active edge fails the chip
    /// may stay in reset until the next successful pulse.
    pub fn pulse_reset(&mut self) -> Result<()> {
        let Some(line) = self.line.as_mut() else {
            log::error!("st54j: unable to pulse reset, no reset line");
            return Err(Error::LineUnavailable);
        };

        line.set_inactive()?;
        std::thread::sleep(self.settle);
        line.set_active()?;

        log::info!("st54j: sent reset request to eSE");
        Ok(())
    }

    /// Release the line to the caller
    pub fn into_line(self) -> Option<L> {
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::NoResetLine;
    use crate::error::LineError;
    use std::time::Instant;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Level {
        Active,
        Inactive,
    }

    #[derive(Default)]
    struct TimedLine {
        events: Vec<(Level, Instant)>,
        fail_inactive: bool,
    }

    impl ResetLine for TimedLine {
        fn set_active(&mut self) -> std::result::Result<(), LineError> {
            self.events.push((Level::Active, Instant::now()));
            Ok(())
        }

        fn set_inactive(&mut self) -> std::result::Result<(), LineError> {
            if self.fail_inactive {
                return Err(LineError::Io(std::io::Error::other("line busy")));
            }
            self.events.push((Level::Inactive, Instant::now()));
            Ok(())
        }
    }

    #[test]
    fn test_pulse_order_and_timing() {
        let settle = Duration::from_millis(5);
        let mut ctrl = ResetController::new(TimedLine::default(), settle);
        assert!(ctrl.is_available());
        assert_eq!(ctrl.settle(), settle);

        ctrl.pulse_reset().unwrap();

        let line = ctrl.into_line().unwrap();
        let levels: Vec<_> = line.events.iter().map(|(l, _)| *l).collect();
        assert_eq!(levels, vec![Level::Inactive, Level::Active]);
        let held = line.events[1].1.duration_since(line.events[0].1);
        assert!(held >= settle, "held {:?}, expected >= {:?}", held, settle);
    }

    #[test]
    fn test_unavailable_line() {
        let mut ctrl: ResetController<NoResetLine> = ResetController::unavailable(DEFAULT_SETTLE);
        assert!(!ctrl.is_available());
        assert!(matches!(ctrl.pulse_reset(), Err(Error::LineUnavailable)));
    }

    #[test]
    fn test_failed_edge_skips_rest_of_pulse() {
        let line = TimedLine {
            fail_inactive: true,
            ..Default::default()
        };
        let mut ctrl = ResetController::new(line, Duration::ZERO);

        assert!(matches!(ctrl.pulse_reset(), Err(Error::LineFault(_))));
        assert!(ctrl.into_line().unwrap().events.is_empty());
    }
}
