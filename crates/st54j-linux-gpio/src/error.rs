//! Error types for Linux GPIO reset line operations

use thiserror::Error;

/// Linux GPIO reset line specific errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to request the reset line
    #[error("Failed to request GPIO line {line} on '{path}': {source}")]
    LineRequestFailed {
        path: String,
        line: u32,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to set GPIO line value
    #[error("Failed to set GPIO line value: {0}")]
    SetValueFailed(#[source] gpiocdev::Error),

    /// GPIO chip or device not specified
    #[error("No GPIO chip specified. Use dev=/dev/gpiochipN or gpiochip=N")]
    NoDevice,
}

impl From<LinuxGpioError> for st54j_core::LineError {
    fn from(e: LinuxGpioError) -> Self {
        st54j_core::LineError::Backend(Box::new(e))
    }
}

/// Result type for Linux GPIO operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;
