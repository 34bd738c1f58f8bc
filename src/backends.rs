//! Backend registration and dispatch
//!
//! Bus transports and reset lines are selected with a backend string of the
//! form `name` or `name:option1=value1,option2=value2`. Each backend crate is
//! feature-gated; this module only knows how to route a string to it.

use st54j_core::{BoxError, ResetLine, SpiBus};

/// Boxed bus transport selected at runtime
pub type DynBus = Box<dyn SpiBus + Send>;

/// Boxed reset line selected at runtime
pub type DynResetLine = Box<dyn ResetLine + Send>;

/// What a backend provides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Bus transport
    Bus,
    /// Reset line
    Reset,
}

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// What the backend provides
    pub kind: BackendKind,
    /// Short description
    pub description: &'static str,
}

impl BackendInfo {
    fn matches(&self, kind: BackendKind, name: &str) -> bool {
        self.kind == kind && (self.name == name || self.aliases.contains(&name))
    }
}

/// Get information about all available backends (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        aliases: &[],
        kind: BackendKind::Bus,
        description: "In-memory secure element emulator (maxblock=<n>,idle=<hex>,failat=<n>,echo=<bool>)",
    });

    #[cfg(feature = "linux-spi")]
    backends.push(BackendInfo {
        name: "linux_spi",
        aliases: &["linux-spi", "spidev"],
        kind: BackendKind::Bus,
        description: "Linux spidev interface (dev=/dev/spidevX.Y,spispeed=<kHz>,mode=<0-3>,csdelay=<us>)",
    });

    backends.push(BackendInfo {
        name: "none",
        aliases: &[],
        kind: BackendKind::Reset,
        description: "No reset line; reset requests fail",
    });

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        aliases: &[],
        kind: BackendKind::Reset,
        description: "Recording reset line for testing",
    });

    #[cfg(feature = "linux-gpio")]
    backends.push(BackendInfo {
        name: "linux_gpio",
        aliases: &["linux-gpio", "gpio"],
        kind: BackendKind::Reset,
        description: "Linux GPIO chardev line (dev=/dev/gpiochipN|gpiochip=N,line=<n>,active_low=<bool>)",
    });

    backends
}

/// Generate help text listing all available backends
pub fn backend_help() -> String {
    let backends = available_backends();
    let mut help = String::new();

    for (kind, title) in [
        (BackendKind::Bus, "Bus backends"),
        (BackendKind::Reset, "Reset backends"),
    ] {
        help.push_str(title);
        help.push_str(":\n");
        for b in backends.iter().filter(|b| b.kind == kind) {
            help.push_str(&format!("  {:12} - {}\n", b.name, b.description));
        }
    }

    help
}

/// Resolve a name or alias to the canonical backend name
pub fn find_backend(kind: BackendKind, name: &str) -> Option<&'static str> {
    available_backends()
        .into_iter()
        .find(|b| b.matches(kind, name))
        .map(|b| b.name)
}

/// Parse a backend string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
///
/// A bare `option` with no value is read as `option=1`.
pub fn parse_backend_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter(|opt| !opt.is_empty())
            .map(|opt| opt.split_once('=').unwrap_or((opt, "1")))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Open the bus transport named by `backend`
#[allow(unused_variables)]
pub fn open_bus(backend: &str) -> Result<DynBus, BoxError> {
    let (name, options) = parse_backend_string(backend);

    match find_backend(BackendKind::Bus, name) {
        #[cfg(feature = "dummy")]
        Some("dummy") => st54j_dummy::open_dummy(&options),

        #[cfg(feature = "linux-spi")]
        Some("linux_spi") => {
            log::info!("Opening Linux SPI bus...");
            st54j_linux_spi::open_linux_spi(&options).map_err(|e| {
                format!(
                    "Failed to open Linux SPI device: {}\n\
                     Make sure the device exists and you have read/write permissions.",
                    e
                )
                .into()
            })
        }

        _ => Err(unknown_backend_error(BackendKind::Bus, name)),
    }
}

/// Open the reset line named by `backend`
///
/// Returns `None` for the `none` backend.
#[allow(unused_variables)]
pub fn open_reset(backend: &str) -> Result<Option<DynResetLine>, BoxError> {
    let (name, options) = parse_backend_string(backend);

    match find_backend(BackendKind::Reset, name) {
        Some("none") => Ok(None),

        #[cfg(feature = "dummy")]
        Some("dummy") => st54j_dummy::open_dummy_reset(&options).map(Some),

        #[cfg(feature = "linux-gpio")]
        Some("linux_gpio") => {
            log::info!("Requesting Linux GPIO reset line...");
            st54j_linux_gpio::open_linux_gpio_reset(&options)
                .map(Some)
                .map_err(|e| {
                    format!(
                        "Failed to request reset line: {}\n\
                         Make sure the GPIO chip exists and the line is not in use.",
                        e
                    )
                    .into()
                })
        }

        _ => Err(unknown_backend_error(BackendKind::Reset, name)),
    }
}

fn unknown_backend_error(kind: BackendKind, name: &str) -> BoxError {
    let what = match kind {
        BackendKind::Bus => "bus",
        BackendKind::Reset => "reset",
    };
    let mut msg = format!("Unknown {} backend: {}\n\n", what, name);
    msg.push_str(&backend_help());
    msg.push_str("\nUse 'st54j-se list' for more details");
    msg.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_string() {
        let (name, opts) = parse_backend_string("linux_spi:dev=/dev/spidev0.0,spispeed=1000");
        assert_eq!(name, "linux_spi");
        assert_eq!(opts, vec![("dev", "/dev/spidev0.0"), ("spispeed", "1000")]);

        let (name, opts) = parse_backend_string("none");
        assert_eq!(name, "none");
        assert!(opts.is_empty());
    }

    #[test]
    fn test_bare_option_is_flag() {
        let (name, opts) = parse_backend_string("linux_gpio:gpiochip=0,line=23,active_low");
        assert_eq!(name, "linux_gpio");
        assert_eq!(
            opts,
            vec![("gpiochip", "0"), ("line", "23"), ("active_low", "1")]
        );

        let (_, opts) = parse_backend_string("dummy:echo,");
        assert_eq!(opts, vec![("echo", "1")]);
    }

    #[cfg(feature = "linux-gpio")]
    #[test]
    fn test_bare_active_low_keeps_polarity() {
        let (_, opts) = parse_backend_string("linux_gpio:gpiochip=0,line=23,active_low");
        let config = st54j_linux_gpio::parse_options(&opts).unwrap();
        assert!(config.active_low);
        assert_eq!(config.line, 23);
    }

    #[test]
    fn test_none_reset_backend() {
        assert!(open_reset("none").unwrap().is_none());
    }

    #[test]
    fn test_unknown_backend() {
        assert!(open_bus("nosuchbus").is_err());
        assert!(open_reset("nosuchline").is_err());
        assert_eq!(find_backend(BackendKind::Bus, "none"), None);
    }

    #[cfg(feature = "linux-spi")]
    #[test]
    fn test_alias_lookup() {
        assert_eq!(find_backend(BackendKind::Bus, "spidev"), Some("linux_spi"));
    }
}
