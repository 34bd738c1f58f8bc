//! st54j-se - ST54J secure element transport
//!
//! Command line front end for the secure element driver. It attaches a bus
//! transport and a reset line chosen at runtime, opens the single client
//! session and runs one request through it.
//!
//! # Architecture
//!
//! - `st54j-core` holds the session manager, the chunked transfer engine and
//!   the reset controller, all behind one bus access lock
//! - backend crates provide the Linux spidev bus, the Linux GPIO reset line
//!   and an in-memory emulator
//! - this binary only selects backends and formats results

mod backends;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use st54j_core::{acquire, DeviceConfig, SeDevice};
use std::time::Duration;

use backends::{DynBus, DynResetLine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Verbosity picks the default filter; RUST_LOG still overrides it
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Commands::List = cli.command {
        commands::list_backends();
        return Ok(());
    }

    let device = attach(&cli)?;
    let handle = device.open()?;

    let result = match cli.command {
        Commands::Write { payload } => {
            let data = commands::transfer::load_payload(&payload)?;
            commands::transfer::run_write(&handle, &data)
        }
        Commands::Read { len, output } => {
            commands::transfer::run_read(&handle, len, output.as_deref())
        }
        Commands::Transceive { payload, len } => {
            let data = commands::transfer::load_payload(&payload)?;
            commands::transfer::run_transceive(&handle, &data, len)
        }
        Commands::Reset => commands::transfer::run_reset(&handle),
        Commands::List => Ok(()),
    };

    drop(handle);
    device.detach();

    result
}

/// Acquire the backends named on the command line and attach the device
fn attach(cli: &Cli) -> Result<SeDevice<DynBus, DynResetLine>, Box<dyn std::error::Error>> {
    let mut config = DeviceConfig::new();
    if let Some(block_size) = cli.block_size {
        config = config.with_block_size(block_size);
    }
    if let Some(us) = cli.settle_us {
        config = config.with_reset_settle(Duration::from_micros(us));
    }

    let bus = acquire("bus", backends::open_bus(&cli.bus))?;
    let reset = acquire("reset line", backends::open_reset(&cli.reset))?;
    if reset.is_none() {
        config = config.with_optional_reset_line();
    }

    Ok(SeDevice::attach(config, bus, reset)?)
}
