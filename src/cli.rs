//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a hex string such as `5a0001`, `5A 00 01` or `0x5a,0x00`
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    let digits: String = s
        .split(|c: char| c.is_whitespace() || c == ',' || c == ':')
        .map(|tok| {
            tok.strip_prefix("0x")
                .or_else(|| tok.strip_prefix("0X"))
                .unwrap_or(tok)
        })
        .collect();

    if digits.len() % 2 != 0 {
        return Err(format!("Odd number of hex digits in '{}'", s));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("Invalid hex byte in '{}'", s))
        })
        .collect()
}

/// Raw bytes given on the command line as hex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

fn parse_hex_arg(s: &str) -> Result<HexBytes, String> {
    parse_hex_bytes(s).map(HexBytes)
}

/// Parse a byte count, accepting hex with a `0x` prefix
fn parse_len(s: &str) -> Result<usize, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<usize>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "st54j-se")]
#[command(author, version, about = "ST54J secure element transport", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Bus backend, e.g. linux_spi:dev=/dev/spidev0.0 or dummy
    #[arg(short, long, global = true, default_value = "dummy")]
    pub bus: String,

    /// Reset line backend, e.g. linux_gpio:gpiochip=0,line=23 or none
    #[arg(short, long, global = true, default_value = "none")]
    pub reset: String,

    /// Override the maximum bytes per bus transaction
    #[arg(long, global = true, value_parser = parse_len)]
    pub block_size: Option<usize>,

    /// Override the reset settle window in microseconds
    #[arg(long, global = true)]
    pub settle_us: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Source of bytes to send
#[derive(clap::Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct PayloadArgs {
    /// Bytes to send as hex
    #[arg(long, value_parser = parse_hex_arg)]
    pub hex: Option<HexBytes>,

    /// File whose contents are sent
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send bytes to the secure element
    Write {
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Read bytes from the secure element
    Read {
        /// Number of bytes to read
        #[arg(short, long, value_parser = parse_len)]
        len: usize,

        /// Write the bytes to a file instead of printing hex
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Send bytes, then read a response in the same session
    Transceive {
        #[command(flatten)]
        payload: PayloadArgs,

        /// Number of response bytes to read
        #[arg(short, long, value_parser = parse_len)]
        len: usize,
    },

    /// Pulse the secure element reset line
    Reset,

    /// List available backends
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_parse_hex_bytes() {
        assert_eq!(parse_hex_bytes("5a0001").unwrap(), vec![0x5A, 0x00, 0x01]);
        assert_eq!(parse_hex_bytes("5A 00 01").unwrap(), vec![0x5A, 0x00, 0x01]);
        assert_eq!(parse_hex_bytes("0x5a,0x00").unwrap(), vec![0x5A, 0x00]);
        assert_eq!(parse_hex_bytes("").unwrap(), Vec::<u8>::new());
        assert!(parse_hex_bytes("5a0").is_err());
        assert!(parse_hex_bytes("zz").is_err());
    }

    #[test]
    fn test_parse_len() {
        assert_eq!(parse_len("258").unwrap(), 258);
        assert_eq!(parse_len("0x102").unwrap(), 258);
        assert!(parse_len("-1").is_err());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_transceive() {
        let cli = Cli::try_parse_from([
            "st54j-se",
            "--bus",
            "dummy:echo=1",
            "transceive",
            "--hex",
            "00a40400",
            "--len",
            "4",
        ])
        .unwrap();
        assert_eq!(cli.bus, "dummy:echo=1");
        assert_eq!(cli.reset, "none");
        match cli.command {
            Commands::Transceive { payload, len } => {
                assert_eq!(payload.hex, Some(HexBytes(vec![0x00, 0xA4, 0x04, 0x00])));
                assert_eq!(len, 4);
            }
            _ => panic!("expected transceive"),
        }
    }

    #[test]
    fn test_write_requires_payload() {
        assert!(Cli::try_parse_from(["st54j-se", "write"]).is_err());
    }
}
