//! Write, read, transceive and reset commands

use st54j_core::{Control, Request, Response, SeHandle};
use std::fs;
use std::path::Path;

use crate::backends::{DynBus, DynResetLine};
use crate::cli::PayloadArgs;

/// Open session on a runtime-selected device
pub type Handle<'a> = SeHandle<'a, DynBus, DynResetLine>;

/// Resolve the bytes to send from `--hex` or `--input`
pub fn load_payload(payload: &PayloadArgs) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    match (&payload.hex, &payload.input) {
        (Some(hex), _) => Ok(hex.0.clone()),
        (None, Some(path)) => {
            let data = fs::read(path)?;
            log::debug!("Loaded {} bytes from {}", data.len(), path.display());
            Ok(data)
        }
        (None, None) => Err("No payload given; use --hex or --input".into()),
    }
}

/// Run the write command
pub fn run_write(handle: &Handle<'_>, data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    let n = expect_count(handle.dispatch(Request::Write(data))?)?;
    println!("Wrote {} bytes", n);
    Ok(())
}

/// Run the read command
pub fn run_read(
    handle: &Handle<'_>,
    len: usize,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut buf = vec![0u8; len];
    let n = expect_count(handle.dispatch(Request::Read(&mut buf))?)?;

    match output {
        Some(path) => {
            fs::write(path, &buf)?;
            println!("Read {} bytes to {}", n, path.display());
        }
        None => print!("{}", format_hex(&buf)),
    }
    Ok(())
}

/// Run the transceive command
pub fn run_transceive(
    handle: &Handle<'_>,
    data: &[u8],
    len: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    expect_count(handle.dispatch(Request::Write(data))?)?;

    let mut buf = vec![0u8; len];
    expect_count(handle.dispatch(Request::Read(&mut buf))?)?;
    print!("{}", format_hex(&buf));
    Ok(())
}

/// Run the reset command
pub fn run_reset(handle: &Handle<'_>) -> Result<(), Box<dyn std::error::Error>> {
    handle.dispatch(Request::Control(Control::Reset))?;
    println!("Reset pulse sent");
    Ok(())
}

fn expect_count(response: Response) -> Result<usize, Box<dyn std::error::Error>> {
    match response {
        Response::Count(n) => Ok(n),
        Response::Done => Err("Unexpected response to transfer request".into()),
    }
}

/// Format bytes as a hex dump, 16 bytes per line with offsets
pub fn format_hex(data: &[u8]) -> String {
    let mut out = String::new();
    for (i, line) in data.chunks(16).enumerate() {
        let bytes: Vec<String> = line.iter().map(|b| format!("{:02X}", b)).collect();
        out.push_str(&format!("{:04X}: {}\n", i * 16, bytes.join(" ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[]), "");
        assert_eq!(format_hex(&[0x90, 0x00]), "0000: 90 00\n");

        let data: Vec<u8> = (0..18).collect();
        assert_eq!(
            format_hex(&data),
            "0000: 00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F\n0010: 10 11\n"
        );
    }
}
