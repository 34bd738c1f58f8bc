//! List command implementation

use crate::backends::{available_backends, BackendKind};
use st54j_core::config::{COMPATIBLE, DRIVER_VERSION, MAX_BLOCK_SIZE};

/// List all available backends
pub fn list_backends() {
    println!("st54j-se driver {} ({})", DRIVER_VERSION, COMPATIBLE);
    println!("Default block size: {} bytes", MAX_BLOCK_SIZE);

    let backends = available_backends();
    for (kind, title) in [
        (BackendKind::Bus, "Bus backends"),
        (BackendKind::Reset, "Reset backends"),
    ] {
        println!();
        println!("{}:", title);
        for b in backends.iter().filter(|b| b.kind == kind) {
            let aliases = if b.aliases.is_empty() {
                String::new()
            } else {
                format!(" (aliases: {})", b.aliases.join(", "))
            };
            println!("  {:<12} {}{}", b.name, b.description, aliases);
        }
    }
}
