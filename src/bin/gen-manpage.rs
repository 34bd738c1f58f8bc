//! Man page generator for st54j-se
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]
//!
//! Writes `st54j-se.1` plus one `st54j-se-<command>.1` page per subcommand.

use clap::CommandFactory;
use std::fs;
use std::path::{Path, PathBuf};

#[path = "../cli.rs"]
#[allow(dead_code)]
mod cli;

fn render(cmd: clap::Command, dir: &Path, name: &str) -> std::io::Result<PathBuf> {
    let mut buffer = Vec::new();
    clap_mangen::Man::new(cmd).title(name).render(&mut buffer)?;
    let path = dir.join(format!("{}.1", name));
    fs::write(&path, buffer)?;
    Ok(path)
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));

    fs::create_dir_all(&output_dir)?;

    let cmd = cli::Cli::command();
    for sub in cmd.get_subcommands() {
        let name = format!("st54j-se-{}", sub.get_name());
        let path = render(sub.clone(), &output_dir, &name)?;
        println!("Man page generated at: {}", path.display());
    }

    let path = render(cmd, &output_dir, "st54j-se")?;
    println!("Man page generated at: {}", path.display());
    println!("View it with: man -l {}", path.display());

    Ok(())
}
