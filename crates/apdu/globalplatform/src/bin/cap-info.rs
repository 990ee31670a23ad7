//! Display what a CAP file would load, without touching a card
//!
//! Prints the package and applet AIDs, component sizes and the LOAD block
//! count, and can hex dump the load file data block.

use std::path::PathBuf;

use clap::Parser;
use jcload_globalplatform::{CapFile, load::BLOCK_SIZE};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the CAP file to analyze
    cap_file: PathBuf,

    /// Hex dump every LOAD block
    #[arg(short, long)]
    blocks: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(true)
        .init();

    let cli = Cli::parse();
    let cap = CapFile::open(&cli.cap_file)?;

    println!("{}", cli.cap_file.display());
    println!("{}", cap.info());

    if cli.blocks {
        for block in cap.blocks() {
            let marker = if block.last { " (last)" } else { "" };
            println!();
            println!("Block {}{marker}, {} bytes", block.number, block.data.len());
            for (row, chunk) in block.data.chunks(16).enumerate() {
                println!(
                    "  {:04x}  {}",
                    usize::from(block.number) * BLOCK_SIZE + row * 16,
                    hex::encode(chunk)
                );
            }
        }
    }

    Ok(())
}
