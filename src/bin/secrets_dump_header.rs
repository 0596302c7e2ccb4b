//! Prints the parsed header of a secrets container
//!
//! Primarily for investigating the container format.

use clap::Parser;
use secrets_rs::crypto::{self, iterations_for_rounds};
use secrets_rs::ContainerHeader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "secrets-dump-header", version)]
struct Args {
    /// Container to inspect
    path: PathBuf,
}

fn main() -> Result<(), secrets_rs::Error> {
    let args = Args::parse();
    let container = secrets_rs::open(&args.path)?;
    let header = container.header();
    match header {
        ContainerHeader::Salted(pair) => {
            println!("Format: salted");
            println!("Salt: {}", pair.salt_hex());
            println!(
                "Rounds: {} ({} iterations)",
                pair.rounds(),
                iterations_for_rounds(pair.rounds())
            );
        }
        ContainerHeader::Legacy => println!("Format: legacy (no header)"),
    }
    for candidate in crypto::cipher_candidates(header) {
        println!("Candidate: {:?}", candidate.generation());
    }
    Ok(())
}
