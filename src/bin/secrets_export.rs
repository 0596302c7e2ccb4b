//! Exports the secrets of a container to a CSV file
//!
//! The password is read from the terminal, never from arguments or a pipe.

use clap::error::ErrorKind;
use clap::Parser;
use secrets_rs::errors::OpenError;
use secrets_rs::export::{self, ExportError};
use secrets_rs::{Password, SecretRecord};
use std::fs::File;
use std::io::{self, BufWriter, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "secrets-export",
    version,
    about = "Export a Secrets for Android container to CSV"
)]
struct Args {
    /// Encrypted container to read
    input: PathBuf,
    /// CSV file to write
    output: PathBuf,
}

#[derive(Debug, Error)]
enum Error {
    #[error("{0}")]
    Argument(String),
    #[error("No terminal available to read the password from")]
    Environment,
    #[error("Could not read {}: {source}", path.display())]
    Input { path: PathBuf, source: io::Error },
    #[error("Could not write {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },
    #[error("Could not read password: {0}")]
    Prompt(io::Error),
    #[error("Unable to read secrets from {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        source: secrets_rs::Error,
    },
    #[error("Could not export to {}: {source}", path.display())]
    Export { path: PathBuf, source: ExportError },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<usize, Error> {
    let unreadable = |source: secrets_rs::Error| Error::Unreadable {
        path: args.input.clone(),
        source,
    };
    let container = match secrets_rs::open(&args.input) {
        Ok(container) => container,
        Err(OpenError::Io(source)) => {
            return Err(Error::Input {
                path: args.input.clone(),
                source,
            })
        }
        Err(e) => return Err(unreadable(e.into())),
    };

    if !io::stdin().is_terminal() {
        return Err(Error::Environment);
    }
    let password = rpassword::prompt_password("Enter password: ").map_err(Error::Prompt)?;
    let password = Password::new(password);
    let unlocked = container
        .unlock(&password)
        .map_err(|failed| unreadable(failed.into()))?;
    export_to(unlocked.records(), &args.output)
}

fn export_to(records: &[SecretRecord], path: &Path) -> Result<usize, Error> {
    let output = File::create(path).map_err(|source| Error::Output {
        path: path.to_path_buf(),
        source,
    })?;
    export::write_csv(records, BufWriter::new(output)).map_err(|e| match e {
        ExportError::Io(source) => Error::Output {
            path: path.to_path_buf(),
            source,
        },
        source => Error::Export {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let message = e.to_string();
            let first_line = message.lines().next().unwrap_or_default().to_string();
            eprintln!("secrets-export: {}", Error::Argument(first_line));
            return ExitCode::FAILURE;
        }
    };
    init_tracing();

    match run(&args) {
        Ok(rows) => {
            info!(rows, output = %args.output.display(), "Export complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("secrets-export: {}", e);
            ExitCode::FAILURE
        }
    }
}
