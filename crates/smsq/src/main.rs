// SPDX-FileCopyrightText: 2026 smsq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! smsq - Relay SMS messages from an Android companion app to Telegram.
//!
//! This is the binary entry point for the relay and its key tooling.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod keys;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// smsq - Relay SMS messages from an Android companion app to Telegram.
#[derive(Parser, Debug)]
#[command(name = "smsq", version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to the XDG and local `smsq.toml` search.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the relay: webhook, SMS endpoints, and the event loop.
    Serve,
    /// Generate a decryption key pair and print the public half.
    Keygen {
        /// Where to write the base64 private key.
        #[arg(long)]
        out: PathBuf,
        /// Overwrite an existing key file.
        #[arg(long)]
        force: bool,
    },
    /// Print a fresh pairing key that passes the admission check.
    MintKey,
    /// Report whether a pairing key passes the admission check.
    CheckKey { key: String },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            let loaded = match &cli.config {
                Some(path) => smsq_config::load_and_validate_from_path(path),
                None => smsq_config::load_and_validate(),
            };
            let config = match loaded {
                Ok(config) => config,
                Err(errors) => {
                    smsq_config::render_errors(&errors);
                    std::process::exit(1);
                }
            };
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Keygen { out, force } => match keys::keygen(&out, force) {
            Ok(public_key) => {
                eprintln!("private key written to {}", out.display());
                println!("{public_key}");
            }
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        },
        Commands::MintKey => println!("{}", keys::mint_key()),
        Commands::CheckKey { key } => {
            if keys::check_key(&key) {
                println!("admissible");
            } else {
                println!("not admissible");
                std::process::exit(1);
            }
        }
    }
}
