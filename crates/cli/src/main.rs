// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! lumity - inspect and append to Lumity transaction logs

mod commands;
mod error;
mod log;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{dump, encode, schema, verify};
use lumity_core::LumityConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lumity", version, about = "Lumity transaction log tool")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the transactions of a log
    Dump(dump::DumpArgs),
    /// Check framing and block signatures of a log
    Verify(verify::VerifyArgs),
    /// Print the schema, optionally rebuilt from a log
    Schema(schema::SchemaArgs),
    /// Append one transaction to a log
    Encode(encode::EncodeArgs),
}

fn main() {
    setup_logging();
    if let Err(e) = run() {
        match e.downcast_ref::<error::LumityError>() {
            Some(friendly) => eprint!("{}", friendly),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = LumityConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Dump(args) => dump::handle(args, &config),
        Commands::Verify(args) => verify::handle(args, &config),
        Commands::Schema(args) => schema::handle(args, &config),
        Commands::Encode(args) => encode::handle(args, &config),
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the default `warn` level
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}
