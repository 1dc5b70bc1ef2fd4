// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Verify command

use crate::error::LumityError;
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use lumity_core::{BlockCheck, BlockVerifier, LumityConfig, Schema, TransactionReader};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct VerifyArgs {
    /// Log file
    pub file: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
#[serde(transparent)]
struct Check(BlockCheck);

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let check = &self.0;
        let status = if check.is_ok() { "ok" } else { "FAILED" };
        write!(
            f,
            "block {} bytes {}..{} transactions={} {}",
            check.block_id, check.block_start, check.offset, check.transactions, status
        )?;
        if !check.signature_ok {
            write!(f, " (signature)")?;
        }
        if !check.offset_ok {
            write!(f, " (offset)")?;
        }
        if let Some(declared) = check.declared_transactions.filter(|n| *n != check.transactions) {
            write!(f, " (declared {} transactions)", declared)?;
        }
        Ok(())
    }
}

pub fn handle(args: VerifyArgs, config: &LumityConfig) -> Result<()> {
    let bytes =
        std::fs::read(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;
    let schema = Arc::new(Schema::with_defaults()?);
    let mut reader = TransactionReader::forward(schema, BlockVerifier::new(&bytes))
        .with_config(&config.reader);

    reader
        .process_buffer(&bytes, |done| {
            if let Some(check) = done.relevant_object {
                output::print(&Check(check), args.format);
            }
        })
        .and_then(|_| reader.finish())
        .map_err(|e| LumityError::read_failed(&args.file, e))?;

    let failures = reader.applier().failures();
    if failures > 0 {
        return Err(LumityError::verification_failed(&args.file, failures).into());
    }
    if args.format == OutputFormat::Text {
        println!(
            "{}: {} transactions, framing ok",
            args.file.display(),
            reader.transactions_read()
        );
    }
    Ok(())
}
