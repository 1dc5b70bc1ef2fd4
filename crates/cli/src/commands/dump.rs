// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dump command

use crate::error::LumityError;
use crate::log;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use lumity_core::{
    read_backward, read_forward, DecodedTransaction, HaltHandle, LumityConfig, TransactionLog,
    TransactionReader,
};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Args)]
pub struct DumpArgs {
    /// Log file
    pub file: PathBuf,
    /// Read from the end of the log toward its start
    #[arg(long)]
    pub backward: bool,
    /// Bytes read from the file at a time
    #[arg(long)]
    pub block_size: Option<usize>,
    /// Stop after this many transactions
    #[arg(long)]
    pub limit: Option<u64>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// A transaction as printed by `dump`
#[derive(Serialize)]
#[serde(transparent)]
struct Entry(DecodedTransaction);

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tx = &self.0;
        write!(
            f,
            "#{} {} (def {}) offset={} length={} block={}",
            tx.transaction_id, tx.definition, tx.definition_id, tx.offset, tx.length, tx.block_id
        )?;
        if !tx.valid {
            write!(f, " INVALID")?;
        }
        for field in &tx.fields {
            write!(f, "\n  {} ({}) = {}", field.name, field.id, field.value)?;
        }
        Ok(())
    }
}

pub fn handle(args: DumpArgs, config: &LumityConfig) -> Result<()> {
    let block_size = args.block_size.unwrap_or(config.reader.block_size);
    let halt = HaltHandle::new();
    let mut printed = 0u64;
    let mut on_complete = |done: lumity_core::Completed<'_, DecodedTransaction>| {
        if let Some(tx) = done.relevant_object {
            output::print(&Entry(tx), args.format);
            printed += 1;
            if args.limit.is_some_and(|limit| printed >= limit) {
                halt.halt();
            }
        }
    };

    let summary = if args.backward {
        // definitions must be known before a backward read reaches their instances
        let schema = log::load_schema(&args.file, config)?;
        let mut reader = TransactionReader::backward(schema, TransactionLog::new(), 0)
            .with_config(&config.reader)
            .with_halt(halt.clone());
        read_backward(&mut reader, log::open(&args.file)?, block_size, &mut on_complete)
    } else {
        let schema = std::sync::Arc::new(lumity_core::Schema::with_defaults()?);
        let mut reader = TransactionReader::forward(schema, TransactionLog::new())
            .with_config(&config.reader)
            .with_halt(halt.clone());
        read_forward(&mut reader, log::open(&args.file)?, block_size, &mut on_complete)
    }
    .map_err(|e| LumityError::read_failed(&args.file, e))?;

    tracing::info!(
        transactions = summary.transactions,
        halted = summary.halted,
        invalid = summary.invalid_transactions.len(),
        "dump complete"
    );
    Ok(())
}
