// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Encode command

use crate::error::LumityError;
use crate::log;
use crate::output::{self, OutputFormat};
use anyhow::{anyhow, Context, Result};
use clap::Args;
use lumity_core::{DataType, LogWriter, LumityConfig, Priority, Schema, TransactionBuilder, Value};
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct EncodeArgs {
    /// Log file, created when missing
    pub file: PathBuf,
    /// Definition id or name
    #[arg(long, short)]
    pub definition: String,
    /// Field value as FIELD=VALUE, in wire order. FIELD is an id or a name;
    /// `null` empties a string or bytes field and `now` stamps a uint field.
    #[arg(long = "field", short = 'f', value_name = "FIELD=VALUE")]
    pub fields: Vec<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct Appended {
    transaction_id: u64,
    offset: u64,
    length: u64,
}

impl fmt::Display for Appended {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "appended transaction {} ({} bytes at offset {})",
            self.transaction_id, self.length, self.offset
        )
    }
}

pub fn handle(args: EncodeArgs, config: &LumityConfig) -> Result<()> {
    let schema = log::load_schema(&args.file, config)?;
    let definition_id = log::definition_id(&schema, &args.definition, &args.file)?;

    let mut tx = TransactionBuilder::new(definition_id);
    for assignment in &args.fields {
        let (field_id, value) = parse_assignment(&schema, assignment, &args.file)?;
        tx = tx.field(field_id, value);
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.file)
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    let offset = file.metadata()?.len();

    let mut writer = LogWriter::new(schema, file, config.flush, offset);
    let transaction_id = writer
        .append(&tx, Priority::High)
        .map_err(|e| LumityError::write_refused(&args.file, e))?;
    let length = writer.position() - offset;
    writer.into_inner()?.sync_all()?;

    tracing::info!(transaction_id, offset, length, "appended");
    output::print(
        &Appended {
            transaction_id,
            offset,
            length,
        },
        args.format,
    );
    Ok(())
}

fn parse_assignment(schema: &Schema, assignment: &str, path: &Path) -> Result<(u64, Value)> {
    let (name, text) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("expected FIELD=VALUE, got '{}'", assignment))?;
    let field_id = log::field_id(schema, name.trim(), path)?;
    let data_type = schema
        .resolve_field(field_id)
        .map(|f| f.data_type())
        .ok_or_else(|| LumityError::unknown_name("field", name, Some(path)))?;

    let value = if data_type == DataType::UInt && text == "now" {
        Value::UInt(now_millis())
    } else {
        Value::parse(data_type, text).map_err(|e| anyhow!("{}: {}", name, e))?
    };
    Ok((field_id, value))
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
