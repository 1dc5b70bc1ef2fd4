// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schema command

use crate::log;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use lumity_core::schema::{DefinitionInfo, FieldInfo};
use lumity_core::{LumityConfig, Schema};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct SchemaArgs {
    /// Log whose schema transactions are replayed over the defaults
    pub file: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Entry {
    Definition(DefinitionInfo),
    Field(FieldInfo),
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Definition(d) => {
                write!(f, "definition {:>4}  {}", d.id, d.name)?;
                if let Some(parent) = d.inherited_id {
                    write!(f, " : {}", parent)?;
                }
                Ok(())
            }
            Entry::Field(field) => {
                write!(f, "field      {:>4}  {} {}", field.id, field.name, field.data_type)
            }
        }
    }
}

pub fn handle(args: SchemaArgs, config: &LumityConfig) -> Result<()> {
    let schema = match &args.file {
        Some(path) => log::load_schema(path, config)?,
        None => Arc::new(Schema::with_defaults()?),
    };

    let entries: Vec<Entry> = schema
        .definitions()
        .iter()
        .map(|d| Entry::Definition(d.info()))
        .chain(schema.fields().iter().map(|f| Entry::Field(f.info())))
        .collect();
    output::print_list(&entries, args.format);
    Ok(())
}
