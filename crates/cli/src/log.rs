// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opening log files and rebuilding their schema

use crate::error::LumityError;
use anyhow::{Context, Result};
use lumity_core::{
    read_forward, LumityConfig, NoopApplier, ReadError, Schema, TransactionReader,
};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("cannot open {}", path.display()))
}

/// Default schema plus everything the log at `path` defines.
///
/// Schema transactions only register when read forward, so this is a full
/// forward pass; a missing file yields the defaults. Damage stops the replay
/// without failing it.
pub fn load_schema(path: &Path, config: &LumityConfig) -> Result<Arc<Schema>> {
    let schema = Arc::new(Schema::with_defaults()?);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no log yet, using default schema");
        return Ok(schema);
    }
    let mut reader =
        TransactionReader::forward(Arc::clone(&schema), NoopApplier).with_config(&config.reader);
    match read_forward(&mut reader, open(path)?, config.reader.block_size, |_| {}) {
        Ok(_) => {}
        // whatever was registered before the damage still describes the log
        Err(e) if e.is_corruption() || matches!(e, ReadError::Truncated { .. }) => {
            tracing::warn!(path = %path.display(), error = %e, "schema replay stopped early");
        }
        Err(e) => return Err(LumityError::read_failed(path, e).into()),
    }
    tracing::debug!(
        definitions = schema.definition_count(),
        fields = schema.field_count(),
        "schema loaded"
    );
    Ok(schema)
}

/// Resolve a definition given by id or name
pub fn definition_id(schema: &Schema, text: &str, path: &Path) -> Result<u64> {
    let id = match text.parse::<u64>() {
        Ok(id) => schema.resolve_definition(id).map(|d| d.id()),
        Err(_) => schema.definition_by_name(text).map(|d| d.id()),
    };
    Ok(id.ok_or_else(|| LumityError::unknown_name("definition", text, Some(path)))?)
}

/// Resolve a field given by id or name
pub fn field_id(schema: &Schema, text: &str, path: &Path) -> Result<u64> {
    let id = match text.parse::<u64>() {
        Ok(id) => schema.resolve_field(id).map(|f| f.id()),
        Err(_) => schema.field_by_name(text).map(|f| f.id()),
    };
    Ok(id.ok_or_else(|| LumityError::unknown_name("field", text, Some(path)))?)
}
