// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loading decoded transactions into a content cache
//!
//! Creates, SetFields and Archive transactions become operations on a
//! [`ContentCache`]. Which fields a record keeps is decided by
//! [`RecordBindings`]: fields the target definition has no binding for are
//! dropped without error, so older readers tolerate newer schemas.

use super::{ApplyError, ApplyTransaction, SpecialFields};
use crate::reader::{FieldData, TransactionView, Value};
use crate::schema::{definition_ids, field_ids, Schema};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("entity {0} already exists")]
    Duplicate(u64),
    #[error("entity {0} does not exist")]
    NotFound(u64),
    #[error("entity {0} is archived")]
    Archived(u64),
}

/// A cached entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub definition_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_type_id: Option<u64>,
    pub created: u64,
    pub modified: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<u64>,
    pub values: BTreeMap<u64, Value>,
}

/// Field changes for an existing record
#[derive(Debug, Clone, PartialEq)]
pub struct RecordUpdate {
    pub id: u64,
    pub timestamp: u64,
    pub variant_type_id: Option<u64>,
    pub values: Vec<(u64, Value)>,
}

/// Storage the loader writes into
pub trait ContentCache {
    fn insert(&mut self, record: Record) -> Result<(), CacheError>;
    fn update(&mut self, update: RecordUpdate) -> Result<(), CacheError>;
    fn archive(&mut self, id: u64, timestamp: u64) -> Result<(), CacheError>;
    fn get(&self, id: u64) -> Option<&Record>;
}

/// In-memory [`ContentCache`]
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    records: BTreeMap<u64, Record>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Records that are not archived
    pub fn live(&self) -> impl Iterator<Item = &Record> {
        self.records.values().filter(|r| r.archived.is_none())
    }
}

impl ContentCache for MemoryCache {
    fn insert(&mut self, record: Record) -> Result<(), CacheError> {
        if self.records.contains_key(&record.id) {
            return Err(CacheError::Duplicate(record.id));
        }
        self.records.insert(record.id, record);
        Ok(())
    }

    fn update(&mut self, update: RecordUpdate) -> Result<(), CacheError> {
        let record = self
            .records
            .get_mut(&update.id)
            .ok_or(CacheError::NotFound(update.id))?;
        if record.archived.is_some() {
            return Err(CacheError::Archived(update.id));
        }
        if update.variant_type_id.is_some() {
            record.variant_type_id = update.variant_type_id;
        }
        record.values.extend(update.values);
        record.modified = record.modified.max(update.timestamp);
        Ok(())
    }

    fn archive(&mut self, id: u64, timestamp: u64) -> Result<(), CacheError> {
        let record = self.records.get_mut(&id).ok_or(CacheError::NotFound(id))?;
        if record.archived.is_some() {
            return Err(CacheError::Archived(id));
        }
        record.archived = Some(timestamp);
        record.modified = record.modified.max(timestamp);
        Ok(())
    }

    fn get(&self, id: u64) -> Option<&Record> {
        self.records.get(&id)
    }
}

/// Fields each definition has a reader for
#[derive(Debug, Clone, Default)]
pub struct RecordBindings {
    bindings: BTreeMap<u64, BTreeSet<u64>>,
}

impl RecordBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the fields instances of `definition_id` (and its descendants) keep
    pub fn bind(mut self, definition_id: u64, fields: impl IntoIterator<Item = u64>) -> Self {
        self.bindings
            .entry(definition_id)
            .or_default()
            .extend(fields);
        self
    }

    /// Bound fields of the nearest ancestor that has a binding, `None` when
    /// no ancestor does
    pub fn resolve(&self, schema: &Schema, definition_id: u64) -> Option<&BTreeSet<u64>> {
        schema
            .ancestry(definition_id)
            .iter()
            .find_map(|d| self.bindings.get(&d.id()))
    }

    pub fn accepts(&self, schema: &Schema, definition_id: u64, field_id: u64) -> bool {
        keeps(self.resolve(schema, definition_id), field_id)
    }
}

fn keeps(bound: Option<&BTreeSet<u64>>, field_id: u64) -> bool {
    bound.map_or(true, |fields| fields.contains(&field_id))
}

/// What the loader did with a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "id", rename_all = "lowercase")]
pub enum CacheAction {
    Created(u64),
    Updated(u64),
    Archived(u64),
    /// Entity transaction refused by bookkeeping
    Skipped(u64),
}

/// Strategy that replays entity transactions into a [`ContentCache`]
#[derive(Debug, Clone, Default)]
pub struct CacheLoader<C> {
    cache: C,
    bindings: RecordBindings,
    skipped_fields: u64,
}

impl<C: ContentCache> CacheLoader<C> {
    pub fn new(cache: C) -> Self {
        Self {
            cache,
            bindings: RecordBindings::default(),
            skipped_fields: 0,
        }
    }

    pub fn with_bindings(mut self, bindings: RecordBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn into_cache(self) -> C {
        self.cache
    }

    /// Field values dropped because no binding covered them
    pub fn skipped_fields(&self) -> u64 {
        self.skipped_fields
    }

    fn bound_values(
        &mut self,
        tx: &TransactionView<'_>,
        definition_id: u64,
        fields: &[FieldData],
    ) -> Vec<(u64, Value)> {
        let bound = self.bindings.resolve(tx.schema, definition_id);
        let mut values = Vec::with_capacity(fields.len());
        let mut skipped = 0;
        for field in fields.iter().filter(|f| f.id() != field_ids::TIMESTAMP) {
            if keeps(bound, field.id()) {
                values.push((field.id(), tx.value(field)));
            } else {
                tracing::trace!(definition_id, field_id = field.id(), "no binding, skipped");
                skipped += 1;
            }
        }
        self.skipped_fields += skipped;
        values
    }
}

impl<C: ContentCache> ApplyTransaction for CacheLoader<C> {
    type Output = CacheAction;

    fn apply(&mut self, tx: &TransactionView<'_>) -> Result<Option<CacheAction>, ApplyError> {
        let definition_id = tx.definition_id();
        let entity_transaction = definition_id > definition_ids::LAST_RESERVED
            || definition_id == definition_ids::SET_FIELDS
            || definition_id == definition_ids::ARCHIVE;
        if !entity_transaction {
            return Ok(None);
        }
        if !tx.valid {
            return Ok(Some(CacheAction::Skipped(tx.transaction_id)));
        }
        let timestamp = tx.timestamp_or_zero();

        match definition_id {
            definition_ids::SET_FIELDS => {
                let special = SpecialFields::scan(tx.fields);
                let (entity_id, target) = special.require_target("Blockchain.SetFields")?;
                if target == definition_ids::FIELD || target == definition_ids::TYPE {
                    return Ok(None);
                }
                let values = self.bound_values(tx, target, special.user_fields(tx.fields));
                self.cache.update(RecordUpdate {
                    id: entity_id,
                    timestamp,
                    variant_type_id: special.variant_type_id,
                    values,
                })?;
                Ok(Some(CacheAction::Updated(entity_id)))
            }
            definition_ids::ARCHIVE => {
                let (entity_id, _) =
                    SpecialFields::scan(tx.fields).require_target("Blockchain.Archive")?;
                self.cache.archive(entity_id, timestamp)?;
                Ok(Some(CacheAction::Archived(entity_id)))
            }
            _ => {
                let values = self.bound_values(tx, definition_id, tx.fields);
                let record = Record {
                    id: tx.transaction_id,
                    definition_id,
                    variant_type_id: tx.uint(field_ids::VARIANT_TYPE_ID),
                    created: timestamp,
                    modified: timestamp,
                    archived: None,
                    values: values.into_iter().collect(),
                };
                self.cache.insert(record)?;
                Ok(Some(CacheAction::Created(tx.transaction_id)))
            }
        }
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
