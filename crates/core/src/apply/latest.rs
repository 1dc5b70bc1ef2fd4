// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newest value per entity field

use super::{ApplyError, ApplyTransaction, SpecialFields};
use crate::reader::{TransactionView, Value};
use crate::schema::{definition_ids, field_ids};
use std::collections::BTreeMap;

/// A field value and where it was written
#[derive(Debug, Clone, PartialEq)]
pub struct FieldWrite {
    pub value: Value,
    pub transaction_id: u64,
    pub timestamp: Option<u64>,
}

/// Keeps the newest write of every `(entity, field)` by Timestamp.
///
/// A later Timestamp replaces an earlier one; on a tie the write seen first
/// stays. Read backward, the first write seen is already current, so the scan
/// can halt as soon as the entities of interest are complete. Entities are
/// keyed by transaction id for creates and by `EntityId` for SetFields.
#[derive(Debug, Clone, Default)]
pub struct LatestFieldValues {
    values: BTreeMap<u64, BTreeMap<u64, FieldWrite>>,
    archived: BTreeMap<u64, u64>,
}

impl LatestFieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity_id: u64, field_id: u64) -> Option<&FieldWrite> {
        self.values.get(&entity_id)?.get(&field_id)
    }

    pub fn entity(&self, entity_id: u64) -> Option<&BTreeMap<u64, FieldWrite>> {
        self.values.get(&entity_id)
    }

    /// Transaction that archived the entity, when one was seen
    pub fn archived_by(&self, entity_id: u64) -> Option<u64> {
        self.archived.get(&entity_id).copied()
    }

    pub fn entity_count(&self) -> usize {
        self.values.len()
    }

    fn record(&mut self, entity_id: u64, field_id: u64, write: FieldWrite) -> bool {
        let fields = self.values.entry(entity_id).or_default();
        match fields.get(&field_id) {
            Some(known) if write.timestamp <= known.timestamp => false,
            _ => {
                fields.insert(field_id, write);
                true
            }
        }
    }
}

impl ApplyTransaction for LatestFieldValues {
    /// Number of field values this transaction made current
    type Output = usize;

    fn apply(&mut self, tx: &TransactionView<'_>) -> Result<Option<usize>, ApplyError> {
        if !tx.valid {
            return Ok(None);
        }
        let (entity_id, fields) = match tx.definition_id() {
            definition_ids::SET_FIELDS => {
                let special = SpecialFields::scan(tx.fields);
                let Some(entity_id) = special.entity_id else {
                    return Ok(None);
                };
                (entity_id, special.user_fields(tx.fields))
            }
            definition_ids::ARCHIVE => {
                let special = SpecialFields::scan(tx.fields);
                if let Some(entity_id) = special.entity_id {
                    self.archived.entry(entity_id).or_insert(tx.transaction_id);
                }
                return Ok(None);
            }
            id if id > definition_ids::LAST_RESERVED => (tx.transaction_id, tx.fields),
            _ => return Ok(None),
        };

        let mut learned = 0;
        for field in fields.iter().filter(|f| f.id() != field_ids::TIMESTAMP) {
            let write = FieldWrite {
                value: tx.value(field),
                transaction_id: tx.transaction_id,
                timestamp: tx.timestamp,
            };
            if self.record(entity_id, field.id(), write) {
                learned += 1;
            }
        }
        Ok(Some(learned))
    }
}
