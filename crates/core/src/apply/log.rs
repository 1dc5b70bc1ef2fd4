// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain log reading: every transaction copied out of the reader

use super::{ApplyError, ApplyTransaction};
use crate::codec::Direction;
use crate::reader::{TransactionView, Value};
use serde::{Deserialize, Serialize};

/// One field of a [`DecodedTransaction`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedField {
    pub id: u64,
    pub name: String,
    pub value: Value,
}

/// Owned copy of a transaction, independent of the reader's buffers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedTransaction {
    pub transaction_id: u64,
    pub offset: u64,
    pub length: u64,
    pub definition_id: u64,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    pub block_id: u64,
    pub valid: bool,
    pub direction: Direction,
    pub fields: Vec<DecodedField>,
}

impl DecodedTransaction {
    pub fn from_view(tx: &TransactionView<'_>) -> Self {
        Self {
            transaction_id: tx.transaction_id,
            offset: tx.offset,
            length: tx.length,
            definition_id: tx.definition_id(),
            definition: tx.definition.name().to_string(),
            timestamp: tx.timestamp,
            block_id: tx.current_block_id,
            valid: tx.valid,
            direction: tx.direction,
            fields: tx
                .fields
                .iter()
                .map(|f| DecodedField {
                    id: f.id(),
                    name: f.field.name().to_string(),
                    value: tx.value(f),
                })
                .collect(),
        }
    }

    /// `(field id, value)` pairs in log order
    pub fn pairs(&self) -> Vec<(u64, Value)> {
        self.fields.iter().map(|f| (f.id, f.value.clone())).collect()
    }

    pub fn field(&self, id: u64) -> Option<&Value> {
        self.fields.iter().find(|f| f.id == id).map(|f| &f.value)
    }
}

/// Strategy that returns each transaction as a [`DecodedTransaction`],
/// optionally keeping a copy
#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    retain: bool,
    entries: Vec<DecodedTransaction>,
}

impl TransactionLog {
    /// Hand out copies without keeping them
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep a copy of every transaction
    pub fn retaining() -> Self {
        Self {
            retain: true,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[DecodedTransaction] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<DecodedTransaction> {
        self.entries
    }
}

impl ApplyTransaction for TransactionLog {
    type Output = DecodedTransaction;

    fn apply(&mut self, tx: &TransactionView<'_>) -> Result<Option<DecodedTransaction>, ApplyError> {
        let decoded = DecodedTransaction::from_view(tx);
        if self.retain {
            self.entries.push(decoded.clone());
        }
        Ok(Some(decoded))
    }
}
