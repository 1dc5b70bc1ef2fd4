// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Block signature checks

use super::{ApplyError, ApplyTransaction};
use crate::reader::TransactionView;
use crate::schema::{definition_ids, field_ids};
use crate::writer::block_signature;
use serde::Serialize;

/// Result of checking one block boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockCheck {
    pub block_id: u64,
    /// Offset of the boundary transaction
    pub offset: u64,
    /// First byte covered by the signature
    pub block_start: u64,
    pub transactions: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_transactions: Option<u64>,
    pub signature_ok: bool,
    pub offset_ok: bool,
}

impl BlockCheck {
    pub fn is_ok(&self) -> bool {
        self.signature_ok
            && self.offset_ok
            && self.declared_transactions.map_or(true, |n| n == self.transactions)
    }
}

/// Recomputes boundary signatures over an in-memory log read forward.
///
/// A boundary signs the bytes between the previous boundary (or the start of
/// the log) and itself. Boundaries without a `Signature` only get their
/// offset and count checked.
#[derive(Debug, Clone)]
pub struct BlockVerifier<'b> {
    log: &'b [u8],
    block_start: u64,
    transactions: u64,
    failures: u64,
}

impl<'b> BlockVerifier<'b> {
    pub fn new(log: &'b [u8]) -> Self {
        Self {
            log,
            block_start: 0,
            transactions: 0,
            failures: 0,
        }
    }

    /// Boundaries that failed a check
    pub fn failures(&self) -> u64 {
        self.failures
    }
}

impl ApplyTransaction for BlockVerifier<'_> {
    type Output = BlockCheck;

    fn apply(&mut self, tx: &TransactionView<'_>) -> Result<Option<BlockCheck>, ApplyError> {
        if tx.direction.is_backward() {
            return Err(ApplyError::Custom(
                "block signatures are checked reading forward".to_string(),
            ));
        }
        if tx.definition_id() != definition_ids::BLOCK_BOUNDARY {
            self.transactions += 1;
            return Ok(None);
        }

        let block = usize::try_from(self.block_start)
            .ok()
            .zip(usize::try_from(tx.offset).ok())
            .and_then(|(start, end)| self.log.get(start..end))
            .ok_or_else(|| ApplyError::InvalidValue {
                field_id: field_ids::BYTE_OFFSET,
                reason: format!("block {}..{} is outside the log", self.block_start, tx.offset),
            })?;

        let signature_ok = match tx.find(field_ids::SIGNATURE).and_then(|f| tx.bytes(f)) {
            Some(declared) => *declared == block_signature(block),
            None => true,
        };
        let check = BlockCheck {
            block_id: tx.current_block_id,
            offset: tx.offset,
            block_start: self.block_start,
            transactions: self.transactions,
            declared_transactions: tx.uint(field_ids::TRANSACTION_COUNT),
            signature_ok,
            offset_ok: tx.uint(field_ids::BYTE_OFFSET).map_or(true, |o| o == tx.offset),
        };
        if !check.is_ok() {
            self.failures += 1;
            tracing::warn!(
                block_id = check.block_id,
                offset = check.offset,
                signature_ok = check.signature_ok,
                offset_ok = check.offset_ok,
                "block check failed"
            );
        }

        self.block_start = tx.offset + tx.length;
        self.transactions = 0;
        Ok(Some(check))
    }
}
