// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transaction encoding and log appends

use crate::clock::{Clock, SystemClock};
use crate::codec::{encode_u64, zigzag_encode};
use crate::flush::{BufferQueue, FlushPolicy, Priority};
use crate::reader::{Value, MAX_FIELD_COUNT};
use crate::schema::{definition_ids, field_ids, DataType, Schema};
use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Definition does not exist with ID {0}")]
    UnknownDefinition(u64),
    #[error("Field does not exist with ID {0}")]
    UnknownField(u64),
    #[error("field {field_id} holds {expected} values, got {found}")]
    TypeMismatch {
        field_id: u64,
        expected: DataType,
        found: Value,
    },
    #[error("{count} fields exceed the limit of {limit}")]
    TooManyFields { count: usize, limit: usize },
    #[error("{definition} cannot be instanced")]
    NotInstanceable { definition: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A transaction under construction
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    definition_id: u64,
    fields: Vec<(u64, Value)>,
}

impl TransactionBuilder {
    pub fn new(definition_id: u64) -> Self {
        Self {
            definition_id,
            fields: Vec::new(),
        }
    }

    pub fn definition_id(&self) -> u64 {
        self.definition_id
    }

    pub fn fields(&self) -> &[(u64, Value)] {
        &self.fields
    }

    pub fn field(mut self, field_id: u64, value: Value) -> Self {
        self.fields.push((field_id, value));
        self
    }

    pub fn uint(self, field_id: u64, value: u64) -> Self {
        self.field(field_id, Value::UInt(value))
    }

    pub fn int(self, field_id: u64, value: i64) -> Self {
        self.field(field_id, Value::Int(value))
    }

    pub fn float4(self, field_id: u64, value: f32) -> Self {
        self.field(field_id, Value::Float4(value))
    }

    pub fn float8(self, field_id: u64, value: f64) -> Self {
        self.field(field_id, Value::Float8(value))
    }

    pub fn string(self, field_id: u64, value: impl Into<String>) -> Self {
        self.field(field_id, Value::String(value.into()))
    }

    pub fn bytes(self, field_id: u64, value: impl Into<Vec<u8>>) -> Self {
        self.field(field_id, Value::Bytes(value.into()))
    }

    pub fn null(self, field_id: u64) -> Self {
        self.field(field_id, Value::Null)
    }

    /// Append the wire form to `out`, returning the number of bytes written.
    ///
    /// No schema checks; values are written in the shape their variant implies.
    pub fn encode_into(&self, out: &mut Vec<u8>) -> usize {
        let start = out.len();
        encode_u64(self.definition_id, out);
        encode_u64(self.fields.len() as u64, out);
        for (field_id, value) in &self.fields {
            encode_u64(*field_id, out);
            encode_value(value, out);
            encode_u64(*field_id, out);
        }
        encode_u64(self.fields.len() as u64, out);
        encode_u64(self.definition_id, out);
        out.len() - start
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    /// Encode after checking every field against `schema`
    pub fn encode_checked(&self, schema: &Schema) -> Result<Vec<u8>, WriteError> {
        self.check(schema)?;
        Ok(self.encode())
    }

    pub fn check(&self, schema: &Schema) -> Result<(), WriteError> {
        let definition = schema
            .resolve_definition(self.definition_id)
            .ok_or(WriteError::UnknownDefinition(self.definition_id))?;
        if self.definition_id > definition_ids::LAST_RESERVED && !definition.can_instance() {
            return Err(WriteError::NotInstanceable {
                definition: definition.name().to_string(),
            });
        }
        if self.fields.len() > MAX_FIELD_COUNT {
            return Err(WriteError::TooManyFields {
                count: self.fields.len(),
                limit: MAX_FIELD_COUNT,
            });
        }
        for (field_id, value) in &self.fields {
            let field = schema
                .resolve_field(*field_id)
                .ok_or(WriteError::UnknownField(*field_id))?;
            if !value.fits(field.data_type()) {
                return Err(WriteError::TypeMismatch {
                    field_id: *field_id,
                    expected: field.data_type(),
                    found: value.clone(),
                });
            }
        }
        Ok(())
    }
}

fn encode_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Null => encode_u64(0, out),
        Value::UInt(v) => encode_u64(*v, out),
        Value::Int(v) => encode_u64(zigzag_encode(*v), out),
        Value::Float4(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Float8(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::String(s) => encode_payload(s.as_bytes(), out),
        Value::Bytes(b) => encode_payload(b, out),
    }
}

fn encode_payload(payload: &[u8], out: &mut Vec<u8>) {
    let marker = payload.len() as u64 + 1;
    encode_u64(marker, out);
    out.extend_from_slice(payload);
    encode_u64(marker, out);
}

/// CRC-32 of a block's bytes, as stored in a boundary's `Signature` field
pub fn block_signature(block: &[u8]) -> [u8; 4] {
    crc32fast::hash(block).to_le_bytes()
}

/// Appends checked transactions to a sink through a [`BufferQueue`],
/// tracking offsets and block boundaries
pub struct LogWriter<W: Write, C: Clock = SystemClock> {
    schema: Arc<Schema>,
    queue: BufferQueue<W, C>,
    position: u64,
    block_id: u64,
    block_start: u64,
    block_transactions: u64,
    block_hasher: crc32fast::Hasher,
    scratch: Vec<u8>,
}

impl<W: Write> LogWriter<W> {
    /// Writer for a sink that already holds `position` bytes of log
    pub fn new(schema: Arc<Schema>, sink: W, policy: FlushPolicy, position: u64) -> Self {
        Self::with_queue(schema, BufferQueue::new(sink, policy), position)
    }
}

impl<W: Write, C: Clock> LogWriter<W, C> {
    pub fn with_queue(schema: Arc<Schema>, queue: BufferQueue<W, C>, position: u64) -> Self {
        Self {
            schema,
            queue,
            position,
            block_id: 0,
            block_start: position,
            block_transactions: 0,
            block_hasher: crc32fast::Hasher::new(),
            scratch: Vec::new(),
        }
    }

    /// Offset the next transaction will start at
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn queue(&self) -> &BufferQueue<W, C> {
        &self.queue
    }

    /// Append `tx`, returning its transaction id
    pub fn append(&mut self, tx: &TransactionBuilder, priority: Priority) -> Result<u64, WriteError> {
        tx.check(&self.schema)?;
        Ok(self.append_unchecked(tx, priority)?)
    }

    fn append_unchecked(&mut self, tx: &TransactionBuilder, priority: Priority) -> io::Result<u64> {
        self.scratch.clear();
        tx.encode_into(&mut self.scratch);
        let offset = self.position;
        self.queue.push(&self.scratch, priority)?;
        self.block_hasher.update(&self.scratch);
        self.position += self.scratch.len() as u64;
        self.block_transactions += 1;

        let transaction_id = tx
            .fields()
            .iter()
            .find_map(|(id, value)| (*id == field_ids::ID).then(|| value.as_u64()).flatten())
            .unwrap_or(offset);
        tracing::trace!(transaction_id, offset, bytes = self.scratch.len(), "appended");
        Ok(transaction_id)
    }

    /// Close the current block with a signed boundary transaction.
    ///
    /// The boundary is written with high priority, so everything queued
    /// before it reaches the sink.
    pub fn write_block_boundary(&mut self, timestamp: u64) -> Result<u64, WriteError> {
        let block_id = self.block_id + 1;
        let signature = self.block_hasher.clone().finalize().to_le_bytes();
        let boundary = TransactionBuilder::new(definition_ids::BLOCK_BOUNDARY)
            .uint(field_ids::TIMESTAMP, timestamp)
            .uint(field_ids::BLOCK_ID, block_id)
            .uint(field_ids::BYTE_OFFSET, self.position)
            .uint(field_ids::TRANSACTION_COUNT, self.block_transactions)
            .bytes(field_ids::SIGNATURE, signature.to_vec());
        boundary.check(&self.schema)?;

        tracing::debug!(
            block_id,
            transactions = self.block_transactions,
            bytes = self.position - self.block_start,
            "closing block"
        );
        let id = self.append_unchecked(&boundary, Priority::High)?;

        // the boundary itself opens the next block
        self.block_id = block_id;
        self.block_hasher = crc32fast::Hasher::new();
        self.block_start = self.position;
        self.block_transactions = 0;
        Ok(id)
    }

    pub fn flush(&mut self) -> Result<(), WriteError> {
        Ok(self.queue.flush()?)
    }

    pub fn into_inner(self) -> Result<W, WriteError> {
        Ok(self.queue.into_inner()?)
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
