// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resumable transaction reader
//!
//! A transaction on the wire is
//!
//! ```text
//! definitionId, fieldCount, { fieldId, value, fieldId } × fieldCount, fieldCount, definitionId
//! ```
//!
//! Every framing element is written on both sides of what it frames, so the
//! byte sequence reads the same way from either end. One state machine covers
//! both directions; only the compressed-integer cursor and the placement of
//! payload bytes depend on [`Direction`].
//!
//! Two cursors drive the machine:
//!
//! - `state`: which primitive is in progress (a compressed number or raw field bytes)
//! - `tx_state`: the last framing element completed, which decides what the
//!   next finished number means
//!
//! All decode state lives in the reader, so input can arrive one buffer at a
//! time and a transaction may span any number of buffers.

mod error;
pub mod stream;
mod view;

pub use error::{Element, ReadError};
pub use stream::{collect_transactions, read_backward, read_forward, DEFAULT_BLOCK_SIZE};
pub use view::{Completed, FieldData, TransactionView, Value};

use crate::apply::builtin::{self, BlockState};
use crate::apply::ApplyTransaction;
use crate::codec::{ByteCursor, CodecError, CompressedDecoder, Direction};
use crate::config::ReaderConfig;
use crate::pool::{BufferChain, FieldBufferPool, ValueSpan};
use crate::schema::{field_ids, DataType, Definition, FieldDefinition, Schema};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Corruption guard on the declared field count of one transaction
pub const MAX_FIELD_COUNT: usize = 4096;
/// Corruption guard on the declared length of one string/bytes value
pub const DEFAULT_MAX_VALUE_LENGTH: usize = 64 * 1024 * 1024;

/// Primitive currently being decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    CompressedNumber,
    FieldBytes,
}

/// Last framing element completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    DefinitionIdDone,
    FieldCountDone,
    FieldIdDone,
    FieldValueLengthDone,
    FieldBytesDone,
    SecondaryFieldValueLengthDone,
    SecondaryFieldIdDone,
    SecondaryFieldCountDone,
    /// Between transactions
    SecondaryDefinitionIdDone,
}

/// Cooperative stop flag, checked between transactions
#[derive(Debug, Clone, Default)]
pub struct HaltHandle {
    flag: Arc<AtomicBool>,
}

impl HaltHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn halt(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.flag.store(false, Ordering::Release);
    }

    pub fn is_halted(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Result of feeding one buffer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferOutcome {
    /// Transactions completed inside this buffer
    pub transactions: u64,
    /// Bytes of the buffer consumed
    pub consumed: usize,
    /// Stopped early at a transaction boundary because of the halt flag
    pub halted: bool,
}

/// State of the reader once a stream has been consumed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadSummary {
    pub direction: Direction,
    pub transactions: u64,
    pub position: u64,
    pub current_block_id: u64,
    pub invalid_transactions: Vec<u64>,
    pub halted: bool,
}

/// Decodes transactions from a byte stream and dispatches them to an applier
pub struct TransactionReader<A> {
    schema: Arc<Schema>,
    applier: A,
    direction: Direction,
    max_field_count: usize,
    max_value_length: usize,
    halt: HaltHandle,

    state: ReadState,
    tx_state: TxState,
    number: CompressedDecoder,
    bytes_remaining: usize,

    /// Forward: offset of the next byte. Backward: offset just past the next byte.
    position: u64,
    /// Position when the current transaction started
    tx_mark: u64,

    definition_id: u64,
    definition: Option<Arc<Definition>>,
    field_count: usize,
    fields: Vec<FieldData>,

    field: Option<Arc<FieldDefinition>>,
    field_id: u64,
    field_value: u64,
    field_span: Option<ValueSpan>,
    field_null: bool,
    chain: BufferChain,

    block: BlockState,
    transactions_read: u64,
    failed: bool,
}

impl<A: ApplyTransaction> TransactionReader<A> {
    /// Reader for a stream consumed from its first byte
    pub fn forward(schema: Arc<Schema>, applier: A) -> Self {
        Self::new(schema, applier, Direction::Forward, 0)
    }

    /// Reader for a stream of `stream_length` bytes consumed from its last byte
    pub fn backward(schema: Arc<Schema>, applier: A, stream_length: u64) -> Self {
        Self::new(schema, applier, Direction::Backward, stream_length)
    }

    fn new(schema: Arc<Schema>, applier: A, direction: Direction, position: u64) -> Self {
        Self {
            schema,
            applier,
            direction,
            max_field_count: MAX_FIELD_COUNT,
            max_value_length: DEFAULT_MAX_VALUE_LENGTH,
            halt: HaltHandle::default(),
            state: ReadState::CompressedNumber,
            tx_state: TxState::SecondaryDefinitionIdDone,
            number: CompressedDecoder::new(),
            bytes_remaining: 0,
            position,
            tx_mark: position,
            definition_id: 0,
            definition: None,
            field_count: 0,
            fields: Vec::new(),
            field: None,
            field_id: 0,
            field_value: 0,
            field_span: None,
            field_null: false,
            chain: BufferChain::new(Arc::new(FieldBufferPool::default())),
            block: BlockState::default(),
            transactions_read: 0,
            failed: false,
        }
    }

    /// Share a buffer pool with other readers
    pub fn with_pool(mut self, pool: Arc<FieldBufferPool>) -> Self {
        self.chain = BufferChain::new(pool);
        self
    }

    /// Lower the field-count guard (it never exceeds [`MAX_FIELD_COUNT`])
    pub fn with_max_field_count(mut self, limit: usize) -> Self {
        self.max_field_count = limit.min(MAX_FIELD_COUNT);
        self
    }

    pub fn with_max_value_length(mut self, limit: usize) -> Self {
        self.max_value_length = limit;
        self
    }

    pub fn with_halt(mut self, halt: HaltHandle) -> Self {
        self.halt = halt;
        self
    }

    pub fn with_config(self, config: &ReaderConfig) -> Self {
        self.with_max_field_count(config.max_field_count)
            .with_max_value_length(config.max_value_length)
            .with_pool(FieldBufferPool::shared(
                config.chunk_size,
                config.retained_chunks,
            ))
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn applier(&self) -> &A {
        &self.applier
    }

    pub fn applier_mut(&mut self) -> &mut A {
        &mut self.applier
    }

    pub fn into_applier(self) -> A {
        self.applier
    }

    pub fn halt_handle(&self) -> HaltHandle {
        self.halt.clone()
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn state(&self) -> ReadState {
        self.state
    }

    pub fn tx_state(&self) -> TxState {
        self.tx_state
    }

    pub fn current_block_id(&self) -> u64 {
        self.block.current_block_id
    }

    /// Transactions of the current block refused by bookkeeping or listed by its boundary
    pub fn invalid_transactions(&self) -> &[u64] {
        &self.block.invalid_transactions
    }

    pub fn transactions_read(&self) -> u64 {
        self.transactions_read
    }

    /// True between transactions, with nothing half-decoded
    pub fn is_at_boundary(&self) -> bool {
        self.state == ReadState::CompressedNumber
            && self.tx_state == TxState::SecondaryDefinitionIdDone
            && !self.number.in_progress()
    }

    /// Start a new stream at `position`, dropping all decode and block state
    pub fn reset_at(&mut self, position: u64) {
        self.state = ReadState::CompressedNumber;
        self.tx_state = TxState::SecondaryDefinitionIdDone;
        self.number.reset();
        self.bytes_remaining = 0;
        self.position = position;
        self.tx_mark = position;
        self.definition = None;
        self.fields.clear();
        self.field = None;
        self.field_span = None;
        self.chain.release();
        self.block = BlockState::default();
        self.transactions_read = 0;
        self.failed = false;
    }

    /// Feed a whole buffer
    pub fn process_buffer<F>(&mut self, buf: &[u8], on_complete: F) -> Result<BufferOutcome, ReadError>
    where
        F: FnMut(Completed<'_, A::Output>),
    {
        self.process_buffer_from(buf, 0, on_complete)
    }

    /// Feed `buf`, ignoring its first `offset` bytes.
    ///
    /// Backward readers expect each buffer to be the block that immediately
    /// precedes everything fed so far.
    pub fn process_buffer_from<F>(
        &mut self,
        buf: &[u8],
        offset: usize,
        mut on_complete: F,
    ) -> Result<BufferOutcome, ReadError>
    where
        F: FnMut(Completed<'_, A::Output>),
    {
        if self.failed {
            return Err(ReadError::Poisoned);
        }
        let mut cursor = ByteCursor::with_offset(buf, self.direction, offset);
        let available = cursor.remaining();
        let mut outcome = BufferOutcome::default();

        let result = self.run(&mut cursor, &mut on_complete, &mut outcome);
        outcome.consumed = available - cursor.remaining();

        match result {
            Ok(()) => Ok(outcome),
            Err(e) => {
                self.failed = true;
                self.fields.clear();
                self.chain.release();
                Err(e)
            }
        }
    }

    /// Declare the end of the stream.
    ///
    /// Fails when a transaction was started but not completed.
    pub fn finish(&mut self) -> Result<ReadSummary, ReadError> {
        if self.failed {
            return Err(ReadError::Poisoned);
        }
        if !self.is_at_boundary() {
            self.failed = true;
            self.fields.clear();
            self.chain.release();
            let pending = self.position.abs_diff(self.tx_mark);
            let position = self.position;
            return Err(match self.direction {
                Direction::Forward => ReadError::Truncated { pending, position },
                Direction::Backward => ReadError::TruncatedBackward { pending, position },
            });
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> ReadSummary {
        ReadSummary {
            direction: self.direction,
            transactions: self.transactions_read,
            position: self.position,
            current_block_id: self.block.current_block_id,
            invalid_transactions: self.block.invalid_transactions.clone(),
            halted: self.halt.is_halted(),
        }
    }

    fn run<F>(
        &mut self,
        cursor: &mut ByteCursor<'_>,
        on_complete: &mut F,
        outcome: &mut BufferOutcome,
    ) -> Result<(), ReadError>
    where
        F: FnMut(Completed<'_, A::Output>),
    {
        while !cursor.is_empty() {
            if self.is_at_boundary() && self.halt.is_halted() {
                outcome.halted = true;
                return Ok(());
            }
            let complete = match self.state {
                ReadState::FieldBytes => {
                    self.consume_field_bytes(cursor);
                    false
                }
                ReadState::CompressedNumber => self.consume_number_byte(cursor)?,
            };
            if complete {
                self.complete_transaction(on_complete)?;
                outcome.transactions += 1;
            }
        }
        outcome.halted = self.is_at_boundary() && self.halt.is_halted();
        Ok(())
    }

    fn advance(&mut self, n: usize) {
        match self.direction {
            Direction::Forward => self.position += n as u64,
            Direction::Backward => self.position = self.position.saturating_sub(n as u64),
        }
    }

    /// Offset of the byte consumed most recently
    fn last_consumed(&self) -> u64 {
        match self.direction {
            Direction::Forward => self.position.saturating_sub(1),
            Direction::Backward => self.position,
        }
    }

    fn consume_number_byte(&mut self, cursor: &mut ByteCursor<'_>) -> Result<bool, ReadError> {
        let Some(byte) = cursor.next_byte() else {
            return Ok(false);
        };
        if self.tx_state == TxState::SecondaryDefinitionIdDone && !self.number.in_progress() {
            self.tx_mark = self.position;
        }
        self.advance(1);
        let position = self.last_consumed();

        match self.number.feed(byte, self.direction) {
            Ok(Some(value)) => self.on_number(value, position),
            Ok(None) => Ok(false),
            Err(CodecError::InvalidMarker { marker }) => {
                Err(ReadError::InvalidMarker { marker, position })
            }
            Err(CodecError::MarkerMismatch { expected, found }) => Err(ReadError::MarkerMismatch {
                expected,
                found,
                position,
            }),
            Err(CodecError::Truncated { .. }) => Err(ReadError::Truncated {
                pending: self.position.abs_diff(self.tx_mark),
                position,
            }),
        }
    }

    fn consume_field_bytes(&mut self, cursor: &mut ByteCursor<'_>) {
        let Some(span) = self.field_span else {
            self.state = ReadState::CompressedNumber;
            return;
        };
        let slice = cursor.take(self.bytes_remaining);
        let n = slice.len();
        if n == 0 {
            return;
        }
        // Backward cursors hand out the slice that ends where the unfilled
        // part of the span ends, so both directions copy in buffer order.
        let offset = match self.direction {
            Direction::Forward => span.data_length - self.bytes_remaining,
            Direction::Backward => self.bytes_remaining - n,
        };
        self.chain.write(&span, offset, slice);
        self.bytes_remaining -= n;
        self.advance(n);

        if self.bytes_remaining == 0 {
            self.state = ReadState::CompressedNumber;
            self.tx_state = TxState::FieldBytesDone;
        }
    }

    /// Interpret a finished compressed number according to `tx_state`
    fn on_number(&mut self, value: u64, position: u64) -> Result<bool, ReadError> {
        match self.tx_state {
            TxState::SecondaryDefinitionIdDone => {
                let definition = self
                    .schema
                    .resolve_definition(value)
                    .ok_or(ReadError::UnknownDefinition { id: value, position })?;
                tracing::trace!(definition_id = value, position, "definition id");
                self.definition_id = value;
                self.definition = Some(definition);
                self.fields.clear();
                self.tx_state = TxState::DefinitionIdDone;
            }
            TxState::DefinitionIdDone => {
                if value > self.max_field_count as u64 {
                    return Err(ReadError::FieldCountLimit {
                        count: value,
                        limit: self.max_field_count,
                        position,
                    });
                }
                self.field_count = value as usize;
                self.fields.reserve(self.field_count);
                self.tx_state = TxState::FieldCountDone;
            }
            TxState::FieldCountDone | TxState::SecondaryFieldIdDone => {
                if self.fields.len() == self.field_count {
                    expect_match(Element::FieldCount, self.field_count as u64, value, position)?;
                    self.tx_state = TxState::SecondaryFieldCountDone;
                } else {
                    self.begin_field(value, position)?;
                }
            }
            TxState::FieldIdDone => self.on_field_value(value, position)?,
            TxState::FieldValueLengthDone | TxState::SecondaryFieldValueLengthDone => {
                self.end_field(value, position)?;
            }
            TxState::FieldBytesDone => {
                if self.field.as_ref().is_some_and(|f| f.is_nullable()) {
                    expect_match(Element::FieldValueLength, self.field_value, value, position)?;
                    self.tx_state = TxState::SecondaryFieldValueLengthDone;
                } else {
                    self.end_field(value, position)?;
                }
            }
            TxState::SecondaryFieldCountDone => {
                expect_match(Element::DefinitionId, self.definition_id, value, position)?;
                self.tx_state = TxState::SecondaryDefinitionIdDone;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn begin_field(&mut self, id: u64, position: u64) -> Result<(), ReadError> {
        let field = self
            .schema
            .resolve_field(id)
            .ok_or(ReadError::UnknownField { id, position })?;
        tracing::trace!(field_id = id, position, "field id");

        self.field_id = id;
        self.field_value = 0;
        self.field_span = None;
        self.field_null = false;
        self.tx_state = TxState::FieldIdDone;
        // Fixed-size payloads follow the field id without a length
        if let Some(size) = field.field_data_size() {
            self.start_field_bytes(size);
        }
        self.field = Some(field);
        Ok(())
    }

    fn on_field_value(&mut self, value: u64, position: u64) -> Result<(), ReadError> {
        let nullable = self.field.as_ref().is_some_and(|f| f.is_nullable());
        self.field_value = value;
        self.tx_state = TxState::FieldValueLengthDone;
        if !nullable {
            return Ok(());
        }
        if value == 0 {
            self.field_null = true;
            return Ok(());
        }
        let length = value - 1;
        let length = usize::try_from(length)
            .ok()
            .filter(|l| *l <= self.max_value_length)
            .ok_or(ReadError::ValueLengthLimit {
                length,
                limit: self.max_value_length,
                position,
            })?;
        self.start_field_bytes(length);
        Ok(())
    }

    fn start_field_bytes(&mut self, length: usize) {
        self.field_span = Some(self.chain.reserve(length));
        if length == 0 {
            self.tx_state = TxState::FieldBytesDone;
        } else {
            self.bytes_remaining = length;
            self.state = ReadState::FieldBytes;
        }
    }

    fn end_field(&mut self, second_id: u64, position: u64) -> Result<(), ReadError> {
        expect_match(Element::FieldId, self.field_id, second_id, position)?;
        let field = self
            .field
            .take()
            .ok_or(ReadError::UnknownField { id: second_id, position })?;
        self.fields.push(FieldData {
            field,
            numeric_value: self.field_value,
            span: self.field_span.take(),
            is_null: self.field_null,
        });
        self.tx_state = TxState::SecondaryFieldIdDone;
        Ok(())
    }

    fn complete_transaction<F>(&mut self, on_complete: &mut F) -> Result<(), ReadError>
    where
        F: FnMut(Completed<'_, A::Output>),
    {
        if self.direction.is_backward() {
            self.fields.reverse();
        }
        let (offset, length) = match self.direction {
            Direction::Forward => (self.tx_mark, self.position - self.tx_mark),
            Direction::Backward => (self.position, self.tx_mark - self.position),
        };
        let definition = self.definition.take().ok_or(ReadError::UnknownDefinition {
            id: self.definition_id,
            position: offset,
        })?;
        let transaction_id = self
            .fields
            .iter()
            .find(|f| f.id() == field_ids::ID && f.data_type() == DataType::UInt)
            .map(|f| f.numeric_value)
            .unwrap_or(offset);

        let mut view = TransactionView {
            transaction_id,
            offset,
            length,
            definition: &definition,
            fields: &self.fields,
            timestamp: TransactionView::first_timestamp(&self.fields),
            current_block_id: self.block.current_block_id,
            direction: self.direction,
            valid: true,
            schema: self.schema.as_ref(),
            chain: &self.chain,
        };

        let verdict = builtin::apply(&view, &mut self.block)
            .map_err(|source| ReadError::Apply {
                transaction_id,
                source,
            })?;
        view.valid = verdict.is_valid();
        view.current_block_id = self.block.current_block_id;

        let relevant_object = self
            .applier
            .apply(&view)
            .map_err(|source| ReadError::Apply {
                transaction_id,
                source,
            })?;

        tracing::debug!(
            transaction_id,
            definition = definition.name(),
            fields = self.fields.len(),
            valid = view.valid,
            direction = %self.direction,
            "transaction decoded"
        );

        on_complete(Completed {
            view,
            relevant_object,
        });

        self.chain.release();
        self.fields.clear();
        self.transactions_read += 1;
        Ok(())
    }
}

fn expect_match(element: Element, first: u64, second: u64, position: u64) -> Result<(), ReadError> {
    if first == second {
        Ok(())
    } else {
        Err(ReadError::Mismatch {
            element,
            first,
            second,
            position,
        })
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
