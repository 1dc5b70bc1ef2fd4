// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::apply::ApplyError;
use crate::codec::Direction;
use std::fmt;
use thiserror::Error;

/// Framing element that is written twice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    DefinitionId,
    FieldCount,
    FieldId,
    FieldValueLength,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::DefinitionId => write!(f, "definition id"),
            Element::FieldCount => write!(f, "field count"),
            Element::FieldId => write!(f, "field id"),
            Element::FieldValueLength => write!(f, "field value length"),
        }
    }
}

/// Fatal decode errors. The log segment is unusable past the reported byte.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("{element} mismatch at byte {position}: {first} != {second}")]
    Mismatch {
        element: Element,
        first: u64,
        second: u64,
        position: u64,
    },
    #[error(
        "compressed integer marker mismatch at byte {position}: expected {expected}, found {found}"
    )]
    MarkerMismatch {
        expected: u8,
        found: u8,
        position: u64,
    },
    #[error("invalid compressed integer marker {marker} at byte {position}")]
    InvalidMarker { marker: u8, position: u64 },
    #[error("Definition does not exist with ID {id} (byte {position})")]
    UnknownDefinition { id: u64, position: u64 },
    #[error("Field does not exist with ID {id} (byte {position})")]
    UnknownField { id: u64, position: u64 },
    #[error("field count {count} exceeds the limit of {limit} (byte {position})")]
    FieldCountLimit {
        count: u64,
        limit: usize,
        position: u64,
    },
    #[error("field value length {length} exceeds the limit of {limit} (byte {position})")]
    ValueLengthLimit {
        length: u64,
        limit: usize,
        position: u64,
    },
    #[error("partial bytes ({pending}) of a transaction at the end of the stream (byte {position})")]
    Truncated { pending: u64, position: u64 },
    #[error(
        "partial bytes ({pending}) of a transaction at the start of the stream (byte {position})"
    )]
    TruncatedBackward { pending: u64, position: u64 },
    #[error("transaction {transaction_id} could not be applied: {source}")]
    Apply {
        transaction_id: u64,
        #[source]
        source: ApplyError,
    },
    #[error("reader stopped after an earlier fatal error")]
    Poisoned,
    #[error("{operation} requires a {expected} reader")]
    WrongDirection {
        operation: &'static str,
        expected: Direction,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReadError {
    /// Byte offset the error was detected at, when it has one
    pub fn position(&self) -> Option<u64> {
        match self {
            ReadError::Mismatch { position, .. }
            | ReadError::MarkerMismatch { position, .. }
            | ReadError::InvalidMarker { position, .. }
            | ReadError::UnknownDefinition { position, .. }
            | ReadError::UnknownField { position, .. }
            | ReadError::FieldCountLimit { position, .. }
            | ReadError::ValueLengthLimit { position, .. }
            | ReadError::Truncated { position, .. }
            | ReadError::TruncatedBackward { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Whether the bytes themselves are damaged, as opposed to the log being
    /// cut short or the consumer failing
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            ReadError::Mismatch { .. }
                | ReadError::MarkerMismatch { .. }
                | ReadError::InvalidMarker { .. }
                | ReadError::UnknownDefinition { .. }
                | ReadError::UnknownField { .. }
                | ReadError::FieldCountLimit { .. }
                | ReadError::ValueLengthLimit { .. }
        )
    }
}
