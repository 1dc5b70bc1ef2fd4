// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream drivers
//!
//! The reader never performs I/O itself; these helpers pull blocks out of a
//! source and feed them in the order the reader's direction expects.

use super::{Completed, ReadError, ReadSummary, TransactionReader};
use crate::apply::{ApplyTransaction, DecodedTransaction, TransactionLog};
use crate::codec::Direction;
use crate::schema::Schema;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::sync::Arc;

/// Default size of the blocks read from a source
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Read `source` front to back in `block_size` chunks until EOF or halt
pub fn read_forward<A, R, F>(
    reader: &mut TransactionReader<A>,
    mut source: R,
    block_size: usize,
    mut on_complete: F,
) -> Result<ReadSummary, ReadError>
where
    A: ApplyTransaction,
    R: Read,
    F: FnMut(Completed<'_, A::Output>),
{
    if reader.direction() != Direction::Forward {
        return Err(ReadError::WrongDirection {
            operation: "read_forward",
            expected: Direction::Forward,
        });
    }
    let span = tracing::info_span!("log.read", direction = "forward", block_size);
    let _guard = span.enter();

    let mut block = vec![0u8; block_size.max(1)];
    loop {
        let n = match source.read(&mut block) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(fail(e.into())),
        };
        let outcome = reader
            .process_buffer(&block[..n], &mut on_complete)
            .map_err(fail)?;
        if outcome.halted {
            tracing::info!(position = reader.position(), "read halted");
            return Ok(reader.summary());
        }
    }

    let summary = reader.finish().map_err(fail)?;
    tracing::debug!(
        transactions = summary.transactions,
        bytes = summary.position,
        "read complete"
    );
    Ok(summary)
}

/// Read `source` from its end toward its start in `block_size` blocks.
///
/// Each block is the one that immediately precedes the previous block, so
/// the reader sees one continuous reversed stream.
pub fn read_backward<A, R, F>(
    reader: &mut TransactionReader<A>,
    mut source: R,
    block_size: usize,
    mut on_complete: F,
) -> Result<ReadSummary, ReadError>
where
    A: ApplyTransaction,
    R: Read + Seek,
    F: FnMut(Completed<'_, A::Output>),
{
    if reader.direction() != Direction::Backward {
        return Err(ReadError::WrongDirection {
            operation: "read_backward",
            expected: Direction::Backward,
        });
    }
    let block_size = block_size.max(1);
    let length = source.seek(SeekFrom::End(0)).map_err(|e| fail(e.into()))?;
    let span = tracing::info_span!("log.read", direction = "backward", block_size, length);
    let _guard = span.enter();

    reader.reset_at(length);
    let mut block = vec![0u8; block_size];
    let mut end = length;
    while end > 0 {
        let start = end.saturating_sub(block_size as u64);
        let n = (end - start) as usize;
        source
            .seek(SeekFrom::Start(start))
            .and_then(|_| source.read_exact(&mut block[..n]))
            .map_err(|e| fail(e.into()))?;

        let outcome = reader
            .process_buffer(&block[..n], &mut on_complete)
            .map_err(fail)?;
        if outcome.halted {
            tracing::info!(position = reader.position(), "read halted");
            return Ok(reader.summary());
        }
        end = start;
    }

    let summary = reader.finish().map_err(fail)?;
    tracing::debug!(transactions = summary.transactions, "read complete");
    Ok(summary)
}

/// Decode a whole in-memory log in one direction
pub fn collect_transactions(
    schema: Arc<Schema>,
    bytes: &[u8],
    direction: Direction,
) -> Result<Vec<DecodedTransaction>, ReadError> {
    let mut reader = match direction {
        Direction::Forward => TransactionReader::forward(schema, TransactionLog::new()),
        Direction::Backward => {
            TransactionReader::backward(schema, TransactionLog::new(), bytes.len() as u64)
        }
    };
    let mut transactions = Vec::new();
    reader.process_buffer(bytes, |done| {
        if let Some(tx) = done.relevant_object {
            transactions.push(tx);
        }
    })?;
    reader.finish()?;
    Ok(transactions)
}

fn fail(error: ReadError) -> ReadError {
    tracing::error!(error = %error, position = ?error.position(), "log read failed");
    error
}
