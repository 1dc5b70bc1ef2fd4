// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! lumity-core: codec for the Lumity transaction log
//!
//! This crate provides:
//! - The compressed integer encoding and a direction-aware byte cursor
//! - The schema of definitions and fields, with bootstrap defaults
//! - A resumable transaction reader that decodes forward or backward
//! - Application strategies (plain log, cache loader, block checks)
//! - A transaction encoder and a buffered log writer

pub mod clock;
pub mod codec;
pub mod config;
pub mod pool;
pub mod schema;

pub mod apply;
pub mod flush;
pub mod reader;
pub mod writer;

pub use apply::{
    ApplyError, ApplyTransaction, BlockCheck, BlockVerifier, CacheAction, CacheLoader,
    ContentCache, DecodedTransaction, FnApplier, MemoryCache, NoopApplier, Record,
    RecordBindings, TracedApplier, TransactionLog,
};
pub use clock::{Clock, SystemClock};
pub use codec::{CodecError, Direction};
pub use config::{ConfigError, LumityConfig, ReaderConfig};
pub use flush::{BufferQueue, FlushPolicy, Priority};
pub use pool::FieldBufferPool;
pub use reader::{
    read_backward, read_forward, Completed, HaltHandle, ReadError, ReadSummary,
    TransactionReader, TransactionView, Value,
};
pub use schema::{DataType, Definition, FieldDefinition, Schema, SchemaError};
pub use writer::{LogWriter, TransactionBuilder, WriteError};
