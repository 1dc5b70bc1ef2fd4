// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transaction application
//!
//! Once a transaction has been decoded and validated the reader performs its
//! own bookkeeping ([`builtin`]) and then hands the view to an
//! [`ApplyTransaction`] strategy. Whatever the strategy returns is passed on
//! to the completion callback as the relevant object.

mod blocks;
pub(crate) mod builtin;
mod cache;
mod latest;
mod log;
mod special;
mod traced;

pub use blocks::{BlockCheck, BlockVerifier};
pub use cache::{
    CacheAction, CacheError, CacheLoader, ContentCache, MemoryCache, Record, RecordBindings,
    RecordUpdate,
};
pub use latest::{FieldWrite, LatestFieldValues};
pub use log::{DecodedField, DecodedTransaction, TransactionLog};
pub use special::SpecialFields;
pub use traced::TracedApplier;

use crate::reader::TransactionView;
use std::marker::PhantomData;
use thiserror::Error;

/// Errors raised while applying a transaction. All of them stop the reader.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("{definition} transaction is missing its {field} field")]
    MissingSpecialField {
        definition: &'static str,
        field: &'static str,
    },
    #[error("invalid value for field {field_id}: {reason}")]
    InvalidValue { field_id: u64, reason: String },
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("{0}")]
    Custom(String),
}

/// Strategy applied to every decoded transaction
pub trait ApplyTransaction {
    /// The relevant object produced for a transaction
    type Output;

    fn apply(&mut self, tx: &TransactionView<'_>) -> Result<Option<Self::Output>, ApplyError>;
}

impl<A: ApplyTransaction + ?Sized> ApplyTransaction for Box<A> {
    type Output = A::Output;

    fn apply(&mut self, tx: &TransactionView<'_>) -> Result<Option<Self::Output>, ApplyError> {
        (**self).apply(tx)
    }
}

impl<A: ApplyTransaction + ?Sized> ApplyTransaction for &mut A {
    type Output = A::Output;

    fn apply(&mut self, tx: &TransactionView<'_>) -> Result<Option<Self::Output>, ApplyError> {
        (**self).apply(tx)
    }
}

/// Strategy that only lets built-in bookkeeping run
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopApplier;

impl ApplyTransaction for NoopApplier {
    type Output = ();

    fn apply(&mut self, _tx: &TransactionView<'_>) -> Result<Option<()>, ApplyError> {
        Ok(None)
    }
}

/// Strategy backed by a closure
pub struct FnApplier<F, T> {
    f: F,
    _output: PhantomData<fn() -> T>,
}

impl<F, T> FnApplier<F, T>
where
    F: FnMut(&TransactionView<'_>) -> Result<Option<T>, ApplyError>,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _output: PhantomData,
        }
    }
}

impl<F, T> ApplyTransaction for FnApplier<F, T>
where
    F: FnMut(&TransactionView<'_>) -> Result<Option<T>, ApplyError>,
{
    type Output = T;

    fn apply(&mut self, tx: &TransactionView<'_>) -> Result<Option<T>, ApplyError> {
        (self.f)(tx)
    }
}

#[cfg(test)]
#[path = "apply_tests.rs"]
mod tests;
