// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing wrapper for application strategies

use super::{ApplyError, ApplyTransaction};
use crate::reader::TransactionView;

/// Wrapper that adds tracing to any strategy
#[derive(Debug, Clone, Default)]
pub struct TracedApplier<A> {
    inner: A,
    name: &'static str,
}

impl<A: ApplyTransaction> TracedApplier<A> {
    /// `name` identifies the strategy in log output (e.g. "cache", "log")
    pub fn new(name: &'static str, inner: A) -> Self {
        Self { inner, name }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }

    pub fn into_inner(self) -> A {
        self.inner
    }
}

impl<A: ApplyTransaction> ApplyTransaction for TracedApplier<A> {
    type Output = A::Output;

    fn apply(&mut self, tx: &TransactionView<'_>) -> Result<Option<Self::Output>, ApplyError> {
        let span = tracing::info_span!(
            "tx.apply",
            strategy = self.name,
            transaction_id = tx.transaction_id,
            definition_id = tx.definition_id(),
        );
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.apply(tx);
        let elapsed_us = start.elapsed().as_micros() as u64;

        match &result {
            Ok(output) => tracing::debug!(
                elapsed_us,
                produced = output.is_some(),
                valid = tx.valid,
                "applied"
            ),
            Err(e) => tracing::error!(elapsed_us, error = %e, "apply failed"),
        }
        result
    }
}
