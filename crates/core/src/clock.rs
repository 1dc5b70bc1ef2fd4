// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time source for flush scheduling

use std::time::{Duration, Instant};

/// Monotonic time source a [`BufferQueue`](crate::flush::BufferQueue) measures
/// its flush interval against
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Instant;

    /// Time since `earlier`, zero if `earlier` is in the future
    fn since(&self, earlier: Instant) -> Duration {
        self.now().saturating_duration_since(earlier)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
