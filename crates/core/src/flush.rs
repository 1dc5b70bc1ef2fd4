// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Buffered log output
//!
//! Encoded transactions are queued in memory and written to the sink when
//! the queue grows past a size threshold, when the flush interval has
//! elapsed, or immediately for high-priority writes. The queue is an owned
//! value; share it behind `Arc<Mutex<_>>` to drive it from a timer task.

use crate::clock::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// When queued bytes are written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlushPolicy {
    /// Flush as soon as this many bytes are pending
    pub size_threshold: usize,
    /// Flush pending bytes at least this often
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for FlushPolicy {
    fn default() -> Self {
        Self {
            size_threshold: 64 * 1024,
            interval: Duration::from_millis(250),
        }
    }
}

impl FlushPolicy {
    /// Write every push through immediately
    pub fn immediate() -> Self {
        Self {
            size_threshold: 0,
            interval: Duration::ZERO,
        }
    }
}

/// Urgency of a queued write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    /// Flushed together with everything queued before it
    High,
}

/// Pending output in front of a sink
#[derive(Debug)]
pub struct BufferQueue<W, C = SystemClock> {
    sink: W,
    clock: C,
    policy: FlushPolicy,
    pending: Vec<u8>,
    last_flush: Instant,
    flushes: u64,
    written: u64,
}

impl<W: Write> BufferQueue<W> {
    pub fn new(sink: W, policy: FlushPolicy) -> Self {
        Self::with_clock(sink, policy, SystemClock)
    }
}

impl<W: Write, C: Clock> BufferQueue<W, C> {
    pub fn with_clock(sink: W, policy: FlushPolicy, clock: C) -> Self {
        let last_flush = clock.now();
        Self {
            sink,
            clock,
            policy,
            pending: Vec::with_capacity(policy.size_threshold.min(1 << 20)),
            last_flush,
            flushes: 0,
            written: 0,
        }
    }

    pub fn policy(&self) -> FlushPolicy {
        self.policy
    }

    /// Queue `bytes`, flushing when the policy says so.
    ///
    /// Returns whether a flush happened.
    pub fn push(&mut self, bytes: &[u8], priority: Priority) -> io::Result<bool> {
        self.pending.extend_from_slice(bytes);
        if priority == Priority::High || self.is_due() {
            self.flush()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Whether pending bytes should be written now
    pub fn is_due(&self) -> bool {
        if self.pending.is_empty() {
            return false;
        }
        self.pending.len() >= self.policy.size_threshold
            || self.clock.since(self.last_flush) >= self.policy.interval
    }

    /// Flush if the interval has elapsed. Meant to be called from a timer.
    pub fn tick(&mut self) -> io::Result<bool> {
        if self.is_due() {
            self.flush()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Write everything pending to the sink and flush it
    pub fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            self.sink.write_all(&self.pending)?;
            self.written += self.pending.len() as u64;
            tracing::trace!(bytes = self.pending.len(), "flushed log buffer");
            self.pending.clear();
            self.flushes += 1;
        }
        self.sink.flush()?;
        self.last_flush = self.clock.now();
        Ok(())
    }

    /// Flush only when something is pending
    pub fn flush_if_pending(&mut self) -> io::Result<bool> {
        if self.pending.is_empty() {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of flushes that wrote bytes
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }

    /// Bytes handed to the sink so far
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Flush and return the sink
    pub fn into_inner(mut self) -> io::Result<W> {
        self.flush()?;
        Ok(self.sink)
    }
}

/// Periodically flush a shared queue on the tokio runtime.
///
/// The task runs until aborted; abort it and call [`BufferQueue::flush`] on
/// shutdown.
pub fn spawn_periodic_flush<W, C>(queue: Arc<Mutex<BufferQueue<W, C>>>) -> JoinHandle<()>
where
    W: Write + Send + 'static,
    C: Clock + 'static,
{
    let period = {
        let queue = queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.policy().interval.max(Duration::from_millis(1))
    };
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let mut queue = queue.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(e) = queue.flush_if_pending() {
                tracing::warn!(error = %e, "periodic log flush failed");
            }
        }
    })
}

#[cfg(test)]
#[path = "flush_tests.rs"]
mod tests;
