// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Field buffer pool
//!
//! Field payloads can straddle input buffers, so the reader copies them into
//! fixed-size chunks borrowed from a shared pool. The chunks used by one
//! transaction form a [`BufferChain`]; a field only records where its bytes
//! live in that chain ([`ValueSpan`]) and is materialized on demand.

use std::borrow::Cow;
use std::sync::{Arc, Mutex};

pub const DEFAULT_CHUNK_SIZE: usize = 4096;
pub const DEFAULT_RETAINED_CHUNKS: usize = 64;

/// Shared free list of fixed-size chunks
#[derive(Debug)]
pub struct FieldBufferPool {
    chunk_size: usize,
    retained: usize,
    free: Mutex<Vec<Box<[u8]>>>,
}

impl Default for FieldBufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_RETAINED_CHUNKS)
    }
}

impl FieldBufferPool {
    /// Pool of `chunk_size` chunks keeping at most `retained` idle ones
    pub fn new(chunk_size: usize, retained: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            retained,
            free: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(chunk_size: usize, retained: usize) -> Arc<Self> {
        Arc::new(Self::new(chunk_size, retained))
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of idle chunks ready for reuse
    pub fn available(&self) -> usize {
        self.free.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn acquire(&self) -> Box<[u8]> {
        let reused = self.free.lock().unwrap_or_else(|e| e.into_inner()).pop();
        reused.unwrap_or_else(|| vec![0u8; self.chunk_size].into_boxed_slice())
    }

    pub fn release(&self, chunk: Box<[u8]>) {
        if chunk.len() != self.chunk_size {
            return;
        }
        let mut free = self.free.lock().unwrap_or_else(|e| e.into_inner());
        if free.len() < self.retained {
            free.push(chunk);
        }
    }
}

/// Location of a field value inside a [`BufferChain`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueSpan {
    /// Index of the chunk holding the first byte
    pub first_buffer: usize,
    /// Offset of the first byte inside that chunk
    pub data_start: usize,
    pub data_length: usize,
}

/// Chunks holding the field payloads of the transaction being decoded
#[derive(Debug)]
pub struct BufferChain {
    pool: Arc<FieldBufferPool>,
    chunks: Vec<Box<[u8]>>,
    len: usize,
}

impl BufferChain {
    pub fn new(pool: Arc<FieldBufferPool>) -> Self {
        Self {
            pool,
            chunks: Vec::new(),
            len: 0,
        }
    }

    /// Bytes reserved so far
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Reserve `length` contiguous bytes at the end of the chain
    pub fn reserve(&mut self, length: usize) -> ValueSpan {
        let chunk_size = self.pool.chunk_size();
        let start = self.len;
        self.len += length;
        while self.chunks.len() * chunk_size < self.len {
            self.chunks.push(self.pool.acquire());
        }
        ValueSpan {
            first_buffer: start / chunk_size,
            data_start: start % chunk_size,
            data_length: length,
        }
    }

    /// Copy `src` into `span` starting `offset` bytes into the span
    pub fn write(&mut self, span: &ValueSpan, offset: usize, src: &[u8]) {
        debug_assert!(offset + src.len() <= span.data_length);
        let chunk_size = self.pool.chunk_size();
        let mut position = span.first_buffer * chunk_size + span.data_start + offset;
        let mut src = src;
        while !src.is_empty() {
            let chunk = position / chunk_size;
            let within = position % chunk_size;
            let n = (chunk_size - within).min(src.len());
            self.chunks[chunk][within..within + n].copy_from_slice(&src[..n]);
            src = &src[n..];
            position += n;
        }
    }

    /// Bytes of `span`, borrowed when they sit inside a single chunk
    pub fn read(&self, span: &ValueSpan) -> Cow<'_, [u8]> {
        if span.data_length == 0 {
            return Cow::Borrowed(&[]);
        }
        let chunk_size = self.pool.chunk_size();
        let end = span.data_start + span.data_length;
        if end <= chunk_size {
            return Cow::Borrowed(&self.chunks[span.first_buffer][span.data_start..end]);
        }
        let mut out = Vec::with_capacity(span.data_length);
        self.copy_to(span, &mut out);
        Cow::Owned(out)
    }

    /// Append the bytes of `span` to `out`
    pub fn copy_to(&self, span: &ValueSpan, out: &mut Vec<u8>) {
        let chunk_size = self.pool.chunk_size();
        let mut position = span.first_buffer * chunk_size + span.data_start;
        let mut remaining = span.data_length;
        while remaining > 0 {
            let chunk = position / chunk_size;
            let within = position % chunk_size;
            let n = (chunk_size - within).min(remaining);
            out.extend_from_slice(&self.chunks[chunk][within..within + n]);
            remaining -= n;
            position += n;
        }
    }

    /// Hand every chunk back to the pool
    pub fn release(&mut self) {
        for chunk in self.chunks.drain(..) {
            self.pool.release(chunk);
        }
        self.len = 0;
    }
}

impl Drop for BufferChain {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
