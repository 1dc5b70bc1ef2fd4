// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read direction and the byte cursor that walks a buffer in that direction

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order in which a log is traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Oldest transaction first, bytes front-to-back
    #[default]
    Forward,
    /// Newest transaction first, bytes back-to-front
    Backward,
}

impl Direction {
    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Forward)
    }

    pub fn is_backward(self) -> bool {
        matches!(self, Direction::Backward)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// Cursor over a single input buffer.
///
/// The unread region is always `buf[front..back]`. Forward cursors consume
/// from `front`, backward cursors from `back`.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    direction: Direction,
    front: usize,
    back: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8], direction: Direction) -> Self {
        Self {
            buf,
            direction,
            front: 0,
            back: buf.len(),
        }
    }

    /// Cursor that ignores the first `offset` bytes of the buffer
    pub fn with_offset(buf: &'a [u8], direction: Direction, offset: usize) -> Self {
        let front = offset.min(buf.len());
        Self {
            buf,
            direction,
            front,
            back: buf.len(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn remaining(&self) -> usize {
        self.back - self.front
    }

    pub fn is_empty(&self) -> bool {
        self.front == self.back
    }

    /// Index inside the buffer of the byte `next_byte` would return
    pub fn index(&self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        match self.direction {
            Direction::Forward => Some(self.front),
            Direction::Backward => Some(self.back - 1),
        }
    }

    pub fn next_byte(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        match self.direction {
            Direction::Forward => {
                let byte = self.buf[self.front];
                self.front += 1;
                Some(byte)
            }
            Direction::Backward => {
                self.back -= 1;
                Some(self.buf[self.back])
            }
        }
    }

    /// Consume up to `n` bytes, returned in buffer (not traversal) order.
    ///
    /// A backward cursor hands out the slice that ends where it stands, so the
    /// caller can copy it verbatim at the tail of whatever it is filling.
    pub fn take(&mut self, n: usize) -> &'a [u8] {
        let k = n.min(self.remaining());
        match self.direction {
            Direction::Forward => {
                let slice = &self.buf[self.front..self.front + k];
                self.front += k;
                slice
            }
            Direction::Backward => {
                let slice = &self.buf[self.back - k..self.back];
                self.back -= k;
                slice
            }
        }
    }
}
