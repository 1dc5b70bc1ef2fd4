// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compressed integer codec
//!
//! Unsigned 64-bit values are written so they can be decoded starting from
//! either end of their byte span:
//!
//! ```text
//! 0..=250            [value]
//! otherwise          [marker][payload, little-endian][marker]
//!
//! marker  251  252  253  254
//! width     2    3    4    8
//! ```
//!
//! The duplicated marker tells a backward reader how wide the payload is, and
//! gives both readers a redundancy check once the payload has been consumed.

use super::direction::Direction;
use thiserror::Error;

/// Largest value stored as a single literal byte
pub const MAX_LITERAL: u8 = 250;
pub const MARKER_2: u8 = 251;
pub const MARKER_3: u8 = 252;
pub const MARKER_4: u8 = 253;
pub const MARKER_8: u8 = 254;

/// Longest possible encoding: marker, 8 payload bytes, marker
pub const MAX_ENCODED_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid compressed integer marker {marker}")]
    InvalidMarker { marker: u8 },
    #[error("compressed integer marker mismatch: expected {expected}, found {found}")]
    MarkerMismatch { expected: u8, found: u8 },
    #[error("compressed integer truncated after {available} bytes")]
    Truncated { available: usize },
}

/// Payload width selected by a marker byte
pub fn marker_width(marker: u8) -> Option<u8> {
    match marker {
        MARKER_2 => Some(2),
        MARKER_3 => Some(3),
        MARKER_4 => Some(4),
        MARKER_8 => Some(8),
        _ => None,
    }
}

/// Number of bytes `encode_u64` writes for `value`
pub fn encoded_len(value: u64) -> usize {
    match value {
        0..=250 => 1,
        251..=0xFFFF => 4,
        0x1_0000..=0xFF_FFFF => 5,
        0x100_0000..=0xFFFF_FFFF => 6,
        _ => 10,
    }
}

/// Append the compressed form of `value` to `out`
pub fn encode_u64(value: u64, out: &mut Vec<u8>) {
    let (marker, width) = match value {
        0..=250 => {
            out.push(value as u8);
            return;
        }
        251..=0xFFFF => (MARKER_2, 2),
        0x1_0000..=0xFF_FFFF => (MARKER_3, 3),
        0x100_0000..=0xFFFF_FFFF => (MARKER_4, 4),
        _ => (MARKER_8, 8),
    };
    out.push(marker);
    out.extend_from_slice(&value.to_le_bytes()[..width]);
    out.push(marker);
}

/// Compressed form of `value` as a fresh vector
pub fn encode_to_vec(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(value));
    encode_u64(value, &mut out);
    out
}

/// Map a signed value onto the unsigned space so small magnitudes stay short
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Progress of the resumable decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberState {
    /// Waiting for the first byte (literal or marker)
    Start,
    TwoBytes,
    ThreeBytes,
    FourBytes,
    EightBytes,
    /// Payload complete, waiting for the duplicated marker
    Marker,
}

impl NumberState {
    fn for_width(width: u8) -> Self {
        match width {
            2 => NumberState::TwoBytes,
            3 => NumberState::ThreeBytes,
            4 => NumberState::FourBytes,
            _ => NumberState::EightBytes,
        }
    }
}

/// Byte-at-a-time decoder that survives buffer boundaries.
///
/// Forward decoding shifts payload bytes in with an ascending bit cursor,
/// backward decoding with a descending one starting at the top byte.
#[derive(Debug, Clone)]
pub struct CompressedDecoder {
    state: NumberState,
    marker: u8,
    value: u64,
    part: u32,
    remaining: u8,
}

impl Default for CompressedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompressedDecoder {
    pub fn new() -> Self {
        Self {
            state: NumberState::Start,
            marker: 0,
            value: 0,
            part: 0,
            remaining: 0,
        }
    }

    pub fn state(&self) -> NumberState {
        self.state
    }

    /// True while a multi-byte number has been started but not finished
    pub fn in_progress(&self) -> bool {
        self.state != NumberState::Start
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feed one byte. Returns the value once the number is complete.
    pub fn feed(&mut self, byte: u8, direction: Direction) -> Result<Option<u64>, CodecError> {
        match self.state {
            NumberState::Start => {
                if byte <= MAX_LITERAL {
                    return Ok(Some(u64::from(byte)));
                }
                let width = marker_width(byte).ok_or(CodecError::InvalidMarker { marker: byte })?;
                self.marker = byte;
                self.value = 0;
                self.remaining = width;
                self.part = match direction {
                    Direction::Forward => 0,
                    Direction::Backward => u32::from(width - 1) * 8,
                };
                self.state = NumberState::for_width(width);
                Ok(None)
            }
            NumberState::Marker => {
                if byte != self.marker {
                    let expected = self.marker;
                    self.reset();
                    return Err(CodecError::MarkerMismatch {
                        expected,
                        found: byte,
                    });
                }
                let value = self.value;
                self.reset();
                Ok(Some(value))
            }
            NumberState::TwoBytes
            | NumberState::ThreeBytes
            | NumberState::FourBytes
            | NumberState::EightBytes => {
                self.value |= u64::from(byte) << self.part;
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.state = NumberState::Marker;
                } else {
                    match direction {
                        Direction::Forward => self.part += 8,
                        Direction::Backward => self.part -= 8,
                    }
                }
                Ok(None)
            }
        }
    }
}

/// Decode one number from the front of `bytes`.
///
/// Returns the value and the number of bytes it occupied.
pub fn decode_forward(bytes: &[u8]) -> Result<(u64, usize), CodecError> {
    let mut decoder = CompressedDecoder::new();
    for (i, &byte) in bytes.iter().enumerate() {
        if let Some(value) = decoder.feed(byte, Direction::Forward)? {
            return Ok((value, i + 1));
        }
    }
    Err(CodecError::Truncated {
        available: bytes.len(),
    })
}

/// Decode one number from the back of `bytes`.
///
/// Returns the value and the number of trailing bytes it occupied.
pub fn decode_backward(bytes: &[u8]) -> Result<(u64, usize), CodecError> {
    let mut decoder = CompressedDecoder::new();
    for (i, &byte) in bytes.iter().rev().enumerate() {
        if let Some(value) = decoder.feed(byte, Direction::Backward)? {
            return Ok((value, i + 1));
        }
    }
    Err(CodecError::Truncated {
        available: bytes.len(),
    })
}

#[cfg(test)]
#[path = "compressed_tests.rs"]
mod tests;
