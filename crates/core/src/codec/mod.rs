// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire primitives shared by the reader and the writer

pub mod compressed;
pub mod direction;

pub use compressed::{
    decode_backward, decode_forward, encode_to_vec, encode_u64, encoded_len, zigzag_decode,
    zigzag_encode, CodecError, CompressedDecoder, NumberState,
};
pub use direction::{ByteCursor, Direction};
