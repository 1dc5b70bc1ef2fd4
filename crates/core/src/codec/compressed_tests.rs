// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    zero = { 0, 1 },
    largest_literal = { 250, 1 },
    smallest_two_byte = { 251, 4 },
    largest_two_byte = { 0xFFFF, 4 },
    smallest_three_byte = { 0x1_0000, 5 },
    largest_three_byte = { 0xFF_FFFF, 5 },
    smallest_four_byte = { 0x100_0000, 6 },
    largest_four_byte = { 0xFFFF_FFFF, 6 },
    smallest_eight_byte = { 0x1_0000_0000, 10 },
    max = { u64::MAX, 10 },
)]
fn encoded_length_by_range(value: u64, expected_len: usize) {
    let bytes = encode_to_vec(value);
    assert_eq!(bytes.len(), expected_len);
    assert_eq!(encoded_len(value), expected_len);
}

#[parameterized(
    two = { 300, MARKER_2 },
    three = { 0x12_3456, MARKER_3 },
    four = { 0x1234_5678, MARKER_4 },
    eight = { 0x0102_0304_0506_0708, MARKER_8 },
)]
fn marker_is_written_on_both_ends(value: u64, marker: u8) {
    let bytes = encode_to_vec(value);
    assert_eq!(bytes[0], marker);
    assert_eq!(bytes[bytes.len() - 1], marker);
}

#[test]
fn payload_is_little_endian() {
    let bytes = encode_to_vec(0x1234);
    assert_eq!(bytes, vec![MARKER_2, 0x34, 0x12, MARKER_2]);
}

#[test]
fn literal_round_trips_in_both_directions() {
    for value in 0..=250u64 {
        let bytes = encode_to_vec(value);
        assert_eq!(decode_forward(&bytes).unwrap(), (value, 1));
        assert_eq!(decode_backward(&bytes).unwrap(), (value, 1));
    }
}

#[test]
fn forward_decode_ignores_trailing_bytes() {
    let mut bytes = encode_to_vec(70_000);
    bytes.extend_from_slice(&[1, 2, 3]);
    assert_eq!(decode_forward(&bytes).unwrap(), (70_000, 5));
}

#[test]
fn backward_decode_ignores_leading_bytes() {
    let mut bytes = vec![9, 9];
    encode_u64(70_000, &mut bytes);
    assert_eq!(decode_backward(&bytes).unwrap(), (70_000, 5));
}

#[test]
fn marker_255_is_rejected() {
    let err = decode_forward(&[255, 0, 0, 255]).unwrap_err();
    assert_eq!(err, CodecError::InvalidMarker { marker: 255 });

    let err = decode_backward(&[255, 0, 0, 255]).unwrap_err();
    assert_eq!(err, CodecError::InvalidMarker { marker: 255 });
}

#[test]
fn mismatched_trailing_marker_is_fatal_forward() {
    let mut bytes = encode_to_vec(1000);
    let last = bytes.len() - 1;
    bytes[last] = MARKER_3;
    let err = decode_forward(&bytes).unwrap_err();
    assert_eq!(
        err,
        CodecError::MarkerMismatch {
            expected: MARKER_2,
            found: MARKER_3
        }
    );
}

#[test]
fn mismatched_leading_marker_is_fatal_backward() {
    let mut bytes = encode_to_vec(1000);
    bytes[0] = MARKER_4;
    let err = decode_backward(&bytes).unwrap_err();
    assert_eq!(
        err,
        CodecError::MarkerMismatch {
            expected: MARKER_2,
            found: MARKER_4
        }
    );
}

#[test]
fn truncated_input_reports_available_bytes() {
    let bytes = encode_to_vec(u64::MAX);
    let err = decode_forward(&bytes[..6]).unwrap_err();
    assert_eq!(err, CodecError::Truncated { available: 6 });
}

#[test]
fn non_minimal_width_is_still_decoded() {
    // 5 written with a two byte payload
    let bytes = [MARKER_2, 5, 0, MARKER_2];
    assert_eq!(decode_forward(&bytes).unwrap(), (5, 4));
    assert_eq!(decode_backward(&bytes).unwrap(), (5, 4));
}

#[test]
fn decoder_resumes_across_feeds() {
    let bytes = encode_to_vec(0xDEAD_BEEF_CAFE);
    let mut decoder = CompressedDecoder::new();
    for &byte in &bytes[..bytes.len() - 1] {
        assert_eq!(decoder.feed(byte, Direction::Forward).unwrap(), None);
        assert!(decoder.in_progress());
    }
    assert_eq!(decoder.state(), NumberState::Marker);
    let value = decoder.feed(bytes[bytes.len() - 1], Direction::Forward).unwrap();
    assert_eq!(value, Some(0xDEAD_BEEF_CAFE));
    assert!(!decoder.in_progress());
}

#[parameterized(
    two = { 0x1234, NumberState::TwoBytes },
    three = { 0x12_3456, NumberState::ThreeBytes },
    four = { 0x1234_5678, NumberState::FourBytes },
    eight = { u64::MAX - 1, NumberState::EightBytes },
)]
fn marker_selects_partial_state(value: u64, expected: NumberState) {
    let bytes = encode_to_vec(value);
    let mut decoder = CompressedDecoder::new();
    decoder.feed(bytes[0], Direction::Forward).unwrap();
    assert_eq!(decoder.state(), expected);
}

#[parameterized(
    zero = { 0, 0 },
    minus_one = { -1, 1 },
    one = { 1, 2 },
    minus_two = { -2, 3 },
    max = { i64::MAX, u64::MAX - 1 },
    min = { i64::MIN, u64::MAX },
)]
fn zigzag_mapping(signed: i64, unsigned: u64) {
    assert_eq!(zigzag_encode(signed), unsigned);
    assert_eq!(zigzag_decode(unsigned), signed);
}

use proptest::prelude::*;

proptest! {
    #[test]
    fn round_trip_forward(value in any::<u64>()) {
        let bytes = encode_to_vec(value);
        prop_assert_eq!(decode_forward(&bytes).unwrap(), (value, bytes.len()));
    }

    #[test]
    fn round_trip_backward(value in any::<u64>()) {
        let bytes = encode_to_vec(value);
        prop_assert_eq!(decode_backward(&bytes).unwrap(), (value, bytes.len()));
    }

    #[test]
    fn zigzag_round_trip(value in any::<i64>()) {
        prop_assert_eq!(zigzag_decode(zigzag_encode(value)), value);
    }
}
