use std::io::Cursor;

use stars_reader::StarsError;
use stars_reader::stars::codec::payload::{BinaryPayloadReader, decode_f64_array};

fn reader(bytes: &[u8]) -> BinaryPayloadReader<Cursor<Vec<u8>>> {
    BinaryPayloadReader::new(Cursor::new(bytes.to_vec()))
}

#[test]
fn reads_one_length_prefixed_block() {
    let mut payload = reader(&[0, 0, 0, 0, 0, 0, 0, 3, 1, 2, 3]);

    let body = payload.read_length_prefixed_block().expect("block");
    assert_eq!(body, vec![1, 2, 3]);
    assert_eq!(payload.offset(), 11);
    assert_eq!(payload.block_offset(), 8);
    assert!(payload.at_end().expect("at_end"));
}

#[test]
fn body_shorter_than_prefix_is_truncation() {
    let mut payload = reader(&[0, 0, 0, 0, 0, 0, 0, 10, 1, 2, 3]);

    match payload.read_length_prefixed_block() {
        Err(StarsError::TruncatedBinary { offset, expected, found, .. }) => {
            assert_eq!(offset, 8);
            assert_eq!(expected, 10);
            assert_eq!(found, 3);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn partial_length_prefix_is_truncation() {
    let mut payload = reader(&[0, 0, 0]);

    match payload.read_length_prefixed_block() {
        Err(StarsError::TruncatedBinary { offset, expected, found, .. }) => {
            assert_eq!(offset, 0);
            assert_eq!(expected, 8);
            assert_eq!(found, 3);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn skipping_a_short_block_is_truncation() {
    let mut payload = reader(&[0, 0, 0, 0, 0, 0, 0, 5, 1, 2]);
    let err = payload.skip_length_prefixed_block().unwrap_err();
    assert!(
        matches!(err, StarsError::TruncatedBinary { expected: 5, found: 2, .. }),
        "unexpected error: {:?}",
        err
    );
}

#[test]
fn decodes_big_endian_floats() {
    let mut raw = Vec::new();
    raw.extend_from_slice(&1.0f64.to_be_bytes());
    raw.extend_from_slice(&(-2.5f64).to_be_bytes());
    raw.extend_from_slice(&1e-3f64.to_be_bytes());

    let values = decode_f64_array(&raw, 3).expect("decode");
    assert_eq!(values, vec![1.0, -2.5, 1e-3]);
}

#[test]
fn float_count_mismatch_is_truncation() {
    let raw = [0u8; 16];
    match decode_f64_array(&raw, 3) {
        Err(StarsError::TruncatedBinary { expected, found, .. }) => {
            assert_eq!(expected, 24);
            assert_eq!(found, 16);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn huge_float_count_is_truncation_not_overflow() {
    let raw = [0u8; 8];
    let err = decode_f64_array(&raw, usize::MAX).unwrap_err();
    assert!(matches!(err, StarsError::TruncatedBinary { found: 8, .. }), "unexpected error: {:?}", err);
}

#[test]
fn decode_error_points_at_the_block_in_the_stream() {
    let mut bytes = vec![0, 0, 0, 0, 0, 0, 0, 1, 0xff];
    bytes.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 8]);
    bytes.extend_from_slice(&7.0f64.to_be_bytes());
    let mut payload = reader(&bytes);

    payload.skip_length_prefixed_block().expect("skip");
    let block = payload.read_length_prefixed_block().expect("block");
    assert_eq!(payload.decode_f64_array(&block, 1).expect("decode"), vec![7.0]);

    match payload.decode_f64_array(&block, 2) {
        Err(StarsError::TruncatedBinary { offset, .. }) => assert_eq!(offset, 17),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn skip_blocks_consumes_every_announced_block() {
    let mut bytes = Vec::new();
    for body in [&[1u8, 2][..], &[], &[3, 4, 5]] {
        bytes.extend_from_slice(&(body.len() as u64).to_be_bytes());
        bytes.extend_from_slice(body);
    }
    let mut payload = reader(&bytes);

    let skipped = payload.skip_blocks(3).expect("skip");
    assert_eq!(skipped, 5);
    assert_eq!(payload.offset(), bytes.len() as u64);
    assert!(payload.at_end().expect("at_end"));
}

#[test]
fn drain_counts_trailing_bytes() {
    let mut payload = reader(&[9, 9, 9, 9]);
    let head = payload.read_exact(1).expect("read");
    assert_eq!(head, vec![9]);
    assert!(!payload.at_end().expect("at_end"));

    assert_eq!(payload.drain_remaining().expect("drain"), 3);
    assert_eq!(payload.offset(), 4);
    assert!(payload.at_end().expect("at_end"));
}
