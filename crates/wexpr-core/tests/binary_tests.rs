//! Binary format tests: chunk layout byte for byte, the file header, and
//! rejection of malformed input.

use wexpr_core::binary::{decode_chunk, decode_file, encode_chunk, encode_file};
use wexpr_core::{parse, ErrorKind, Expression, ExpressionType, Map};

/// The 20-byte header every binary file starts with.
const HEADER: [u8; 20] = [
    0x83, b'B', b'W', b'E', b'X', b'P', b'R', 0x0A, // magic
    0x00, 0x00, 0x00, 0x01, // version 1, big-endian
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // reserved
];

// ============================================================================
// Chunk encoding
// ============================================================================

#[test]
fn encode_null_chunk() {
    assert_eq!(encode_chunk(&Expression::Null), [0, 0, 0, 0, 0x00]);
}

#[test]
fn encode_invalid_shares_the_null_chunk_type() {
    assert_eq!(encode_chunk(&Expression::Invalid), [0, 0, 0, 0, 0x00]);
}

#[test]
fn encode_value_chunk() {
    let chunk = encode_chunk(&Expression::Value("Hello".into()));
    assert_eq!(chunk[..5], [0, 0, 0, 5, 0x01]);
    assert_eq!(&chunk[5..], b"Hello");
}

#[test]
fn encode_value_chunk_has_no_terminator() {
    let chunk = encode_chunk(&Expression::Value("a".into()));
    assert_eq!(chunk, [0, 0, 0, 1, 0x01, b'a']);
}

#[test]
fn encode_binary_data_chunk() {
    let chunk = encode_chunk(&Expression::BinaryData(vec![0xDE, 0xAD, 0x00]));
    assert_eq!(chunk, [0, 0, 0, 3, 0x04, 0xDE, 0xAD, 0x00]);
}

#[test]
fn encode_array_chunk_concatenates_children() {
    let arr = Expression::Array(vec![Expression::Null, Expression::Value("x".into())]);
    let chunk = encode_chunk(&arr);
    // payload = null chunk (5) + value chunk (6) = 11 bytes
    assert_eq!(chunk[..5], [0, 0, 0, 11, 0x02]);
    assert_eq!(chunk[5..10], [0, 0, 0, 0, 0x00]);
    assert_eq!(chunk[10..], [0, 0, 0, 1, 0x01, b'x']);
}

#[test]
fn encode_map_chunk_alternates_key_and_value_chunks() {
    let mut map = Map::new();
    map.insert("k", Expression::Null);
    let chunk = encode_chunk(&Expression::Map(map));
    assert_eq!(
        chunk,
        [0, 0, 0, 11, 0x03, 0, 0, 0, 1, 0x01, b'k', 0, 0, 0, 0, 0x00]
    );
}

// ============================================================================
// Chunk decoding
// ============================================================================

#[test]
fn decode_null_chunk() {
    let expr = decode_chunk(&[0, 0, 0, 0, 0x00]).unwrap();
    assert_eq!(expr.ty(), ExpressionType::Null);
}

#[test]
fn decode_value_chunk() {
    let expr = decode_chunk(&[0, 0, 0, 2, 0x01, b'h', b'i']).unwrap();
    assert_eq!(expr.value(), Some("hi"));
}

#[test]
fn decode_nested_containers() {
    let original = parse("@(list #(a b) blob <AAE=>)").unwrap();
    let decoded = decode_chunk(&encode_chunk(&original)).unwrap();
    assert_eq!(decoded, original);
}

#[test]
fn decode_ignores_bytes_past_the_declared_chunk() {
    let expr = decode_chunk(&[0, 0, 0, 0, 0x00, 0xFF, 0xFF]).unwrap();
    assert_eq!(expr.ty(), ExpressionType::Null);
}

#[test]
fn decode_rejects_truncated_prefix() {
    let err = decode_chunk(&[0, 0, 0]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BinaryChunkOverflow);
    assert_eq!((err.line, err.column), (0, 0));
}

#[test]
fn decode_rejects_size_overrunning_the_buffer() {
    let err = decode_chunk(&[0, 0, 0, 9, 0x01, b'a']).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BinaryChunkOverflow);
}

#[test]
fn decode_rejects_overrun_in_a_nested_chunk() {
    // array payload declares a child whose size overruns the payload
    let err = decode_chunk(&[0, 0, 0, 5, 0x02, 0, 0, 0, 9, 0x01]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BinaryChunkOverflow);
}

#[test]
fn decode_rejects_unknown_chunk_type() {
    let err = decode_chunk(&[0, 0, 0, 0, 0x05]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BinaryUnknownType);
}

#[test]
fn decode_rejects_non_value_map_key() {
    // map payload: null chunk as key, null chunk as value
    let err = decode_chunk(&[0, 0, 0, 10, 0x03, 0, 0, 0, 0, 0x00, 0, 0, 0, 0, 0x00]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BinaryChunkNotMap);
}

#[test]
fn decode_rejects_map_key_without_value() {
    // map payload: a single value chunk
    let err = decode_chunk(&[0, 0, 0, 6, 0x03, 0, 0, 0, 1, 0x01, b'k']).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BinaryChunkNotMap);
}

#[test]
fn decode_rejects_invalid_utf8_value() {
    let err = decode_chunk(&[0, 0, 0, 2, 0x01, 0xFF, 0xFE]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidUtf8);
}

#[test]
fn decode_binary_data_keeps_raw_bytes() {
    let expr = decode_chunk(&[0, 0, 0, 2, 0x04, 0xFF, 0x00]).unwrap();
    assert_eq!(expr.binary_data(), Some(&[0xFF, 0x00][..]));
}

// ============================================================================
// File encoding
// ============================================================================

#[test]
fn encode_file_prepends_the_header() {
    let file = encode_file(&Expression::Null);
    assert_eq!(file.len(), 25);
    assert_eq!(file[..20], HEADER);
    assert_eq!(file[20..], [0, 0, 0, 0, 0x00]);
}

#[test]
fn decode_file_null_expression() {
    let mut file = HEADER.to_vec();
    file.extend_from_slice(&[0, 0, 0, 0, 0x00]);
    assert_eq!(decode_file(&file).unwrap().ty(), ExpressionType::Null);
}

#[test]
fn file_roundtrip_preserves_structure() {
    let original = parse("@(name Bob scores #(1 2 3) blob <SGVsbG8=>)").unwrap();
    let decoded = decode_file(&encode_file(&original)).unwrap();
    assert_eq!(decoded, original);
}

// ============================================================================
// File header rejection
// ============================================================================

#[test]
fn decode_file_rejects_short_input() {
    let err = decode_file(&HEADER[..12]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BinaryInvalidHeader);
}

#[test]
fn decode_file_rejects_bad_magic() {
    let mut file = HEADER.to_vec();
    file.extend_from_slice(&[0, 0, 0, 0, 0x00]);
    file[1] = b'X';
    let err = decode_file(&file).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BinaryInvalidHeader);
}

#[test]
fn decode_file_rejects_unknown_version() {
    let mut file = HEADER.to_vec();
    file.extend_from_slice(&[0, 0, 0, 0, 0x00]);
    file[11] = 0x02;
    let err = decode_file(&file).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BinaryUnknownVersion);
}

#[test]
fn decode_file_rejects_nonzero_reserved_bytes() {
    for reserved_offset in 12..20 {
        let mut file = HEADER.to_vec();
        file.extend_from_slice(&[0, 0, 0, 0, 0x00]);
        file[reserved_offset] = 0x01;
        let err = decode_file(&file).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BinaryInvalidHeader, "offset {reserved_offset}");
    }
}

// ============================================================================
// Top-level chunk walk
// ============================================================================

#[test]
fn decode_file_with_no_chunks_is_invalid() {
    assert_eq!(decode_file(&HEADER).unwrap().ty(), ExpressionType::Invalid);
}

#[test]
fn decode_file_skips_auxiliary_chunks() {
    let mut file = HEADER.to_vec();
    file.extend_from_slice(&[0, 0, 0, 0, 0x00]); // the expression
    file.extend_from_slice(&[0, 0, 0, 2, 0x7F, 0xAA, 0xBB]); // auxiliary
    assert_eq!(decode_file(&file).unwrap().ty(), ExpressionType::Null);
}

#[test]
fn decode_file_rejects_multiple_expression_chunks() {
    let mut file = HEADER.to_vec();
    file.extend_from_slice(&[0, 0, 0, 0, 0x00]);
    file.extend_from_slice(&[0, 0, 0, 1, 0x01, b'a']);
    let err = decode_file(&file).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BinaryMultipleExpressions);
}

#[test]
fn decode_file_rejects_truncated_trailing_chunk() {
    let mut file = HEADER.to_vec();
    file.extend_from_slice(&[0, 0, 0, 0, 0x00]);
    file.extend_from_slice(&[0, 0]); // not even a prefix
    let err = decode_file(&file).unwrap_err();
    assert_eq!(err.kind, ErrorKind::BinaryChunkOverflow);
}
