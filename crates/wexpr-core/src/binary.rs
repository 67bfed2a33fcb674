//! Binary wexpr: expression chunks and the headered file form.
//!
//! Every chunk is framed the same way:
//!
//! ```text
//! [ size : uint32 big-endian ]   // payload byte count
//! [ type : uint8 ]
//! [ payload : size bytes ]
//! ```
//!
//! Null and Invalid expressions share type 0x00 with an empty payload.
//! Value and BinaryData payloads are raw bytes; Array payloads are the
//! concatenated child chunks; Map payloads alternate key chunks (which must
//! be Value-typed) with value chunks.
//!
//! A wexpr *file* is a 20-byte header followed by top-level chunks. Exactly
//! one of those chunks may be expression-typed (0x00..=0x04); chunks of any
//! other type are auxiliary and skipped. The decoder validates every
//! declared size against the enclosing buffer before descending.

use crate::endian::{u32_from_big, u32_to_big};
use crate::error::{ErrorKind, Result, WexprError};
use crate::expression::{Expression, Map};

const CHUNK_TYPE_NULL: u8 = 0x00;
const CHUNK_TYPE_VALUE: u8 = 0x01;
const CHUNK_TYPE_ARRAY: u8 = 0x02;
const CHUNK_TYPE_MAP: u8 = 0x03;
const CHUNK_TYPE_BINARY_DATA: u8 = 0x04;

/// Bytes taken by the size and type fields on every chunk.
const CHUNK_PREFIX_SIZE: usize = 5;

/// First byte of a binary wexpr file; distinguishes it from text.
pub const MAGIC_BYTE: u8 = 0x83;

/// Total size of the file header.
pub const FILE_HEADER_SIZE: usize = 20;

/// Magic sentinel, ASCII `BWEXPR`, and a line feed.
const FILE_MAGIC: [u8; 8] = [MAGIC_BYTE, b'B', b'W', b'E', b'X', b'P', b'R', 0x0A];

/// The one file format version we read and write.
const FILE_VERSION: u32 = 0x0000_0001;

/// Encode an expression tree as a single chunk (recursively containing its
/// children), without the file header.
pub fn encode_chunk(expr: &Expression) -> Vec<u8> {
    let mut out = Vec::new();
    append_chunk(expr, &mut out);
    out
}

fn append_chunk(expr: &Expression, out: &mut Vec<u8>) {
    match expr {
        Expression::Invalid | Expression::Null => {
            out.extend_from_slice(&u32_to_big(0));
            out.push(CHUNK_TYPE_NULL);
        }
        Expression::Value(text) => append_value_chunk(text, out),
        Expression::BinaryData(data) => {
            out.extend_from_slice(&u32_to_big(data.len() as u32));
            out.push(CHUNK_TYPE_BINARY_DATA);
            out.extend_from_slice(data);
        }
        Expression::Array(children) => {
            let size_pos = reserve_container_prefix(CHUNK_TYPE_ARRAY, out);
            for child in children {
                append_chunk(child, out);
            }
            patch_container_size(size_pos, out);
        }
        Expression::Map(map) => {
            let size_pos = reserve_container_prefix(CHUNK_TYPE_MAP, out);
            for (key, value) in map.iter() {
                append_value_chunk(key, out);
                append_chunk(value, out);
            }
            patch_container_size(size_pos, out);
        }
    }
}

fn append_value_chunk(text: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(&u32_to_big(text.len() as u32));
    out.push(CHUNK_TYPE_VALUE);
    out.extend_from_slice(text.as_bytes());
}

/// Write a placeholder size and the type byte; returns the offset of the
/// size field so it can be patched once the payload is written.
fn reserve_container_prefix(chunk_type: u8, out: &mut Vec<u8>) -> usize {
    let size_pos = out.len();
    out.extend_from_slice(&[0; 4]);
    out.push(chunk_type);
    size_pos
}

fn patch_container_size(size_pos: usize, out: &mut Vec<u8>) {
    let payload_len = out.len() - size_pos - CHUNK_PREFIX_SIZE;
    out[size_pos..size_pos + 4].copy_from_slice(&u32_to_big(payload_len as u32));
}

/// Decode a single chunk (recursively containing its children) back into an
/// expression tree. Bytes past the declared chunk are ignored.
pub fn decode_chunk(data: &[u8]) -> Result<Expression> {
    let (expr, _consumed) = read_chunk(data)?;
    Ok(expr)
}

/// Read one chunk from the front of `data`, returning the expression and
/// how many bytes it occupied.
fn read_chunk(data: &[u8]) -> Result<(Expression, usize)> {
    let (size, chunk_type) = read_chunk_prefix(data)?;
    let payload = &data[CHUNK_PREFIX_SIZE..CHUNK_PREFIX_SIZE + size];

    let expr = match chunk_type {
        CHUNK_TYPE_NULL => Expression::Null,
        CHUNK_TYPE_VALUE => {
            let text = std::str::from_utf8(payload).map_err(|_| {
                WexprError::binary(ErrorKind::InvalidUtf8, "value chunk is not valid UTF-8")
            })?;
            Expression::Value(text.to_string())
        }
        CHUNK_TYPE_ARRAY => {
            let mut children = Vec::new();
            let mut pos = 0;
            while pos < payload.len() {
                let (child, used) = read_chunk(&payload[pos..])?;
                children.push(child);
                pos += used;
            }
            Expression::Array(children)
        }
        CHUNK_TYPE_MAP => {
            let mut map = Map::new();
            let mut pos = 0;
            while pos < payload.len() {
                let (key_expr, used) = read_chunk(&payload[pos..])?;
                pos += used;
                let key = match key_expr.value() {
                    Some(key) => key.to_string(),
                    None => {
                        return Err(WexprError::binary(
                            ErrorKind::BinaryChunkNotMap,
                            "map chunk key is not a value chunk",
                        ));
                    }
                };
                if pos >= payload.len() {
                    return Err(WexprError::binary(
                        ErrorKind::BinaryChunkNotMap,
                        format!("map chunk key '{key}' has no value chunk"),
                    ));
                }
                let (value, used) = read_chunk(&payload[pos..])?;
                pos += used;
                map.insert(key, value);
            }
            Expression::Map(map)
        }
        CHUNK_TYPE_BINARY_DATA => Expression::BinaryData(payload.to_vec()),
        other => {
            return Err(WexprError::binary(
                ErrorKind::BinaryUnknownType,
                format!("unknown chunk type 0x{other:02X}"),
            ));
        }
    };

    Ok((expr, CHUNK_PREFIX_SIZE + size))
}

/// Validate the prefix of the chunk at the front of `data` against the
/// buffer bounds, returning (payload size, type).
fn read_chunk_prefix(data: &[u8]) -> Result<(usize, u8)> {
    if data.len() < CHUNK_PREFIX_SIZE {
        return Err(WexprError::binary(
            ErrorKind::BinaryChunkOverflow,
            "chunk is too small for its size and type prefix",
        ));
    }
    let size = u32_from_big([data[0], data[1], data[2], data[3]]) as usize;
    if CHUNK_PREFIX_SIZE + size > data.len() {
        return Err(WexprError::binary(
            ErrorKind::BinaryChunkOverflow,
            "chunk size overruns the buffer",
        ));
    }
    Ok((size, data[4]))
}

/// Encode an expression as a complete binary file: header plus expression
/// chunk.
pub fn encode_file(expr: &Expression) -> Vec<u8> {
    let chunk = encode_chunk(expr);
    let mut out = Vec::with_capacity(FILE_HEADER_SIZE + chunk.len());
    out.extend_from_slice(&FILE_MAGIC);
    out.extend_from_slice(&u32_to_big(FILE_VERSION));
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&chunk);
    out
}

/// Decode a complete binary file: validate the header, then walk the
/// top-level chunks.
///
/// Exactly one top-level chunk may be expression-typed; auxiliary chunks of
/// other types are skipped. A file with no expression chunk yields
/// [`Expression::Invalid`], the same "nothing" an empty text document
/// parses to.
pub fn decode_file(data: &[u8]) -> Result<Expression> {
    if data.len() < FILE_HEADER_SIZE {
        return Err(WexprError::binary(
            ErrorKind::BinaryInvalidHeader,
            "invalid binary header - not big enough",
        ));
    }
    if data[..FILE_MAGIC.len()] != FILE_MAGIC {
        return Err(WexprError::binary(
            ErrorKind::BinaryInvalidHeader,
            "invalid binary header - invalid magic",
        ));
    }
    if u32_from_big([data[8], data[9], data[10], data[11]]) != FILE_VERSION {
        return Err(WexprError::binary(
            ErrorKind::BinaryUnknownVersion,
            "invalid binary header - unknown version",
        ));
    }
    if data[12..FILE_HEADER_SIZE].iter().any(|&b| b != 0) {
        return Err(WexprError::binary(
            ErrorKind::BinaryInvalidHeader,
            "invalid binary header - unknown reserved bits",
        ));
    }

    let mut expr = None;
    let mut pos = FILE_HEADER_SIZE;
    while pos < data.len() {
        let remaining = &data[pos..];
        let (size, chunk_type) = read_chunk_prefix(remaining)?;

        if chunk_type <= CHUNK_TYPE_BINARY_DATA {
            if expr.is_some() {
                return Err(WexprError::binary(
                    ErrorKind::BinaryMultipleExpressions,
                    "found multiple expression chunks",
                ));
            }
            let (parsed, _used) = read_chunk(remaining)?;
            expr = Some(parsed);
        }
        // any other type is an auxiliary chunk; skip it

        pos += CHUNK_PREFIX_SIZE + size;
    }

    Ok(expr.unwrap_or(Expression::Invalid))
}
