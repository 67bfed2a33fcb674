//! Big-endian conversion for the binary format's 32-bit fields.
//!
//! Every multi-byte field in the chunk format and file header goes through
//! these two functions; textual output never does.

/// Convert a host-order `u32` to its big-endian byte layout.
pub fn u32_to_big(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Convert a big-endian byte layout back to a host-order `u32`.
pub fn u32_from_big(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}
