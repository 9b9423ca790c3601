//! Versioned byte envelope for pointer lists.
//!
//! Layout, all integers big-endian:
//!
//! | bytes      | field                                  |
//! |------------|----------------------------------------|
//! | 0..2       | magic `b"PL"`                          |
//! | 2          | format version                         |
//! | 3          | reserved, must be zero                 |
//! | 4..8       | pointer count `n`                      |
//! | 8..8+16n   | `n` × (offset `u64`, length `u64`)     |
//! | last 4     | CRC32 of every preceding byte          |

use crate::model::{PointerList, StoragePointer};
use crate::primitives::bytes::{buf::Cursor, ord};
use crate::types::checksum::envelope_crc32;
use crate::types::{IndexError, Result};

/// Envelope magic.
pub const POINTER_LIST_MAGIC: [u8; 2] = *b"PL";
/// Current envelope version.
pub const POINTER_LIST_VERSION: u8 = 1;

const HEADER_LEN: usize = 8;
const ENTRY_LEN: usize = 16;
const CRC_LEN: usize = 4;

/// Encodes a pointer list into its envelope.
pub fn encode(list: &[StoragePointer]) -> Result<Vec<u8>> {
    let count: u32 = list
        .len()
        .try_into()
        .map_err(|_| IndexError::Invalid("pointer list longer than u32::MAX"))?;
    let mut buf = Vec::with_capacity(encoded_len(list.len()));
    buf.extend_from_slice(&POINTER_LIST_MAGIC);
    buf.push(POINTER_LIST_VERSION);
    buf.push(0);
    ord::put_u32_be(&mut buf, count);
    for ptr in list {
        ord::put_u64_be(&mut buf, ptr.offset);
        ord::put_u64_be(&mut buf, ptr.length);
    }
    let crc = envelope_crc32(&buf);
    ord::put_u32_be(&mut buf, crc);
    Ok(buf)
}

/// Decodes an envelope produced by [`encode`].
///
/// Any mismatch with the expected layout is reported as
/// [`IndexError::Corruption`]; a malformed value never decodes to an empty
/// list.
pub fn decode(bytes: &[u8]) -> Result<PointerList> {
    if bytes.len() < HEADER_LEN + CRC_LEN {
        return Err(IndexError::Corruption("pointer list envelope truncated"));
    }
    let (body, trailer) = bytes.split_at(bytes.len() - CRC_LEN);
    let mut cur = Cursor::new(body);
    let magic: [u8; 2] = cur.take_array("pointer list magic")?;
    if magic != POINTER_LIST_MAGIC {
        return Err(IndexError::Corruption("invalid pointer list magic"));
    }
    if cur.u8("pointer list version")? != POINTER_LIST_VERSION {
        return Err(IndexError::Corruption(
            "unsupported pointer list format version",
        ));
    }
    if cur.u8("pointer list reserved byte")? != 0 {
        return Err(IndexError::Corruption(
            "pointer list reserved byte not zero",
        ));
    }
    let count = cur.u32_be("pointer list count")? as usize;
    let expected = count
        .checked_mul(ENTRY_LEN)
        .ok_or(IndexError::Corruption("pointer list count overflow"))?;
    if cur.remaining() != expected {
        return Err(IndexError::Corruption(
            "pointer list length does not match count",
        ));
    }
    let stored_crc = u32::from_be_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    if stored_crc != envelope_crc32(body) {
        return Err(IndexError::Corruption("pointer list checksum mismatch"));
    }
    let mut list = Vec::with_capacity(count);
    for _ in 0..count {
        let offset = cur.u64_be("pointer offset")?;
        let length = cur.u64_be("pointer length")?;
        list.push(StoragePointer { offset, length });
    }
    Ok(list)
}

/// Size in bytes of the envelope for `count` pointers.
pub const fn encoded_len(count: usize) -> usize {
    HEADER_LEN + count * ENTRY_LEN + CRC_LEN
}

/// Stateless codec handle, for callers that prefer a value to free functions.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContentAddressCodec;

impl ContentAddressCodec {
    /// See [`encode`].
    pub fn encode(&self, list: &[StoragePointer]) -> Result<Vec<u8>> {
        encode(list)
    }

    /// See [`decode`].
    pub fn decode(&self, bytes: &[u8]) -> Result<PointerList> {
        decode(bytes)
    }
}
