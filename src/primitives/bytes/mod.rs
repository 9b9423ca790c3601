#![forbid(unsafe_code)]
//! Big-endian encoders and a bounds-checked cursor shared by the codecs.

pub mod ord {
    //! Fixed-width big-endian integers and length-prefixed strings.

    /// Appends `v` as 8 big-endian bytes.
    pub fn put_u64_be(dst: &mut Vec<u8>, v: u64) {
        dst.extend_from_slice(&v.to_be_bytes());
    }

    /// Appends `v` as 4 big-endian bytes.
    pub fn put_u32_be(dst: &mut Vec<u8>, v: u32) {
        dst.extend_from_slice(&v.to_be_bytes());
    }

    /// Appends a `u32` length prefix followed by the UTF-8 bytes of `s`.
    ///
    /// Strings longer than `u32::MAX` bytes are not representable; callers
    /// only feed identifiers through here.
    pub fn put_str_key(dst: &mut Vec<u8>, s: &str) {
        let len = s.len();
        assert!(
            len <= u32::MAX as usize,
            "string key too long (>{} bytes)",
            u32::MAX
        );
        put_u32_be(dst, len as u32);
        dst.extend_from_slice(s.as_bytes());
    }
}

pub mod buf {
    //! A slice-backed cursor that reports truncation instead of panicking.

    use core::fmt;

    use crate::types::{IndexError, Result};

    /// Reads fixed-width fields from a byte slice, tracking the offset.
    pub struct Cursor<'a> {
        buf: &'a [u8],
        off: usize,
    }

    impl<'a> Cursor<'a> {
        /// Creates a cursor positioned at the start of `buf`.
        pub fn new(buf: &'a [u8]) -> Self {
            Self { buf, off: 0 }
        }

        /// Takes the next `n` bytes, failing with `what` if fewer remain.
        pub fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8]> {
            let end = self
                .off
                .checked_add(n)
                .ok_or(IndexError::Corruption(what))?;
            if end > self.buf.len() {
                return Err(IndexError::Corruption(what));
            }
            let slice = &self.buf[self.off..end];
            self.off = end;
            Ok(slice)
        }

        /// Takes exactly `N` bytes as an array.
        pub fn take_array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N]> {
            let mut out = [0u8; N];
            out.copy_from_slice(self.take(N, what)?);
            Ok(out)
        }

        /// Reads one byte.
        pub fn u8(&mut self, what: &'static str) -> Result<u8> {
            Ok(self.take_array::<1>(what)?[0])
        }

        /// Reads a big-endian `u32`.
        pub fn u32_be(&mut self, what: &'static str) -> Result<u32> {
            Ok(u32::from_be_bytes(self.take_array(what)?))
        }

        /// Reads a big-endian `u64`.
        pub fn u64_be(&mut self, what: &'static str) -> Result<u64> {
            Ok(u64::from_be_bytes(self.take_array(what)?))
        }

        /// Returns the number of bytes remaining in the buffer.
        pub fn remaining(&self) -> usize {
            self.buf.len().saturating_sub(self.off)
        }
    }

    impl<'a> fmt::Debug for Cursor<'a> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Cursor")
                .field("off", &self.off)
                .field("remaining", &self.remaining())
                .finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{buf::Cursor, ord};
    use proptest::prelude::*;

    #[test]
    fn u64_roundtrip_through_cursor() {
        let mut dst = Vec::new();
        ord::put_u64_be(&mut dst, 123456789);
        ord::put_u32_be(&mut dst, 7);
        let mut cur = Cursor::new(&dst);
        assert_eq!(cur.u64_be("u64").unwrap(), 123456789);
        assert_eq!(cur.u32_be("u32").unwrap(), 7);
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn cursor_overread_is_corruption() {
        let mut cur = Cursor::new(&[1, 2, 3]);
        let err = cur.u32_be("short field").unwrap_err();
        assert!(err.is_corruption());
        // a failed read does not advance
        assert_eq!(cur.remaining(), 3);
        assert_eq!(cur.u8("byte").unwrap(), 1);
    }

    #[test]
    fn str_key_is_length_prefixed() {
        let mut a = Vec::new();
        ord::put_str_key(&mut a, "ab");
        ord::put_str_key(&mut a, "c");
        let mut b = Vec::new();
        ord::put_str_key(&mut b, "a");
        ord::put_str_key(&mut b, "bc");
        assert_ne!(a, b);
        assert_eq!(&a[..4], &2u32.to_be_bytes());
    }

    proptest! {
        #[test]
        fn big_endian_preserves_order(xs in proptest::collection::vec(any::<u64>(), 1..64)) {
            let mut encoded: Vec<(Vec<u8>, u64)> = xs
                .iter()
                .map(|&v| {
                    let mut buf = Vec::new();
                    ord::put_u64_be(&mut buf, v);
                    (buf, v)
                })
                .collect();
            encoded.sort_by(|a, b| a.0.cmp(&b.0));
            let decoded: Vec<u64> = encoded.iter().map(|(_, v)| *v).collect();
            let mut expected = xs.clone();
            expected.sort();
            prop_assert_eq!(decoded, expected);
        }
    }
}
