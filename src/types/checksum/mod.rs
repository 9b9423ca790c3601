#![forbid(unsafe_code)]

/// Incremental checksum over a byte stream.
pub trait Checksum {
    /// Feeds more bytes into the checksum.
    fn update(&mut self, bytes: &[u8]);
    /// Returns the checksum of everything fed so far.
    fn finalize(&self) -> u32;
}

/// CRC32 (IEEE) backed by `crc32fast`.
pub struct Crc32Fast {
    inner: crc32fast::Hasher,
}

impl Default for Crc32Fast {
    fn default() -> Self {
        Self {
            inner: crc32fast::Hasher::new(),
        }
    }
}

impl Checksum for Crc32Fast {
    fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    fn finalize(&self) -> u32 {
        self.inner.clone().finalize()
    }
}

/// CRC32 of an encoded envelope body (everything before the trailer).
pub fn envelope_crc32(body: &[u8]) -> u32 {
    let mut crc = Crc32Fast::default();
    crc.update(body);
    crc.finalize()
}
