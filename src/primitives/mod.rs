//! Low-level primitives shared by the index.
//!
//! Includes byte encoding utilities and the key-striped lock table.

/// Byte-level utilities and encoding/decoding.
///
/// Big-endian field encoders and a bounds-checked read cursor.
pub mod bytes;

/// Concurrency primitives and synchronization.
///
/// Key-striped mutex table used to serialize same-key upserts.
pub mod concurrency;
