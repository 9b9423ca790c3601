#![forbid(unsafe_code)]
//! Shared error and result types.

use std::io;

/// Checksum helpers used by on-disk envelopes.
pub mod checksum;

/// Errors surfaced by the node identity index.
///
/// Callers can distinguish a store that cannot be used at all
/// ([`IndexError::StoreUnavailable`]) from a transient read or write failure
/// ([`IndexError::Io`]) and from an entry whose bytes no longer parse
/// ([`IndexError::Corruption`]). A digest that was never written is not an
/// error; lookups report it as `None`.
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    /// The backing store failed to open, or was used after `close`.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    /// A get or put against the backing store failed.
    #[error("IO: {0}")]
    Io(#[from] io::Error),
    /// Stored bytes do not parse as a pointer list.
    #[error("corruption: {0}")]
    Corruption(&'static str),
    /// An argument or option was rejected.
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IndexError>;

impl IndexError {
    pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
        IndexError::StoreUnavailable(reason.into())
    }

    pub(crate) fn closed() -> Self {
        IndexError::StoreUnavailable("index store is closed".into())
    }

    /// Returns true for open failures and use-after-close.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, IndexError::StoreUnavailable(_))
    }

    /// Returns true for transient store failures; the whole upsert may be retried.
    pub fn is_io(&self) -> bool {
        matches!(self, IndexError::Io(_))
    }

    /// Returns true when persisted bytes failed to decode.
    pub fn is_corruption(&self) -> bool {
        matches!(self, IndexError::Corruption(_))
    }
}
