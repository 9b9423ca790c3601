//! Key-striped locking for per-key read-modify-write sequences.
//!
//! A [`StripedLocks`] table owns a fixed, power-of-two number of mutexes.
//! Each key maps to exactly one stripe, so operations on the same key are
//! serialized while operations on keys in different stripes proceed in
//! parallel. There is no table-wide lock.

use parking_lot::{Mutex, MutexGuard};
use tracing::trace;

use crate::types::{IndexError, Result};

/// Default number of stripes in an index lock table.
pub const DEFAULT_LOCK_STRIPES: usize = 1024;

/// A fixed table of mutexes addressed by key hash.
pub struct StripedLocks {
    stripes: Box<[Mutex<()>]>,
    mask: u64,
}

/// Guard for a held stripe. Dropping it releases the stripe.
pub struct StripeGuard<'a> {
    _guard: MutexGuard<'a, ()>,
    stripe: usize,
}

impl StripeGuard<'_> {
    /// Index of the stripe this guard holds.
    pub(crate) fn stripe(&self) -> usize {
        self.stripe
    }
}

impl StripedLocks {
    /// Builds a table with `stripes` locks. The count must be a non-zero
    /// power of two so that stripe selection is a mask.
    pub fn new(stripes: usize) -> Result<Self> {
        if stripes == 0 || !stripes.is_power_of_two() {
            return Err(IndexError::Invalid(
                "lock stripe count must be a non-zero power of two",
            ));
        }
        let table: Vec<Mutex<()>> = (0..stripes).map(|_| Mutex::new(())).collect();
        Ok(Self {
            stripes: table.into_boxed_slice(),
            mask: (stripes - 1) as u64,
        })
    }

    /// Number of stripes in the table.
    pub fn len(&self) -> usize {
        self.stripes.len()
    }

    /// Always false; a table has at least one stripe.
    pub fn is_empty(&self) -> bool {
        self.stripes.is_empty()
    }

    /// Maps a key hash to its stripe index.
    pub fn stripe_for(&self, key_hash: u64) -> usize {
        (key_hash & self.mask) as usize
    }

    /// Blocks until the stripe owning `key_hash` is held.
    pub fn lock(&self, key_hash: u64) -> StripeGuard<'_> {
        let stripe = self.stripe_for(key_hash);
        let guard = self.stripes[stripe].lock();
        trace!(stripe, "stripe acquired");
        StripeGuard {
            _guard: guard,
            stripe,
        }
    }

    #[cfg(test)]
    fn try_lock(&self, key_hash: u64) -> Option<StripeGuard<'_>> {
        let stripe = self.stripe_for(key_hash);
        self.stripes[stripe].try_lock().map(|guard| StripeGuard {
            _guard: guard,
            stripe,
        })
    }
}
