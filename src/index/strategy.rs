use crate::index::digest::Digest;
use crate::model::{PointerList, StoragePointer};

/// Seed and merge rules for an upsert.
///
/// `seed` produces the first value for a digest; `merge` folds a new write
/// into the value already stored. Plain closures passed to
/// [`NodeIdIndex::add_or_update`](crate::index::NodeIdIndex::add_or_update)
/// cover one-off cases; implement this for reusable policies.
pub trait UpsertStrategy {
    /// Value stored when the digest has no entry yet.
    fn seed(&self) -> PointerList;
    /// Value stored when the digest already maps to `existing`.
    fn merge(&self, digest: &Digest, existing: PointerList) -> PointerList;
}

/// Appends pointers to the tail of the stored list, keeping prior order and
/// duplicates. This is the policy of the primary write path.
#[derive(Clone, Debug)]
pub struct Append {
    pointers: PointerList,
}

impl Append {
    /// Appends `pointers`, in order.
    pub fn new(pointers: impl Into<PointerList>) -> Self {
        Self {
            pointers: pointers.into(),
        }
    }

    /// Appends a single pointer.
    pub fn one(pointer: StoragePointer) -> Self {
        Self {
            pointers: vec![pointer],
        }
    }
}

impl UpsertStrategy for Append {
    fn seed(&self) -> PointerList {
        self.pointers.clone()
    }

    fn merge(&self, _digest: &Digest, mut existing: PointerList) -> PointerList {
        existing.extend_from_slice(&self.pointers);
        existing
    }
}

/// Stores `pointers` on first write and leaves existing entries as they are.
#[derive(Clone, Debug)]
pub struct KeepExisting {
    pointers: PointerList,
}

impl KeepExisting {
    /// Seeds with `pointers`.
    pub fn new(pointers: impl Into<PointerList>) -> Self {
        Self {
            pointers: pointers.into(),
        }
    }
}

impl UpsertStrategy for KeepExisting {
    fn seed(&self) -> PointerList {
        self.pointers.clone()
    }

    fn merge(&self, _digest: &Digest, existing: PointerList) -> PointerList {
        existing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order_and_duplicates() {
        let d = Digest::from(9u128);
        let a = StoragePointer::new(100, 200);
        let b = StoragePointer::new(300, 50);
        let strategy = Append::new(vec![b, a]);
        assert_eq!(strategy.seed(), vec![b, a]);
        assert_eq!(strategy.merge(&d, vec![a]), vec![a, b, a]);
    }

    #[test]
    fn keep_existing_ignores_new_pointers() {
        let d = Digest::from(9u128);
        let a = StoragePointer::new(1, 1);
        let strategy = KeepExisting::new(vec![StoragePointer::new(2, 2)]);
        assert_eq!(strategy.merge(&d, vec![a]), vec![a]);
        assert_eq!(strategy.seed(), vec![StoragePointer::new(2, 2)]);
        assert_eq!(Append::one(a).seed(), vec![a]);
    }
}
