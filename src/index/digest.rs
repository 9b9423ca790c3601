use std::fmt;

use xxhash_rust::xxh3::xxh3_128;

use crate::model::NodeIdentity;
use crate::primitives::bytes::ord;
use crate::types::{IndexError, Result};

/// Width of a [`Digest`] in bytes.
pub const DIGEST_LEN: usize = 16;

const IDENTITY_DOMAIN: &[u8] = b"node-identity/1";

/// 128-bit key derived from a [`NodeIdentity`].
///
/// Distinct identities that collide share one index entry; collisions are
/// not detected.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Wraps raw digest bytes.
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses a digest from a store key.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; DIGEST_LEN] = bytes
            .try_into()
            .map_err(|_| IndexError::Invalid("digest must be 16 bytes"))?;
        Ok(Self(arr))
    }

    /// Raw bytes, used as the store key.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Big-endian integer view of the digest.
    pub fn to_u128(&self) -> u128 {
        u128::from_be_bytes(self.0)
    }

    /// Low 64 bits, used to pick a lock stripe.
    pub fn stripe_hash(&self) -> u64 {
        self.to_u128() as u64
    }
}

impl From<u128> for Digest {
    fn from(value: u128) -> Self {
        Self(value.to_be_bytes())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.to_u128())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

/// Derives index keys from node identities.
///
/// XXH3-128 over a domain tag and the length-prefixed graph and node id.
/// No seed or process-local salt is involved, so digests written by one
/// process are found again by the next.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityHasher;

impl IdentityHasher {
    /// Hashes `identity` into its digest.
    pub fn hash(&self, identity: &NodeIdentity) -> Digest {
        hash_identity(identity)
    }
}

/// Free-function form of [`IdentityHasher::hash`].
pub fn hash_identity(identity: &NodeIdentity) -> Digest {
    let fields = identity.graph().len() + identity.node_id().len();
    let mut buf = Vec::with_capacity(IDENTITY_DOMAIN.len() + 8 + fields);
    buf.extend_from_slice(IDENTITY_DOMAIN);
    ord::put_str_key(&mut buf, identity.graph());
    ord::put_str_key(&mut buf, identity.node_id());
    Digest::from(xxh3_128(&buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn structurally_equal_identities_share_a_digest() {
        let a = NodeIdentity::new("graph", "1");
        let b = NodeIdentity::new(String::from("graph"), String::from("1"));
        assert_eq!(hash_identity(&a), hash_identity(&b));
        assert_eq!(IdentityHasher.hash(&a), hash_identity(&a));
    }

    #[test]
    fn digests_are_pinned_across_builds() {
        // changing these values orphans every entry already on disk
        let cases = [
            (("graph", "1"), "e4148a5ec25eb34a34e9eba893b32b72"),
            (("graph1", "12345"), "8b750dc53ef96e8b6f05405b6809f8ec"),
            (("", ""), "56d43d150f42017c298fe8abebe50d07"),
        ];
        for ((graph, node), expected) in cases {
            let digest = hash_identity(&NodeIdentity::new(graph, node));
            assert_eq!(digest.to_string(), expected, "{graph}/{node}");
        }
    }

    #[test]
    fn field_boundaries_are_part_of_the_digest() {
        let a = hash_identity(&NodeIdentity::new("ab", "c"));
        let b = hash_identity(&NodeIdentity::new("a", "bc"));
        assert_ne!(a, b);
        assert_ne!(
            hash_identity(&NodeIdentity::new("g", "")),
            hash_identity(&NodeIdentity::new("", "g"))
        );
    }

    #[test]
    fn digest_bytes_roundtrip_and_display() {
        let d = hash_identity(&NodeIdentity::new("graph1", "12345"));
        let back = Digest::from_slice(d.as_bytes()).unwrap();
        assert_eq!(back, d);
        assert_eq!(d.to_string().len(), 32);
        assert!(Digest::from_slice(&[0u8; 8]).is_err());
        assert_eq!(Digest::from(1u128).stripe_hash(), 1);
    }

    proptest! {
        #[test]
        fn hashing_is_deterministic(graph in ".{0,16}", node in ".{0,16}") {
            let identity = NodeIdentity::new(graph.clone(), node.clone());
            let again = NodeIdentity::new(graph, node);
            prop_assert_eq!(hash_identity(&identity), hash_identity(&again));
        }
    }
}
