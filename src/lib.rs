//! Durable node identity index for graph storage.
//!
//! A [`NodeIdIndex`] maps the digest of a node's `(graph, node id)` identity
//! to the ordered list of storage pointers recording every write of that
//! node. Upserts on the same digest are linearizable; upserts on different
//! digests do not share an index lock.

#![warn(missing_docs)]

pub mod config;
pub mod index;
pub mod model;
pub mod primitives;
pub mod types;

pub use config::{ConfigError, IndexConfig};
pub use index::{
    hash_identity, Append, ContentAddressCodec, CounterMetrics, Digest, IdentityHasher,
    IndexMetrics, IndexOptions, KeepExisting, KvStore, NodeIdIndex, RedbStore, StoreOptions,
    UpsertStrategy,
};
pub use model::{
    AddressBlock, BinaryBlock, DataBlock, KeyValue, Node, NodeAddress, NodeIdentity, PointerList,
    StoragePointer, TypedData,
};
pub use types::{IndexError, Result};
