//! Node identity index.
//!
//! Maps a node's [`Digest`] to the [`PointerList`](crate::model::PointerList)
//! of every write of that node, persisted in a [`KvStore`].

pub mod codec;
mod digest;
mod metrics;
mod node_index;
mod options;
mod store;
mod strategy;

pub use codec::ContentAddressCodec;
pub use digest::{hash_identity, Digest, IdentityHasher, DIGEST_LEN};
pub use metrics::{CounterMetrics, IndexMetrics, MetricsSnapshot, NoopMetrics};
pub use node_index::NodeIdIndex;
pub use options::IndexOptions;
pub use store::{KvStore, RedbStore, StoreOptions};
pub use strategy::{Append, KeepExisting, UpsertStrategy};
