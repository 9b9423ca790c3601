use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::index::codec;
use crate::index::digest::{hash_identity, Digest};
use crate::index::metrics::{IndexMetrics, NoopMetrics};
use crate::index::options::IndexOptions;
use crate::index::store::{KvStore, RedbStore};
use crate::index::strategy::{Append, UpsertStrategy};
use crate::model::{NodeIdentity, PointerList, StoragePointer};
use crate::primitives::concurrency::StripedLocks;
use crate::types::{IndexError, Result};

/// Durable map from node digests to the pointers of every write of that node.
///
/// Upserts on the same digest are serialized through a striped lock table;
/// upserts on digests in different stripes run in parallel and only meet
/// inside the store. Reads take no index lock.
///
/// The index must be closed with [`NodeIdIndex::close`]; dropping an open
/// index closes it as well and logs a warning. Every call after close fails
/// with [`IndexError::StoreUnavailable`].
pub struct NodeIdIndex {
    store: Arc<dyn KvStore>,
    locks: StripedLocks,
    metrics: Arc<dyn IndexMetrics>,
    closed: AtomicBool,
}

impl NodeIdIndex {
    /// Opens (or creates, per `options`) the index stored at `path`.
    pub fn open(path: impl AsRef<Path>, options: IndexOptions) -> Result<Self> {
        let locks = StripedLocks::new(options.lock_stripes)?;
        let store = RedbStore::open(path, &options.store_options())?;
        Ok(Self::assemble(Arc::new(store), locks, &options))
    }

    /// Opens an index over an already opened store.
    pub fn with_store(store: Arc<dyn KvStore>, options: IndexOptions) -> Result<Self> {
        if store.is_closed() {
            return Err(IndexError::closed());
        }
        let locks = StripedLocks::new(options.lock_stripes)?;
        Ok(Self::assemble(store, locks, &options))
    }

    /// Opens the index, runs `f`, and closes the index on every exit path.
    ///
    /// An error from `f` takes precedence over an error from closing.
    pub fn scoped<T, F>(path: impl AsRef<Path>, options: IndexOptions, f: F) -> Result<T>
    where
        F: FnOnce(&NodeIdIndex) -> Result<T>,
    {
        let index = Self::open(path, options)?;
        let outcome = f(&index);
        let closed = index.close();
        let value = outcome?;
        closed?;
        Ok(value)
    }

    fn assemble(store: Arc<dyn KvStore>, locks: StripedLocks, options: &IndexOptions) -> Self {
        let metrics = options
            .metrics
            .clone()
            .unwrap_or_else(|| Arc::new(NoopMetrics));
        debug!(stripes = locks.len(), "node index ready");
        Self {
            store,
            locks,
            metrics,
            closed: AtomicBool::new(false),
        }
    }

    /// Creates or updates the entry for `digest`.
    ///
    /// With no entry, `seed()` is stored and returned. Otherwise the stored
    /// list is decoded, passed to `merge`, and the result is stored and
    /// returned. The whole read-decide-write runs under the digest's lock
    /// stripe. On any error the stored entry is unchanged.
    pub fn add_or_update<S, M>(&self, digest: &Digest, seed: S, merge: M) -> Result<PointerList>
    where
        S: FnOnce() -> PointerList,
        M: FnOnce(&Digest, PointerList) -> PointerList,
    {
        self.ensure_open()?;
        let guard = self.locks.lock(digest.stripe_hash());
        let result = self.upsert_locked(digest, seed, merge);
        if let Err(err) = &result {
            debug!(%digest, stripe = guard.stripe(), error = %err, "index upsert failed");
            self.metrics.failure();
        }
        result
    }

    /// [`NodeIdIndex::add_or_update`] driven by a reusable strategy.
    pub fn add_or_update_with<U>(&self, digest: &Digest, strategy: &U) -> Result<PointerList>
    where
        U: UpsertStrategy + ?Sized,
    {
        self.add_or_update(digest, || strategy.seed(), |d, existing| {
            strategy.merge(d, existing)
        })
    }

    /// Appends `pointers` to the entry for `digest`, creating it if needed.
    pub fn append(
        &self,
        digest: &Digest,
        pointers: impl Into<PointerList>,
    ) -> Result<PointerList> {
        self.add_or_update_with(digest, &Append::new(pointers))
    }

    /// Records one more write of `identity`'s data at `pointer`.
    pub fn record(&self, identity: &NodeIdentity, pointer: StoragePointer) -> Result<PointerList> {
        self.add_or_update_with(&hash_identity(identity), &Append::one(pointer))
    }

    fn upsert_locked<S, M>(&self, digest: &Digest, seed: S, merge: M) -> Result<PointerList>
    where
        S: FnOnce() -> PointerList,
        M: FnOnce(&Digest, PointerList) -> PointerList,
    {
        let key = digest.as_bytes();
        let (next, created) = match self.store.get(key)? {
            None => (seed(), true),
            Some(bytes) => {
                let existing = codec::decode(&bytes)?;
                (merge(digest, existing), false)
            }
        };
        let encoded = codec::encode(&next)?;
        self.store.put(key, &encoded)?;
        if created {
            debug!(%digest, pointers = next.len(), "index entry created");
            self.metrics.entry_created();
        } else {
            debug!(%digest, pointers = next.len(), "index entry merged");
            self.metrics.entry_merged();
        }
        Ok(next)
    }

    /// Reads the entry for `digest`. `Ok(None)` means it was never written;
    /// unreadable bytes are an error.
    pub fn get(&self, digest: &Digest) -> Result<Option<PointerList>> {
        self.ensure_open()?;
        let found = match self.store.get(digest.as_bytes()) {
            Ok(found) => found,
            Err(err) => {
                self.metrics.failure();
                return Err(err);
            }
        };
        self.metrics.lookup(found.is_some());
        match found {
            None => Ok(None),
            Some(bytes) => codec::decode(&bytes).map(Some).inspect_err(|_| {
                self.metrics.failure();
            }),
        }
    }

    /// Reads the entry for `identity`.
    pub fn lookup(&self, identity: &NodeIdentity) -> Result<Option<PointerList>> {
        self.get(&hash_identity(identity))
    }

    /// Number of lock stripes.
    pub fn lock_stripes(&self) -> usize {
        self.locks.len()
    }

    /// Whether [`NodeIdIndex::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Flushes and closes the store. Later calls return `Ok(())` and do
    /// nothing.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let flushed = self.store.flush();
        let closed = self.store.close();
        info!("node index closed");
        flushed.and(closed)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(IndexError::closed());
        }
        Ok(())
    }
}

impl Drop for NodeIdIndex {
    fn drop(&mut self) {
        if self.is_closed() {
            return;
        }
        warn!("node index dropped without close; closing now");
        if let Err(err) = self.close() {
            warn!(error = %err, "closing node index on drop failed");
        }
    }
}
