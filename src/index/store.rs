//! Durable byte-key to byte-value storage behind the node index.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use redb::{Database, ReadableDatabase, TableDefinition, WriteTransaction};
use tracing::{debug, info};

use crate::types::{IndexError, Result};

/// Table holding digest -> encoded pointer list entries.
const NODE_INDEX: TableDefinition<&[u8], &[u8]> = TableDefinition::new("node_index");

/// A thread-safe, durable key-value store.
///
/// `get` and `put` on different keys may be called concurrently. The store
/// does not make a read followed by a write atomic; the index layers that
/// on top. After [`KvStore::close`] every call fails with
/// [`IndexError::StoreUnavailable`].
pub trait KvStore: Send + Sync + 'static {
    /// Reads the value stored under `key`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;
    /// Durably stores `value` under `key`, replacing any previous value.
    /// On error the previous value is left untouched.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;
    /// Makes all completed puts durable.
    fn flush(&self) -> Result<()>;
    /// Flushes and releases the store. Calling it again is a no-op.
    fn close(&self) -> Result<()>;
    /// Whether `close` has run.
    fn is_closed(&self) -> bool;
}

/// How to open a [`RedbStore`].
#[derive(Clone, Debug)]
pub struct StoreOptions {
    /// Create the database file (and parent directories) when absent.
    pub create_if_missing: bool,
    /// Page cache budget handed to redb, in bytes.
    pub cache_size_bytes: Option<usize>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            cache_size_bytes: None,
        }
    }
}

/// [`KvStore`] backed by an embedded redb database file.
///
/// Every `put` is its own write transaction committed with redb's default
/// (immediate) durability.
pub struct RedbStore {
    path: PathBuf,
    db: RwLock<Option<Database>>,
}

impl RedbStore {
    /// Opens the database at `path`.
    ///
    /// Fails with [`IndexError::StoreUnavailable`] when the file is missing
    /// and `create_if_missing` is off, or when redb cannot open it.
    pub fn open(path: impl AsRef<Path>, opts: &StoreOptions) -> Result<Self> {
        let path = path.as_ref();
        let mut builder = Database::builder();
        if let Some(bytes) = opts.cache_size_bytes {
            builder.set_cache_size(bytes);
        }
        let opened = if opts.create_if_missing {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|err| {
                    IndexError::unavailable(format!(
                        "cannot create directory {}: {err}",
                        parent.display()
                    ))
                })?;
            }
            builder.create(path)
        } else {
            if !path.exists() {
                return Err(IndexError::unavailable(format!(
                    "no index store at {}",
                    path.display()
                )));
            }
            builder.open(path)
        };
        let db = opened.map_err(|err| {
            IndexError::unavailable(format!("cannot open {}: {err}", path.display()))
        })?;
        ensure_table(&db).map_err(|err| {
            IndexError::unavailable(format!(
                "cannot initialise {}: {err}",
                path.display()
            ))
        })?;
        info!(path = %path.display(), "index store opened");
        Ok(Self {
            path: path.to_path_buf(),
            db: RwLock::new(Some(db)),
        })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn insert(txn: &WriteTransaction, key: &[u8], value: &[u8]) -> Result<()> {
        let mut table = txn.open_table(NODE_INDEX).map_err(io_failure)?;
        table.insert(key, value).map_err(io_failure)?;
        Ok(())
    }
}

impl KvStore for RedbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or_else(IndexError::closed)?;
        let txn = db.begin_read().map_err(io_failure)?;
        let table = txn.open_table(NODE_INDEX).map_err(io_failure)?;
        let value = table.get(key).map_err(io_failure)?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or_else(IndexError::closed)?;
        let txn = db.begin_write().map_err(io_failure)?;
        if let Err(err) = Self::insert(&txn, key, value) {
            let _ = txn.abort();
            return Err(err);
        }
        txn.commit().map_err(io_failure)
    }

    fn flush(&self) -> Result<()> {
        // commits are durable on return; only the handle state is checked
        if self.db.read().is_none() {
            return Err(IndexError::closed());
        }
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let mut guard = self.db.write();
        if let Some(db) = guard.take() {
            drop(db);
            info!(path = %self.path.display(), "index store closed");
        } else {
            debug!(path = %self.path.display(), "index store already closed");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.db.read().is_none()
    }
}

fn ensure_table(db: &Database) -> std::result::Result<(), redb::Error> {
    let txn = db.begin_write()?;
    txn.open_table(NODE_INDEX)?;
    txn.commit()?;
    Ok(())
}

fn io_failure(err: impl Into<redb::Error>) -> IndexError {
    match err.into() {
        redb::Error::Io(err) => IndexError::Io(err),
        other => IndexError::Io(io::Error::other(other.to_string())),
    }
}
