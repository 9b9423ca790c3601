use std::sync::Arc;

use crate::index::metrics::IndexMetrics;
use crate::index::store::StoreOptions;
use crate::primitives::concurrency::DEFAULT_LOCK_STRIPES;

/// Configuration supplied when opening a [`super::NodeIdIndex`].
#[derive(Clone)]
pub struct IndexOptions {
    /// Create the store when it does not exist yet.
    pub create_if_missing: bool,
    /// Number of lock stripes; must be a non-zero power of two.
    pub lock_stripes: usize,
    /// Store page cache budget in bytes; `None` keeps the store default.
    pub cache_size_bytes: Option<usize>,
    /// Optional metrics collection implementation.
    pub metrics: Option<Arc<dyn IndexMetrics>>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            lock_stripes: DEFAULT_LOCK_STRIPES,
            cache_size_bytes: None,
            metrics: None,
        }
    }
}

impl IndexOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables creating a missing store.
    pub fn create_if_missing(mut self, enabled: bool) -> Self {
        self.create_if_missing = enabled;
        self
    }

    /// Sets the lock stripe count.
    pub fn lock_stripes(mut self, stripes: usize) -> Self {
        self.lock_stripes = stripes;
        self
    }

    /// Sets the store page cache budget.
    pub fn cache_size_bytes(mut self, bytes: usize) -> Self {
        self.cache_size_bytes = Some(bytes);
        self
    }

    /// Sets the metrics collection implementation.
    pub fn metrics(mut self, metrics: Arc<dyn IndexMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub(crate) fn store_options(&self) -> StoreOptions {
        StoreOptions {
            create_if_missing: self.create_if_missing,
            cache_size_bytes: self.cache_size_bytes,
        }
    }
}

impl std::fmt::Debug for IndexOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexOptions")
            .field("create_if_missing", &self.create_if_missing)
            .field("lock_stripes", &self.lock_stripes)
            .field("cache_size_bytes", &self.cache_size_bytes)
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}
