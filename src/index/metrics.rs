use std::sync::atomic::{AtomicU64, Ordering};

/// Hooks for counting index operations.
///
/// Implementations must be cheap and thread-safe; they are called while a
/// lock stripe is held.
pub trait IndexMetrics: Send + Sync {
    /// A digest received its first entry.
    fn entry_created(&self);

    /// An existing entry was merged and rewritten.
    fn entry_merged(&self);

    /// A read-only lookup completed; `hit` is false when the digest was absent.
    fn lookup(&self, hit: bool);

    /// An operation failed with a store or decode error.
    fn failure(&self);
}

/// Discards every event.
#[derive(Default)]
pub struct NoopMetrics;

impl IndexMetrics for NoopMetrics {
    fn entry_created(&self) {}
    fn entry_merged(&self) {}
    fn lookup(&self, _hit: bool) {}
    fn failure(&self) {}
}

/// Atomic counters for every [`IndexMetrics`] event.
#[derive(Default)]
pub struct CounterMetrics {
    /// Entries created.
    pub entries_created: AtomicU64,
    /// Entries merged.
    pub entries_merged: AtomicU64,
    /// Lookups that found an entry.
    pub lookup_hits: AtomicU64,
    /// Lookups for absent digests.
    pub lookup_misses: AtomicU64,
    /// Failed operations.
    pub failures: AtomicU64,
}

/// Point-in-time copy of [`CounterMetrics`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MetricsSnapshot {
    /// Entries created.
    pub entries_created: u64,
    /// Entries merged.
    pub entries_merged: u64,
    /// Lookups that found an entry.
    pub lookup_hits: u64,
    /// Lookups for absent digests.
    pub lookup_misses: u64,
    /// Failed operations.
    pub failures: u64,
}

impl CounterMetrics {
    /// Reads all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            entries_created: self.entries_created.load(Ordering::Relaxed),
            entries_merged: self.entries_merged.load(Ordering::Relaxed),
            lookup_hits: self.lookup_hits.load(Ordering::Relaxed),
            lookup_misses: self.lookup_misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

impl IndexMetrics for CounterMetrics {
    fn entry_created(&self) {
        self.entries_created.fetch_add(1, Ordering::Relaxed);
    }

    fn entry_merged(&self) {
        self.entries_merged.fetch_add(1, Ordering::Relaxed);
    }

    fn lookup(&self, hit: bool) {
        if hit {
            self.lookup_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.lookup_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_events() {
        let m = CounterMetrics::default();
        m.entry_created();
        m.entry_merged();
        m.entry_merged();
        m.lookup(true);
        m.lookup(false);
        m.failure();
        assert_eq!(
            m.snapshot(),
            MetricsSnapshot {
                entries_created: 1,
                entries_merged: 2,
                lookup_hits: 1,
                lookup_misses: 1,
                failures: 1,
            }
        );
    }
}
