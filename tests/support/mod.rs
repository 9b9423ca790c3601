#![allow(dead_code)]

use std::path::PathBuf;

use graphidx::{IndexOptions, NodeIdIndex};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A scratch directory plus the store path inside it.
pub struct Scratch {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl Scratch {
    pub fn new() -> Self {
        init_tracing();
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("node-ids.redb");
        Self { dir, path }
    }

    pub fn open(&self) -> NodeIdIndex {
        NodeIdIndex::open(&self.path, IndexOptions::default()).expect("open index")
    }
}
