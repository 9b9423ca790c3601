mod support;

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use graphidx::{hash_identity, Digest, NodeIdentity, Result, StoragePointer};
use support::Scratch;

const SAME_KEY_THREADS: usize = 1000;
const DISTINCT_KEY_THREADS: usize = 64;
const WRITES_PER_KEY: usize = 4;

#[test]
fn same_digest_from_many_threads_loses_nothing() -> Result<()> {
    let scratch = Scratch::new();
    let index = Arc::new(scratch.open());
    let digest = hash_identity(&NodeIdentity::new("graph", "hot"));
    let barrier = Arc::new(Barrier::new(SAME_KEY_THREADS));

    let handles: Vec<_> = (0..SAME_KEY_THREADS)
        .map(|i| {
            let index = Arc::clone(&index);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || -> Result<()> {
                let mine = StoragePointer::new(i as u64, 1);
                barrier.wait();
                index.add_or_update(&digest, || vec![mine], |_, mut existing| {
                    existing.push(mine);
                    existing
                })?;
                Ok(())
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap()?;
    }

    let stored = index.get(&digest)?.expect("entry exists");
    assert_eq!(stored.len(), SAME_KEY_THREADS);
    let offsets: HashSet<u64> = stored.iter().map(|p| p.offset).collect();
    assert_eq!(offsets, (0..SAME_KEY_THREADS as u64).collect::<HashSet<_>>());
    index.close()?;
    Ok(())
}

#[test]
fn distinct_digests_are_independent() -> Result<()> {
    let scratch = Scratch::new();
    let index = Arc::new(scratch.open());
    let barrier = Arc::new(Barrier::new(DISTINCT_KEY_THREADS));

    let handles: Vec<_> = (0..DISTINCT_KEY_THREADS)
        .map(|t| {
            let index = Arc::clone(&index);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || -> Result<()> {
                let id = NodeIdentity::new("graph", format!("node-{t}"));
                barrier.wait();
                for w in 0..WRITES_PER_KEY {
                    index.record(&id, StoragePointer::new((t * 100 + w) as u64, 8))?;
                }
                Ok(())
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap()?;
    }

    for t in 0..DISTINCT_KEY_THREADS {
        let id = NodeIdentity::new("graph", format!("node-{t}"));
        let expected: Vec<StoragePointer> = (0..WRITES_PER_KEY)
            .map(|w| StoragePointer::new((t * 100 + w) as u64, 8))
            .collect();
        assert_eq!(index.lookup(&id)?, Some(expected), "node-{t}");
    }
    index.close()?;
    Ok(())
}

#[test]
fn readers_never_see_an_entry_shrink_or_vanish() -> Result<()> {
    const WRITERS: usize = 8;
    const WRITES: usize = 25;
    let scratch = Scratch::new();
    let index = Arc::new(scratch.open());
    let digest = Digest::from(0xfeed_u128);
    index.append(&digest, vec![StoragePointer::null()])?;

    let barrier = Arc::new(Barrier::new(WRITERS + 1));
    let writers: Vec<_> = (0..WRITERS)
        .map(|w| {
            let index = Arc::clone(&index);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || -> Result<()> {
                barrier.wait();
                for i in 0..WRITES {
                    index.append(&digest, vec![StoragePointer::new((w * WRITES + i) as u64, 1)])?;
                }
                Ok(())
            })
        })
        .collect();

    let reader = {
        let index = Arc::clone(&index);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || -> Result<()> {
            barrier.wait();
            let mut last = 0;
            while last < WRITERS * WRITES + 1 {
                let seen = index.get(&digest)?.expect("entry never disappears");
                assert!(seen.len() >= last, "entry shrank from {last} to {}", seen.len());
                assert_eq!(seen[0], StoragePointer::null(), "history was reordered");
                last = seen.len();
            }
            Ok(())
        })
    };

    for handle in writers {
        handle.join().unwrap()?;
    }
    reader.join().unwrap()?;
    assert_eq!(index.get(&digest)?.unwrap().len(), WRITERS * WRITES + 1);
    index.close()?;
    Ok(())
}
