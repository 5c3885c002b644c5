//! Per-key lock striping for ledger and registry mutations.
//!
//! RocksDB gives us atomic writes but not atomic read-modify-write, so the
//! store serializes all mutations touching the same key through a dedicated
//! mutex. Mutations on different keys proceed concurrently.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// A map of lazily created per-key mutexes.
///
/// Entries are never reclaimed: accounts are never deleted and VPS ids are
/// allocated from a small monotonic counter, so the map stays bounded by the
/// working set.
#[derive(Default)]
pub struct KeyLocks {
    inner: Mutex<HashMap<u64, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    /// Create an empty lock map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the mutex guarding the given key, creating it on first use.
    ///
    /// The caller locks the returned handle for the duration of its
    /// read-modify-write sequence.
    #[must_use]
    pub fn acquire(&self, key: u64) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock();
        map.entry(key).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_shares_a_mutex() {
        let locks = KeyLocks::new();
        let a = locks.acquire(1);
        let b = locks.acquire(1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_keys_do_not_share() {
        let locks = KeyLocks::new();
        let a = locks.acquire(1);
        let b = locks.acquire(2);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn serializes_concurrent_increments() {
        let locks = Arc::new(KeyLocks::new());
        let counter = Arc::new(Mutex::new(0u64));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        let lock = locks.acquire(7);
                        let _guard = lock.lock();
                        let mut c = counter.lock();
                        *c += 1;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*counter.lock(), 800);
    }
}
