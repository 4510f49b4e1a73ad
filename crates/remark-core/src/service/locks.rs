//! Scoped lock registry

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Lazily created exclusive locks, one per resource key
///
/// Every caller asking for the same key gets the same lock instance. Locks are
/// never evicted, so the map grows with the number of distinct keys (page
/// URLs) seen by the process.
#[derive(Debug, Default)]
pub struct ScopedLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ScopedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock for `key`, creating it on first use
    ///
    /// The registry mutex is held only for the lookup-or-insert.
    pub fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = locks.get(key) {
            return Arc::clone(lock);
        }
        let lock = Arc::new(Mutex::new(()));
        locks.insert(key.to_string(), Arc::clone(&lock));
        lock
    }

    /// Number of resident locks
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_same_key_same_lock() {
        let locks = ScopedLocks::new();
        let a = locks.lock_for("https://example.com/1");
        let b = locks.lock_for("https://example.com/1");
        let c = locks.lock_for("https://example.com/2");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(locks.len(), 2);
    }

    #[test]
    fn test_concurrent_first_use_single_instance() {
        let locks = ScopedLocks::new();
        let barrier = Barrier::new(16);

        let acquired: Vec<Arc<Mutex<()>>> = thread::scope(|s| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        locks.lock_for("https://example.com/hot")
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(locks.len(), 1);
        assert!(acquired.iter().all(|l| Arc::ptr_eq(l, &acquired[0])));
    }

    #[test]
    fn test_lock_survives_poisoning() {
        let locks = ScopedLocks::new();
        let lock = locks.lock_for("k");
        let poisoner = Arc::clone(&lock);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison");
        })
        .join();

        let again = locks.lock_for("k");
        assert!(Arc::ptr_eq(&lock, &again));
        let _guard = again.lock().unwrap_or_else(PoisonError::into_inner);
    }
}
