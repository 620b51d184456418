//! Key-scoped exclusive locks.
//!
//! Two requests touching the same owner (or the same owner pair, or the same
//! `(owner, species)` stat record) serialize on one mutex; unrelated keys run
//! in parallel.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone + Ord> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &K) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Run `f` while holding the lock for `key`.
    pub fn with_lock<T>(&self, key: &K, f: impl FnOnce() -> T) -> T {
        let slot = self.slot(key);
        let _guard = lock_slot(&slot);
        f()
    }

    /// Run `f` while holding the locks for both keys. Keys are locked in sorted
    /// order so `(a, b)` and `(b, a)` cannot deadlock; equal keys lock once.
    pub fn with_pair_lock<T>(&self, a: &K, b: &K, f: impl FnOnce() -> T) -> T {
        if a == b {
            return self.with_lock(a, f);
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first_slot = self.slot(first);
        let second_slot = self.slot(second);
        let _first_guard = lock_slot(&first_slot);
        let _second_guard = lock_slot(&second_slot);
        f()
    }
}

impl<K: Eq + Hash + Clone + Ord> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_slot(slot: &Mutex<()>) -> MutexGuard<'_, ()> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_same_key_serializes() {
        let locks = Arc::new(KeyedLocks::<u64>::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                thread::spawn(move || {
                    locks.with_lock(&1, || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        thread::yield_now();
                        inside.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("worker panicked");
        }
        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pair_lock_in_either_order() {
        let locks = KeyedLocks::<u64>::new();
        let total = locks.with_pair_lock(&2, &1, || locks.with_lock(&3, || 6));
        assert_eq!(total, 6);
        assert_eq!(locks.with_pair_lock(&4, &4, || 4), 4);
    }
}
