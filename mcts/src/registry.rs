use std::{hash::Hash, sync::Arc};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Map from state to a shared per-state slot.
/// The map lock is only held while looking up or inserting a slot,
/// never while a slot is being worked on.
pub struct Registry<S, T> {
    slots: RwLock<FxHashMap<S, Arc<T>>>,
}

impl<S, T> Default for Registry<S, T> {
    fn default() -> Self {
        Registry {
            slots: RwLock::new(FxHashMap::default()),
        }
    }
}

impl<S: Eq + Hash + Clone, T> Registry<S, T> {
    pub fn get(&self, state: &S) -> Option<Arc<T>> {
        self.slots.read().get(state).cloned()
    }

    /// Look up the slot for `state`, creating it with `make` if it is missing.
    /// Concurrent callers for the same state all receive the same slot.
    pub fn get_or_insert_with(&self, state: &S, make: impl FnOnce() -> T) -> Arc<T> {
        if let Some(slot) = self.get(state) {
            return slot;
        }
        self.slots
            .write()
            .entry(state.clone())
            .or_insert_with(|| Arc::new(make()))
            .clone()
    }

    /// Snapshot of the keys whose slot satisfies `keep`.
    pub fn keys_where(&self, keep: impl Fn(&T) -> bool) -> Vec<S> {
        self.slots
            .read()
            .iter()
            .filter(|&(_, slot)| keep(&**slot))
            .map(|(state, _)| state.clone())
            .collect()
    }

    pub fn count_where(&self, keep: impl Fn(&T) -> bool) -> usize {
        self.slots.read().values().filter(|&slot| keep(&**slot)).count()
    }

    pub fn clear(&mut self) {
        self.slots.get_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Barrier,
        },
        thread,
    };

    use super::Registry;

    #[test]
    fn slot_is_created_once() {
        const THREADS: usize = 8;
        let registry: Registry<u64, usize> = Registry::default();
        let created = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);

        let slots: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|i| {
                    let (registry, created, barrier) = (&registry, &created, &barrier);
                    s.spawn(move || {
                        barrier.wait();
                        registry.get_or_insert_with(&7, || {
                            created.fetch_add(1, Ordering::SeqCst);
                            i
                        })
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert!(slots.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.keys_where(|_| true), vec![7]);
    }

    #[test]
    fn missing_key_reads_as_absent() {
        let registry: Registry<&str, ()> = Registry::default();
        assert!(registry.get(&"root").is_none());
        assert!(registry.keys_where(|_| true).is_empty());
    }
}
