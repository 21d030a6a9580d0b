use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

struct Entry {
    generation: u64,
    token: CancellationToken,
}

struct Inner<K> {
    next_generation: u64,
    entries: BTreeMap<K, Entry>,
}

/// At most one live task per key. Each claim gets a generation so a task
/// that finishes after being replaced cannot release its successor.
pub(crate) struct TaskRegistry<K> {
    inner: Arc<Mutex<Inner<K>>>,
}

impl<K> Clone for TaskRegistry<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Ord + Copy> TaskRegistry<K> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                next_generation: 1,
                entries: BTreeMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a task for `key`. Returns `Err` with the live generation if
    /// one is already registered.
    pub(crate) fn claim(&self, key: K) -> Result<(u64, CancellationToken), u64> {
        let mut inner = self.lock();
        if let Some(entry) = inner.entries.get(&key) {
            return Err(entry.generation);
        }
        let generation = inner.next_generation;
        inner.next_generation += 1;
        let token = CancellationToken::new();
        inner.entries.insert(
            key,
            Entry {
                generation,
                token: token.clone(),
            },
        );
        Ok((generation, token))
    }

    /// Drops the entry for `key` if it still belongs to `generation`.
    pub(crate) fn release(&self, key: K, generation: u64) -> bool {
        let mut inner = self.lock();
        match inner.entries.get(&key) {
            Some(entry) if entry.generation == generation => {
                inner.entries.remove(&key);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn cancel(&self, key: K, generation: Option<u64>) -> bool {
        let mut inner = self.lock();
        let matches = inner
            .entries
            .get(&key)
            .is_some_and(|entry| generation.map_or(true, |g| g == entry.generation));
        if !matches {
            return false;
        }
        match inner.entries.remove(&key) {
            Some(entry) => {
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    pub(crate) fn cancel_all(&self) -> usize {
        let mut inner = self.lock();
        let entries = std::mem::take(&mut inner.entries);
        for entry in entries.values() {
            entry.token.cancel();
        }
        entries.len()
    }

    pub(crate) fn generation(&self, key: K) -> Option<u64> {
        self.lock().entries.get(&key).map(|entry| entry.generation)
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().entries.len()
    }
}
