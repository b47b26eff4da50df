//! Expiration Queue Module
//!
//! Min-heap of absolute expiry instants with a key to heap-slot index, so an
//! entry can be dropped from any position in O(log n) when it is deleted,
//! overwritten, or evicted before it expires.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

// == Expiration Slot ==
#[derive(Debug, Clone)]
struct Slot<K> {
    key: K,
    expire_at: Instant,
}

// == Expiration Queue ==
/// Binary min-heap ordered by expiry instant.
///
/// Every swap during sift-up/sift-down updates `index`, so `index[key]` is
/// always the key's current position in `heap`.
#[derive(Debug)]
pub struct ExpirationQueue<K> {
    heap: Vec<Slot<K>>,
    index: HashMap<K, usize>,
}

impl<K: Hash + Eq + Clone> ExpirationQueue<K> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            index: HashMap::new(),
        }
    }

    // == Push ==
    /// Schedules `key` to expire at `expire_at`, replacing any previous
    /// schedule for the same key.
    pub fn push(&mut self, key: K, expire_at: Instant) {
        self.remove(&key);

        let pos = self.heap.len();
        self.index.insert(key.clone(), pos);
        self.heap.push(Slot { key, expire_at });
        self.sift_up(pos);
    }

    // == Remove ==
    /// Drops the schedule for `key`, returning its expiry instant.
    ///
    /// The slot is swapped with the last element and the moved element is
    /// re-sifted in whichever direction restores heap order.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<Instant>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let pos = self.index.remove(key)?;
        let last = self.heap.len() - 1;

        self.heap.swap(pos, last);
        let removed = self.heap.pop()?;

        if pos < self.heap.len() {
            self.index.insert(self.heap[pos].key.clone(), pos);
            self.sift_down(pos);
            self.sift_up(pos);
        }

        Some(removed.expire_at)
    }

    // == Peek ==
    /// Returns the earliest scheduled expiry.
    pub fn peek(&self) -> Option<(&K, Instant)> {
        self.heap.first().map(|slot| (&slot.key, slot.expire_at))
    }

    // == Pop Expired ==
    /// Removes and returns the root if it is due at `now`.
    ///
    /// Returns None as soon as the root lies in the future; heap order
    /// guarantees every other slot does too.
    pub fn pop_expired(&mut self, now: Instant) -> Option<(K, Instant)> {
        let (root, expire_at) = self.peek()?;
        if expire_at > now {
            return None;
        }

        let key = root.clone();
        self.remove(&key)?;
        Some((key, expire_at))
    }

    /// Returns the scheduled expiry of `key`.
    pub fn deadline<Q>(&self, key: &Q) -> Option<Instant>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&pos| self.heap[pos].expire_at)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.index.clear();
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.heap[pos].expire_at >= self.heap[parent].expire_at {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;

            if left < len && self.heap[left].expire_at < self.heap[smallest].expire_at {
                smallest = left;
            }
            if right < len && self.heap[right].expire_at < self.heap[smallest].expire_at {
                smallest = right;
            }
            if smallest == pos {
                break;
            }

            self.swap(pos, smallest);
            pos = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        if let Some(slot) = self.index.get_mut(&self.heap[a].key) {
            *slot = a;
        }
        if let Some(slot) = self.index.get_mut(&self.heap[b].key) {
            *slot = b;
        }
    }

    /// Checks heap order and index consistency.
    #[cfg(test)]
    pub(crate) fn validate(&self) {
        assert_eq!(self.heap.len(), self.index.len());
        for (pos, slot) in self.heap.iter().enumerate() {
            assert_eq!(self.index.get(&slot.key), Some(&pos));
            if pos > 0 {
                assert!(self.heap[(pos - 1) / 2].expire_at <= slot.expire_at);
            }
        }
    }
}

impl<K: Hash + Eq + Clone> Default for ExpirationQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
