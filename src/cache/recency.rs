//! Recency List Module
//!
//! Write-order tracking for cache eviction.
//!
//! Nodes live in a growable arena and link to each other by index. Two
//! sentinel nodes, `HEAD` and `TAIL`, are allocated up front and never
//! removed, so insertion and removal never special-case the list ends.
//!
//! ```text
//!   HEAD <-> [oldest] <-> ... <-> [newest] <-> TAIL
//! ```

use std::fmt;

const HEAD: usize = 0;
const TAIL: usize = 1;

// == Node Id ==
/// Handle to a node in the recency list.
///
/// Only meaningful for the list that issued it; stays valid until the node
/// is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<K> {
    /// None for sentinels and free slots
    key: Option<K>,
    prev: usize,
    next: usize,
}

// == Recency List ==
/// Doubly linked ordering of live keys, oldest write at the front.
pub struct RecencyList<K> {
    nodes: Vec<Node<K>>,
    /// Indices of released slots available for reuse
    free: Vec<usize>,
    len: usize,
}

impl<K> RecencyList<K> {
    // == Constructor ==
    /// Creates an empty list containing only the two sentinels.
    pub fn new() -> Self {
        Self {
            nodes: vec![
                Node {
                    key: None,
                    prev: HEAD,
                    next: TAIL,
                },
                Node {
                    key: None,
                    prev: HEAD,
                    next: TAIL,
                },
            ],
            free: Vec::new(),
            len: 0,
        }
    }

    // == Push Back ==
    /// Appends a key at the tail (newest position). O(1).
    pub fn push_back(&mut self, key: K) -> NodeId {
        let node = Node {
            key: Some(key),
            prev: HEAD,
            next: TAIL,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };

        self.attach_before_tail(idx);
        self.len += 1;
        NodeId(idx)
    }

    // == Move To Back ==
    /// Moves an existing node to the tail without reallocating it. O(1).
    pub fn move_to_back(&mut self, id: NodeId) {
        debug_assert!(self.is_live(id.0), "move_to_back on a released node");
        self.detach(id.0);
        self.attach_before_tail(id.0);
    }

    // == Remove ==
    /// Unlinks a node and releases its slot, returning its key. O(1).
    pub fn remove(&mut self, id: NodeId) -> Option<K> {
        if !self.is_live(id.0) {
            return None;
        }

        self.detach(id.0);
        self.free.push(id.0);
        self.len -= 1;
        self.nodes[id.0].key.take()
    }

    // == Front ==
    /// Returns the oldest key, if any.
    pub fn front(&self) -> Option<&K> {
        self.nodes[self.nodes[HEAD].next].key.as_ref()
    }

    /// Returns the key after the oldest one, if any.
    pub fn second(&self) -> Option<&K> {
        let first = self.nodes[HEAD].next;
        if first == TAIL {
            return None;
        }
        self.nodes[self.nodes[first].next].key.as_ref()
    }

    // == Length ==
    /// Returns the number of live (non-sentinel) nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[HEAD].next == TAIL
    }

    // == Clear ==
    /// Drops every node and relinks the sentinels.
    pub fn clear(&mut self) {
        self.nodes.truncate(2);
        self.nodes[HEAD].next = TAIL;
        self.nodes[TAIL].prev = HEAD;
        self.free.clear();
        self.len = 0;
    }

    /// Iterates keys from oldest to newest.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            current: self.nodes[HEAD].next,
        }
    }

    fn is_live(&self, idx: usize) -> bool {
        idx > TAIL && self.nodes.get(idx).is_some_and(|node| node.key.is_some())
    }

    fn detach(&mut self, idx: usize) {
        let Node { prev, next, .. } = self.nodes[idx];
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    fn attach_before_tail(&mut self, idx: usize) {
        let last = self.nodes[TAIL].prev;
        self.nodes[last].next = idx;
        self.nodes[idx].prev = last;
        self.nodes[idx].next = TAIL;
        self.nodes[TAIL].prev = idx;
    }
}

impl<K> Default for RecencyList<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for RecencyList<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// == Iterator ==
pub struct Iter<'a, K> {
    list: &'a RecencyList<K>,
    current: usize,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == TAIL {
            return None;
        }
        let node = &self.list.nodes[self.current];
        self.current = node.next;
        node.key.as_ref()
    }
}
