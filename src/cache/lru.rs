//! LRU Tracker Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::HashMap;

use crate::cache::arena::{SlotArena, SlotId};

#[derive(Debug)]
struct LruNode {
    key: Box<[u8]>,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction strategy.
///
/// Keys are stored in a doubly-linked list where:
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// An index from key to list node makes every update O(1).
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Key to list node
    index: HashMap<Box<[u8]>, SlotId>,
    /// List nodes
    nodes: SlotArena<LruNode>,
    /// Most recently used
    head: Option<SlotId>,
    /// Least recently used
    tail: Option<SlotId>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Insert ==
    /// Starts tracking `key` at the most recently used end.
    ///
    /// Returns false if the key was already tracked; it is moved to the
    /// front instead.
    pub fn record_insert(&mut self, key: &[u8]) -> bool {
        if let Some(&id) = self.index.get(key) {
            self.move_to_front(id);
            return false;
        }
        let id = self.nodes.insert(LruNode {
            key: key.into(),
            prev: None,
            next: None,
        });
        self.push_front(id);
        self.index.insert(key.into(), id);
        true
    }

    // == Record Access ==
    /// Marks a key as recently used (moves to front).
    ///
    /// Returns false if the key is not tracked.
    pub fn record_access(&mut self, key: &[u8]) -> bool {
        match self.index.get(key) {
            Some(&id) => {
                self.move_to_front(id);
                true
            }
            None => false,
        }
    }

    // == Record Delete ==
    /// Stops tracking a key. Returns false if it was not tracked.
    pub fn record_delete(&mut self, key: &[u8]) -> bool {
        match self.index.remove(key) {
            Some(id) => {
                self.unlink(id);
                self.nodes.remove(id);
                true
            }
            None => false,
        }
    }

    // == Select Victim ==
    /// Returns the least recently used key without removing it.
    ///
    /// Returns None if tracker is empty.
    pub fn select_victim(&self) -> Option<&[u8]> {
        self.tail.map(|id| &*self.nodes.node(id).key)
    }

    fn move_to_front(&mut self, id: SlotId) {
        if self.head == Some(id) {
            return;
        }
        self.unlink(id);
        self.push_front(id);
    }

    fn push_front(&mut self, id: SlotId) {
        let old_head = self.head;
        {
            let node = self.nodes.node_mut(id);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => self.nodes.node_mut(head).prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    fn unlink(&mut self, id: SlotId) {
        let (prev, next) = {
            let node = self.nodes.node(id);
            (node.prev, node.next)
        };
        match prev {
            Some(prev) => self.nodes.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    /// Returns true if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.index.contains_key(key)
    }

    /// Iterates keys from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.nodes.node(cursor?);
            cursor = node.next;
            Some(&*node.key)
        })
    }

    /// Forgets every key.
    pub fn clear(&mut self) {
        self.index.clear();
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    // == Check Invariants ==
    /// Verifies list links agree with the index. Panics on any violation.
    pub fn check_invariants(&self) {
        let mut prev = None;
        let mut count = 0;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let node = self.nodes.node(id);
            assert_eq!(node.prev, prev, "LRU back link broken");
            assert_eq!(self.index.get(&node.key), Some(&id), "LRU index out of sync");
            count += 1;
            assert!(count <= self.index.len(), "LRU list longer than its index");
            prev = Some(id);
            cursor = node.next;
        }
        assert_eq!(self.tail, prev, "LRU tail out of sync");
        assert_eq!(count, self.index.len(), "LRU list shorter than its index");
        assert_eq!(count, self.nodes.len(), "orphaned LRU nodes");
    }
}
