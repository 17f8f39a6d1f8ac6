//! Collision Chain Module
//!
//! A doubly-linked list of entries sharing one bucket. Nodes live in a
//! [`SlotArena`] owned by the hash table; a chain only records its head
//! and length, so an empty chain is just `Chain::default()`.

use crate::cache::arena::{SlotArena, SlotId};
use crate::cache::CacheEntry;

// == Chain Node ==
/// Arena node: an entry plus its links within one bucket.
#[derive(Debug)]
pub struct ChainNode {
    pub entry: CacheEntry,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

impl ChainNode {
    pub fn new(entry: CacheEntry) -> Self {
        Self {
            entry,
            prev: None,
            next: None,
        }
    }
}

// == Chain ==
/// Head-inserted chain of arena nodes. Newest entry first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Chain {
    head: Option<SlotId>,
    len: usize,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    // == Insert Front ==
    /// Stores `entry` in the arena and links it at the head. O(1).
    pub fn insert_front(&mut self, nodes: &mut SlotArena<ChainNode>, entry: CacheEntry) -> SlotId {
        let id = nodes.insert(ChainNode::new(entry));
        self.link_front(nodes, id);
        id
    }

    /// Links an already-allocated node at the head, overwriting its old links.
    pub fn link_front(&mut self, nodes: &mut SlotArena<ChainNode>, id: SlotId) {
        let old_head = self.head;
        {
            let node = nodes.node_mut(id);
            node.prev = None;
            node.next = old_head;
        }
        if let Some(head) = old_head {
            nodes.node_mut(head).prev = Some(id);
        }
        self.head = Some(id);
        self.len += 1;
    }

    // == Find ==
    /// Returns the node holding `key`, if any. O(chain length).
    pub fn find(&self, nodes: &SlotArena<ChainNode>, key: &[u8]) -> Option<SlotId> {
        self.iter(nodes)
            .find(|(_, entry)| entry.matches(key))
            .map(|(id, _)| id)
    }

    // == Remove ==
    /// Unlinks and frees the node holding `key`, handing the entry back.
    pub fn remove(&mut self, nodes: &mut SlotArena<ChainNode>, key: &[u8]) -> Option<CacheEntry> {
        let id = self.find(nodes, key)?;
        self.unlink(nodes, id);
        nodes.remove(id).map(|node| node.entry)
    }

    fn unlink(&mut self, nodes: &mut SlotArena<ChainNode>, id: SlotId) {
        let (prev, next) = {
            let node = nodes.node(id);
            (node.prev, node.next)
        };
        match prev {
            Some(prev) => nodes.node_mut(prev).next = next,
            None => self.head = next,
        }
        if let Some(next) = next {
            nodes.node_mut(next).prev = prev;
        }
        self.len -= 1;
    }

    // == Detach ==
    /// Empties the chain without freeing its nodes; returns their ids so
    /// they can be relinked elsewhere.
    pub fn detach(&mut self, nodes: &SlotArena<ChainNode>) -> Vec<SlotId> {
        let ids = self.iter(nodes).map(|(id, _)| id).collect();
        *self = Chain::default();
        ids
    }

    // == Destroy All ==
    /// Frees every node in the chain. Returns the total value bytes released.
    pub fn destroy_all(&mut self, nodes: &mut SlotArena<ChainNode>) -> u64 {
        let mut freed = 0;
        for id in self.detach(nodes) {
            if let Some(node) = nodes.remove(id) {
                freed += u64::from(node.entry.size());
            }
        }
        freed
    }

    pub fn iter<'a>(&self, nodes: &'a SlotArena<ChainNode>) -> ChainIter<'a> {
        ChainIter {
            nodes,
            cursor: self.head,
        }
    }

    // == Check Links ==
    /// Walks the chain verifying back links and length. Panics on corruption.
    pub fn check_links(&self, nodes: &SlotArena<ChainNode>) {
        let mut prev = None;
        let mut count = 0;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let node = nodes.node(id);
            assert_eq!(node.prev, prev, "chain back link broken at slot {}", id.index());
            count += 1;
            assert!(count <= self.len, "chain longer than its recorded length");
            prev = Some(id);
            cursor = node.next;
        }
        assert_eq!(count, self.len, "chain shorter than its recorded length");
    }
}

/// Iterator over `(slot, entry)` pairs from head to tail.
#[derive(Debug)]
pub struct ChainIter<'a> {
    nodes: &'a SlotArena<ChainNode>,
    cursor: Option<SlotId>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = (SlotId, &'a CacheEntry);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.nodes.node(id);
        self.cursor = node.next;
        Some((id, &node.entry))
    }
}
