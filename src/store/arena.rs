//! Index arena holding every element node and every list sentinel.
//!
//! A node carries two independent link sets:
//!
//! - `bucket_prev` / `bucket_next`: doubly-linked membership in a hash bucket.
//! - `expiry_next`: singly-linked membership in one ring slot.
//!
//! Links are arena indices rather than references, so a node can sit in two
//! lists at once without shared ownership. Sentinels (bucket heads and ring
//! slot heads) are nodes too; they carry no key and no value and are never
//! returned to the free list.

use crate::Tick;

/// Marks an absent link.
pub(crate) const NULL: usize = usize::MAX;

pub(crate) struct Node<V> {
    /// `None` only for sentinels and freed slots.
    pub(crate) key: Option<Box<[u8]>>,
    pub(crate) value: Option<V>,
    pub(crate) ttl: Tick,
    pub(crate) bucket_prev: usize,
    pub(crate) bucket_next: usize,
    pub(crate) expiry_next: usize,
    /// Ring slot the node is scheduled in (`NULL` for sentinels).
    pub(crate) frame: usize,
}

impl<V> Node<V> {
    fn sentinel() -> Self {
        Node {
            key: None,
            value: None,
            ttl: 0,
            bucket_prev: NULL,
            bucket_next: NULL,
            expiry_next: NULL,
            frame: NULL,
        }
    }
}

pub(crate) struct Arena<V> {
    nodes: Vec<Node<V>>,
    /// Indices of freed (reusable) element slots.
    free_list: Vec<usize>,
    live: usize,
}

impl<V> Arena<V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Arena {
            nodes: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Number of live elements (sentinels excluded).
    pub(crate) fn live(&self) -> usize {
        self.live
    }

    pub(crate) fn node(&self, idx: usize) -> &Node<V> {
        &self.nodes[idx]
    }

    pub(crate) fn node_mut(&mut self, idx: usize) -> &mut Node<V> {
        &mut self.nodes[idx]
    }

    /// Allocates a list head. Sentinels live for the lifetime of the arena.
    pub(crate) fn alloc_sentinel(&mut self) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Node::sentinel());
        idx
    }

    /// Allocates an unlinked element node, reusing a freed slot when available.
    pub(crate) fn alloc(&mut self, key: Box<[u8]>, value: V, ttl: Tick) -> usize {
        self.live += 1;
        let node = Node {
            key: Some(key),
            value: Some(value),
            ttl,
            bucket_prev: NULL,
            bucket_next: NULL,
            expiry_next: NULL,
            frame: NULL,
        };
        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx] = node;
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(node);
            idx
        }
    }

    /// Takes the key and value out of a fully detached element and recycles
    /// its slot.
    pub(crate) fn release(&mut self, idx: usize) -> Option<(Box<[u8]>, V)> {
        let node = &mut self.nodes[idx];
        debug_assert!(
            node.bucket_prev == NULL && node.bucket_next == NULL && node.expiry_next == NULL,
            "released node {idx} is still linked"
        );
        let key = node.key.take()?;
        let value = node.value.take()?;
        node.frame = NULL;
        self.free_list.push(idx);
        self.live -= 1;
        Some((key, value))
    }

    // -----------------------------------------------------------------------
    // Bucket links
    // -----------------------------------------------------------------------

    /// Links `idx` immediately after `at` in a bucket list.
    pub(crate) fn attach_after(&mut self, at: usize, idx: usize) {
        debug_assert!(self.nodes[idx].bucket_prev == NULL, "node {idx} already in a bucket");
        let next = self.nodes[at].bucket_next;
        self.nodes[idx].bucket_prev = at;
        self.nodes[idx].bucket_next = next;
        self.nodes[at].bucket_next = idx;
        if next != NULL {
            self.nodes[next].bucket_prev = idx;
        }
    }

    /// Unlinks `idx` from its bucket list, patching both neighbours.
    ///
    /// An element is always preceded by at least its bucket's sentinel, so a
    /// cleared `bucket_prev` means the node is already detached and the call
    /// does nothing.
    pub(crate) fn detach_from_bucket(&mut self, idx: usize) {
        let prev = self.nodes[idx].bucket_prev;
        let next = self.nodes[idx].bucket_next;
        if prev == NULL {
            debug_assert!(next == NULL, "node {idx} has a successor but no predecessor");
            return;
        }
        self.nodes[prev].bucket_next = next;
        if next != NULL {
            self.nodes[next].bucket_prev = prev;
        }
        self.nodes[idx].bucket_prev = NULL;
        self.nodes[idx].bucket_next = NULL;
    }

    pub(crate) fn matches_key(&self, idx: usize, key: &[u8]) -> bool {
        self.nodes[idx].key.as_deref() == Some(key)
    }
}
