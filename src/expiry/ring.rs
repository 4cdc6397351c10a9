//! Single-level timing wheel of intrusive expiry lists.
//!
//! ## Layout
//!
//! The ring is a fixed array of `max_tick + 1` time frames. Each frame is a
//! sentinel node in the shared [`Arena`]; the elements scheduled in it hang
//! off the sentinel through their `expiry_next` link, most recent first.
//!
//! The owner keeps a cursor on the frame of its oldest unpruned tick; an
//! element due `ttl` ticks later lives `ttl` frames past the cursor. Frames
//! may therefore alias ticks a full revolution apart; the owner of the ring
//! must purge every tick before the wheel wraps past it.
//!
//! ## Purge
//!
//! Every element is linked into a hash bucket as well as a frame. Purging a
//! frame unlinks each element from its bucket in the same pass, so nothing
//! returned by [`Ring::purge`] is reachable from a bucket afterwards.
//!
//! ## References
//! - Varghese & Lauck (1987). *Hashed and Hierarchical Timing Wheels.*

use crate::store::arena::{Arena, NULL};
use crate::Tick;

pub(crate) struct Ring {
    /// `frames[slot]` is the sentinel index of that slot's expiry list.
    frames: Box<[usize]>,
}

impl Ring {
    /// Allocates `len` empty frames in `arena`.
    pub(crate) fn new<V>(arena: &mut Arena<V>, len: usize) -> Self {
        debug_assert!(len > 0);
        let frames = (0..len)
            .map(|_| arena.alloc_sentinel())
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Ring { frames }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    /// Frame index `ticks` ticks after frame `slot`.
    ///
    /// Works on frame positions rather than absolute ticks, so the result
    /// stays exact however far the absolute clock has run.
    #[inline]
    pub(crate) fn advance(&self, slot: usize, ticks: Tick) -> usize {
        let len = self.frames.len();
        (slot + (ticks % len as Tick) as usize) % len
    }

    /// Pushes `idx` at the head of frame `slot`.
    pub(crate) fn insert<V>(&self, arena: &mut Arena<V>, slot: usize, idx: usize) {
        let head = self.frames[slot];
        debug_assert!(arena.node(idx).frame == NULL, "node {idx} already scheduled");
        let first = arena.node(head).expiry_next;
        let node = arena.node_mut(idx);
        node.expiry_next = first;
        node.frame = slot;
        arena.node_mut(head).expiry_next = idx;
    }

    /// Detaches every element of frame `slot` from both the frame and its
    /// bucket, appending the element indices to `out` in list order.
    ///
    /// Returns the number of purged elements.
    pub(crate) fn purge<V>(
        &self,
        arena: &mut Arena<V>,
        slot: usize,
        out: &mut Vec<usize>,
    ) -> usize {
        let head = self.frames[slot];
        let mut cur = arena.node(head).expiry_next;
        let mut purged = 0;
        while cur != NULL {
            let next = arena.node(cur).expiry_next;
            arena.detach_from_bucket(cur);
            arena.node_mut(cur).expiry_next = NULL;
            out.push(cur);
            purged += 1;
            cur = next;
        }
        arena.node_mut(head).expiry_next = NULL;
        purged
    }

    /// Unlinks a single element from the frame it is scheduled in.
    ///
    /// The expiry list is singly linked, so this walks the frame to find the
    /// predecessor. Bucket links are left alone. Returns `false` if `idx` was
    /// not found in its recorded frame.
    pub(crate) fn unlink<V>(&self, arena: &mut Arena<V>, idx: usize) -> bool {
        let slot = arena.node(idx).frame;
        if slot == NULL {
            return false;
        }
        let mut prev = self.frames[slot];
        loop {
            let cur = arena.node(prev).expiry_next;
            if cur == NULL {
                return false;
            }
            if cur == idx {
                let next = arena.node(idx).expiry_next;
                arena.node_mut(prev).expiry_next = next;
                let node = arena.node_mut(idx);
                node.expiry_next = NULL;
                node.frame = NULL;
                return true;
            }
            prev = cur;
        }
    }
}
