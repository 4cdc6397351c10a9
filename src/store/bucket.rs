use super::arena::{Arena, NULL};

/// Collision list of elements sharing one hash value.
///
/// Only the sentinel index is stored here; the links live inside the nodes.
/// There is no removal through the bucket: an element leaves its bucket via
/// [`Arena::detach_from_bucket`], called from the expiry or removal path.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Bucket {
    head: usize,
}

impl Bucket {
    pub(crate) fn new<V>(arena: &mut Arena<V>) -> Self {
        Bucket {
            head: arena.alloc_sentinel(),
        }
    }

    /// Attaches `idx` as the first real element.
    pub(crate) fn insert<V>(&self, arena: &mut Arena<V>, idx: usize) {
        arena.attach_after(self.head, idx);
    }

    /// Returns the first element whose key equals `key`.
    pub(crate) fn search<V>(&self, arena: &Arena<V>, key: &[u8]) -> Option<usize> {
        let mut cur = arena.node(self.head).bucket_next;
        while cur != NULL {
            if arena.matches_key(cur, key) {
                return Some(cur);
            }
            cur = arena.node(cur).bucket_next;
        }
        None
    }

    #[cfg(test)]
    pub(crate) fn is_empty<V>(&self, arena: &Arena<V>) -> bool {
        arena.node(self.head).bucket_next == NULL
    }
}
