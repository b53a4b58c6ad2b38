//! Bucket storage: one inline node plus an owned overflow chain.

use core::borrow::Borrow;

/// A stored entry: the precomputed hash plus the key/value pair.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) hash: u64,
    pub(crate) key: K,
    pub(crate) value: V,
}

/// Position of a node within one bucket.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// The inline node stored directly in the bucket.
    First,
    /// Index into the overflow chain.
    Chain(usize),
}

/// One bucket of the table.
///
/// The first entry hashed to this bucket lives in `first`, avoiding any
/// chain allocation in the common non-colliding case. Further entries go
/// to `chain` in insertion order.
///
/// Invariant: `chain` is never non-empty while `first` is vacant. Removal
/// of the inline node promotes the chain head into the inline slot.
#[derive(Clone, Debug)]
pub(crate) struct Bucket<K, V> {
    pub(crate) first: Option<Node<K, V>>,
    pub(crate) chain: Vec<Node<K, V>>,
}

impl<K, V> Bucket<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            first: None,
            chain: Vec::new(),
        }
    }

    /// Occupancy: inline slot (0 or 1) plus chain length.
    pub(crate) fn len(&self) -> usize {
        usize::from(self.first.is_some()) + self.chain.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn clear(&mut self) {
        self.first = None;
        self.chain.clear();
    }

    pub(crate) fn node(&self, slot: Slot) -> Option<&Node<K, V>> {
        match slot {
            Slot::First => self.first.as_ref(),
            Slot::Chain(i) => self.chain.get(i),
        }
    }

    pub(crate) fn node_mut(&mut self, slot: Slot) -> Option<&mut Node<K, V>> {
        match slot {
            Slot::First => self.first.as_mut(),
            Slot::Chain(i) => self.chain.get_mut(i),
        }
    }

    /// Appends a node whose hash is already known to map here. Used by
    /// rehashing, which never compares keys.
    pub(crate) fn push(&mut self, node: Node<K, V>) {
        if self.first.is_none() {
            self.first = Some(node);
        } else {
            self.chain.push(node);
        }
    }
}

impl<K: Eq, V> Bucket<K, V> {
    /// Locates the slot holding `q`, inline node first, then the chain.
    pub(crate) fn slot_of<Q>(&self, q: &Q) -> Option<Slot>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        if let Some(first) = &self.first {
            if first.key.borrow() == q {
                return Some(Slot::First);
            }
        }
        self.chain
            .iter()
            .position(|n| n.key.borrow() == q)
            .map(Slot::Chain)
    }

    /// Upsert: overwrites the value in place when the key is present,
    /// otherwise stores a new node (inline slot first, then chain tail).
    /// Returns the slot and whether a new node was created.
    pub(crate) fn upsert(&mut self, node: Node<K, V>) -> (Slot, bool) {
        match &mut self.first {
            None => {
                self.first = Some(node);
                (Slot::First, true)
            }
            Some(first) if first.key == node.key => {
                first.value = node.value;
                (Slot::First, false)
            }
            Some(_) => {
                if let Some(i) = self.chain.iter().position(|n| n.key == node.key) {
                    self.chain[i].value = node.value;
                    (Slot::Chain(i), false)
                } else {
                    self.chain.push(node);
                    (Slot::Chain(self.chain.len() - 1), true)
                }
            }
        }
    }

    /// Like `upsert`, but keeps the existing value when the key is present.
    /// `default` runs only when a new node is stored.
    pub(crate) fn or_insert_with<F>(&mut self, hash: u64, key: K, default: F) -> (Slot, bool)
    where
        F: FnOnce() -> V,
    {
        match self.slot_of(&key) {
            Some(slot) => (slot, false),
            None => {
                let node = Node {
                    hash,
                    key,
                    value: default(),
                };
                if self.first.is_none() {
                    self.first = Some(node);
                    (Slot::First, true)
                } else {
                    self.chain.push(node);
                    (Slot::Chain(self.chain.len() - 1), true)
                }
            }
        }
    }

    /// Removes the node for `q` and returns its value.
    ///
    /// Removing the inline node promotes the chain head into the inline
    /// slot so the bucket invariant holds; chain removals shift the tail
    /// up, preserving the order of the remaining entries.
    pub(crate) fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        match self.slot_of(q)? {
            Slot::First => {
                let node = if self.chain.is_empty() {
                    self.first.take()
                } else {
                    self.first.replace(self.chain.remove(0))
                };
                node.map(|n| n.value)
            }
            Slot::Chain(i) => Some(self.chain.remove(i).value),
        }
    }
}
