//! Bidirectional cursors over the two-tier bucket structure.
//!
//! A cursor walks buckets left to right and, inside each occupied bucket,
//! visits the inline node first and then the chain in insertion order.
//! Position is an explicit state machine over indices rather than stored
//! references, so stepping never aliases the map borrow; both map flavors
//! share the logic because a cursor only ever sees the bucket slice.
//!
//! The end sentinel is the position one past the last chain entry of the
//! last bucket. Stepping past the sentinel, or before the first element,
//! panics in debug builds and saturates at the boundary in release builds.

use crate::bucket::{Bucket, Node, Slot};

/// Cursor state: either the inline node of a bucket, or a chain position.
///
/// `Chain { pos }` equal to the chain length is the bucket's one-past-the-end
/// position; with `bucket` being the last bucket it is the map's end sentinel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Cursor {
    First { bucket: usize },
    Chain { bucket: usize, pos: usize },
}

impl Cursor {
    /// Position of the first element: the inline node of the leftmost
    /// occupied bucket, or the end sentinel when the map is empty.
    pub(crate) fn begin<K, V>(buckets: &[Bucket<K, V>]) -> Self {
        match buckets.iter().position(|b| !b.is_empty()) {
            Some(bucket) => Cursor::First { bucket },
            None => Self::end(buckets),
        }
    }

    /// The end sentinel: one past the last bucket's chain.
    pub(crate) fn end<K, V>(buckets: &[Bucket<K, V>]) -> Self {
        let bucket = buckets.len() - 1;
        Cursor::Chain {
            bucket,
            pos: buckets[bucket].chain.len(),
        }
    }

    pub(crate) fn at(bucket: usize, slot: Slot) -> Self {
        match slot {
            Slot::First => Cursor::First { bucket },
            Slot::Chain(pos) => Cursor::Chain { bucket, pos },
        }
    }

    pub(crate) fn is_end<K, V>(self, buckets: &[Bucket<K, V>]) -> bool {
        self == Self::end(buckets)
    }

    /// Resolves the current node; `None` on the end sentinel.
    pub(crate) fn node<'a, K, V>(self, buckets: &'a [Bucket<K, V>]) -> Option<&'a Node<K, V>> {
        match self {
            Cursor::First { bucket } => buckets[bucket].first.as_ref(),
            Cursor::Chain { bucket, pos } => buckets[bucket].chain.get(pos),
        }
    }

    pub(crate) fn node_mut<'a, K, V>(
        self,
        buckets: &'a mut [Bucket<K, V>],
    ) -> Option<&'a mut Node<K, V>> {
        match self {
            Cursor::First { bucket } => buckets[bucket].first.as_mut(),
            Cursor::Chain { bucket, pos } => buckets[bucket].chain.get_mut(pos),
        }
    }

    /// Steps to the next element.
    ///
    /// From the inline node the cursor moves onto the chain begin, which is
    /// already the chain end when the chain is empty. Past the chain end it
    /// scans forward for the next occupied bucket, landing on its inline
    /// node, or becomes the end sentinel.
    pub(crate) fn advance<K, V>(self, buckets: &[Bucket<K, V>]) -> Self {
        debug_assert!(!self.is_end(buckets), "cursor stepped past the end");

        let (bucket, pos) = match self {
            Cursor::First { bucket } => (bucket, 0),
            Cursor::Chain { bucket, pos } => (bucket, pos + 1),
        };
        if pos < buckets[bucket].chain.len() {
            return Cursor::Chain { bucket, pos };
        }
        for next in bucket + 1..buckets.len() {
            if !buckets[next].is_empty() {
                return Cursor::First { bucket: next };
            }
        }
        Self::end(buckets)
    }

    /// Steps to the previous element, the exact reverse of `advance`.
    pub(crate) fn retreat<K, V>(self, buckets: &[Bucket<K, V>]) -> Self {
        match self {
            Cursor::Chain { bucket, pos } if pos > 0 => Cursor::Chain {
                bucket,
                pos: pos - 1,
            },
            // The inline node precedes the chain in iteration order; this
            // also covers a sentinel resting on a bucket with no chain.
            Cursor::Chain { bucket, pos: 0 } if buckets[bucket].first.is_some() => {
                Cursor::First { bucket }
            }
            Cursor::First { bucket } | Cursor::Chain { bucket, .. } => {
                for prev in (0..bucket).rev() {
                    let b = &buckets[prev];
                    if !b.is_empty() {
                        return match b.chain.len() {
                            0 => Cursor::First { bucket: prev },
                            n => Cursor::Chain {
                                bucket: prev,
                                pos: n - 1,
                            },
                        };
                    }
                }
                debug_assert!(false, "cursor stepped before the first element");
                self
            }
        }
    }
}

/// Read-only bidirectional cursor over a map.
///
/// Obtained from [`HashMap::iter`], [`HashMap::find`] and [`HashMap::end`]
/// (and the `StaticHashMap` equivalents). Also a plain [`Iterator`] over
/// `(&K, &V)` starting at its current position.
///
/// Two cursors are equal iff they reference the same map instance and the
/// same position, including the inline-versus-chain distinction; the end
/// sentinels of two different maps are never equal.
///
/// [`HashMap::iter`]: crate::HashMap::iter
/// [`HashMap::find`]: crate::HashMap::find
/// [`HashMap::end`]: crate::HashMap::end
pub struct Iter<'a, K, V> {
    buckets: &'a [Bucket<K, V>],
    cursor: Cursor,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn begin(buckets: &'a [Bucket<K, V>]) -> Self {
        Self {
            cursor: Cursor::begin(buckets),
            buckets,
        }
    }

    pub(crate) fn end(buckets: &'a [Bucket<K, V>]) -> Self {
        Self {
            cursor: Cursor::end(buckets),
            buckets,
        }
    }

    pub(crate) fn at(buckets: &'a [Bucket<K, V>], cursor: Cursor) -> Self {
        Self { buckets, cursor }
    }

    /// Whether the cursor is the end sentinel.
    pub fn is_end(&self) -> bool {
        self.cursor.is_end(self.buckets)
    }

    /// Steps forward to the next element, skipping empty buckets.
    pub fn move_next(&mut self) {
        self.cursor = self.cursor.advance(self.buckets);
    }

    /// Steps backward to the previous element, skipping empty buckets.
    pub fn move_prev(&mut self) {
        self.cursor = self.cursor.retreat(self.buckets);
    }

    /// The current entry, or `None` on the end sentinel.
    pub fn get(&self) -> Option<(&'a K, &'a V)> {
        self.cursor.node(self.buckets).map(|n| (&n.key, &n.value))
    }

    fn node(&self) -> &'a Node<K, V> {
        match self.cursor.node(self.buckets) {
            Some(node) => node,
            None => panic!("cursor accessor called on the end sentinel"),
        }
    }

    /// The current key. Panics on the end sentinel.
    pub fn key(&self) -> &'a K {
        &self.node().key
    }

    /// The current value. Panics on the end sentinel.
    pub fn value(&self) -> &'a V {
        &self.node().value
    }

    /// The stored hash of the current entry. Panics on the end sentinel.
    pub fn hash(&self) -> u64 {
        self.node().hash
    }
}

// Manual impl: cloning a cursor must not require K: Clone or V: Clone.
impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            buckets: self.buckets,
            cursor: self.cursor,
        }
    }
}

impl<K, V> PartialEq for Iter<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.buckets, other.buckets) && self.cursor == other.cursor
    }
}

impl<K, V> Eq for Iter<'_, K, V> {}

impl<K, V> core::fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Iter").field("cursor", &self.cursor).finish()
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.get()?;
        self.move_next();
        Some(entry)
    }
}

/// Mutable bidirectional cursor over a map.
///
/// Same traversal as [`Iter`] with value mutation through [`value_mut`].
/// Traversal is cursor-style: step with [`move_next`]/[`move_prev`] and
/// mutate in place. Converts into a read-only [`Iter`] at the same
/// position via `From`; the reverse conversion does not exist.
///
/// [`value_mut`]: IterMut::value_mut
/// [`move_next`]: IterMut::move_next
/// [`move_prev`]: IterMut::move_prev
pub struct IterMut<'a, K, V> {
    buckets: &'a mut [Bucket<K, V>],
    cursor: Cursor,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn begin(buckets: &'a mut [Bucket<K, V>]) -> Self {
        Self {
            cursor: Cursor::begin(buckets),
            buckets,
        }
    }

    pub(crate) fn at(buckets: &'a mut [Bucket<K, V>], cursor: Cursor) -> Self {
        Self { buckets, cursor }
    }

    /// Whether the cursor is the end sentinel.
    pub fn is_end(&self) -> bool {
        self.cursor.is_end(self.buckets)
    }

    /// Steps forward to the next element, skipping empty buckets.
    pub fn move_next(&mut self) {
        self.cursor = self.cursor.advance(self.buckets);
    }

    /// Steps backward to the previous element, skipping empty buckets.
    pub fn move_prev(&mut self) {
        self.cursor = self.cursor.retreat(self.buckets);
    }

    /// The current entry, or `None` on the end sentinel.
    pub fn get(&self) -> Option<(&K, &V)> {
        self.cursor.node(self.buckets).map(|n| (&n.key, &n.value))
    }

    /// The current entry with a mutable value, or `None` on the end sentinel.
    pub fn get_mut(&mut self) -> Option<(&K, &mut V)> {
        self.cursor
            .node_mut(self.buckets)
            .map(|n| (&n.key, &mut n.value))
    }

    fn node(&self) -> &Node<K, V> {
        match self.cursor.node(self.buckets) {
            Some(node) => node,
            None => panic!("cursor accessor called on the end sentinel"),
        }
    }

    /// The current key. Panics on the end sentinel.
    pub fn key(&self) -> &K {
        &self.node().key
    }

    /// The current value. Panics on the end sentinel.
    pub fn value(&self) -> &V {
        &self.node().value
    }

    /// Mutable access to the current value. Panics on the end sentinel.
    pub fn value_mut(&mut self) -> &mut V {
        match self.cursor.node_mut(self.buckets) {
            Some(node) => &mut node.value,
            None => panic!("cursor accessor called on the end sentinel"),
        }
    }

    /// The stored hash of the current entry. Panics on the end sentinel.
    pub fn hash(&self) -> u64 {
        self.node().hash
    }

    /// Reborrows as a read-only cursor at the same position.
    pub fn as_const(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets,
            cursor: self.cursor,
        }
    }
}

/// One-way narrowing: a mutable cursor converts into a read-only one at
/// the same position. There is no conversion in the other direction.
impl<'a, K, V> From<IterMut<'a, K, V>> for Iter<'a, K, V> {
    fn from(it: IterMut<'a, K, V>) -> Self {
        Iter {
            buckets: it.buckets,
            cursor: it.cursor,
        }
    }
}

impl<K, V> PartialEq for IterMut<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq::<[Bucket<K, V>]>(self.buckets, other.buckets) && self.cursor == other.cursor
    }
}

impl<K, V> Eq for IterMut<'_, K, V> {}

impl<K, V> core::fmt::Debug for IterMut<'_, K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IterMut")
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::Node;

    fn node(key: &'static str, value: i32) -> Node<&'static str, i32> {
        Node {
            hash: 0,
            key,
            value,
        }
    }

    // Bucket layout helper: each entry is the list of keys in one bucket,
    // first key inline, the rest chained.
    fn buckets(layout: &[&[&'static str]]) -> Vec<Bucket<&'static str, i32>> {
        layout
            .iter()
            .map(|keys| {
                let mut b = Bucket::new();
                for (i, k) in keys.iter().enumerate() {
                    b.push(node(k, i as i32));
                }
                b
            })
            .collect()
    }

    fn forward_keys(buckets: &[Bucket<&'static str, i32>]) -> Vec<&'static str> {
        let mut keys = Vec::new();
        let mut c = Cursor::begin(buckets);
        while !c.is_end(buckets) {
            keys.push(c.node(buckets).unwrap().key);
            c = c.advance(buckets);
        }
        keys
    }

    fn backward_keys(buckets: &[Bucket<&'static str, i32>], count: usize) -> Vec<&'static str> {
        let mut keys = Vec::new();
        let mut c = Cursor::end(buckets);
        for _ in 0..count {
            c = c.retreat(buckets);
            keys.push(c.node(buckets).unwrap().key);
        }
        keys
    }

    /// Invariant: on an empty table, begin equals the end sentinel.
    #[test]
    fn begin_equals_end_when_empty() {
        let bs = buckets(&[&[], &[], &[]]);
        assert_eq!(Cursor::begin(&bs), Cursor::end(&bs));
        assert!(Cursor::begin(&bs).is_end(&bs));
    }

    /// Invariant: forward traversal skips empty buckets and visits the
    /// inline node of each bucket before its chain, in chain order.
    #[test]
    fn forward_order_inline_then_chain() {
        let bs = buckets(&[&[], &["a", "b", "c"], &[], &["d"], &[]]);
        assert_eq!(forward_keys(&bs), ["a", "b", "c", "d"]);
    }

    /// Invariant: begin lands on the first occupied bucket even when
    /// bucket zero is occupied or everything before the last is empty.
    #[test]
    fn begin_positions() {
        let bs = buckets(&[&["x"], &["y"]]);
        assert_eq!(Cursor::begin(&bs), Cursor::First { bucket: 0 });

        let bs = buckets(&[&[], &[], &["z"]]);
        assert_eq!(Cursor::begin(&bs), Cursor::First { bucket: 2 });
    }

    /// Invariant: backward traversal from the sentinel visits the exact
    /// reverse of the forward sequence and lands on begin.
    #[test]
    fn backward_is_reverse_of_forward() {
        let layouts: &[&[&[&'static str]]] = &[
            &[&["a"]],
            &[&["a", "b"], &[], &["c"], &["d", "e", "f"], &[]],
            &[&[], &["a"], &[], &[], &["b", "c"]],
            &[&["a", "b", "c", "d"], &[], &[], &[]],
        ];
        for layout in layouts {
            let bs = buckets(layout);
            let fwd = forward_keys(&bs);
            let mut back = backward_keys(&bs, fwd.len());
            back.reverse();
            assert_eq!(back, fwd, "layout {layout:?}");

            // Stepping back size() times lands exactly on begin.
            let mut c = Cursor::end(&bs);
            for _ in 0..fwd.len() {
                c = c.retreat(&bs);
            }
            assert_eq!(c, Cursor::begin(&bs));
        }
    }

    /// Invariant: the end sentinel rests on the last bucket regardless of
    /// where the last occupied bucket is.
    #[test]
    fn sentinel_rests_on_last_bucket() {
        let bs = buckets(&[&["a"], &[], &[]]);
        assert_eq!(Cursor::end(&bs), Cursor::Chain { bucket: 2, pos: 0 });

        // Advancing off the last element jumps straight to the sentinel.
        let c = Cursor::First { bucket: 0 }.advance(&bs);
        assert!(c.is_end(&bs));

        // Last bucket occupied with a chain: sentinel sits past the chain.
        let bs = buckets(&[&[], &["a", "b"]]);
        assert_eq!(Cursor::end(&bs), Cursor::Chain { bucket: 1, pos: 1 });
    }

    /// Invariant: equality distinguishes inline from chain positions and
    /// requires the same underlying table.
    #[test]
    fn iterator_equality_is_four_field() {
        let bs = buckets(&[&["a", "b"]]);
        let other = buckets(&[&["a", "b"]]);

        let inline = Iter::at(&bs, Cursor::First { bucket: 0 });
        let chain = Iter::at(&bs, Cursor::Chain { bucket: 0, pos: 0 });
        assert_ne!(inline, chain);
        assert_eq!(inline, inline.clone());

        // Same position over a different table is unequal.
        assert_ne!(Iter::begin(&bs), Iter::begin(&other));
        assert_ne!(Iter::end(&bs), Iter::end(&other));
    }

    /// Invariant (debug): stepping past the sentinel panics.
    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "past the end")]
    fn advancing_past_end_panics_in_debug() {
        let bs = buckets(&[&["a"]]);
        let mut it = Iter::end(&bs);
        it.move_next();
    }

    /// Invariant (debug): stepping before the first element panics.
    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "before the first")]
    fn retreating_before_begin_panics_in_debug() {
        let bs = buckets(&[&["a"], &[]]);
        let mut it = Iter::begin(&bs);
        it.move_prev();
    }
}
