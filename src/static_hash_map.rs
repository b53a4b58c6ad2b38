//! Fixed-capacity hash map: the bucket array is a const-generic array and
//! never grows.

use crate::bucket::{Bucket, Node};
use crate::hash_map::InsertOutcome;
use crate::iter::{Cursor, Iter, IterMut};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use fnv::FnvBuildHasher;

/// The fixed-capacity sibling of [`HashMap`].
///
/// `N` is both the bucket count and the maximum element count; neither
/// ever changes after construction, so no insertion can trigger a rehash.
/// Inserting a new key while `len() == N` is a caller contract violation
/// and panics. Updating an existing key at capacity is fine.
///
/// Bucket selection, the inline-first-node layout, promotion on removal
/// and cursor traversal are identical to [`HashMap`].
///
/// [`HashMap`]: crate::HashMap
#[derive(Clone)]
pub struct StaticHashMap<K, V, const N: usize, S = FnvBuildHasher> {
    hasher: S,
    buckets: [Bucket<K, V>; N],
    len: usize,
}

impl<K, V, const N: usize> StaticHashMap<K, V, N>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(FnvBuildHasher::default())
    }
}

impl<K, V, const N: usize> Default for StaticHashMap<K, V, N>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, const N: usize, S> StaticHashMap<K, V, N, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        assert!(N > 0, "StaticHashMap needs at least one bucket");
        Self {
            hasher,
            buckets: core::array::from_fn(|_| Bucket::new()),
            len: 0,
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    fn bucket_index(&self, hash: u64) -> usize {
        (hash % N as u64) as usize
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bucket count and maximum element count, i.e. `N`.
    pub fn capacity(&self) -> usize {
        N
    }

    pub fn bucket_count(&self) -> usize {
        N
    }

    pub fn load_factor(&self) -> f32 {
        self.len as f32 / N as f32
    }

    fn check_capacity_for_new_key(&self) {
        assert!(self.len < N, "StaticHashMap capacity exceeded (N = {})", N);
    }

    /// Upsert, as in [`HashMap::insert`]. Panics when storing a new key
    /// would exceed the capacity `N`.
    ///
    /// [`HashMap::insert`]: crate::HashMap::insert
    pub fn insert(&mut self, key: K, value: V) -> (InsertOutcome, &mut V) {
        let hash = self.make_hash(&key);
        let idx = self.bucket_index(hash);
        if self.buckets[idx].slot_of(&key).is_none() {
            self.check_capacity_for_new_key();
        }
        let (slot, inserted) = self.buckets[idx].upsert(Node { hash, key, value });
        if inserted {
            self.len += 1;
        }
        let outcome = if inserted {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::Updated
        };
        match self.buckets[idx].node_mut(slot) {
            Some(node) => (outcome, &mut node.value),
            None => unreachable!(),
        }
    }

    /// The value for `key`, inserting `default()` first when absent.
    /// Panics when the insertion would exceed the capacity `N`.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let hash = self.make_hash(&key);
        let idx = self.bucket_index(hash);
        if self.buckets[idx].slot_of(&key).is_none() {
            self.check_capacity_for_new_key();
        }
        let (slot, inserted) = self.buckets[idx].or_insert_with(hash, key, default);
        if inserted {
            self.len += 1;
        }
        match self.buckets[idx].node_mut(slot) {
            Some(node) => &mut node.value,
            None => unreachable!(),
        }
    }

    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.bucket_index(self.make_hash(q));
        let bucket = &self.buckets[idx];
        bucket
            .slot_of(q)
            .and_then(|slot| bucket.node(slot))
            .map(|n| &n.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.bucket_index(self.make_hash(q));
        let bucket = &mut self.buckets[idx];
        bucket
            .slot_of(q)
            .and_then(|slot| bucket.node_mut(slot))
            .map(|n| &mut n.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).is_some()
    }

    /// A cursor positioned at `q`, or at the end sentinel when absent.
    pub fn find<Q>(&self, q: &Q) -> Iter<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.bucket_index(self.make_hash(q));
        match self.buckets[idx].slot_of(q) {
            Some(slot) => Iter::at(&self.buckets, Cursor::at(idx, slot)),
            None => Iter::end(&self.buckets),
        }
    }

    /// A mutable cursor positioned at `q`, or at the end sentinel when
    /// absent.
    pub fn find_mut<Q>(&mut self, q: &Q) -> IterMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.bucket_index(self.make_hash(q));
        let cursor = match self.buckets[idx].slot_of(q) {
            Some(slot) => Cursor::at(idx, slot),
            None => Cursor::end(&self.buckets),
        };
        IterMut::at(&mut self.buckets, cursor)
    }

    /// Removes the entry for `q`; promotion as in [`HashMap::remove`].
    ///
    /// [`HashMap::remove`]: crate::HashMap::remove
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let idx = self.bucket_index(self.make_hash(q));
        let value = self.buckets[idx].remove(q)?;
        self.len -= 1;
        Some(value)
    }

    /// Empties every bucket.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// A cursor at the first entry (begin equals [`end`] when empty).
    ///
    /// [`end`]: StaticHashMap::end
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::begin(&self.buckets)
    }

    /// A mutable cursor at the first entry.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::begin(&mut self.buckets)
    }

    /// The end sentinel cursor.
    pub fn end(&self) -> Iter<'_, K, V> {
        Iter::end(&self.buckets)
    }

    /// The end sentinel as a mutable cursor, for backward mutable walks.
    pub fn end_mut(&mut self) -> IterMut<'_, K, V> {
        let cursor = Cursor::end(&self.buckets);
        IterMut::at(&mut self.buckets, cursor)
    }
}

impl<'a, K, V, const N: usize, S> IntoIterator for &'a StaticHashMap<K, V, N, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, Q, const N: usize, S> core::ops::Index<&Q> for StaticHashMap<K, V, N, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found"),
        }
    }
}

impl<K, V, const N: usize, S> core::fmt::Debug for StaticHashMap<K, V, N, S>
where
    K: Eq + Hash + core::fmt::Debug,
    V: core::fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::hash::Hasher;

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        }
    }

    /// Invariant: the bucket count is fixed at `N` no matter how full the
    /// map gets.
    #[test]
    fn bucket_count_never_changes() {
        let mut m: StaticHashMap<u32, u32, 8> = StaticHashMap::new();
        for i in 0..8 {
            m.insert(i, i);
        }
        assert_eq!(m.len(), 8);
        assert_eq!(m.bucket_count(), 8);
        assert_eq!(m.capacity(), 8);
        for i in 0..8 {
            assert_eq!(m.get(&i), Some(&i));
        }
    }

    /// Invariant: inserting a new key past `N` entries panics fast.
    #[test]
    #[should_panic(expected = "capacity exceeded")]
    fn overflow_panics() {
        let mut m: StaticHashMap<u32, u32, 4> = StaticHashMap::new();
        for i in 0..5 {
            m.insert(i, i);
        }
    }

    /// Invariant: updating an existing key at full capacity is allowed.
    #[test]
    fn update_at_capacity_is_allowed() {
        let mut m: StaticHashMap<u32, u32, 4> = StaticHashMap::new();
        for i in 0..4 {
            m.insert(i, i);
        }
        let (outcome, v) = m.insert(2, 99);
        assert_eq!(outcome, InsertOutcome::Updated);
        assert_eq!(*v, 99);
        assert_eq!(m.len(), 4);
    }

    /// Invariant: `get_or_insert_default` materializes a default exactly
    /// like the growable map, under the same capacity contract.
    #[test]
    fn get_or_insert_default_counts_against_capacity() {
        let mut m: StaticHashMap<&str, u32, 2> = StaticHashMap::new();
        *m.get_or_insert_default("a") += 1;
        *m.get_or_insert_default("a") += 1;
        *m.get_or_insert_default("b") += 1;
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("a"), Some(&2));
        assert_eq!(m.get("b"), Some(&1));
    }

    /// Invariant: removal with promotion behaves exactly as the growable
    /// map, with all entries forced into one bucket.
    #[test]
    fn promotion_in_single_bucket() {
        let mut m: StaticHashMap<String, i32, 8, ConstBuildHasher> =
            StaticHashMap::with_hasher(ConstBuildHasher);
        for (i, k) in ["a", "b", "c"].iter().enumerate() {
            m.insert((*k).to_string(), i as i32);
        }
        assert_eq!(m.remove("a"), Some(0));
        let order: Vec<String> = m.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(order, ["b", "c"]);
    }

    /// Invariant: clearing resets the count and every cursor range.
    #[test]
    fn clear_resets() {
        let mut m: StaticHashMap<u32, u32, 16> = StaticHashMap::new();
        for i in 0..10 {
            m.insert(i, i);
        }
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.iter(), m.end());
        m.insert(1, 1);
        assert_eq!(m.len(), 1);
    }
}
