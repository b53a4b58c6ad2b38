//! Growable hash map with inline first-node buckets.

use crate::bucket::{Bucket, Node};
use crate::iter::{Cursor, Iter, IterMut};
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use fnv::FnvBuildHasher;

/// Bucket count used by [`HashMap::new`].
pub const DEFAULT_CAPACITY: usize = 16;

/// Growth threshold: rehash when occupancy would exceed 80% of the
/// bucket count.
const MAX_LOAD_PERCENT: usize = 80;

/// Whether [`insert`] stored a new entry or overwrote an existing one.
///
/// [`insert`]: HashMap::insert
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Updated,
}

/// A hash map storing the first entry of each bucket inline and any
/// colliding entries in a per-bucket overflow chain.
///
/// Keys are placed by `hash % bucket_count` under a pluggable
/// [`BuildHasher`] policy; the default is FNV-1a, which hashes string-like
/// keys by content. Each entry keeps its hash, so growing the table never
/// re-invokes `K: Hash` — entries are only re-bucketed.
///
/// Lookups are O(1) expected and O(bucket occupancy) worst case. The map
/// is single-threaded and unsynchronized; cursors borrow the map, so the
/// borrow checker rejects structural mutation while any cursor is live.
#[derive(Clone)]
pub struct HashMap<K, V, S = FnvBuildHasher> {
    hasher: S,
    buckets: Vec<Bucket<K, V>>,
    len: usize,
}

impl<K, V> HashMap<K, V>
where
    K: Eq + Hash,
{
    /// An empty map with [`DEFAULT_CAPACITY`] buckets.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// An empty map with at least `capacity` buckets (rounded up to a
    /// power of two).
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, FnvBuildHasher::default())
    }
}

impl<K, V> Default for HashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// An empty map with [`DEFAULT_CAPACITY`] buckets and the given hash
    /// policy.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let bucket_count = capacity.next_power_of_two().max(1);
        Self {
            hasher,
            buckets: (0..bucket_count).map(|_| Bucket::new()).collect(),
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
        (hash % self.buckets.len() as u64) as usize
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Ratio of stored entries to buckets.
    pub fn load_factor(&self) -> f32 {
        self.len as f32 / self.buckets.len() as f32
    }

    /// Upsert: stores `value` under `key`, overwriting in place when the
    /// key is already present. Returns whether a new entry was created and
    /// a reference to the stored value.
    ///
    /// May grow the table (doubling the bucket count) before storing a new
    /// entry once the load factor would cross the growth threshold.
    pub fn insert(&mut self, key: K, value: V) -> (InsertOutcome, &mut V) {
        let hash = self.make_hash(&key);
        let idx = self.bucket_index(hash);
        if self.buckets[idx].slot_of(&key).is_none() {
            self.grow_if_needed();
        }
        // Growth may have moved the bucket; recompute from the stored hash.
        let idx = self.bucket_index(hash);
        let (slot, inserted) = self.buckets[idx].upsert(Node { hash, key, value });
        if inserted {
            self.len += 1;
        }
        let outcome = if inserted {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::Updated
        };
        // The slot was just written; resolving it cannot fail.
        match self.buckets[idx].node_mut(slot) {
            Some(node) => (outcome, &mut node.value),
            None => unreachable!(),
        }
    }

    /// The value for `key`, inserting `default()` first when absent.
    /// `default` runs only on insertion.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let hash = self.make_hash(&key);
        let idx = self.bucket_index(hash);
        if self.buckets[idx].slot_of(&key).is_none() {
            self.grow_if_needed();
        }
        // Growth may have moved the bucket; recompute from the stored hash.
        let idx = self.bucket_index(hash);
        let (slot, inserted) = self.buckets[idx].or_insert_with(hash, key, default);
        if inserted {
            self.len += 1;
        }
        match self.buckets[idx].node_mut(slot) {
            Some(node) => &mut node.value,
            None => unreachable!(),
        }
    }

    /// The value for `key`, inserting `V::default()` first when absent.
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

    /// Removes the entry for `q` and returns its value; `None` when the
    /// key is absent. Removing a bucket's inline node promotes the head of
    /// its chain into the inline slot.
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

    /// Empties every bucket. The bucket array is retained.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Redistributes every entry into a bucket array of at least
    /// `bucket_count` buckets (rounded up to a power of two). Entries are
    /// re-bucketed by their stored hash; `K: Hash` is not invoked.
    pub fn rehash(&mut self, bucket_count: usize) {
        let bucket_count = bucket_count.next_power_of_two().max(1);
        let old = core::mem::replace(
            &mut self.buckets,
            (0..bucket_count).map(|_| Bucket::new()).collect(),
        );
        for bucket in old {
            for node in bucket.first.into_iter().chain(bucket.chain) {
                let idx = (node.hash % bucket_count as u64) as usize;
                self.buckets[idx].push(node);
            }
        }
    }

    fn grow_if_needed(&mut self) {
        if (self.len + 1) * 100 > self.buckets.len() * MAX_LOAD_PERCENT {
            self.rehash(self.buckets.len() * 2);
        }
    }

    /// A cursor at the first entry (begin equals [`end`] when empty).
    ///
    /// [`end`]: HashMap::end
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

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_capacity_and_hasher(DEFAULT_CAPACITY, S::default());
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S>
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

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            buckets: self.buckets.into_iter(),
            first: None,
            chain: Vec::new().into_iter(),
        }
    }
}

/// Owning iterator over a consumed [`HashMap`], in bucket order.
pub struct IntoIter<K, V> {
    buckets: std::vec::IntoIter<Bucket<K, V>>,
    first: Option<Node<K, V>>,
    chain: std::vec::IntoIter<Node<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.first.take() {
                return Some((node.key, node.value));
            }
            if let Some(node) = self.chain.next() {
                return Some((node.key, node.value));
            }
            let bucket = self.buckets.next()?;
            self.first = bucket.first;
            self.chain = bucket.chain.into_iter();
        }
    }
}

impl<K, V, Q, S> core::ops::Index<&Q> for HashMap<K, V, S>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// Panics when the key is absent; use [`get_or_insert_default`] for
    /// upsert-on-read access.
    ///
    /// [`get_or_insert_default`]: HashMap::get_or_insert_default
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found"),
        }
    }
}

impl<K, V, S> core::fmt::Debug for HashMap<K, V, S>
where
    K: Eq + Hash + core::fmt::Debug,
    V: core::fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
