use inline_hashmap::{HashMap, InsertOutcome, Iter};
use std::collections::BTreeSet;
use std::hash::{BuildHasher, Hasher};

/// Forces every key into one bucket to make chain layout deterministic.
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

fn sample_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    for (k, v) in [("one", "1"), ("two", "2"), ("three", "3"), ("four", "4")] {
        m.insert(k.to_string(), v.to_string());
    }
    m
}

/// Inserting distinct keys yields a size equal to the key count and every
/// key finds the value last stored for it.
#[test]
fn distinct_inserts_then_lookup() {
    let m = sample_map();
    assert_eq!(m.len(), 4);
    for (k, v) in [("one", "1"), ("two", "2"), ("three", "3"), ("four", "4")] {
        let it = m.find(k);
        assert!(!it.is_end());
        assert_eq!(it.key(), k);
        assert_eq!(it.value(), v);
    }
}

/// Inserting the same key twice keeps size at one and the second value.
#[test]
fn double_insert_keeps_second_value() {
    let mut m: HashMap<String, String> = HashMap::new();
    let (o1, _) = m.insert("k".to_string(), "first".to_string());
    let (o2, _) = m.insert("k".to_string(), "second".to_string());
    assert_eq!(o1, InsertOutcome::Inserted);
    assert_eq!(o2, InsertOutcome::Updated);
    assert_eq!(m.len(), 1);
    assert_eq!(m.find("k").value(), "second");
}

/// A full forward walk visits exactly `len()` entries with distinct keys.
#[test]
fn forward_walk_visits_each_entry_once() {
    let m = sample_map();
    let mut seen = BTreeSet::new();
    let mut steps = 0;
    let mut it = m.iter();
    while !it.is_end() {
        assert!(seen.insert(it.key().clone()), "duplicate key visited");
        it.move_next();
        steps += 1;
    }
    assert_eq!(steps, m.len());
    assert_eq!(it, m.end());
}

/// Stepping backward from `end()` exactly `len()` times lands on begin
/// and yields the reverse of the forward key sequence.
#[test]
fn backward_walk_is_reverse_of_forward() {
    let m = sample_map();
    let forward: Vec<String> = m.iter().map(|(k, _)| k.clone()).collect();

    let mut backward = Vec::new();
    let mut it = m.end();
    for _ in 0..m.len() {
        it.move_prev();
        backward.push(it.key().clone());
    }
    assert_eq!(it, m.iter(), "len() backward steps reach begin");

    backward.reverse();
    assert_eq!(backward, forward);
}

/// With every key colliding, a bucket is visited inline node first, then
/// chain entries in insertion order; the stored hash is observable at
/// every position.
#[test]
fn collision_bucket_order_and_hash_accessor() {
    let mut m: HashMap<String, i32, ConstBuildHasher> = HashMap::with_hasher(ConstBuildHasher);
    for (i, k) in ["inline", "c0", "c1", "c2"].iter().enumerate() {
        m.insert((*k).to_string(), i as i32);
    }
    let order: Vec<String> = m.iter().map(|(k, _)| k.clone()).collect();
    assert_eq!(order, ["inline", "c0", "c1", "c2"]);

    let mut it = m.iter();
    while !it.is_end() {
        assert_eq!(it.hash(), 0, "constant hasher stores hash 0");
        it.move_next();
    }
}

/// Removing the inline node of a colliding bucket promotes the chain head
/// and leaves the order of the remaining chain unchanged; the promoted
/// key remains findable.
#[test]
fn inline_removal_promotes_chain_head() {
    let mut m: HashMap<String, i32, ConstBuildHasher> = HashMap::with_hasher(ConstBuildHasher);
    for (i, k) in ["inline", "c0", "c1"].iter().enumerate() {
        m.insert((*k).to_string(), i as i32);
    }

    assert_eq!(m.remove("inline"), Some(0));
    assert_eq!(m.len(), 2);

    let it = m.find("c0");
    assert!(!it.is_end(), "promoted key still found");
    assert_eq!(it.value(), &1);

    let order: Vec<String> = m.iter().map(|(k, _)| k.clone()).collect();
    assert_eq!(order, ["c0", "c1"]);
}

/// Removing a nonexistent key changes nothing.
#[test]
fn remove_missing_key_is_noop() {
    let mut m = sample_map();
    assert_eq!(m.remove("five"), None);
    assert_eq!(m.len(), 4);
    let keys: BTreeSet<String> = m.iter().map(|(k, _)| k.clone()).collect();
    assert_eq!(keys.len(), 4);
}

/// A converted mutable cursor denotes the same position as a read-only
/// lookup: the entry it yields and the remainder of its walk match.
#[test]
fn mut_cursor_narrows_to_const_at_same_position() {
    let mut m = sample_map();

    let mut it = m.find_mut("two");
    *it.value_mut() = "2!".to_string();
    let it: Iter<'_, String, String> = it.into();
    assert_eq!(it.key(), "two");
    assert_eq!(it.value(), "2!");

    // The converted cursor walks the same suffix a fresh const lookup does.
    let rest_via_mut: Vec<String> = it.map(|(k, _)| k.clone()).collect();
    let rest_via_const: Vec<String> = m.find("two").map(|(k, _)| k.clone()).collect();
    assert_eq!(rest_via_mut, rest_via_const);
}

/// Cursor equality requires the same map: the same key found in two maps
/// with identical contents compares unequal, while two lookups in one map
/// compare equal.
#[test]
fn cursor_equality_is_per_map() {
    let a = sample_map();
    let b = sample_map();
    assert_eq!(a.find("one"), a.find("one"));
    assert_ne!(a.find("one"), b.find("one"));
    assert_ne!(a.end(), b.end());
}

/// Borrowed lookups work: store `String`, query with `&str`.
#[test]
fn borrowed_lookup() {
    let m = sample_map();
    assert!(m.contains_key("one"));
    assert!(!m.contains_key("zero"));
    assert_eq!(m.get("three").map(String::as_str), Some("3"));
}

/// A map that grew several times still traverses cleanly in both
/// directions and visits every entry exactly once.
#[test]
fn traversal_after_growth() {
    let mut m: HashMap<u32, u32> = HashMap::with_capacity(2);
    for i in 0..200 {
        m.insert(i, i);
    }
    assert_eq!(m.len(), 200);

    let forward: Vec<u32> = m.iter().map(|(k, _)| *k).collect();
    assert_eq!(forward.len(), 200);
    let distinct: BTreeSet<u32> = forward.iter().copied().collect();
    assert_eq!(distinct.len(), 200);

    let mut backward = Vec::new();
    let mut it = m.end();
    for _ in 0..m.len() {
        it.move_prev();
        backward.push(*it.key());
    }
    backward.reverse();
    assert_eq!(backward, forward);
}

/// Accessing the sentinel's entry is a contract violation and panics.
#[test]
#[should_panic(expected = "end sentinel")]
fn dereferencing_end_panics() {
    let m: HashMap<String, i32> = HashMap::new();
    let _ = m.end().value();
}
