#![cfg(test)]

// Property tests for HashMap and StaticHashMap kept inside the crate so
// they can exercise the cursor machinery without feature gates.

use crate::{HashMap, InsertOutcome, StaticHashMap};
use core::hash::{BuildHasher, Hasher};
use proptest::prelude::*;
use std::collections::HashMap as StdHashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    GetOrDefault(usize),
    Remove(usize),
    Find(usize),
    Mutate(usize, i32),
    Clear,
    Traverse,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let pool: Vec<String> = {
            let mut p = pool;
            p.sort();
            p.dedup();
            p
        };
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => idx.clone().prop_map(Op::GetOrDefault),
            3 => idx.clone().prop_map(Op::Remove),
            3 => idx.clone().prop_map(Op::Find),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::Clear),
            3 => Just(Op::Traverse),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Forward traversal from begin, and backward traversal from the sentinel,
// must be exact reverses and each visit every key exactly once.
fn check_traversal<S: BuildHasher>(
    sut: &HashMap<String, i32, S>,
    model: &StdHashMap<String, i32>,
) -> Result<(), TestCaseError> {
    let forward: Vec<(String, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
    prop_assert_eq!(forward.len(), model.len());
    for (k, v) in &forward {
        prop_assert_eq!(model.get(k), Some(v));
    }

    let mut backward = Vec::new();
    let mut it = sut.end();
    for _ in 0..sut.len() {
        it.move_prev();
        backward.push((it.key().clone(), *it.value()));
    }
    backward.reverse();
    prop_assert_eq!(backward, forward);

    // Walking back size() steps from the sentinel lands exactly on begin.
    prop_assert_eq!(it, sut.iter());
    Ok(())
}

fn run_scenario<S: BuildHasher>(
    mut sut: HashMap<String, i32, S>,
    pool: Vec<String>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: StdHashMap<String, i32> = StdHashMap::new();

    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = pool[i].clone();
                let already = model.contains_key(&k);
                let (outcome, stored) = sut.insert(k.clone(), v);
                prop_assert_eq!(*stored, v);
                match outcome {
                    InsertOutcome::Inserted => prop_assert!(!already),
                    InsertOutcome::Updated => prop_assert!(already),
                }
                model.insert(k, v);
            }
            Op::GetOrDefault(i) => {
                let k = pool[i].clone();
                let expected = model.get(&k).copied().unwrap_or_default();
                let v = *sut.get_or_insert_default(k.clone());
                prop_assert_eq!(v, expected);
                model.entry(k).or_default();
            }
            Op::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k.as_str()), model.remove(k));
            }
            Op::Find(i) => {
                let k = &pool[i];
                let it = sut.find(k.as_str());
                match model.get(k) {
                    Some(v) => {
                        prop_assert!(!it.is_end());
                        prop_assert_eq!(it.key(), k);
                        prop_assert_eq!(it.value(), v);
                        prop_assert_eq!(sut.get(k.as_str()), Some(v));
                    }
                    None => {
                        prop_assert!(it.is_end());
                        prop_assert_eq!(it, sut.end());
                        prop_assert!(!sut.contains_key(k.as_str()));
                    }
                }
            }
            Op::Mutate(i, d) => {
                let k = &pool[i];
                let mut it = sut.find_mut(k.as_str());
                if let Some((_, v)) = it.get_mut() {
                    *v = v.saturating_add(d);
                }
                if let Some(mv) = model.get_mut(k) {
                    *mv = mv.saturating_add(d);
                }
            }
            Op::Clear => {
                let buckets = sut.bucket_count();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.bucket_count(), buckets);
            }
            Op::Traverse => check_traversal(&sut, &model)?,
        }

        // Post-conditions after each op.
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.load_factor() <= 0.8 + f32::EPSILON);
    }
    check_traversal(&sut, &model)
}

// Property: state-machine equivalence against std::collections::HashMap
// across random operation sequences, including full forward/backward
// traversal checks after every Traverse op and at the end.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(HashMap::new(), pool, ops)?;
    }

    // Start from a single bucket so the very first inserts already force
    // growth and collisions.
    #[test]
    fn prop_state_machine_tiny_table((pool, ops) in arb_scenario()) {
        run_scenario(HashMap::with_capacity(1), pool, ops)?;
    }
}

// Collision variant using a constant hasher so every key lands in one
// bucket: stresses the chain path, promotion on removal, and the cursor's
// inline-then-chain ordering.
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

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_scenario(HashMap::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}

// Property: the fixed-capacity map agrees with the growable one on every
// operation, as long as the key pool fits the capacity (the pool is at
// most 8 keys, the capacity 16, so the contract is never violated).
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_static_matches_dynamic((pool, ops) in arb_scenario()) {
        let mut fixed: StaticHashMap<String, i32, 16> = StaticHashMap::new();
        let mut dynamic: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(i, v) => {
                    let k = pool[i].clone();
                    let (fo, fv) = fixed.insert(k.clone(), v);
                    let (go, gv) = dynamic.insert(k, v);
                    prop_assert_eq!(fo, go);
                    prop_assert_eq!(*fv, *gv);
                }
                Op::GetOrDefault(i) => {
                    let k = pool[i].clone();
                    let fv = *fixed.get_or_insert_default(k.clone());
                    let gv = *dynamic.get_or_insert_default(k);
                    prop_assert_eq!(fv, gv);
                }
                Op::Remove(i) => {
                    prop_assert_eq!(
                        fixed.remove(pool[i].as_str()),
                        dynamic.remove(pool[i].as_str())
                    );
                }
                Op::Find(i) => {
                    let k = pool[i].as_str();
                    let f = fixed.find(k);
                    let g = dynamic.find(k);
                    prop_assert_eq!(f.is_end(), g.is_end());
                    if !f.is_end() {
                        prop_assert_eq!(f.key(), g.key());
                        prop_assert_eq!(f.value(), g.value());
                    }
                }
                Op::Mutate(i, d) => {
                    let k = pool[i].as_str();
                    if let Some(v) = fixed.get_mut(k) {
                        *v = v.saturating_add(d);
                    }
                    if let Some(v) = dynamic.get_mut(k) {
                        *v = v.saturating_add(d);
                    }
                }
                Op::Clear => {
                    fixed.clear();
                    dynamic.clear();
                }
                Op::Traverse => {
                    let f: StdHashMap<String, i32> =
                        fixed.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    let g: StdHashMap<String, i32> =
                        dynamic.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(f, g);
                }
            }
            prop_assert_eq!(fixed.len(), dynamic.len());
        }
    }
}
