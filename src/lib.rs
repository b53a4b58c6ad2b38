//! inline-hashmap: hash maps that keep the first entry of each bucket
//! inline, with bidirectional cursors.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a hand-built two-tier hash table where the common
//!   non-colliding case touches no chain storage, plus a cursor that can
//!   walk the table in both directions.
//! - Layers:
//!   - Bucket<K, V>: one optional inline node plus an owned overflow
//!     chain holding further entries in insertion order. All key search,
//!     upsert, and promotion-on-removal logic lives here.
//!   - HashMap<K, V, S>: growable bucket array; selects buckets by
//!     `hash % bucket_count`, doubles and re-buckets past an 80% load
//!     factor.
//!   - StaticHashMap<K, V, N, S>: fixed-capacity sibling; `N` buckets,
//!     at most `N` entries, never rehashes. Overflow is a caller error
//!     and panics.
//!   - Iter / IterMut: bidirectional cursors over the bucket slice,
//!     driven by an explicit position state machine (inline node versus
//!     chain index). IterMut narrows into Iter, never the reverse.
//!
//! Constraints
//! - Single-threaded, unsynchronized; no atomics, no locking.
//! - No per-entry allocation until a bucket collides.
//! - Each entry stores its `u64` hash; rehashing re-buckets by the stored
//!   hash and never re-invokes `K: Hash`.
//! - Cursors borrow the map, so any structural mutation while a cursor is
//!   live is a compile error rather than a documented invalidation hazard.
//!
//! Iteration order
//! - Buckets left to right; within a bucket the inline node first, then
//!   the chain in insertion order. Backward traversal visits the exact
//!   reverse. Empty buckets are skipped; the end sentinel rests one past
//!   the last bucket's chain.
//!
//! Hash policy
//! - Any `S: BuildHasher`. The default is FNV-1a via the `fnv` crate,
//!   which hashes string-like keys (including `CString`/`CStr`) by
//!   content, not by address.
//!
//! Notes and non-goals
//! - Not thread-safe; callers serialize access.
//! - No serialization of map contents.
//! - The overflow chain is plain owned storage behind positional indices;
//!   no allocator customization.

mod bucket;
mod hash_map;
mod hash_map_proptest;
mod iter;
mod static_hash_map;

// Public surface
pub use hash_map::{HashMap, InsertOutcome, IntoIter, DEFAULT_CAPACITY};
pub use iter::{Iter, IterMut};
pub use static_hash_map::StaticHashMap;

/// Default hash policy: content-based FNV-1a.
pub use fnv::FnvBuildHasher;
