//! String interner for identifier deduplication.
//!
//! Type names, member names and type-parameter names are interned once per
//! snapshot and passed around as `Atom` handles, so signature comparison in
//! the resolver is integer comparison.

use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `ShardedInterner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

const SHARD_BITS: u32 = 4;
const SHARD_COUNT: usize = 1 << SHARD_BITS;
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;

/// Names that show up in nearly every snapshot: keyword type names, accessor
/// keywords and the conventional indexer name.
const COMMON_STRINGS: &[&str] = &[
    "void", "object", "string", "bool", "char", "sbyte", "byte", "short", "ushort", "int", "uint",
    "long", "ulong", "float", "double", "decimal", "get", "set", "add", "remove", "this", "value",
    "System", "T",
];

#[derive(Default)]
struct ShardState {
    map: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

/// Sharded string interner for concurrent use.
///
/// A snapshot may be shared by several speculative fix computations, so
/// interning goes through `&self`. Fixed buckets keep lock contention low
/// while Atom lookups stay O(1): the low `SHARD_BITS` of an atom select the
/// shard, the remaining bits index into it.
pub struct ShardedInterner {
    shards: [RwLock<ShardState>; SHARD_COUNT],
}

impl ShardedInterner {
    /// Create a new interner with the empty string pre-interned as `Atom::NONE`.
    pub fn new() -> Self {
        let shards: [RwLock<ShardState>; SHARD_COUNT] =
            std::array::from_fn(|_| RwLock::new(ShardState::default()));

        if let Ok(mut state) = shards[0].write() {
            let empty: Arc<str> = Arc::from("");
            state.strings.push(empty.clone());
            state.map.insert(empty, Atom::NONE);
        }

        let interner = ShardedInterner { shards };
        for s in COMMON_STRINGS {
            interner.intern(s);
        }
        interner
    }

    /// Intern a string, returning its Atom handle.
    pub fn intern(&self, s: &str) -> Atom {
        if s.is_empty() {
            return Atom::NONE;
        }

        let shard_idx = Self::shard_for(s);
        let Ok(mut state) = self.shards[shard_idx].write() else {
            return Atom::NONE;
        };

        if let Some(&atom) = state.map.get(s) {
            return atom;
        }

        let local_index = state.strings.len() as u32;
        if local_index > (u32::MAX >> SHARD_BITS) {
            return Atom::NONE;
        }

        let atom = Atom((local_index << SHARD_BITS) | (shard_idx as u32 & SHARD_MASK));
        let owned: Arc<str> = Arc::from(s);
        state.strings.push(owned.clone());
        state.map.insert(owned, atom);
        atom
    }

    /// Resolve an Atom back to its string value.
    /// Unknown atoms resolve to the empty string.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.try_resolve(atom).unwrap_or_else(|| Arc::from(""))
    }

    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        let shard_idx = (atom.0 & SHARD_MASK) as usize;
        let local_index = (atom.0 >> SHARD_BITS) as usize;
        let state = self.shards.get(shard_idx)?.read().ok()?;
        state.strings.get(local_index).cloned()
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.read().map(|state| state.strings.len()).unwrap_or(0))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    fn shard_for(s: &str) -> usize {
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        (hasher.finish() as usize) & (SHARD_COUNT - 1)
    }
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/interner_tests.rs"]
mod tests;
