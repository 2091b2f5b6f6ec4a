//! Type interning for structural deduplication.
//!
//! Converts `TypeData` structures into lightweight `TypeId` handles.
//! Two structurally equal types always intern to the same id, which makes
//! "is this substituted signature the same as that one" an integer compare.

use crate::def::DefId;
use crate::types::{
    IntrinsicKind, TupleElement, TypeData, TypeId, TypeList, TypeParamInfo,
};
use rustc_hash::FxHashMap;
use std::sync::{Arc, PoisonError, RwLock};
use stubsmith_common::{Atom, ShardedInterner};

#[derive(Default)]
struct TypeTable {
    key_to_id: FxHashMap<TypeData, TypeId>,
    id_to_key: Vec<TypeData>,
}

/// Interner for types and the strings they mention.
///
/// Interning goes through `&self`; a snapshot can be shared by concurrent
/// fix computations.
pub struct TypeInterner {
    strings: ShardedInterner,
    table: RwLock<TypeTable>,
}

impl TypeInterner {
    pub fn new() -> Self {
        let mut table = TypeTable::default();
        for kind in IntrinsicKind::ALL {
            let data = TypeData::Intrinsic(kind);
            let id = TypeId(table.id_to_key.len() as u32);
            debug_assert_eq!(id, kind.type_id());
            table.key_to_id.insert(data.clone(), id);
            table.id_to_key.push(data);
        }

        TypeInterner {
            strings: ShardedInterner::new(),
            table: RwLock::new(table),
        }
    }

    pub fn intern_string(&self, s: &str) -> Atom {
        self.strings.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.strings.resolve(atom)
    }

    /// Intern a type structure, returning the existing id when an equal
    /// structure was interned before.
    pub fn intern(&self, data: TypeData) -> TypeId {
        if let TypeData::Intrinsic(kind) = data {
            return kind.type_id();
        }

        {
            let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(&id) = table.key_to_id.get(&data) {
                return id;
            }
        }

        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(&id) = table.key_to_id.get(&data) {
            return id;
        }
        let id = TypeId(table.id_to_key.len() as u32);
        table.key_to_id.insert(data.clone(), id);
        table.id_to_key.push(data);
        id
    }

    /// Look up the structure behind a type id.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.id_to_key.get(id.0 as usize).cloned()
    }

    /// Number of distinct interned types, intrinsics included.
    pub fn len(&self) -> usize {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.id_to_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn intrinsic(&self, kind: IntrinsicKind) -> TypeId {
        kind.type_id()
    }

    pub fn named(&self, def: DefId, outer: Option<TypeId>, args: &[TypeId]) -> TypeId {
        self.intern(TypeData::Named {
            def,
            outer,
            args: TypeList::from_slice(args),
        })
    }

    pub fn array(&self, element: TypeId) -> TypeId {
        self.array_of_rank(element, 1)
    }

    pub fn array_of_rank(&self, element: TypeId, rank: u32) -> TypeId {
        self.intern(TypeData::Array {
            element,
            rank: rank.max(1),
        })
    }

    pub fn nullable(&self, inner: TypeId) -> TypeId {
        self.intern(TypeData::Nullable(inner))
    }

    pub fn pointer(&self, pointee: TypeId) -> TypeId {
        self.intern(TypeData::Pointer(pointee))
    }

    pub fn tuple(&self, elements: Vec<TupleElement>) -> TypeId {
        self.intern(TypeData::Tuple(elements))
    }

    pub fn type_param(&self, info: TypeParamInfo) -> TypeId {
        self.intern(TypeData::TypeParameter(info))
    }

    pub fn error_type(&self, name: &str, qualifier: Option<&str>) -> TypeId {
        let name = self.intern_string(name);
        let qualifier = qualifier.map(|q| self.intern_string(q));
        self.intern(TypeData::Error { name, qualifier })
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/intern_tests.rs"]
mod tests;
