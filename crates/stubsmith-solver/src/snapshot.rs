//! The semantic snapshot a fix runs against.
//!
//! A snapshot pairs the type interner with the definition store and offers
//! the few constructors hosts and tests need to describe a type graph:
//! identity types, instantiations, type parameter references.

use crate::def::{DefId, DefinitionStore, TypeDefinition};
use crate::intern::TypeInterner;
use crate::members::{MemberDef, MemberId};
use crate::types::{TypeData, TypeId, TypeParamId, TypeParamInfo, TypeParamOwner};
use std::sync::Arc;
use stubsmith_common::Atom;

/// Immutable view of a host's type graph.
#[derive(Default)]
pub struct SemanticSnapshot {
    pub interner: TypeInterner,
    pub store: DefinitionStore,
}

impl SemanticSnapshot {
    pub fn new() -> Self {
        SemanticSnapshot::default()
    }

    pub fn atom(&self, s: &str) -> Atom {
        self.interner.intern_string(s)
    }

    pub fn name(&self, atom: Atom) -> Arc<str> {
        self.interner.resolve_atom(atom)
    }

    pub fn define(&self, def: TypeDefinition) -> DefId {
        self.store.register(def)
    }

    pub fn definition(&self, def: DefId) -> Option<Arc<TypeDefinition>> {
        self.store.get(def)
    }

    pub fn set_base(&self, def: DefId, base: TypeId) {
        self.store.set_base(def, base);
    }

    pub fn alloc_member_id(&self) -> MemberId {
        self.store.alloc_member_id()
    }

    pub fn add_member(&self, member: MemberDef) -> MemberId {
        self.store.add_member(member)
    }

    pub fn member(&self, member: MemberId) -> Option<Arc<MemberDef>> {
        self.store.member(member)
    }

    /// Reference to the `index`th type parameter of `def`.
    pub fn type_param(&self, def: DefId, index: u32) -> TypeId {
        let name = self
            .store
            .get(def)
            .and_then(|d| d.type_params.get(index as usize).copied())
            .unwrap_or(Atom::NONE);
        self.interner.type_param(TypeParamInfo {
            id: TypeParamId {
                owner: TypeParamOwner::Def(def),
                index,
            },
            name,
        })
    }

    /// Reference to the `index`th method type parameter of `member`.
    pub fn method_type_param(&self, member: MemberId, index: u32, name: Atom) -> TypeId {
        self.interner.type_param(TypeParamInfo {
            id: TypeParamId {
                owner: TypeParamOwner::Method(member),
                index,
            },
            name,
        })
    }

    /// The type of `def` as seen from inside its own declaration:
    /// `A<T>.B<U>` for `B<U>` nested in `A<T>`.
    pub fn identity_type(&self, def: DefId) -> TypeId {
        let chain = self.store.self_and_containers(def);
        let mut outer: Option<TypeId> = None;
        for &current in chain.iter().rev() {
            let arity = self
                .store
                .get(current)
                .map(|d| d.type_params.len())
                .unwrap_or(0);
            let args: Vec<TypeId> = (0..arity as u32)
                .map(|index| self.type_param(current, index))
                .collect();
            outer = Some(self.interner.named(current, outer, &args));
        }
        outer.unwrap_or(TypeId::OBJECT)
    }

    /// `def<args>` for a top-level definition.
    pub fn instantiate_def(&self, def: DefId, args: &[TypeId]) -> TypeId {
        self.interner.named(def, None, args)
    }

    /// `outer.def<args>` for a nested definition.
    pub fn instantiate_nested(&self, outer: TypeId, def: DefId, args: &[TypeId]) -> TypeId {
        self.interner.named(def, Some(outer), args)
    }

    /// Definition behind a named type, if any.
    pub fn def_of(&self, ty: TypeId) -> Option<DefId> {
        match self.interner.lookup(ty) {
            Some(TypeData::Named { def, .. }) => Some(def),
            _ => None,
        }
    }

    /// Names of every type parameter visible inside `def`: its own and
    /// those of its containers.
    pub fn type_params_in_scope(&self, def: DefId) -> Vec<Atom> {
        self.store
            .self_and_containers(def)
            .into_iter()
            .flat_map(|d| self.store.type_params_of(d))
            .collect()
    }
}

#[cfg(test)]
#[path = "tests/snapshot_tests.rs"]
mod tests;
