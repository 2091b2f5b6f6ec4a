//! Type definitions and their storage.
//!
//! A `DefinitionStore` holds every type definition and member signature a
//! host handed over in one semantic snapshot. The store is filled once and
//! then only read; both maps are `DashMap`s so a snapshot can be shared by
//! concurrent fix computations.

use crate::members::{MemberDef, MemberId};
use crate::types::TypeId;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use stubsmith_common::Atom;
use tracing::trace;

// =============================================================================
// DefId
// =============================================================================

/// Identifier of a type definition within one snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel value for invalid `DefId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DefId`.
    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

// =============================================================================
// DefKind
// =============================================================================

/// Kind of type definition.
///
/// | Kind | Reference type | Can be an abstract base |
/// |------|----------------|-------------------------|
/// | Class | yes | yes |
/// | Struct | no | no |
/// | Interface | yes | no |
/// | Enum | no | no |
/// | Delegate | yes | no |
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DefKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

impl DefKind {
    pub fn is_value_type(self) -> bool {
        matches!(self, DefKind::Struct | DefKind::Enum)
    }
}

/// A named constant of an enum definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EnumConstant {
    pub name: Atom,
    pub value: i128,
}

// =============================================================================
// TypeDefinition
// =============================================================================

/// Everything the engine needs to know about one type definition.
#[derive(Clone, Debug)]
pub struct TypeDefinition {
    pub kind: DefKind,
    pub name: Atom,
    /// Dotted namespace path; `Atom::NONE` for the global namespace.
    /// Nested definitions carry the namespace of their outermost container.
    pub namespace: Atom,
    /// Containing definition for nested types.
    pub containing: Option<DefId>,
    /// Names of the definition's own type parameters, in declaration order.
    pub type_params: Vec<Atom>,
    /// Declared base type, expressed in terms of this definition's own type
    /// parameters and those of its containers.
    pub base: Option<TypeId>,
    pub is_abstract: bool,
    pub is_sealed: bool,
    /// Compilation unit that declares the type.
    pub assembly: Atom,
    pub members: Vec<MemberId>,
    pub enum_constants: Vec<EnumConstant>,
}

impl TypeDefinition {
    pub fn new(kind: DefKind, name: Atom) -> Self {
        TypeDefinition {
            kind,
            name,
            namespace: Atom::NONE,
            containing: None,
            type_params: Vec::new(),
            base: None,
            is_abstract: false,
            is_sealed: false,
            assembly: Atom::NONE,
            members: Vec::new(),
            enum_constants: Vec::new(),
        }
    }

    pub fn class(name: Atom) -> Self {
        Self::new(DefKind::Class, name)
    }

    pub fn abstract_class(name: Atom) -> Self {
        Self::new(DefKind::Class, name).with_abstract(true)
    }

    pub fn structure(name: Atom) -> Self {
        Self::new(DefKind::Struct, name)
    }

    pub fn with_namespace(mut self, namespace: Atom) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_containing(mut self, containing: DefId) -> Self {
        self.containing = Some(containing);
        self
    }

    pub fn with_type_params(mut self, type_params: Vec<Atom>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn with_base(mut self, base: TypeId) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_sealed(mut self, is_sealed: bool) -> Self {
        self.is_sealed = is_sealed;
        self
    }

    pub fn with_assembly(mut self, assembly: Atom) -> Self {
        self.assembly = assembly;
        self
    }

    pub fn with_enum_constants(mut self, constants: Vec<EnumConstant>) -> Self {
        self.enum_constants = constants;
        self
    }

    pub fn enum_constant_named(&self, value: i128) -> Option<Atom> {
        self.enum_constants
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.name)
    }
}

// =============================================================================
// DefinitionStore
// =============================================================================

/// Thread-safe storage for type definitions and member signatures.
pub struct DefinitionStore {
    definitions: DashMap<DefId, Arc<TypeDefinition>>,
    members: DashMap<MemberId, Arc<MemberDef>>,
    next_def: AtomicU32,
    next_member: AtomicU32,
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore {
    pub fn new() -> Self {
        DefinitionStore {
            definitions: DashMap::new(),
            members: DashMap::new(),
            next_def: AtomicU32::new(DefId::FIRST_VALID),
            next_member: AtomicU32::new(MemberId::FIRST_VALID),
        }
    }

    /// Register a new definition and return its `DefId`.
    pub fn register(&self, def: TypeDefinition) -> DefId {
        let id = DefId(self.next_def.fetch_add(1, Ordering::SeqCst));
        trace!(def_id = id.0, kind = ?def.kind, "DefinitionStore::register");
        self.definitions.insert(id, Arc::new(def));
        id
    }

    pub fn get(&self, id: DefId) -> Option<Arc<TypeDefinition>> {
        self.definitions.get(&id).map(|r| Arc::clone(&r))
    }

    pub fn contains(&self, id: DefId) -> bool {
        self.definitions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Set the declared base of a definition.
    ///
    /// Bases usually mention the definition itself (`class B : A<B>`), so
    /// they are attached after registration.
    pub fn set_base(&self, id: DefId, base: TypeId) {
        if let Some(mut entry) = self.definitions.get_mut(&id) {
            Arc::make_mut(&mut entry).base = Some(base);
        }
    }

    /// Reserve a member id before the member is built.
    ///
    /// Generic methods need their own id to construct the types of their
    /// method type parameters.
    pub fn alloc_member_id(&self) -> MemberId {
        MemberId(self.next_member.fetch_add(1, Ordering::SeqCst))
    }

    /// Store a member under its own id and append it to its declaring
    /// definition's member list.
    pub fn add_member(&self, member: MemberDef) -> MemberId {
        let id = member.id;
        let declaring = member.declaring;
        trace!(member_id = id.0, def_id = declaring.0, "DefinitionStore::add_member");
        self.members.insert(id, Arc::new(member));
        if let Some(mut entry) = self.definitions.get_mut(&declaring) {
            Arc::make_mut(&mut entry).members.push(id);
        }
        id
    }

    pub fn member(&self, id: MemberId) -> Option<Arc<MemberDef>> {
        self.members.get(&id).map(|r| Arc::clone(&r))
    }

    /// Members of a definition in declaration order.
    pub fn members_of(&self, id: DefId) -> Vec<Arc<MemberDef>> {
        let Some(def) = self.get(id) else {
            return Vec::new();
        };
        def.members
            .iter()
            .filter_map(|&member| self.member(member))
            .collect()
    }

    /// The definition followed by its containers, innermost first.
    pub fn self_and_containers(&self, id: DefId) -> Vec<DefId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(def_id) = current {
            if chain.contains(&def_id) {
                break;
            }
            chain.push(def_id);
            current = self.get(def_id).and_then(|def| def.containing);
        }
        chain
    }

    /// Containing definitions of `id`, outermost first, excluding `id`.
    pub fn containing_chain(&self, id: DefId) -> Vec<DefId> {
        let mut chain = self.self_and_containers(id);
        chain.remove(0);
        chain.reverse();
        chain
    }

    pub fn type_params_of(&self, id: DefId) -> Vec<Atom> {
        self.get(id)
            .map(|def| def.type_params.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "tests/def_tests.rs"]
mod tests;
