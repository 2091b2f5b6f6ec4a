//! Generic type instantiation and substitution.
//!
//! Member signatures are stored in terms of their declaring definition's
//! type parameters. To express a signature at the target type, every base
//! link between the declaring definition and the target contributes one
//! mapping; `SubstitutionChain` composes them right-to-left so that the
//! result mentions only the target's own (or its containers') parameters.

use crate::def::{DefId, DefinitionStore};
use crate::intern::TypeInterner;
use crate::types::{TupleElement, TypeData, TypeId, TypeList, TypeParamId, TypeParamOwner};
use rustc_hash::{FxHashMap, FxHashSet};
use stubsmith_common::limits::MAX_INSTANTIATION_DEPTH;
use tracing::{trace, warn};

/// A mapping from type parameter identities to types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeSubstitution {
    map: FxHashMap<TypeParamId, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        TypeSubstitution::default()
    }

    /// Mappings induced by one instantiation: `A<int>.B<string>` maps
    /// `A`'s parameters to `int` and `B`'s to `string`.
    pub fn for_instantiation(interner: &TypeInterner, ty: TypeId) -> Self {
        let mut subst = TypeSubstitution::new();
        let mut current = Some(ty);
        let mut steps = 0;
        while let Some(ty) = current {
            steps += 1;
            if steps > MAX_INSTANTIATION_DEPTH {
                warn!(ty = ty.0, "for_instantiation: containing chain too deep");
                break;
            }
            let Some(TypeData::Named { def, outer, args }) = interner.lookup(ty) else {
                break;
            };
            for (index, &arg) in args.iter().enumerate() {
                subst.insert(
                    TypeParamId {
                        owner: TypeParamOwner::Def(def),
                        index: index as u32,
                    },
                    arg,
                );
            }
            current = outer;
        }
        subst
    }

    pub fn insert(&mut self, param: TypeParamId, ty: TypeId) {
        self.map.insert(param, ty);
    }

    pub fn get(&self, param: TypeParamId) -> Option<TypeId> {
        self.map.get(&param).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Single-pass instantiator. Replacement types are not re-substituted, so a
/// mapping `T -> List<T>` terminates.
struct TypeInstantiator<'a> {
    interner: &'a TypeInterner,
    subst: &'a TypeSubstitution,
    depth: u32,
    exceeded: bool,
}

impl<'a> TypeInstantiator<'a> {
    fn new(interner: &'a TypeInterner, subst: &'a TypeSubstitution) -> Self {
        TypeInstantiator {
            interner,
            subst,
            depth: 0,
            exceeded: false,
        }
    }

    fn instantiate(&mut self, ty: TypeId) -> TypeId {
        if ty.is_intrinsic() {
            return ty;
        }
        if self.depth >= MAX_INSTANTIATION_DEPTH {
            self.exceeded = true;
            return ty;
        }

        self.depth += 1;
        let result = self.instantiate_inner(ty);
        self.depth -= 1;
        result
    }

    fn instantiate_inner(&mut self, ty: TypeId) -> TypeId {
        let Some(data) = self.interner.lookup(ty) else {
            return ty;
        };

        match data {
            TypeData::Intrinsic(_) | TypeData::Error { .. } => ty,
            TypeData::TypeParameter(info) => self.subst.get(info.id).unwrap_or(ty),
            TypeData::Named { def, outer, args } => {
                let outer = outer.map(|outer| self.instantiate(outer));
                let args: TypeList = args.iter().map(|&arg| self.instantiate(arg)).collect();
                self.interner.named(def, outer, &args)
            }
            TypeData::Array { element, rank } => {
                let element = self.instantiate(element);
                self.interner.array_of_rank(element, rank)
            }
            TypeData::Nullable(inner) => {
                let inner = self.instantiate(inner);
                self.interner.nullable(inner)
            }
            TypeData::Pointer(pointee) => {
                let pointee = self.instantiate(pointee);
                self.interner.pointer(pointee)
            }
            TypeData::Tuple(elements) => {
                let elements = elements
                    .into_iter()
                    .map(|element| TupleElement {
                        ty: self.instantiate(element.ty),
                        name: element.name,
                    })
                    .collect();
                self.interner.tuple(elements)
            }
        }
    }
}

/// Apply a substitution to a type.
///
/// Returns the input unchanged when the nesting exceeds
/// `MAX_INSTANTIATION_DEPTH`.
pub fn instantiate_type(interner: &TypeInterner, ty: TypeId, subst: &TypeSubstitution) -> TypeId {
    if subst.is_empty() {
        return ty;
    }
    let mut instantiator = TypeInstantiator::new(interner, subst);
    let result = instantiator.instantiate(ty);
    if instantiator.exceeded {
        warn!(ty = ty.0, "instantiate_type: depth limit exceeded, keeping input");
        return ty;
    }
    result
}

/// Collect every type parameter mentioned anywhere in `ty`.
pub fn collect_type_params(interner: &TypeInterner, ty: TypeId) -> FxHashSet<TypeParamId> {
    let mut found = FxHashSet::default();
    collect_into(interner, ty, &mut found, 0);
    found
}

fn collect_into(
    interner: &TypeInterner,
    ty: TypeId,
    found: &mut FxHashSet<TypeParamId>,
    depth: u32,
) {
    if ty.is_intrinsic() || depth > MAX_INSTANTIATION_DEPTH {
        return;
    }
    match interner.lookup(ty) {
        Some(TypeData::TypeParameter(info)) => {
            found.insert(info.id);
        }
        Some(TypeData::Named { outer, args, .. }) => {
            if let Some(outer) = outer {
                collect_into(interner, outer, found, depth + 1);
            }
            for arg in args {
                collect_into(interner, arg, found, depth + 1);
            }
        }
        Some(
            TypeData::Array { element: inner, .. }
            | TypeData::Nullable(inner)
            | TypeData::Pointer(inner),
        ) => collect_into(interner, inner, found, depth + 1),
        Some(TypeData::Tuple(elements)) => {
            for element in elements {
                collect_into(interner, element.ty, found, depth + 1);
            }
        }
        Some(TypeData::Intrinsic(_) | TypeData::Error { .. }) | None => {}
    }
}

pub fn contains_type_params(interner: &TypeInterner, ty: TypeId) -> bool {
    !collect_type_params(interner, ty).is_empty()
}

/// True when `ty` mentions a pointer type anywhere.
pub fn contains_pointer(interner: &TypeInterner, ty: TypeId) -> bool {
    fn walk(interner: &TypeInterner, ty: TypeId, depth: u32) -> bool {
        if ty.is_intrinsic() || depth > MAX_INSTANTIATION_DEPTH {
            return false;
        }
        match interner.lookup(ty) {
            Some(TypeData::Pointer(_)) => true,
            Some(TypeData::Named { outer, args, .. }) => {
                outer.is_some_and(|outer| walk(interner, outer, depth + 1))
                    || args.iter().any(|&arg| walk(interner, arg, depth + 1))
            }
            Some(TypeData::Array { element: inner, .. } | TypeData::Nullable(inner)) => {
                walk(interner, inner, depth + 1)
            }
            Some(TypeData::Tuple(elements)) => elements
                .iter()
                .any(|element| walk(interner, element.ty, depth + 1)),
            _ => false,
        }
    }
    walk(interner, ty, 0)
}

// =============================================================================
// SubstitutionChain
// =============================================================================

/// The declared base types walked from a target upward, one per link.
///
/// `raw[0]` is the target's declared base, written in terms of the target's
/// parameters. `raw[k]` is the declared base of `raw[k - 1]`'s definition,
/// written in terms of that definition's parameters.
#[derive(Clone, Debug, Default)]
pub struct SubstitutionChain {
    raw: Vec<TypeId>,
}

impl SubstitutionChain {
    pub fn new() -> Self {
        SubstitutionChain::default()
    }

    pub fn push(&mut self, declared_base: TypeId) {
        self.raw.push(declared_base);
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Close every link over the target's parameters.
    ///
    /// `closed[0] = raw[0]` and `closed[k] = raw[k]` instantiated through the
    /// mapping induced by `closed[k - 1]`. Members declared at link `k` are
    /// then substituted with `TypeSubstitution::for_instantiation(closed[k])`.
    pub fn compose(&self, interner: &TypeInterner) -> Vec<TypeId> {
        let mut closed: Vec<TypeId> = Vec::with_capacity(self.raw.len());
        for (index, &raw) in self.raw.iter().enumerate() {
            let ty = match closed.last() {
                None => raw,
                Some(&previous) => {
                    let subst = TypeSubstitution::for_instantiation(interner, previous);
                    instantiate_type(interner, raw, &subst)
                }
            };
            trace!(link = index, raw = raw.0, closed = ty.0, "SubstitutionChain::compose");
            closed.push(ty);
        }
        closed
    }
}

/// Assert that a substituted type no longer mentions parameters of any
/// definition other than `target` and its containers. Method type
/// parameters stay open by construction.
///
/// # Panics
///
/// Panics when a foreign type parameter survives; that means the chain was
/// composed incorrectly.
pub fn assert_closed(
    interner: &TypeInterner,
    store: &DefinitionStore,
    target: DefId,
    ty: TypeId,
) {
    let in_scope = store.self_and_containers(target);
    for param in collect_type_params(interner, ty) {
        let allowed = match param.owner {
            TypeParamOwner::Method(_) => true,
            TypeParamOwner::Def(owner) => in_scope.contains(&owner),
        };
        assert!(
            allowed,
            "substitution left type parameter {param:?} open in type {ty:?} for target {target:?}"
        );
    }
}

#[cfg(test)]
#[path = "tests/instantiate_tests.rs"]
mod tests;
