//! Abstract base chain construction.
//!
//! Walks a target type's declared bases upward while each base is abstract,
//! recording one link per base together with its instantiation closed over
//! the target's own type parameters.
//!
//! Unlike a compiler, the walk cannot assume an acyclic graph: snapshots
//! come from a host. Cycles are cut at the first repeated definition and the
//! walk is bounded by `MAX_BASE_CHAIN_DEPTH`.

use crate::def::{DefId, DefKind};
use crate::instantiate::{SubstitutionChain, TypeSubstitution};
use crate::snapshot::SemanticSnapshot;
use crate::types::TypeId;
use rustc_hash::FxHashSet;
use stubsmith_common::limits::MAX_BASE_CHAIN_DEPTH;
use tracing::{debug, warn};

/// Relationship between a target type and its declared base.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BaseRelationship {
    /// Reference-type target with an abstract class base.
    AbstractBase(DefId),
    /// No base, a non-class base, or a concrete base.
    NothingToImplement,
    /// Value-type target declaring a class base.
    Illegal,
}

/// Classify the relationship between `target` and its declared base.
pub fn base_relationship(snapshot: &SemanticSnapshot, target: DefId) -> BaseRelationship {
    let Some(target_def) = snapshot.definition(target) else {
        return BaseRelationship::NothingToImplement;
    };
    let Some(base_def) = target_def
        .base
        .and_then(|base| snapshot.def_of(base))
        .and_then(|def| snapshot.definition(def).map(|info| (def, info)))
    else {
        return BaseRelationship::NothingToImplement;
    };

    let (base_id, base_info) = base_def;
    if base_info.kind != DefKind::Class {
        return BaseRelationship::NothingToImplement;
    }
    if target_def.kind.is_value_type() {
        return BaseRelationship::Illegal;
    }
    if !base_info.is_abstract {
        return BaseRelationship::NothingToImplement;
    }
    BaseRelationship::AbstractBase(base_id)
}

/// One base type in the chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChainLink {
    pub def: DefId,
    /// The base as declared by the previous link's definition.
    pub declared: TypeId,
    /// The base closed over the target's type parameters.
    pub instantiation: TypeId,
    pub is_abstract: bool,
}

/// Ordered base chain of a target, nearest base first, ending at the first
/// concrete class (included) or at the topmost abstract ancestor.
#[derive(Clone, Debug)]
pub struct AbstractChain {
    pub target: DefId,
    links: Vec<ChainLink>,
}

impl AbstractChain {
    pub fn build(snapshot: &SemanticSnapshot, target: DefId) -> Self {
        let mut raw = SubstitutionChain::new();
        let mut defs: Vec<(DefId, TypeId, bool)> = Vec::new();
        let mut visited: FxHashSet<DefId> = FxHashSet::default();
        visited.insert(target);

        let mut current = target;
        loop {
            if defs.len() >= MAX_BASE_CHAIN_DEPTH {
                warn!(target = target.0, "AbstractChain::build: base chain too deep");
                break;
            }
            let Some(base) = snapshot.definition(current).and_then(|def| def.base) else {
                break;
            };
            let Some(base_def) = snapshot.def_of(base) else {
                break;
            };
            let Some(base_info) = snapshot.definition(base_def) else {
                break;
            };
            if base_info.kind != DefKind::Class {
                break;
            }
            if !visited.insert(base_def) {
                warn!(
                    target = target.0,
                    def = base_def.0,
                    "AbstractChain::build: cyclic base chain"
                );
                break;
            }

            raw.push(base);
            defs.push((base_def, base, base_info.is_abstract));
            if !base_info.is_abstract {
                break;
            }
            current = base_def;
        }

        let closed = raw.compose(&snapshot.interner);
        let links: Vec<ChainLink> = defs
            .into_iter()
            .zip(closed)
            .map(|((def, declared, is_abstract), instantiation)| ChainLink {
                def,
                declared,
                instantiation,
                is_abstract,
            })
            .collect();

        debug!(target = target.0, links = links.len(), "AbstractChain::build");
        AbstractChain { target, links }
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The abstract prefix of the chain.
    pub fn abstract_links(&self) -> &[ChainLink] {
        let end = self
            .links
            .iter()
            .position(|link| !link.is_abstract)
            .unwrap_or(self.links.len());
        &self.links[..end]
    }

    pub fn topmost_abstract(&self) -> Option<&ChainLink> {
        self.abstract_links().last()
    }

    /// Substitution for members declared at link `index`.
    pub fn substitution(&self, snapshot: &SemanticSnapshot, index: usize) -> TypeSubstitution {
        match self.links.get(index) {
            Some(link) => TypeSubstitution::for_instantiation(&snapshot.interner, link.instantiation),
            None => TypeSubstitution::new(),
        }
    }

    pub fn position_of(&self, def: DefId) -> Option<usize> {
        self.links.iter().position(|link| link.def == def)
    }
}

#[cfg(test)]
#[path = "tests/class_hierarchy_tests.rs"]
mod tests;
