//! Unimplemented abstract member resolution.
//!
//! Given a target type, walk its abstract base chain and compute the members
//! (and, for properties, indexers and events, the individual accessors) that
//! still lack an implementation at the target.
//!
//! ## Satisfaction table
//!
//! Levels are processed most-derived first: level 0 is the target itself,
//! level `k` is the `k`th abstract base. For each member the table records
//! which of its parts (`AccessorSet`) a more derived declaration already
//! handles. An override hands everything it declares, plus everything
//! handled for itself, to the member it overrides:
//!
//! ```text
//! class A { abstract int X { get; set; } }      handled[A.X] = GET
//! class B : A { override int X { get => 1; } }  handled[B.X] = {}
//! class C : B { }                               -> X needs SET only
//! ```
//!
//! An abstract re-declaration (`abstract override`) hands its parts upward
//! too, so the ancestor collapses into the re-declaration's work item. The
//! same table is kept by substituted signature key for overrides the host
//! did not link.

use crate::class_hierarchy::{AbstractChain, BaseRelationship, base_relationship};
use crate::def::DefId;
use crate::instantiate::{TypeSubstitution, assert_closed, instantiate_type};
use crate::members::{
    Accessibility, AccessorInfo, AccessorSet, MemberDef, MemberId, MemberKind, MemberModifiers,
    ParamInfo, SignatureKey,
};
use crate::normalize::normalize_member;
use crate::snapshot::SemanticSnapshot;
use crate::types::{TypeId, TypeParamId, TypeParamInfo, TypeParamOwner};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;
use stubsmith_common::Atom;
use tracing::{debug, debug_span, trace};

/// Why the fix does not apply.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
pub enum NotApplicable {
    #[error("the target has no unimplemented abstract members")]
    NoUnimplementedMembers,
    #[error("a value type cannot derive from an abstract class")]
    IllegalBaseRelationship,
    #[error("every declaration part of the target is hidden")]
    NoVisibleInsertionPoint,
}

/// An abstract member expressed at the target type.
///
/// Parameter and return types are substituted through the base chain, and
/// `accessors` lists only the accessors that still need a body.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMember {
    /// Most specific abstract declaration.
    pub member: MemberId,
    pub declaring: DefId,
    pub name: Atom,
    pub kind: MemberKind,
    pub accessibility: Accessibility,
    pub is_unsafe: bool,
    /// Method type parameter names; their types are owned by `member`.
    pub type_params: Vec<Atom>,
    pub params: Vec<ParamInfo>,
    pub ty: TypeId,
    /// Outstanding accessors, `get` before `set`, `add` before `remove`.
    pub accessors: Vec<AccessorInfo>,
    /// Every accessor the member declares, outstanding or not.
    pub declared_accessors: AccessorSet,
    pub field_like: bool,
}

impl ResolvedMember {
    /// Outstanding parts as a set.
    pub fn outstanding(&self) -> AccessorSet {
        match self.kind {
            MemberKind::Method => AccessorSet::BODY,
            _ => self
                .accessors
                .iter()
                .fold(AccessorSet::empty(), |set, a| set | a.kind.as_set()),
        }
    }

    /// The override declaration this work item turns into once synthesized,
    /// declared on `target` under `id`.
    pub fn as_override(&self, snapshot: &SemanticSnapshot, target: DefId, id: MemberId) -> MemberDef {
        let mut subst = TypeSubstitution::new();
        for (index, &name) in self.type_params.iter().enumerate() {
            let index = index as u32;
            subst.insert(
                TypeParamId {
                    owner: TypeParamOwner::Method(self.member),
                    index,
                },
                snapshot.method_type_param(id, index, name),
            );
        }
        let rebind = |ty| instantiate_type(&snapshot.interner, ty, &subst);

        let mut modifiers = MemberModifiers::OVERRIDE;
        if self.is_unsafe {
            modifiers |= MemberModifiers::UNSAFE;
        }

        MemberDef {
            id,
            name: self.name,
            kind: self.kind,
            declaring: target,
            accessibility: self.accessibility,
            modifiers,
            overridden: Some(self.member),
            type_params: self.type_params.clone(),
            params: self
                .params
                .iter()
                .map(|param| ParamInfo {
                    ty: rebind(param.ty),
                    ..param.clone()
                })
                .collect(),
            ty: rebind(self.ty),
            accessors: self
                .accessors
                .iter()
                .map(|accessor| AccessorInfo {
                    is_abstract: false,
                    ..*accessor
                })
                .collect(),
            field_like: self.field_like,
        }
    }
}

/// A work item under construction.
struct Candidate {
    member: Arc<MemberDef>,
    level: usize,
    outstanding: AccessorSet,
    /// Accessor declarations gathered from every contributing member.
    accessors: Vec<AccessorInfo>,
    /// `(level, declaration index)` of the topmost contribution.
    order: (usize, usize),
}

/// Signature key of `member` after substitution, with the member's own
/// method type parameters replaced by positional placeholders.
pub fn signature_key(
    snapshot: &SemanticSnapshot,
    member: &MemberDef,
    subst: &TypeSubstitution,
) -> SignatureKey {
    let mut subst = subst.clone();
    for index in 0..member.type_params.len() as u32 {
        subst.insert(
            TypeParamId {
                owner: TypeParamOwner::Method(member.id),
                index,
            },
            snapshot.interner.type_param(TypeParamInfo {
                id: TypeParamId {
                    owner: TypeParamOwner::Method(MemberId::INVALID),
                    index,
                },
                name: Atom::NONE,
            }),
        );
    }
    let params: Vec<_> = member
        .params
        .iter()
        .map(|param| {
            (
                instantiate_type(&snapshot.interner, param.ty, &subst),
                param.modifier,
            )
        })
        .collect();
    SignatureKey::new(
        member.kind,
        member.name,
        member.type_params.len() as u32,
        &params,
    )
}

/// Compute the members `target` must still implement, ancestor-first and
/// in declaration order within an ancestor.
///
/// Returns an empty list when the target has no abstract base, and
/// `IllegalBaseRelationship` for a value type deriving from a class.
pub fn resolve_unimplemented_members(
    snapshot: &SemanticSnapshot,
    target: DefId,
) -> Result<Vec<ResolvedMember>, NotApplicable> {
    let _span = debug_span!("resolve_unimplemented_members", target = target.0).entered();

    match base_relationship(snapshot, target) {
        BaseRelationship::Illegal => return Err(NotApplicable::IllegalBaseRelationship),
        BaseRelationship::NothingToImplement => return Ok(Vec::new()),
        BaseRelationship::AbstractBase(_) => {}
    }

    let chain = AbstractChain::build(snapshot, target);
    let abstract_links = chain.abstract_links();

    let mut handled: FxHashMap<MemberId, AccessorSet> = FxHashMap::default();
    let mut handled_by_key: FxHashMap<SignatureKey, AccessorSet> = FxHashMap::default();
    let mut candidates: IndexMap<SignatureKey, Candidate> = IndexMap::new();

    // Level 0 is the target; level k + 1 is abstract link k.
    let levels = std::iter::once((target, TypeSubstitution::new())).chain(
        abstract_links
            .iter()
            .enumerate()
            .map(|(index, link)| (link.def, chain.substitution(snapshot, index))),
    );

    for (level, (def, subst)) in levels.enumerate() {
        for (index, member) in snapshot.store.members_of(def).into_iter().enumerate() {
            if member.is_static() {
                continue;
            }

            let key = signature_key(snapshot, &member, &subst);
            let done = handled.get(&member.id).copied().unwrap_or_default()
                | handled_by_key.get(&key).copied().unwrap_or_default();

            if level > 0 {
                let outstanding = member.abstract_parts() - done;
                if !outstanding.is_empty() {
                    trace!(
                        member = member.id.0,
                        level,
                        outstanding = ?outstanding,
                        "candidate"
                    );
                    add_candidate(&mut candidates, key.clone(), &member, level, index, outstanding);
                }
            }

            if member.is_override() {
                let passed_up = member.parts() | done;
                *handled_by_key.entry(key).or_default() |= passed_up;
                if let Some(overridden) = member.overridden {
                    *handled.entry(overridden).or_default() |= passed_up;
                }
            }
        }
    }

    let mut work: Vec<Candidate> = candidates.into_values().collect();
    work.sort_by(|a, b| b.order.0.cmp(&a.order.0).then(a.order.1.cmp(&b.order.1)));

    let resolved: Vec<ResolvedMember> = work
        .into_iter()
        .map(|candidate| {
            let subst = chain.substitution(snapshot, candidate.level - 1);
            let mut resolved = substitute_candidate(snapshot, &candidate, &subst);
            for ty in resolved
                .params
                .iter()
                .map(|param| param.ty)
                .chain(std::iter::once(resolved.ty))
            {
                assert_closed(&snapshot.interner, &snapshot.store, target, ty);
            }
            normalize_member(snapshot, target, &mut resolved);
            resolved
        })
        .collect();

    debug!(target = target.0, members = resolved.len(), "resolved work list");
    Ok(resolved)
}

fn add_candidate(
    candidates: &mut IndexMap<SignatureKey, Candidate>,
    key: SignatureKey,
    member: &Arc<MemberDef>,
    level: usize,
    index: usize,
    outstanding: AccessorSet,
) {
    let contributed: Vec<AccessorInfo> = member
        .accessors
        .iter()
        .filter(|a| outstanding.contains(a.kind.as_set()))
        .copied()
        .collect();

    match candidates.get_mut(&key) {
        Some(existing) => {
            existing.outstanding |= outstanding;
            for accessor in contributed {
                if !existing.accessors.iter().any(|a| a.kind == accessor.kind) {
                    existing.accessors.push(accessor);
                }
            }
            existing.order = (level, index);
        }
        None => {
            candidates.insert(
                key,
                Candidate {
                    member: Arc::clone(member),
                    level,
                    outstanding,
                    accessors: contributed,
                    order: (level, index),
                },
            );
        }
    }
}

fn substitute_candidate(
    snapshot: &SemanticSnapshot,
    candidate: &Candidate,
    subst: &TypeSubstitution,
) -> ResolvedMember {
    let member = &candidate.member;
    let interner = &snapshot.interner;

    let mut accessors = candidate.accessors.clone();
    accessors.sort_by_key(|a| a.kind as u8);

    ResolvedMember {
        member: member.id,
        declaring: member.declaring,
        name: member.name,
        kind: member.kind,
        accessibility: member.accessibility,
        is_unsafe: member.modifiers.contains(MemberModifiers::UNSAFE),
        type_params: member.type_params.clone(),
        params: member
            .params
            .iter()
            .map(|param| ParamInfo {
                ty: instantiate_type(interner, param.ty, subst),
                ..param.clone()
            })
            .collect(),
        ty: instantiate_type(interner, member.ty, subst),
        accessors: if member.kind == MemberKind::Method {
            Vec::new()
        } else {
            accessors
        },
        declared_accessors: member.parts(),
        field_like: member.field_like,
    }
}

#[cfg(test)]
#[path = "tests/signature_key_tests.rs"]
mod tests;
