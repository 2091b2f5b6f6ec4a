//! Signature normalization.
//!
//! Restores what a resolved abstract declaration does not carry by itself
//! but the override must:
//!
//! - `params` on a trailing array parameter, when any declaration up the
//!   virtual chain had it (the override drops the re-declaration's default);
//! - `unsafe` when a pointer type appears in the signature;
//! - alias-free names for types bound through an extern alias;
//! - `protected` in place of `protected internal` across assemblies.

use crate::abstract_members::ResolvedMember;
use crate::def::DefId;
use crate::instantiate::contains_pointer;
use crate::intern::TypeInterner;
use crate::members::{Accessibility, ParamModifier};
use crate::snapshot::SemanticSnapshot;
use crate::types::{TupleElement, TypeData, TypeId, TypeList};
use stubsmith_common::limits::{MAX_INSTANTIATION_DEPTH, MAX_OVERRIDE_CHAIN_DEPTH};
use tracing::trace;

pub fn normalize_member(snapshot: &SemanticSnapshot, target: DefId, member: &mut ResolvedMember) {
    restore_params_modifier(snapshot, member);

    let interner = &snapshot.interner;
    for param in &mut member.params {
        param.ty = strip_alias_qualifiers(interner, param.ty);
    }
    member.ty = strip_alias_qualifiers(interner, member.ty);

    if member
        .params
        .iter()
        .map(|param| param.ty)
        .chain(std::iter::once(member.ty))
        .any(|ty| contains_pointer(interner, ty))
    {
        member.is_unsafe = true;
    }

    if crosses_assembly(snapshot, member.declaring, target) {
        member.accessibility = narrow_across_assembly(member.accessibility);
        for accessor in &mut member.accessors {
            accessor.accessibility = accessor.accessibility.map(narrow_across_assembly);
        }
    }
}

/// Walk the `overridden` links of the resolved declaration and restore
/// `params` on the trailing parameter if any ancestor declared it.
fn restore_params_modifier(snapshot: &SemanticSnapshot, member: &mut ResolvedMember) {
    let Some(last) = member.params.len().checked_sub(1) else {
        return;
    };
    if member.params[last].modifier != ParamModifier::None {
        return;
    }

    let mut current = snapshot.member(member.member).and_then(|m| m.overridden);
    let mut steps = 0;
    while let Some(id) = current {
        steps += 1;
        if steps > MAX_OVERRIDE_CHAIN_DEPTH {
            break;
        }
        let Some(ancestor) = snapshot.member(id) else {
            break;
        };
        let restores = ancestor.params.len() == member.params.len()
            && ancestor.params[last].modifier == ParamModifier::Params;
        if restores {
            trace!(member = member.member.0, ancestor = id.0, "restoring params modifier");
            let param = &mut member.params[last];
            param.modifier = ParamModifier::Params;
            param.default = None;
            return;
        }
        current = ancestor.overridden;
    }
}

fn crosses_assembly(snapshot: &SemanticSnapshot, declaring: DefId, target: DefId) -> bool {
    match (snapshot.definition(declaring), snapshot.definition(target)) {
        (Some(declaring), Some(target)) => declaring.assembly != target.assembly,
        _ => false,
    }
}

fn narrow_across_assembly(accessibility: Accessibility) -> Accessibility {
    match accessibility {
        Accessibility::ProtectedInternal => Accessibility::Protected,
        other => other,
    }
}

/// Drop the alias qualifier of every error type inside `ty`.
pub fn strip_alias_qualifiers(interner: &TypeInterner, ty: TypeId) -> TypeId {
    strip(interner, ty, 0)
}

fn strip(interner: &TypeInterner, ty: TypeId, depth: u32) -> TypeId {
    if ty.is_intrinsic() || depth > MAX_INSTANTIATION_DEPTH {
        return ty;
    }
    let Some(data) = interner.lookup(ty) else {
        return ty;
    };
    match data {
        TypeData::Error {
            name,
            qualifier: Some(_),
        } => interner.intern(TypeData::Error {
            name,
            qualifier: None,
        }),
        TypeData::Named { def, outer, args } => {
            let outer = outer.map(|outer| strip(interner, outer, depth + 1));
            let args: TypeList = args.iter().map(|&arg| strip(interner, arg, depth + 1)).collect();
            interner.named(def, outer, &args)
        }
        TypeData::Array { element, rank } => {
            interner.array_of_rank(strip(interner, element, depth + 1), rank)
        }
        TypeData::Nullable(inner) => interner.nullable(strip(interner, inner, depth + 1)),
        TypeData::Pointer(inner) => interner.pointer(strip(interner, inner, depth + 1)),
        TypeData::Tuple(elements) => interner.tuple(
            elements
                .into_iter()
                .map(|element| TupleElement {
                    ty: strip(interner, element.ty, depth + 1),
                    name: element.name,
                })
                .collect(),
        ),
        TypeData::Intrinsic(_) | TypeData::TypeParameter(_) | TypeData::Error { .. } => ty,
    }
}

#[cfg(test)]
#[path = "tests/normalize_tests.rs"]
mod tests;
