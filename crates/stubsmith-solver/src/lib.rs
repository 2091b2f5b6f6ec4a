//! Semantic snapshot and abstract member resolution.
//!
//! This crate models a host's type graph independently of surface syntax
//! and answers one question about it: which abstract members does a type
//! still have to implement, and what do their signatures look like from
//! inside that type.
//!
//! - **Interned types**: `TypeId` handles over structural `TypeData`, so
//!   substituted signatures compare by id
//! - **Definitions**: `DefinitionStore` of types and member signatures
//! - **Substitution**: per-link mappings composed right-to-left through the
//!   base chain
//! - **Resolution**: an explicit satisfaction table keyed by member and
//!   accessor, followed by normalization of the surviving signatures
pub mod abstract_members;
pub mod class_hierarchy;
pub mod def;
pub mod instantiate;
mod intern;
pub mod members;
pub mod normalize;
pub mod snapshot;
pub mod types;

pub use abstract_members::{
    NotApplicable, ResolvedMember, resolve_unimplemented_members, signature_key,
};
pub use class_hierarchy::{AbstractChain, BaseRelationship, ChainLink, base_relationship};
pub use def::{DefId, DefKind, DefinitionStore, EnumConstant, TypeDefinition};
pub use instantiate::{SubstitutionChain, TypeSubstitution, instantiate_type};
pub use intern::TypeInterner;
pub use members::{
    Accessibility, AccessorInfo, AccessorKind, AccessorSet, DefaultValue, MemberDef, MemberId,
    MemberKind, MemberModifiers, ParamInfo, ParamModifier, SignatureKey,
};
pub use snapshot::SemanticSnapshot;
pub use types::{
    IntrinsicKind, TupleElement, TypeData, TypeId, TypeList, TypeParamId, TypeParamInfo,
    TypeParamOwner,
};
