//! Member signatures.
//!
//! A `MemberDef` is a syntax-independent description of one method,
//! property, indexer or event: its kind, parameters, accessors,
//! accessibility and generic shape. Parameter and return types are
//! `TypeId`s expressed in terms of the declaring definition's own type
//! parameters (and its containers'), plus the member's own method type
//! parameters.

use crate::def::DefId;
use crate::types::TypeId;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use stubsmith_common::Atom;

/// Identifier of a member within one snapshot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MemberId(pub u32);

impl MemberId {
    /// Sentinel value; also the owner of canonical method type parameters
    /// inside signature keys.
    pub const INVALID: Self = Self(0);

    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberKind {
    Method,
    Property,
    Indexer,
    Event,
}

/// Declared accessibility, most visible first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Accessibility {
    Public,
    ProtectedInternal,
    Internal,
    Protected,
    PrivateProtected,
    Private,
}

impl Accessibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::ProtectedInternal => "protected internal",
            Accessibility::Internal => "internal",
            Accessibility::Protected => "protected",
            Accessibility::PrivateProtected => "private protected",
            Accessibility::Private => "private",
        }
    }
}

bitflags! {
    /// Declaration modifiers of a member.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MemberModifiers: u8 {
        const ABSTRACT = 1 << 0;
        const VIRTUAL = 1 << 1;
        const OVERRIDE = 1 << 2;
        const SEALED = 1 << 3;
        const STATIC = 1 << 4;
        const UNSAFE = 1 << 5;
        const NEW = 1 << 6;
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamModifier {
    #[default]
    None,
    Ref,
    Out,
    In,
    /// Variadic trailing array (`params T[]`).
    Params,
}

impl ParamModifier {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            ParamModifier::None => None,
            ParamModifier::Ref => Some("ref"),
            ParamModifier::Out => Some("out"),
            ParamModifier::In => Some("in"),
            ParamModifier::Params => Some("params"),
        }
    }

    /// The part of the modifier that distinguishes overloads. `params` does
    /// not: `M(int[] a)` and `M(params int[] a)` are the same signature.
    pub fn signature_part(self) -> ParamModifier {
        match self {
            ParamModifier::Params => ParamModifier::None,
            other => other,
        }
    }
}

/// Declared default of an optional parameter, as the host bound it.
#[derive(Clone, Debug, PartialEq)]
pub enum DefaultValue {
    /// `= null`
    Null,
    /// `= default`, `= default(T)` or `= new S()`
    Default,
    Bool(bool),
    Char(char),
    Integer(i128),
    Float(f64),
    String(String),
    /// Source text the host could not bind to a constant. Rendered as-is.
    Expression(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamInfo {
    pub name: Atom,
    pub ty: TypeId,
    pub modifier: ParamModifier,
    /// `Some` iff the parameter is optional.
    pub default: Option<DefaultValue>,
}

impl ParamInfo {
    pub fn new(name: Atom, ty: TypeId) -> Self {
        ParamInfo {
            name,
            ty,
            modifier: ParamModifier::None,
            default: None,
        }
    }

    pub fn with_modifier(mut self, modifier: ParamModifier) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessorKind {
    Get,
    Set,
    Add,
    Remove,
}

impl AccessorKind {
    pub fn keyword(self) -> &'static str {
        match self {
            AccessorKind::Get => "get",
            AccessorKind::Set => "set",
            AccessorKind::Add => "add",
            AccessorKind::Remove => "remove",
        }
    }

    pub fn as_set(self) -> AccessorSet {
        match self {
            AccessorKind::Get => AccessorSet::GET,
            AccessorKind::Set => AccessorSet::SET,
            AccessorKind::Add => AccessorSet::ADD,
            AccessorKind::Remove => AccessorSet::REMOVE,
        }
    }
}

bitflags! {
    /// Implementable parts of a member. A method has a single `BODY` part;
    /// properties and indexers have `GET`/`SET`; events `ADD`/`REMOVE`.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AccessorSet: u8 {
        const GET = 1 << 0;
        const SET = 1 << 1;
        const ADD = 1 << 2;
        const REMOVE = 1 << 3;
        const BODY = 1 << 4;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AccessorInfo {
    pub kind: AccessorKind,
    /// Accessor-level accessibility when narrower than the member's.
    pub accessibility: Option<Accessibility>,
    pub is_abstract: bool,
}

impl AccessorInfo {
    pub fn new(kind: AccessorKind) -> Self {
        AccessorInfo {
            kind,
            accessibility: None,
            is_abstract: false,
        }
    }
}

/// One member signature of a type definition.
#[derive(Clone, Debug)]
pub struct MemberDef {
    pub id: MemberId,
    pub name: Atom,
    pub kind: MemberKind,
    pub declaring: DefId,
    pub accessibility: Accessibility,
    pub modifiers: MemberModifiers,
    /// The member this one overrides, as bound by the host.
    pub overridden: Option<MemberId>,
    /// Method type parameter names.
    pub type_params: Vec<Atom>,
    pub params: Vec<ParamInfo>,
    /// Return type for methods; property, indexer or event type otherwise.
    pub ty: TypeId,
    pub accessors: Vec<AccessorInfo>,
    /// Events only: declared without explicit add/remove accessors.
    pub field_like: bool,
}

impl MemberDef {
    fn new(id: MemberId, declaring: DefId, name: Atom, kind: MemberKind, ty: TypeId) -> Self {
        MemberDef {
            id,
            name,
            kind,
            declaring,
            accessibility: Accessibility::Public,
            modifiers: MemberModifiers::empty(),
            overridden: None,
            type_params: Vec::new(),
            params: Vec::new(),
            ty,
            accessors: Vec::new(),
            field_like: false,
        }
    }

    pub fn method(id: MemberId, declaring: DefId, name: Atom, return_type: TypeId) -> Self {
        Self::new(id, declaring, name, MemberKind::Method, return_type)
    }

    /// A property with the accessors in `accessors` (`GET` and/or `SET`).
    pub fn property(
        id: MemberId,
        declaring: DefId,
        name: Atom,
        ty: TypeId,
        accessors: AccessorSet,
    ) -> Self {
        Self::new(id, declaring, name, MemberKind::Property, ty).with_accessor_set(accessors)
    }

    /// An indexer; by convention its name is `this`.
    pub fn indexer(
        id: MemberId,
        declaring: DefId,
        name: Atom,
        ty: TypeId,
        accessors: AccessorSet,
    ) -> Self {
        Self::new(id, declaring, name, MemberKind::Indexer, ty).with_accessor_set(accessors)
    }

    /// A field-like event (`event Action E;`).
    pub fn event(id: MemberId, declaring: DefId, name: Atom, ty: TypeId) -> Self {
        let mut member = Self::new(id, declaring, name, MemberKind::Event, ty)
            .with_accessor_set(AccessorSet::ADD | AccessorSet::REMOVE);
        member.field_like = true;
        member
    }

    fn with_accessor_set(mut self, accessors: AccessorSet) -> Self {
        for kind in [
            AccessorKind::Get,
            AccessorKind::Set,
            AccessorKind::Add,
            AccessorKind::Remove,
        ] {
            if accessors.contains(kind.as_set()) {
                self.accessors.push(AccessorInfo::new(kind));
            }
        }
        self
    }

    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn with_modifiers(mut self, modifiers: MemberModifiers) -> Self {
        self.modifiers |= modifiers;
        if modifiers.contains(MemberModifiers::ABSTRACT) {
            for accessor in &mut self.accessors {
                accessor.is_abstract = true;
            }
        }
        self
    }

    /// Mark the member and all its accessors abstract.
    pub fn abstract_(self) -> Self {
        self.with_modifiers(MemberModifiers::ABSTRACT)
    }

    pub fn virtual_(self) -> Self {
        self.with_modifiers(MemberModifiers::VIRTUAL)
    }

    pub fn static_(self) -> Self {
        self.with_modifiers(MemberModifiers::STATIC)
    }

    pub fn override_of(mut self, overridden: MemberId) -> Self {
        self.modifiers |= MemberModifiers::OVERRIDE;
        self.overridden = Some(overridden);
        self
    }

    pub fn with_type_params(mut self, type_params: Vec<Atom>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn with_params(mut self, params: Vec<ParamInfo>) -> Self {
        self.params = params;
        self
    }

    pub fn with_param(mut self, param: ParamInfo) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_accessor_accessibility(
        mut self,
        kind: AccessorKind,
        accessibility: Accessibility,
    ) -> Self {
        if let Some(accessor) = self.accessors.iter_mut().find(|a| a.kind == kind) {
            accessor.accessibility = Some(accessibility);
        }
        self
    }

    /// Events declared with explicit `add`/`remove` accessors.
    pub fn with_explicit_accessors(mut self) -> Self {
        self.field_like = false;
        self
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(MemberModifiers::ABSTRACT)
    }

    #[inline]
    pub fn is_override(&self) -> bool {
        self.modifiers.contains(MemberModifiers::OVERRIDE)
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(MemberModifiers::STATIC)
    }

    /// All implementable parts of this member.
    pub fn parts(&self) -> AccessorSet {
        match self.kind {
            MemberKind::Method => AccessorSet::BODY,
            _ => self
                .accessors
                .iter()
                .fold(AccessorSet::empty(), |set, a| set | a.kind.as_set()),
        }
    }

    /// Parts this declaration leaves without an implementation.
    pub fn abstract_parts(&self) -> AccessorSet {
        match self.kind {
            MemberKind::Method if self.is_abstract() => AccessorSet::BODY,
            MemberKind::Method => AccessorSet::empty(),
            _ => self
                .accessors
                .iter()
                .filter(|a| a.is_abstract || self.is_abstract())
                .fold(AccessorSet::empty(), |set, a| set | a.kind.as_set()),
        }
    }

    /// Parts this declaration supplies a body for.
    pub fn implemented_parts(&self) -> AccessorSet {
        self.parts() - self.abstract_parts()
    }

    pub fn accessor(&self, kind: AccessorKind) -> Option<&AccessorInfo> {
        self.accessors.iter().find(|a| a.kind == kind)
    }
}

/// Overload identity of a member after substitution.
///
/// Two members with equal keys can only coexist in one type if one
/// overrides the other, so the resolver uses keys to collapse
/// re-declarations and to match target members the host did not link.
/// Method type parameters are canonicalized by position, return types do
/// not take part.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SignatureKey {
    pub kind: MemberKind,
    pub name: Atom,
    pub arity: u32,
    pub params: SmallVec<[(TypeId, ParamModifier); 4]>,
}

impl SignatureKey {
    pub fn new(kind: MemberKind, name: Atom, arity: u32, params: &[(TypeId, ParamModifier)]) -> Self {
        SignatureKey {
            kind,
            name,
            arity,
            params: params
                .iter()
                .map(|&(ty, modifier)| (ty, modifier.signature_part()))
                .collect(),
        }
    }
}

#[cfg(test)]
#[path = "tests/members_tests.rs"]
mod tests;
