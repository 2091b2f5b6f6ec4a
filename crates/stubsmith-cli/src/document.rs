//! Snapshot documents.
//!
//! A snapshot document is the JSON form in which a host hands over its bound
//! types, the target type and the target's declaration parts:
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "Foo", "abstract": true, "members": [
//!       { "name": "Bar", "kind": "method", "modifiers": ["abstract"], "type": "void" }
//!     ] },
//!     { "name": "Program", "base": "Foo" }
//!   ],
//!   "target": "Program",
//!   "parts": [ { "openBrace": 16, "closeBrace": 18 } ],
//!   "usings": ["System"]
//! }
//! ```
//!
//! Types are referenced by key (`id`, defaulting to `name`). A type
//! reference is either a string (keyword, type parameter in scope, or the
//! key of a definition without type arguments) or an object tagged with
//! `named`, `array`, `nullable`, `pointer`, `tuple` or `error`. Members are
//! referenced from `overrides` by `id`, defaulting to `TypeKey.MemberName`.

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use stubsmith_codefix::{DeclarationPart, ImplementAbstractClassRequest, ImplementTypeOptions};
use stubsmith_solver::{
    Accessibility, AccessorKind, AccessorSet, DefId, DefKind, DefaultValue, EnumConstant,
    IntrinsicKind, MemberDef, MemberId, MemberKind, MemberModifiers, ParamInfo, ParamModifier,
    SemanticSnapshot, TupleElement, TypeDefinition, TypeId,
};
use tracing::{debug, debug_span};

// =============================================================================
// Document model
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    pub types: Vec<TypeDoc>,
    /// Key of the type the fix is invoked on.
    pub target: String,
    #[serde(default)]
    pub parts: Vec<DeclarationPart>,
    #[serde(default)]
    pub invoked_part: usize,
    #[serde(default)]
    pub usings: Vec<String>,
    #[serde(default)]
    pub options: ImplementTypeOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDoc {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub kind: TypeKindDoc,
    #[serde(default)]
    pub namespace: Option<String>,
    /// Key of the containing type; it must appear earlier in the document.
    #[serde(default)]
    pub containing: Option<String>,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub base: Option<TypeRefDoc>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "sealed")]
    pub is_sealed: bool,
    #[serde(default)]
    pub assembly: Option<String>,
    #[serde(default)]
    pub members: Vec<MemberDoc>,
    #[serde(default)]
    pub enum_constants: Vec<EnumConstantDoc>,
}

impl TypeDoc {
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKindDoc {
    #[default]
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

impl From<TypeKindDoc> for DefKind {
    fn from(kind: TypeKindDoc) -> Self {
        match kind {
            TypeKindDoc::Class => DefKind::Class,
            TypeKindDoc::Struct => DefKind::Struct,
            TypeKindDoc::Interface => DefKind::Interface,
            TypeKindDoc::Enum => DefKind::Enum,
            TypeKindDoc::Delegate => DefKind::Delegate,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EnumConstantDoc {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDoc {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    pub kind: MemberKind,
    #[serde(default = "default_accessibility")]
    pub accessibility: Accessibility,
    #[serde(default)]
    pub modifiers: Vec<ModifierDoc>,
    /// Label of the member this one overrides.
    #[serde(default)]
    pub overrides: Option<String>,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub params: Vec<ParamDoc>,
    /// Return type for methods; property, indexer or event type otherwise.
    #[serde(rename = "type", default = "void_type")]
    pub ty: TypeRefDoc,
    #[serde(default)]
    pub accessors: Vec<AccessorDoc>,
    #[serde(default)]
    pub explicit_accessors: bool,
}

fn default_accessibility() -> Accessibility {
    Accessibility::Public
}

fn void_type() -> TypeRefDoc {
    TypeRefDoc::Name("void".to_string())
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModifierDoc {
    Abstract,
    Virtual,
    Override,
    Sealed,
    Static,
    Unsafe,
    New,
}

impl From<ModifierDoc> for MemberModifiers {
    fn from(modifier: ModifierDoc) -> Self {
        match modifier {
            ModifierDoc::Abstract => MemberModifiers::ABSTRACT,
            ModifierDoc::Virtual => MemberModifiers::VIRTUAL,
            ModifierDoc::Override => MemberModifiers::OVERRIDE,
            ModifierDoc::Sealed => MemberModifiers::SEALED,
            ModifierDoc::Static => MemberModifiers::STATIC,
            ModifierDoc::Unsafe => MemberModifiers::UNSAFE,
            ModifierDoc::New => MemberModifiers::NEW,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AccessorDoc {
    pub kind: AccessorKind,
    /// Accessor-level accessibility, when narrower than the member's.
    #[serde(default)]
    pub accessibility: Option<Accessibility>,
}

#[derive(Debug, Deserialize)]
pub struct ParamDoc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRefDoc,
    #[serde(default)]
    pub modifier: ParamModifier,
    #[serde(default)]
    pub default: Option<DefaultDoc>,
}

/// Declared parameter default. Unit forms are plain strings (`"null"`,
/// `"default"`), the rest are single-key objects (`{"integer": 3}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DefaultDoc {
    Null,
    Default,
    Bool(bool),
    Char(char),
    Integer(i64),
    /// Unsigned values above `i64::MAX` (`ulong.MaxValue`).
    Unsigned(u64),
    Float(FloatDoc),
    String(String),
    Expression(String),
}

/// A float literal; JSON has no NaN or infinities, so those are strings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FloatDoc {
    Number(f64),
    Special(SpecialFloat),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SpecialFloat {
    NaN,
    Infinity,
    #[serde(rename = "-Infinity")]
    NegativeInfinity,
}

impl From<FloatDoc> for f64 {
    fn from(value: FloatDoc) -> Self {
        match value {
            FloatDoc::Number(n) => n,
            FloatDoc::Special(SpecialFloat::NaN) => f64::NAN,
            FloatDoc::Special(SpecialFloat::Infinity) => f64::INFINITY,
            FloatDoc::Special(SpecialFloat::NegativeInfinity) => f64::NEG_INFINITY,
        }
    }
}

impl From<DefaultDoc> for DefaultValue {
    fn from(value: DefaultDoc) -> Self {
        match value {
            DefaultDoc::Null => DefaultValue::Null,
            DefaultDoc::Default => DefaultValue::Default,
            DefaultDoc::Bool(b) => DefaultValue::Bool(b),
            DefaultDoc::Char(c) => DefaultValue::Char(c),
            DefaultDoc::Integer(n) => DefaultValue::Integer(i128::from(n)),
            DefaultDoc::Unsigned(n) => DefaultValue::Integer(i128::from(n)),
            DefaultDoc::Float(f) => DefaultValue::Float(f.into()),
            DefaultDoc::String(s) => DefaultValue::String(s),
            DefaultDoc::Expression(s) => DefaultValue::Expression(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TypeRefDoc {
    /// Keyword, type parameter in scope, or key of a non-generic definition.
    Name(String),
    Composite(Box<CompositeTypeDoc>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompositeTypeDoc {
    /// `outer.name<args>`; `outer` defaults to the identity of the
    /// definition's container.
    Named {
        name: String,
        #[serde(default)]
        args: Vec<TypeRefDoc>,
        #[serde(default)]
        outer: Option<TypeRefDoc>,
    },
    Array {
        element: TypeRefDoc,
        #[serde(default = "single_rank")]
        rank: u32,
    },
    Nullable(TypeRefDoc),
    Pointer(TypeRefDoc),
    Tuple(Vec<TupleElementDoc>),
    Error {
        name: String,
        #[serde(default)]
        qualifier: Option<String>,
    },
}

fn single_rank() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TupleElementDoc {
    #[serde(rename = "type")]
    pub ty: TypeRefDoc,
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// Loading
// =============================================================================

/// A snapshot built from a document, plus what the fix request needs.
pub struct LoadedSnapshot {
    pub snapshot: SemanticSnapshot,
    pub target: DefId,
    pub parts: Vec<DeclarationPart>,
    pub invoked_part: usize,
    pub usings: Vec<String>,
    pub options: ImplementTypeOptions,
}

impl LoadedSnapshot {
    pub fn request(&self) -> Result<ImplementAbstractClassRequest> {
        let mut parts = self.parts.iter().cloned();
        let Some(first) = parts.next() else {
            bail!("the snapshot document has no declaration parts for the target");
        };
        if self.invoked_part >= self.parts.len() {
            bail!(
                "invoked part {} is out of range ({} parts)",
                self.invoked_part,
                self.parts.len()
            );
        }
        let request = parts
            .fold(ImplementAbstractClassRequest::new(self.target, first), |request, part| {
                request.with_part(part)
            })
            .invoked_on(self.invoked_part);
        Ok(self
            .usings
            .iter()
            .fold(request, |request, using| request.with_using(using.as_str())))
    }
}

impl SnapshotDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid snapshot document")
    }

    pub fn load(self) -> Result<LoadedSnapshot> {
        let _span = debug_span!("load_snapshot", types = self.types.len()).entered();
        let mut loader = Loader::new();
        loader.define_types(&self.types)?;
        let member_ids = loader.allocate_members(&self.types);
        loader.set_bases(&self.types)?;
        loader.add_members(&self.types, &member_ids)?;

        let target = loader.def(&self.target)?;
        debug!(target = target.0, parts = self.parts.len(), "snapshot loaded");
        Ok(LoadedSnapshot {
            snapshot: loader.snapshot,
            target,
            parts: self.parts,
            invoked_part: self.invoked_part,
            usings: self.usings,
            options: self.options,
        })
    }
}

/// Where a type reference is resolved: inside a definition, and possibly
/// inside one of its generic methods.
#[derive(Copy, Clone)]
struct Scope<'a> {
    def: DefId,
    method: Option<(MemberId, &'a [String])>,
}

struct Loader {
    snapshot: SemanticSnapshot,
    defs: FxHashMap<String, DefId>,
    /// Member label to id; `None` when the label is ambiguous.
    members: FxHashMap<String, Option<MemberId>>,
}

impl Loader {
    fn new() -> Self {
        Loader {
            snapshot: SemanticSnapshot::new(),
            defs: FxHashMap::default(),
            members: FxHashMap::default(),
        }
    }

    fn def(&self, key: &str) -> Result<DefId> {
        self.defs
            .get(key)
            .copied()
            .with_context(|| format!("unknown type `{key}`"))
    }

    fn define_types(&mut self, types: &[TypeDoc]) -> Result<()> {
        for doc in types {
            let s = &self.snapshot;
            let mut def = TypeDefinition::new(doc.kind.into(), s.atom(&doc.name))
                .with_type_params(doc.type_params.iter().map(|p| s.atom(p)).collect())
                .with_abstract(doc.is_abstract)
                .with_sealed(doc.is_sealed)
                .with_enum_constants(
                    doc.enum_constants
                        .iter()
                        .map(|c| EnumConstant {
                            name: s.atom(&c.name),
                            value: i128::from(c.value),
                        })
                        .collect(),
                );
            if let Some(namespace) = &doc.namespace {
                def = def.with_namespace(s.atom(namespace));
            }
            if let Some(assembly) = &doc.assembly {
                def = def.with_assembly(s.atom(assembly));
            }
            if let Some(containing) = &doc.containing {
                let outer = self.defs.get(containing.as_str()).copied().with_context(|| {
                    format!(
                        "type `{}` is nested in `{containing}`, which must be declared before it",
                        doc.key()
                    )
                })?;
                def = def.with_containing(outer);
                if doc.namespace.is_none() {
                    if let Some(outer_def) = s.definition(outer) {
                        def = def.with_namespace(outer_def.namespace);
                    }
                }
            }

            let id = s.define(def);
            if self.defs.insert(doc.key().to_string(), id).is_some() {
                bail!("duplicate type key `{}`", doc.key());
            }
        }
        Ok(())
    }

    fn allocate_members(&mut self, types: &[TypeDoc]) -> Vec<Vec<MemberId>> {
        let mut ids = Vec::with_capacity(types.len());
        for doc in types {
            let mut type_ids = Vec::with_capacity(doc.members.len());
            for member in &doc.members {
                let id = self.snapshot.alloc_member_id();
                let label = member
                    .id
                    .clone()
                    .unwrap_or_else(|| format!("{}.{}", doc.key(), member.name));
                self.members
                    .entry(label)
                    .and_modify(|existing| *existing = None)
                    .or_insert(Some(id));
                type_ids.push(id);
            }
            ids.push(type_ids);
        }
        ids
    }

    fn set_bases(&self, types: &[TypeDoc]) -> Result<()> {
        for doc in types {
            let Some(base) = &doc.base else {
                continue;
            };
            let def = self.def(doc.key())?;
            let scope = Scope { def, method: None };
            let base = self
                .resolve_type(base, scope)
                .with_context(|| format!("in the base type of `{}`", doc.key()))?;
            self.snapshot.set_base(def, base);
        }
        Ok(())
    }

    fn add_members(&self, types: &[TypeDoc], ids: &[Vec<MemberId>]) -> Result<()> {
        for (doc, type_ids) in types.iter().zip(ids) {
            let def = self.def(doc.key())?;
            for (member, &id) in doc.members.iter().zip(type_ids) {
                let built = self
                    .member(def, id, member)
                    .with_context(|| format!("in member `{}.{}`", doc.key(), member.name))?;
                self.snapshot.add_member(built);
            }
        }
        Ok(())
    }

    fn member(&self, def: DefId, id: MemberId, doc: &MemberDoc) -> Result<MemberDef> {
        let s = &self.snapshot;
        let scope = Scope {
            def,
            method: Some((id, &doc.type_params)),
        };
        let name = s.atom(&doc.name);
        let ty = self.resolve_type(&doc.ty, scope)?;

        let mut member = match doc.kind {
            MemberKind::Method => MemberDef::method(id, def, name, ty),
            MemberKind::Property => MemberDef::property(id, def, name, ty, accessor_set(doc)?),
            MemberKind::Indexer => MemberDef::indexer(id, def, name, ty, accessor_set(doc)?),
            MemberKind::Event if doc.explicit_accessors => {
                MemberDef::event(id, def, name, ty).with_explicit_accessors()
            }
            MemberKind::Event => MemberDef::event(id, def, name, ty),
        };

        let modifiers = doc
            .modifiers
            .iter()
            .fold(MemberModifiers::empty(), |set, &m| set | MemberModifiers::from(m));
        member = member
            .with_accessibility(doc.accessibility)
            .with_modifiers(modifiers)
            .with_type_params(doc.type_params.iter().map(|p| s.atom(p)).collect());

        for accessor in &doc.accessors {
            if let Some(accessibility) = accessor.accessibility {
                member = member.with_accessor_accessibility(accessor.kind, accessibility);
            }
        }

        for param in &doc.params {
            let mut info = ParamInfo::new(s.atom(&param.name), self.resolve_type(&param.ty, scope)?)
                .with_modifier(param.modifier);
            if let Some(default) = &param.default {
                info = info.with_default(default.clone().into());
            }
            member = member.with_param(info);
        }

        if let Some(label) = &doc.overrides {
            let overridden = match self.members.get(label.as_str()) {
                Some(Some(overridden)) => *overridden,
                Some(None) => bail!("member label `{label}` is ambiguous; give the overloads an `id`"),
                None => bail!("unknown overridden member `{label}`"),
            };
            member = member.override_of(overridden);
        }
        Ok(member)
    }

    fn resolve_type(&self, ty: &TypeRefDoc, scope: Scope<'_>) -> Result<TypeId> {
        let s = &self.snapshot;
        match ty {
            TypeRefDoc::Name(name) => self.resolve_name(name, scope),
            TypeRefDoc::Composite(composite) => match composite.as_ref() {
                CompositeTypeDoc::Named { name, args, outer } => {
                    let def = self.def(name)?;
                    let args = args
                        .iter()
                        .map(|arg| self.resolve_type(arg, scope))
                        .collect::<Result<Vec<_>>>()?;
                    let outer = outer
                        .as_ref()
                        .map(|outer| self.resolve_type(outer, scope))
                        .transpose()?;
                    self.named(def, outer, &args)
                }
                CompositeTypeDoc::Array { element, rank } => {
                    let element = self.resolve_type(element, scope)?;
                    Ok(s.interner.array_of_rank(element, (*rank).max(1)))
                }
                CompositeTypeDoc::Nullable(inner) => {
                    Ok(s.interner.nullable(self.resolve_type(inner, scope)?))
                }
                CompositeTypeDoc::Pointer(inner) => {
                    Ok(s.interner.pointer(self.resolve_type(inner, scope)?))
                }
                CompositeTypeDoc::Tuple(elements) => {
                    let elements = elements
                        .iter()
                        .map(|element| {
                            Ok(TupleElement {
                                ty: self.resolve_type(&element.ty, scope)?,
                                name: element.name.as_deref().map(|n| s.atom(n)),
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Ok(s.interner.tuple(elements))
                }
                CompositeTypeDoc::Error { name, qualifier } => {
                    Ok(s.interner.error_type(name, qualifier.as_deref()))
                }
            },
        }
    }

    /// Keyword, then method type parameter, then type parameters of the
    /// scope's definition and its containers (innermost first), then a
    /// definition key.
    fn resolve_name(&self, name: &str, scope: Scope<'_>) -> Result<TypeId> {
        let s = &self.snapshot;
        if let Some(kind) = IntrinsicKind::from_keyword(name) {
            return Ok(kind.type_id());
        }
        if let Some((member, type_params)) = scope.method {
            if let Some(index) = type_params.iter().position(|p| p == name) {
                return Ok(s.method_type_param(member, index as u32, s.atom(name)));
            }
        }
        for def in s.store.self_and_containers(scope.def) {
            let params = s.store.type_params_of(def);
            if let Some(index) = params.iter().position(|&p| *s.name(p) == *name) {
                return Ok(s.type_param(def, index as u32));
            }
        }
        match self.defs.get(name) {
            Some(&def) => self.named(def, None, &[]),
            None => bail!("unknown type `{name}`"),
        }
    }

    fn named(&self, def: DefId, outer: Option<TypeId>, args: &[TypeId]) -> Result<TypeId> {
        let s = &self.snapshot;
        let Some(definition) = s.definition(def) else {
            bail!("unknown definition {}", def.0);
        };
        if definition.type_params.len() != args.len() {
            bail!(
                "`{}` takes {} type argument(s), {} given",
                s.name(definition.name),
                definition.type_params.len(),
                args.len()
            );
        }
        let outer = outer.or_else(|| definition.containing.map(|c| s.identity_type(c)));
        Ok(match outer {
            Some(outer) => s.instantiate_nested(outer, def, args),
            None => s.instantiate_def(def, args),
        })
    }
}

fn accessor_set(doc: &MemberDoc) -> Result<AccessorSet> {
    let set = doc
        .accessors
        .iter()
        .fold(AccessorSet::empty(), |set, a| set | a.kind.as_set());
    if !set.intersects(AccessorSet::GET | AccessorSet::SET) {
        bail!("a property or indexer needs a `get` or `set` accessor");
    }
    Ok(set)
}

#[cfg(test)]
#[path = "tests/document_tests.rs"]
mod tests;
