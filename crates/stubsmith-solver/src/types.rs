//! Type representation for the semantic snapshot.
//!
//! Every type that appears in a member signature is interned into a
//! `TypeInterner` and referred to by a `TypeId`. Structural equality of two
//! types is therefore `TypeId` equality, which is what the resolver uses to
//! compare substituted signatures.

use crate::def::DefId;
use crate::members::MemberId;
use serde::Serialize;
use smallvec::SmallVec;
use stubsmith_common::Atom;

/// Inline capacity for generic argument lists. Almost every instantiation
/// in practice has one or two arguments.
pub type TypeList = SmallVec<[TypeId; 4]>;

/// Handle to an interned type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const VOID: TypeId = TypeId(0);
    pub const OBJECT: TypeId = TypeId(1);
    pub const STRING: TypeId = TypeId(2);
    pub const BOOL: TypeId = TypeId(3);
    pub const CHAR: TypeId = TypeId(4);
    pub const SBYTE: TypeId = TypeId(5);
    pub const BYTE: TypeId = TypeId(6);
    pub const SHORT: TypeId = TypeId(7);
    pub const USHORT: TypeId = TypeId(8);
    pub const INT: TypeId = TypeId(9);
    pub const UINT: TypeId = TypeId(10);
    pub const LONG: TypeId = TypeId(11);
    pub const ULONG: TypeId = TypeId(12);
    pub const FLOAT: TypeId = TypeId(13);
    pub const DOUBLE: TypeId = TypeId(14);
    pub const DECIMAL: TypeId = TypeId(15);

    /// First id handed out for non-intrinsic types.
    pub const FIRST_USER: u32 = 16;

    #[inline]
    pub fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }
}

/// Built-in keyword types.
///
/// The discriminant order matches the pre-interned `TypeId` constants, so
/// `IntrinsicKind::Int.type_id() == TypeId::INT`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IntrinsicKind {
    Void,
    Object,
    String,
    Bool,
    Char,
    SByte,
    Byte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
}

impl IntrinsicKind {
    pub const ALL: [IntrinsicKind; 16] = [
        IntrinsicKind::Void,
        IntrinsicKind::Object,
        IntrinsicKind::String,
        IntrinsicKind::Bool,
        IntrinsicKind::Char,
        IntrinsicKind::SByte,
        IntrinsicKind::Byte,
        IntrinsicKind::Short,
        IntrinsicKind::UShort,
        IntrinsicKind::Int,
        IntrinsicKind::UInt,
        IntrinsicKind::Long,
        IntrinsicKind::ULong,
        IntrinsicKind::Float,
        IntrinsicKind::Double,
        IntrinsicKind::Decimal,
    ];

    #[inline]
    pub fn type_id(self) -> TypeId {
        TypeId(self as u32)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            IntrinsicKind::Void => "void",
            IntrinsicKind::Object => "object",
            IntrinsicKind::String => "string",
            IntrinsicKind::Bool => "bool",
            IntrinsicKind::Char => "char",
            IntrinsicKind::SByte => "sbyte",
            IntrinsicKind::Byte => "byte",
            IntrinsicKind::Short => "short",
            IntrinsicKind::UShort => "ushort",
            IntrinsicKind::Int => "int",
            IntrinsicKind::UInt => "uint",
            IntrinsicKind::Long => "long",
            IntrinsicKind::ULong => "ulong",
            IntrinsicKind::Float => "float",
            IntrinsicKind::Double => "double",
            IntrinsicKind::Decimal => "decimal",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == keyword)
    }

    /// `object` and `string` are reference types; `void` is neither but is
    /// never asked about.
    pub fn is_value_type(self) -> bool {
        !matches!(
            self,
            IntrinsicKind::Void | IntrinsicKind::Object | IntrinsicKind::String
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(
            self,
            IntrinsicKind::Float | IntrinsicKind::Double | IntrinsicKind::Decimal
        )
    }

    /// Inclusive value range of an integral type.
    pub fn integral_range(self) -> Option<(i128, i128)> {
        Some(match self {
            IntrinsicKind::SByte => (i8::MIN as i128, i8::MAX as i128),
            IntrinsicKind::Byte => (0, u8::MAX as i128),
            IntrinsicKind::Short => (i16::MIN as i128, i16::MAX as i128),
            IntrinsicKind::UShort => (0, u16::MAX as i128),
            IntrinsicKind::Int => (i32::MIN as i128, i32::MAX as i128),
            IntrinsicKind::UInt => (0, u32::MAX as i128),
            IntrinsicKind::Long => (i64::MIN as i128, i64::MAX as i128),
            IntrinsicKind::ULong => (0, u64::MAX as i128),
            _ => return None,
        })
    }
}

/// Who declares a type parameter.
///
/// Identity matters more than the name: a nested type may declare a type
/// parameter with the same name as its container's, and a generic method
/// may shadow its declaring type's parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeParamOwner {
    Def(DefId),
    Method(MemberId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeParamId {
    pub owner: TypeParamOwner,
    pub index: u32,
}

/// A type parameter as it appears in a signature.
/// The name is carried for display only.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TypeParamInfo {
    pub id: TypeParamId,
    pub name: Atom,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TupleElement {
    pub ty: TypeId,
    pub name: Option<Atom>,
}

/// Structural description of an interned type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// A keyword type (`int`, `string`, ...).
    Intrinsic(IntrinsicKind),

    /// An open type parameter of a type definition or a generic method.
    TypeParameter(TypeParamInfo),

    /// A named type definition.
    ///
    /// `outer` is the instantiation of the containing type when `def` is
    /// nested, so `A<int>.B` and `A<string>.B` are distinct types. `args`
    /// are the definition's own type arguments only.
    Named {
        def: DefId,
        outer: Option<TypeId>,
        args: TypeList,
    },

    /// `T[]`, `T[,]`, ...
    Array { element: TypeId, rank: u32 },

    /// `T?` over a value type or, with nullable annotations, a reference type.
    Nullable(TypeId),

    /// `T*`
    Pointer(TypeId),

    /// `(int a, string)`
    Tuple(Vec<TupleElement>),

    /// A name the host could not bind. `qualifier` is the alias it was
    /// written through (`var::X` has qualifier `var`).
    Error { name: Atom, qualifier: Option<Atom> },
}
