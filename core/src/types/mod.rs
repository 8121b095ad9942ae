#![deny(missing_docs)]

//! # Types
//!
//! The resolved type tree produced from schema type strings.
//!
//! Grammar (Dart-flavoured, as written in `generate.yaml`):
//! - `T?`: nullable
//! - `List<T>`: list
//! - `Map<K, V>`: string-keyed wire map
//! - a bare name: primitive, typedef, enum, class, extension or opaque type

pub mod resolver;

pub use resolver::TypeResolver;

use std::fmt;

/// Built-in scalar types of the schema language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `int`
    Int,
    /// `double`
    Double,
    /// `num`
    Num,
    /// `bool`
    Bool,
    /// `String`
    String,
    /// `dynamic`
    Dynamic,
    /// `Object`
    Object,
}

impl Primitive {
    /// Every primitive, in a stable order.
    pub const ALL: [Primitive; 7] = [
        Primitive::Int,
        Primitive::Double,
        Primitive::Num,
        Primitive::Bool,
        Primitive::String,
        Primitive::Dynamic,
        Primitive::Object,
    ];

    /// Maps a bare type name to a primitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The spelling used in schemas and emitted code.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Double => "double",
            Primitive::Num => "num",
            Primitive::Bool => "bool",
            Primitive::String => "String",
            Primitive::Dynamic => "dynamic",
            Primitive::Object => "Object",
        }
    }
}

/// What a named reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A declared or generated enum.
    Enum,
    /// A data class.
    Class,
    /// An extension of the class `base`.
    Extension {
        /// The base class whose decoder is cast through.
        base: String,
    },
    /// A host-native type declared under `opaque`.
    Opaque,
}

/// A resolved named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The referenced name (after alias expansion).
    pub name: String,
    /// Its classification.
    pub kind: ReferenceKind,
}

/// A fully resolved type expression. Typedefs never appear here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// A built-in scalar.
    Primitive(Primitive),
    /// `T?`
    Nullable(Box<TypeExpr>),
    /// `List<T>`
    List(Box<TypeExpr>),
    /// `Map<K, V>`
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// A named enum, class, extension or opaque type.
    Reference(Reference),
}

impl TypeExpr {
    /// Whether the outermost layer is `Nullable`.
    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeExpr::Nullable(_))
    }

    /// Shorthand for a reference node.
    pub fn reference(name: impl Into<String>, kind: ReferenceKind) -> Self {
        TypeExpr::Reference(Reference {
            name: name.into(),
            kind,
        })
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive(p) => f.write_str(p.name()),
            TypeExpr::Nullable(inner) => write!(f, "{}?", inner),
            TypeExpr::List(inner) => write!(f, "List<{}>", inner),
            TypeExpr::Map(key, value) => write!(f, "Map<{}, {}>", key, value),
            TypeExpr::Reference(r) => f.write_str(&r.name),
        }
    }
}
