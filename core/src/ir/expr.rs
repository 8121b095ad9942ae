#![deny(missing_docs)]

//! # Conversion Expressions
//!
//! The expression language the synthesizer produces. Each node is one step of
//! moving a value between its wire form (JSON-like) and its typed form.
//!
//! An expression that is exactly [`Expr::Var`] of the binding it was synthesized
//! for is the identity conversion; containers use this to skip re-wrapping.

use crate::types::Primitive;

/// Which way a container conversion runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Wire form to typed form.
    Decode,
    /// Typed form to wire form.
    Encode,
}

/// Target of a representation cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastTarget {
    /// A built-in scalar.
    Primitive(Primitive),
    /// A host-native type, cast by name.
    Opaque(String),
}

/// A conversion expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A bound name: a parameter, a local, a field or a closure binding.
    Var(String),
    /// `target['key']` on a wire object. A missing key reads as absent.
    Index {
        /// The wire object.
        target: Box<Expr>,
        /// The key.
        key: String,
    },
    /// Binds `value` to `binding`; absent stays absent, anything else becomes `then`.
    IfPresent {
        /// The possibly absent value.
        value: Box<Expr>,
        /// Name bound inside `then`.
        binding: String,
        /// Conversion of the present value.
        then: Box<Expr>,
    },
    /// Element-wise list conversion.
    MapList {
        /// The list.
        list: Box<Expr>,
        /// Name bound to each element.
        binding: String,
        /// Conversion of one element.
        element: Box<Expr>,
        /// Decode lists are cast from dynamic lists first.
        direction: Direction,
    },
    /// Entry-wise map conversion; wire keys are always strings.
    MapEntries {
        /// The map.
        map: Box<Expr>,
        /// Name bound to each key.
        key_binding: String,
        /// Name bound to each value.
        value_binding: String,
        /// Conversion of one key.
        key: Box<Expr>,
        /// Conversion of one value.
        value: Box<Expr>,
        /// Decode maps are cast from dynamic maps first.
        direction: Direction,
    },
    /// Representation cast of a wire scalar (`x as int`).
    Cast {
        /// The wire value.
        value: Box<Expr>,
        /// The cast target.
        target: CastTarget,
    },
    /// `Enum.values[x]`.
    EnumFromOrdinal {
        /// Enum name.
        enum_name: String,
        /// The ordinal.
        value: Box<Expr>,
    },
    /// `Enum.values.indexOf(x)`.
    EnumToOrdinal {
        /// Enum name.
        enum_name: String,
        /// The variant.
        value: Box<Expr>,
    },
    /// Wire-string table lookup: wire-string to variant. Unknown strings are fatal.
    EnumFromWire {
        /// Enum name.
        enum_name: String,
        /// The wire-string.
        value: Box<Expr>,
    },
    /// Wire-string table lookup: variant to wire-string.
    EnumToWire {
        /// Enum name.
        enum_name: String,
        /// The variant.
        value: Box<Expr>,
    },
    /// Parses a map key string into a scalar.
    ParseKey {
        /// Scalar type.
        primitive: Primitive,
        /// The key string.
        value: Box<Expr>,
    },
    /// Formats a scalar as a map key string.
    FormatKey {
        /// Scalar type.
        primitive: Primitive,
        /// The scalar.
        value: Box<Expr>,
    },
    /// `Class.fromJson(x)`.
    DecodeClass {
        /// Class name.
        class: String,
        /// The wire object.
        value: Box<Expr>,
    },
    /// `Base.fromJson(x).asExtension`.
    DecodeExtension {
        /// The base class.
        base: String,
        /// The extension.
        extension: String,
        /// The wire object.
        value: Box<Expr>,
    },
    /// `x.toJson()` on a class or extension instance.
    EncodeObject {
        /// The instance.
        value: Box<Expr>,
    },
}

impl Expr {
    /// A bound name.
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    /// `target['key']`.
    pub fn index(target: Expr, key: impl Into<String>) -> Self {
        Expr::Index {
            target: Box::new(target),
            key: key.into(),
        }
    }

    /// Whether this expression is exactly the binding `name`, i.e. the identity.
    pub fn is_binding(&self, name: &str) -> bool {
        matches!(self, Expr::Var(v) if v == name)
    }

    /// Whether evaluating this node performs a conversion of its own
    /// (as opposed to reading or binding a value).
    pub fn is_conversion(&self) -> bool {
        !matches!(
            self,
            Expr::Var(_) | Expr::Index { .. } | Expr::IfPresent { .. }
        )
    }
}
