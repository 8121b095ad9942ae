#![deny(missing_docs)]

//! # Serialization Synthesizer
//!
//! Derives the decode (wire -> typed) and encode (typed -> wire) expressions for a
//! resolved [`TypeExpr`] applied to an access expression.
//!
//! Containers bind their elements to fixed names (`val`, `element`, `k`, `v`). When the
//! element conversion comes back as exactly that binding, the container conversion is
//! the identity too and the accessor is returned unchanged. This is the only
//! optimization performed, and it propagates bottom-up through any nesting depth.

pub mod keys;

use crate::error::AppResult;
use crate::ir::{CastTarget, Direction, Expr};
use crate::types::{Primitive, ReferenceKind, TypeExpr, TypeResolver};

/// Binding of a nullable value inside its presence guard.
pub const NULLABLE_BINDING: &str = "val";
/// Binding of a list element.
pub const ELEMENT_BINDING: &str = "element";
/// Binding of a map key.
pub const KEY_BINDING: &str = "k";
/// Binding of a map value.
pub const VALUE_BINDING: &str = "v";

/// Synthesizes conversions for one schema.
#[derive(Debug, Clone, Copy)]
pub struct Synthesizer<'a> {
    resolver: TypeResolver<'a>,
}

impl<'a> Synthesizer<'a> {
    /// Creates a synthesizer resolving type strings with `resolver`.
    pub fn new(resolver: TypeResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Resolves `ty` and synthesizes its decoder.
    pub fn decode_text(&self, ty: &str, access: Expr) -> AppResult<Expr> {
        let resolved = self.resolver.resolve(ty)?;
        self.decode(&resolved, access)
    }

    /// Resolves `ty` and synthesizes its encoder.
    pub fn encode_text(&self, ty: &str, access: Expr) -> AppResult<Expr> {
        let resolved = self.resolver.resolve(ty)?;
        self.encode(&resolved, access)
    }

    /// Wire form -> typed form.
    ///
    /// # Arguments
    ///
    /// * `ty` - The resolved type.
    /// * `access` - Expression yielding the wire value.
    pub fn decode(&self, ty: &TypeExpr, access: Expr) -> AppResult<Expr> {
        match ty {
            TypeExpr::Nullable(inner) => {
                let then = self.decode(inner, Expr::var(NULLABLE_BINDING))?;
                Ok(guard_presence(access, then))
            }
            TypeExpr::List(inner) => {
                let element = self.decode(inner, Expr::var(ELEMENT_BINDING))?;
                Ok(map_list(access, element, Direction::Decode))
            }
            TypeExpr::Map(key, value) => {
                let key = keys::from_string(key, Expr::var(KEY_BINDING))?;
                let value = self.decode(value, Expr::var(VALUE_BINDING))?;
                Ok(map_entries(access, key, value, Direction::Decode))
            }
            TypeExpr::Primitive(Primitive::Dynamic) => Ok(access),
            TypeExpr::Primitive(p) => Ok(Expr::Cast {
                value: Box::new(access),
                target: CastTarget::Primitive(*p),
            }),
            TypeExpr::Reference(r) => Ok(match &r.kind {
                ReferenceKind::Enum => Expr::EnumFromOrdinal {
                    enum_name: r.name.clone(),
                    value: Box::new(access),
                },
                ReferenceKind::Class => Expr::DecodeClass {
                    class: r.name.clone(),
                    value: Box::new(access),
                },
                ReferenceKind::Extension { base } => Expr::DecodeExtension {
                    base: base.clone(),
                    extension: r.name.clone(),
                    value: Box::new(access),
                },
                ReferenceKind::Opaque => Expr::Cast {
                    value: Box::new(access),
                    target: CastTarget::Opaque(r.name.clone()),
                },
            }),
        }
    }

    /// Typed form -> wire form.
    ///
    /// # Arguments
    ///
    /// * `ty` - The resolved type.
    /// * `access` - Expression yielding the typed value.
    pub fn encode(&self, ty: &TypeExpr, access: Expr) -> AppResult<Expr> {
        match ty {
            TypeExpr::Nullable(inner) => {
                let then = self.encode(inner, Expr::var(NULLABLE_BINDING))?;
                Ok(guard_presence(access, then))
            }
            TypeExpr::List(inner) => {
                let element = self.encode(inner, Expr::var(ELEMENT_BINDING))?;
                Ok(map_list(access, element, Direction::Encode))
            }
            TypeExpr::Map(key, value) => {
                let key = keys::to_string(key, Expr::var(KEY_BINDING))?;
                let value = self.encode(value, Expr::var(VALUE_BINDING))?;
                Ok(map_entries(access, key, value, Direction::Encode))
            }
            TypeExpr::Primitive(_) => Ok(access),
            TypeExpr::Reference(r) => Ok(match &r.kind {
                ReferenceKind::Enum => Expr::EnumToOrdinal {
                    enum_name: r.name.clone(),
                    value: Box::new(access),
                },
                ReferenceKind::Class | ReferenceKind::Extension { .. } => Expr::EncodeObject {
                    value: Box::new(access),
                },
                ReferenceKind::Opaque => access,
            }),
        }
    }
}

fn guard_presence(access: Expr, then: Expr) -> Expr {
    if then.is_binding(NULLABLE_BINDING) {
        return access;
    }
    Expr::IfPresent {
        value: Box::new(access),
        binding: NULLABLE_BINDING.to_string(),
        then: Box::new(then),
    }
}

fn map_list(access: Expr, element: Expr, direction: Direction) -> Expr {
    if element.is_binding(ELEMENT_BINDING) {
        return access;
    }
    Expr::MapList {
        list: Box::new(access),
        binding: ELEMENT_BINDING.to_string(),
        element: Box::new(element),
        direction,
    }
}

fn map_entries(access: Expr, key: Expr, value: Expr, direction: Direction) -> Expr {
    if key.is_binding(KEY_BINDING) && value.is_binding(VALUE_BINDING) {
        return access;
    }
    Expr::MapEntries {
        map: Box::new(access),
        key_binding: KEY_BINDING.to_string(),
        value_binding: VALUE_BINDING.to_string(),
        key: Box::new(key),
        value: Box::new(value),
        direction,
    }
}
