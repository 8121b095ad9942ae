#![deny(missing_docs)]

//! # Map Key Conversions
//!
//! Wire maps are keyed by strings, so map keys are converted through a legible string
//! form: scalars by parse/format, enums through their wire-string tables (never their
//! ordinals).

use crate::error::{AppError, AppResult};
use crate::ir::Expr;
use crate::types::{Primitive, Reference, ReferenceKind, TypeExpr};

/// Checks that `ty` may key a map at all.
fn check_key_type(ty: &TypeExpr) -> AppResult<()> {
    match ty {
        TypeExpr::Primitive(_)
        | TypeExpr::Reference(Reference {
            kind: ReferenceKind::Enum,
            ..
        }) => Ok(()),
        other => Err(AppError::Synthesis(format!(
            "cannot use type `{}` as map key",
            other
        ))),
    }
}

fn check_key_primitive(primitive: Primitive, direction: &str) -> AppResult<()> {
    match primitive {
        Primitive::Dynamic | Primitive::Object => Err(AppError::Synthesis(format!(
            "cannot convert type `{}` {} string key",
            primitive.name(),
            direction
        ))),
        _ => Ok(()),
    }
}

/// Key string -> typed key.
///
/// # Arguments
///
/// * `ty` - The resolved key type.
/// * `access` - Expression yielding the key string.
pub fn from_string(ty: &TypeExpr, access: Expr) -> AppResult<Expr> {
    check_key_type(ty)?;
    match ty {
        TypeExpr::Primitive(Primitive::String) => Ok(access),
        TypeExpr::Primitive(p) => {
            check_key_primitive(*p, "from")?;
            Ok(Expr::ParseKey {
                primitive: *p,
                value: Box::new(access),
            })
        }
        TypeExpr::Reference(r) => Ok(Expr::EnumFromWire {
            enum_name: r.name.clone(),
            value: Box::new(access),
        }),
        other => Err(AppError::Synthesis(format!(
            "cannot convert type `{}` from string key",
            other
        ))),
    }
}

/// Typed key -> key string.
///
/// # Arguments
///
/// * `ty` - The resolved key type.
/// * `access` - Expression yielding the typed key.
pub fn to_string(ty: &TypeExpr, access: Expr) -> AppResult<Expr> {
    check_key_type(ty)?;
    match ty {
        TypeExpr::Primitive(Primitive::String) => Ok(access),
        TypeExpr::Primitive(p) => {
            check_key_primitive(*p, "to")?;
            Ok(Expr::FormatKey {
                primitive: *p,
                value: Box::new(access),
            })
        }
        TypeExpr::Reference(r) => Ok(Expr::EnumToWire {
            enum_name: r.name.clone(),
            value: Box::new(access),
        }),
        other => Err(AppError::Synthesis(format!(
            "cannot convert type `{}` to string key",
            other
        ))),
    }
}
