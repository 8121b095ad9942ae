#![deny(missing_docs)]

//! # Declarations
//!
//! Enum, class and alias declarations as produced by the declaration builder.

use crate::ir::expr::Expr;
use crate::schema::model::EnumDef;

/// Name bound to the wire object inside a class decoder.
pub const JSON_BINDING: &str = "json";

/// An emitted enum with both lookup tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    /// Enum name.
    pub name: String,
    /// `(label, wire-string)` in ordinal order.
    pub variants: Vec<(String, String)>,
}

impl From<&EnumDef> for EnumDecl {
    fn from(def: &EnumDef) -> Self {
        Self {
            name: def.name.clone(),
            variants: def
                .variants
                .iter()
                .map(|v| (v.label.clone(), v.wire.clone()))
                .collect(),
        }
    }
}

impl EnumDecl {
    /// Ordinal of `label`.
    pub fn ordinal(&self, label: &str) -> Option<usize> {
        self.variants.iter().position(|(l, _)| l == label)
    }

    /// Name of the label -> wire-string function.
    pub fn to_wire_fn(&self) -> String {
        format!("{}ToString", self.name)
    }

    /// Name of the wire-string -> label function.
    pub fn from_wire_fn(&self) -> String {
        format!("{}FromString", self.name)
    }
}

/// One class field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Field name (also its wire key).
    pub name: String,
    /// Type as written in the schema.
    pub ty: String,
    /// Whether the resolved type is nullable (optional in the constructor).
    pub nullable: bool,
    /// Decode from `json['<name>']`.
    pub decode: Expr,
    /// Encode from the field itself.
    pub encode: Expr,
}

/// A copy-builder method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyBuilder {
    /// Method name (`copyWith` or `copyBaseWith`).
    pub method: String,
    /// Type constructed by the method.
    pub produces: String,
}

/// An emitted data class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// Class name.
    pub name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDecl>,
    /// Extension cast target (`as<Extension>` accessor), if any.
    pub extension: Option<String>,
    /// Copy-builders, base first.
    pub copy_builders: Vec<CopyBuilder>,
}

impl ClassDecl {
    /// Looks a field up by name.
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// `typedef Name = Target;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefDecl {
    /// Alias name.
    pub name: String,
    /// Aliased type as written.
    pub target: String,
}
