#![deny(missing_docs)]

//! # Symbol Table
//!
//! One flat namespace for every type name a schema declares: enums (including the
//! generated `AuthLevel` and `APIException`), classes, extensions, typedefs and opaque
//! host types. Declaring a name twice, or shadowing a primitive, is an error.

use crate::error::{AppError, AppResult};
use crate::types::Primitive;
use indexmap::IndexMap;
use std::fmt;

/// What a declared name stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    /// An enumeration.
    Enum,
    /// A data class, optionally extended.
    Class {
        /// Name of the extension type, if the class declares one.
        extension: Option<String>,
    },
    /// An extension type embedding all fields of `base`.
    Extension {
        /// The class this extension derives from.
        base: String,
    },
    /// A textual alias for another type expression.
    Typedef {
        /// The aliased type expression, unresolved.
        target: String,
    },
    /// A host-native type passed through conversions as a cast.
    Opaque,
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Symbol::Enum => "enum",
            Symbol::Class { .. } => "class",
            Symbol::Extension { .. } => "extension",
            Symbol::Typedef { .. } => "typedef",
            Symbol::Opaque => "opaque type",
        };
        f.write_str(kind)
    }
}

/// Name -> symbol lookup, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: IndexMap<String, Symbol>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `name`, rejecting primitives and names already taken.
    pub fn declare(&mut self, name: &str, symbol: Symbol) -> AppResult<()> {
        if Primitive::from_name(name).is_some() {
            return Err(AppError::Schema(format!(
                "{} `{}` shadows a primitive type",
                symbol, name
            )));
        }
        if let Some(existing) = self.entries.get(name) {
            return Err(AppError::Schema(format!(
                "{} `{}` collides with an existing {} of the same name",
                symbol, name, existing
            )));
        }
        self.entries.insert(name.to_string(), symbol);
        Ok(())
    }

    /// Looks a name up.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.entries.get(name)
    }

    /// Returns `true` when `name` is a declared enum.
    pub fn is_enum(&self, name: &str) -> bool {
        matches!(self.lookup(name), Some(Symbol::Enum))
    }

    /// Iterates over all declarations in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of declared names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_lookup() {
        let mut table = SymbolTable::new();
        table.declare("Color", Symbol::Enum).unwrap();
        table
            .declare("Point", Symbol::Class { extension: None })
            .unwrap();
        assert!(table.is_enum("Color"));
        assert!(!table.is_enum("Point"));
        assert_eq!(table.len(), 2);
        assert!(table.lookup("Missing").is_none());
    }

    #[test]
    fn test_collision_is_rejected() {
        let mut table = SymbolTable::new();
        table.declare("Thing", Symbol::Enum).unwrap();
        let err = table
            .declare(
                "Thing",
                Symbol::Typedef {
                    target: "int".into(),
                },
            )
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Schema Error: typedef `Thing` collides with an existing enum of the same name"
        );
    }

    #[test]
    fn test_primitive_shadowing_is_rejected() {
        let mut table = SymbolTable::new();
        let err = table
            .declare("String", Symbol::Class { extension: None })
            .unwrap_err();
        assert!(err.to_string().contains("shadows a primitive"));
    }
}
