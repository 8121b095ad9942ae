#![deny(missing_docs)]

//! # Type Resolver
//!
//! Turns a type string into a [`TypeExpr`] against a [`SymbolTable`].
//!
//! The only comma-bearing type in the grammar is a map, and a map can never be a map
//! key, so `Map<K, V>` is split at its first comma without bracket counting.
//! Typedefs are substituted textually and re-resolved; an alias reached again while it
//! is still being expanded is a cycle.

use crate::error::{AppError, AppResult};
use crate::schema::symbols::{Symbol, SymbolTable};
use crate::types::{Primitive, ReferenceKind, TypeExpr};

/// Resolves type strings against one schema's symbols.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    symbols: &'a SymbolTable,
}

impl<'a> TypeResolver<'a> {
    /// Creates a resolver over `symbols`.
    pub fn new(symbols: &'a SymbolTable) -> Self {
        Self { symbols }
    }

    /// Resolves `text` into a type tree.
    ///
    /// # Errors
    ///
    /// * malformed syntax (`List<int`, `Map<int>`)
    /// * unresolved names that are neither declared nor primitive
    /// * typedef cycles
    pub fn resolve(&self, text: &str) -> AppResult<TypeExpr> {
        let mut expanding = Vec::new();
        self.resolve_inner(text, &mut expanding)
    }

    fn resolve_inner(&self, text: &str, expanding: &mut Vec<String>) -> AppResult<TypeExpr> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Type("empty type expression".into()));
        }

        // 1. Nullability (an alias of a nullable type stays singly nullable)
        if let Some(rest) = text.strip_suffix('?') {
            let inner = self.resolve_inner(rest, expanding)?;
            return Ok(match inner {
                TypeExpr::Nullable(_) => inner,
                other => TypeExpr::Nullable(Box::new(other)),
            });
        }

        // 2. Containers
        if let Some(body) = generic_body(text, "List") {
            let element = self.resolve_inner(body, expanding)?;
            return Ok(TypeExpr::List(Box::new(element)));
        }
        if let Some(body) = generic_body(text, "Map") {
            let (key, value) = body.split_once(',').ok_or_else(|| {
                AppError::Type(format!("`{}` needs both a key and a value type", text))
            })?;
            let key = self.resolve_inner(key, expanding)?;
            let value = self.resolve_inner(value, expanding)?;
            return Ok(TypeExpr::Map(Box::new(key), Box::new(value)));
        }

        if text.contains(['<', '>', ',', ' ']) {
            return Err(AppError::Type(format!("malformed type expression `{}`", text)));
        }

        // 3. Bare names
        if let Some(primitive) = Primitive::from_name(text) {
            return Ok(TypeExpr::Primitive(primitive));
        }

        match self.symbols.lookup(text) {
            Some(Symbol::Typedef { target }) => {
                if let Some(start) = expanding.iter().position(|n| n == text) {
                    let mut chain = expanding[start..].to_vec();
                    chain.push(text.to_string());
                    return Err(AppError::Type(format!(
                        "typedef cycle: {}",
                        chain.join(" -> ")
                    )));
                }
                expanding.push(text.to_string());
                let resolved = self.resolve_inner(target, expanding);
                expanding.pop();
                resolved
            }
            Some(Symbol::Enum) => Ok(TypeExpr::reference(text, ReferenceKind::Enum)),
            Some(Symbol::Class { .. }) => Ok(TypeExpr::reference(text, ReferenceKind::Class)),
            Some(Symbol::Extension { base }) => Ok(TypeExpr::reference(
                text,
                ReferenceKind::Extension { base: base.clone() },
            )),
            Some(Symbol::Opaque) => Ok(TypeExpr::reference(text, ReferenceKind::Opaque)),
            None => Err(AppError::Type(format!(
                "unresolved type `{}` (list it under `opaque` if it is a host-native type)",
                text
            ))),
        }
    }
}

/// Returns the text between `Head<` and the final `>`.
fn generic_body<'t>(text: &'t str, head: &str) -> Option<&'t str> {
    text.strip_prefix(head)?
        .trim_start()
        .strip_prefix('<')?
        .strip_suffix('>')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Reference;

    fn table() -> SymbolTable {
        let mut t = SymbolTable::new();
        t.declare("Color", Symbol::Enum).unwrap();
        t.declare(
            "User",
            Symbol::Class {
                extension: Some("UserExt".into()),
            },
        )
        .unwrap();
        t.declare(
            "UserExt",
            Symbol::Extension {
                base: "User".into(),
            },
        )
        .unwrap();
        t.declare(
            "UserId",
            Symbol::Typedef {
                target: "int".into(),
            },
        )
        .unwrap();
        t.declare(
            "Roster",
            Symbol::Typedef {
                target: "Map<UserId, List<User?>>".into(),
            },
        )
        .unwrap();
        t.declare("DateTime", Symbol::Opaque).unwrap();
        t
    }

    #[test]
    fn test_primitives_and_nullables() {
        let t = table();
        let r = TypeResolver::new(&t);
        assert_eq!(
            r.resolve("int").unwrap(),
            TypeExpr::Primitive(Primitive::Int)
        );
        assert_eq!(
            r.resolve("String?").unwrap(),
            TypeExpr::Nullable(Box::new(TypeExpr::Primitive(Primitive::String)))
        );
    }

    #[test]
    fn test_alias_expansion_inside_containers() {
        let t = table();
        let r = TypeResolver::new(&t);
        let resolved = r.resolve("Roster").unwrap();
        assert_eq!(resolved.to_string(), "Map<int, List<User?>>");
    }

    #[test]
    fn test_reference_classification() {
        let t = table();
        let r = TypeResolver::new(&t);
        assert_eq!(
            r.resolve("UserExt").unwrap(),
            TypeExpr::Reference(Reference {
                name: "UserExt".into(),
                kind: ReferenceKind::Extension {
                    base: "User".into()
                },
            })
        );
        assert_eq!(
            r.resolve("Color").unwrap(),
            TypeExpr::reference("Color", ReferenceKind::Enum)
        );
        assert_eq!(
            r.resolve("DateTime").unwrap(),
            TypeExpr::reference("DateTime", ReferenceKind::Opaque)
        );
    }

    #[test]
    fn test_nested_map_value_keeps_its_comma() {
        let t = table();
        let r = TypeResolver::new(&t);
        let resolved = r.resolve("Map<String, Map<Color, int>>").unwrap();
        match resolved {
            TypeExpr::Map(key, value) => {
                assert_eq!(*key, TypeExpr::Primitive(Primitive::String));
                assert_eq!(value.to_string(), "Map<Color, int>");
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_name_is_rejected() {
        let t = table();
        let r = TypeResolver::new(&t);
        let err = r.resolve("List<Ponit>").unwrap_err();
        assert!(err.to_string().contains("unresolved type `Ponit`"));
    }

    #[test]
    fn test_malformed_expressions() {
        let t = table();
        let r = TypeResolver::new(&t);
        assert!(r.resolve("List<int").is_err());
        assert!(r.resolve("Map<int>").is_err());
        assert!(r.resolve("").is_err());
        assert!(r.resolve("Map<Map<int, int>, int>").is_err());
    }

    #[test]
    fn test_typedef_cycle_is_reported() {
        let mut t = SymbolTable::new();
        t.declare("A", Symbol::Typedef { target: "B?".into() })
            .unwrap();
        t.declare(
            "B",
            Symbol::Typedef {
                target: "List<A>".into(),
            },
        )
        .unwrap();
        let err = TypeResolver::new(&t).resolve("A").unwrap_err();
        assert_eq!(err.to_string(), "Type Error: typedef cycle: A -> B -> A");
    }

    #[test]
    fn test_alias_used_twice_is_not_a_cycle() {
        let t = table();
        let r = TypeResolver::new(&t);
        let resolved = r.resolve("Map<UserId, UserId>").unwrap();
        assert_eq!(resolved.to_string(), "Map<int, int>");
    }

    #[test]
    fn test_nullable_alias_collapses() {
        let mut t = SymbolTable::new();
        t.declare(
            "MaybeInt",
            Symbol::Typedef {
                target: "int?".into(),
            },
        )
        .unwrap();
        let resolved = TypeResolver::new(&t).resolve("MaybeInt?").unwrap();
        assert_eq!(resolved.to_string(), "int?");
    }
}
