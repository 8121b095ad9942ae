#![deny(missing_docs)]

//! # Schema
//!
//! Loading and validating `generate.yaml`.
//!
//! - **document**: the raw serde shape of the YAML file.
//! - **symbols**: the flat type namespace.
//! - **model**: the validated, immutable schema.
//! - **validation**: the pass from document to model.

pub mod document;
pub mod model;
pub mod symbols;
pub mod validation;

pub use document::{parse_schema_document, HandledBy, SchemaDocument};
pub use model::{
    AuthDef, AuthRequirement, BuiltinException, ClassDef, EndpointDef, EndpointKind, EnumDef,
    Schema, Variant,
};
pub use symbols::{Symbol, SymbolTable};

use crate::error::AppResult;
use tracing::info;

impl Schema {
    /// Parses and validates a schema from YAML text.
    pub fn from_yaml(yaml: &str) -> AppResult<Self> {
        let schema = validation::validate(parse_schema_document(yaml)?)?;
        info!(
            symbols = schema.symbols.len(),
            endpoints = schema.endpoints.len(),
            "schema loaded"
        );
        Ok(schema)
    }

    /// Reads, parses and validates a schema file.
    pub fn from_path(path: &std::path::Path) -> AppResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }
}
