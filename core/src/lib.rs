#![deny(missing_docs)]

//! # Thaum Core
//!
//! Core library for the schema-to-protocol compiler.
//!
//! A `generate.yaml` schema is validated, every declared type gets a synthesized
//! decode/encode pair, and the result is printed as a single source file holding the
//! typed model, a server request dispatcher and matching client stubs.

/// Shared error types.
pub mod error;

/// Schema loading and validation.
pub mod schema;

/// Type expressions and name resolution.
pub mod types;

/// Decode/encode expression synthesis.
pub mod synth;

/// The intermediate representation between synthesis and printing.
pub mod ir;

/// Program builders.
pub mod codegen;

/// Target language printers.
pub mod targets;

/// Reference interpreter for built programs.
pub mod runtime;

pub use codegen::{build_program, generate, generate_with, GeneratedFile, GenerationTarget};
pub use error::{AppError, AppResult};
pub use ir::Program;
pub use schema::Schema;
pub use synth::Synthesizer;
pub use targets::{DartTarget, TargetLanguage};
pub use types::{TypeExpr, TypeResolver};
