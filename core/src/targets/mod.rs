#![deny(missing_docs)]

//! # Targets
//!
//! Printers turning a [`Program`](crate::ir::Program) into source text.
//!
//! - **traits**: Defines `TargetLanguage` for implementing new output languages.
//! - **dart**: The default implementation, emitting `generated.dart`.
//! - **code_writer**: Indentation-aware text accumulator shared by printers.

pub mod code_writer;
pub mod dart;
pub mod traits;

pub use code_writer::CodeWriter;
pub use dart::DartTarget;
pub use traits::TargetLanguage;
