#![deny(missing_docs)]

//! # Code Generation
//!
//! Builds a [`Program`] from a validated [`Schema`] and prints it with a
//! [`TargetLanguage`].
//!
//! - **declarations**: enums, classes, typedefs, exceptions.
//! - **dispatch**: the server state machine and handler interfaces.
//! - **client**: the client stubs.

pub mod client;
pub mod declarations;
pub mod dispatch;

use crate::error::{AppError, AppResult};
use crate::ir::{Prelude, Program};
use crate::schema::Schema;
use crate::synth::Synthesizer;
use crate::targets::{DartTarget, TargetLanguage};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Which halves of the protocol to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationTarget {
    /// Declarations and the request dispatcher.
    Server,
    /// Declarations and the client library.
    Frontend,
    /// Both.
    #[default]
    Thaum,
}

impl GenerationTarget {
    /// Every target, for help output.
    pub const ALL: [GenerationTarget; 3] = [
        GenerationTarget::Server,
        GenerationTarget::Frontend,
        GenerationTarget::Thaum,
    ];

    /// Whether the dispatcher is emitted.
    pub fn includes_server(self) -> bool {
        matches!(self, GenerationTarget::Server | GenerationTarget::Thaum)
    }

    /// Whether the client library is emitted.
    pub fn includes_client(self) -> bool {
        matches!(self, GenerationTarget::Frontend | GenerationTarget::Thaum)
    }

    /// The spelling used on the command line and in `thaum.yaml`.
    pub fn name(self) -> &'static str {
        match self {
            GenerationTarget::Server => "server",
            GenerationTarget::Frontend => "frontend",
            GenerationTarget::Thaum => "thaum",
        }
    }
}

impl fmt::Display for GenerationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GenerationTarget {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| AppError::General(format!("Unsupported target '{}'", s)))
    }
}

/// A generated artifact ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name relative to the output directory.
    pub file_name: String,
    /// File contents.
    pub contents: String,
}

/// Builds the intermediate program for `target`.
///
/// # Arguments
///
/// * `schema` - The validated schema.
/// * `target` - Which halves to include.
///
/// # Errors
///
/// Fails on the first conversion that cannot be synthesized (e.g. a class used as a
/// map key).
pub fn build_program(schema: &Schema, target: GenerationTarget) -> AppResult<Program> {
    let synth = Synthesizer::new(schema.resolver());

    // 1. Declarations
    let prelude = Prelude {
        client_imports: target.includes_client(),
        extension_imports: schema.extensions().map(|(ext, _)| ext.to_string()).collect(),
        use_https: schema.use_https,
        typedefs: declarations::build_typedefs(schema),
    };
    let enums = declarations::build_enums(schema);
    let classes = declarations::build_classes(schema, &synth)?;
    let exceptions = declarations::build_exceptions(schema);

    // 2. Protocol halves
    let server = if target.includes_server() {
        Some(dispatch::build_server(schema, &synth)?)
    } else {
        None
    };
    let client = if target.includes_client() {
        Some(client::build_client(schema, &synth)?)
    } else {
        None
    };

    Ok(Program {
        prelude,
        enums,
        classes,
        exceptions,
        server,
        client,
    })
}

/// Builds and prints the artifact for `target` with `language`.
pub fn generate_with(
    schema: &Schema,
    target: GenerationTarget,
    language: &dyn TargetLanguage,
) -> AppResult<GeneratedFile> {
    let program = build_program(schema, target)?;
    let contents = language.render(&program);
    info!(
        %target,
        file = language.file_name(),
        bytes = contents.len(),
        "generated artifact"
    );
    Ok(GeneratedFile {
        file_name: language.file_name().to_string(),
        contents,
    })
}

/// Builds and prints the Dart artifact (`generated.dart`) for `target`.
pub fn generate(schema: &Schema, target: GenerationTarget) -> AppResult<GeneratedFile> {
    generate_with(schema, target, &DartTarget)
}
