#![deny(missing_docs)]

//! # Intermediate Representation
//!
//! The syntax tree between synthesis and printing. Builders in [`crate::codegen`]
//! produce a [`Program`]; printers in [`crate::targets`] and the evaluator in
//! [`crate::runtime`] consume it.

pub mod client;
pub mod decl;
pub mod expr;
pub mod server;

pub use client::{ApiBase, ClientAuth, ClientPlan, ClientStub};
pub use decl::{ClassDecl, CopyBuilder, EnumDecl, FieldDecl, TypedefDecl};
pub use expr::{CastTarget, Direction, Expr};
pub use server::{
    AuthGate, Binding, CallArg, HandlerCall, HandlerInterface, HandlerMethod, HandlerTarget,
    Param, RoutePlan, ServerPlan,
};

/// File-level preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prelude {
    /// Emit the HTTP client import.
    pub client_imports: bool,
    /// Hand-written extension files to import, one per extension.
    pub extension_imports: Vec<String>,
    /// Value of `kApiUseHttps`.
    pub use_https: bool,
    /// Type aliases.
    pub typedefs: Vec<TypedefDecl>,
}

/// A complete generated artifact, before printing.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Preamble.
    pub prelude: Prelude,
    /// Enums in emission order (`AuthLevel` first when present).
    pub enums: Vec<EnumDecl>,
    /// Classes in declaration order.
    pub classes: Vec<ClassDecl>,
    /// The exception enumeration, emitted last among declarations.
    pub exceptions: EnumDecl,
    /// Server side, for `server` and `thaum` targets.
    pub server: Option<ServerPlan>,
    /// Client side, for `frontend` and `thaum` targets.
    pub client: Option<ClientPlan>,
}

impl Program {
    /// Finds an enum, including the exception enumeration.
    pub fn enum_decl(&self, name: &str) -> Option<&EnumDecl> {
        if self.exceptions.name == name {
            return Some(&self.exceptions);
        }
        self.enums.iter().find(|e| e.name == name)
    }

    /// Finds a class by name.
    pub fn class_decl(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Finds the class an extension derives from.
    pub fn extension_base(&self, extension: &str) -> Option<&ClassDecl> {
        self.classes
            .iter()
            .find(|c| c.extension.as_deref() == Some(extension))
    }
}
