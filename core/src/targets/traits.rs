#![deny(missing_docs)]

//! # Target Language Trait
//!
//! Defines the interface a printer implements to emit a [`Program`] in one language.
//! Synthesis never depends on a printer; printers never make decisions the IR does not
//! already record.

use crate::ir::{
    ClassDecl, ClientPlan, EnumDecl, HandlerInterface, Prelude, Program, ServerPlan,
};
use crate::targets::code_writer::CodeWriter;

/// A printer for one target language.
pub trait TargetLanguage {
    /// Name of the emitted file.
    fn file_name(&self) -> &'static str;

    /// Spaces per indentation level.
    fn indent_spaces(&self) -> usize {
        2
    }

    /// Imports, constants and aliases.
    fn prelude(&self, w: &mut CodeWriter, prelude: &Prelude);

    /// An enum with its wire-string lookup tables.
    fn enum_decl(&self, w: &mut CodeWriter, decl: &EnumDecl);

    /// A data class.
    ///
    /// # Arguments
    ///
    /// * `w` - Output.
    /// * `decl` - The class.
    fn class_decl(&self, w: &mut CodeWriter, decl: &ClassDecl);

    /// An abstract handler interface.
    fn handler_interface(&self, w: &mut CodeWriter, iface: &HandlerInterface);

    /// The request entry point and per-route dispatch.
    fn dispatcher(&self, w: &mut CodeWriter, plan: &ServerPlan);

    /// The client session and stubs.
    fn client(&self, w: &mut CodeWriter, plan: &ClientPlan);

    /// Renders a whole program: prelude, enums, classes, exceptions, then the server
    /// and client halves that are present.
    fn render(&self, program: &Program) -> String {
        let mut w = CodeWriter::with_indent_spaces(self.indent_spaces());

        self.prelude(&mut w, &program.prelude);
        for decl in &program.enums {
            self.enum_decl(&mut w, decl);
        }
        for decl in &program.classes {
            self.class_decl(&mut w, decl);
        }
        self.enum_decl(&mut w, &program.exceptions);

        if let Some(server) = &program.server {
            self.handler_interface(&mut w, &server.main);
            if let Some(auth) = &server.auth {
                self.handler_interface(&mut w, auth);
            }
            self.dispatcher(&mut w, server);
        }
        if let Some(client) = &program.client {
            self.client(&mut w, client);
        }

        w.finish()
    }
}
