#![deny(missing_docs)]

//! # Dart Target
//!
//! Emits `generated.dart`: declarations, the `HttpRequest` dispatcher (`dart:io`)
//! and the client library (`package:http`).

mod client;
mod decl;
pub mod expr;
mod server;

use crate::ir::{ClassDecl, ClientPlan, EnumDecl, HandlerInterface, Prelude, ServerPlan};
use crate::targets::code_writer::CodeWriter;
use crate::targets::traits::TargetLanguage;

/// The Dart printer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DartTarget;

impl TargetLanguage for DartTarget {
    fn file_name(&self) -> &'static str {
        "generated.dart"
    }

    fn prelude(&self, w: &mut CodeWriter, prelude: &Prelude) {
        decl::prelude(w, prelude)
    }

    fn enum_decl(&self, w: &mut CodeWriter, decl: &EnumDecl) {
        decl::enum_decl(w, decl)
    }

    fn class_decl(&self, w: &mut CodeWriter, decl: &ClassDecl) {
        decl::class_decl(w, decl)
    }

    fn handler_interface(&self, w: &mut CodeWriter, iface: &HandlerInterface) {
        server::handler_interface(w, iface)
    }

    fn dispatcher(&self, w: &mut CodeWriter, plan: &ServerPlan) {
        server::dispatcher(w, plan)
    }

    fn client(&self, w: &mut CodeWriter, plan: &ClientPlan) {
        client::client(w, plan)
    }
}
