//! Dart rendering of the prelude, enums and data classes.

use super::expr::{render, string_literal};
use crate::ir::{ClassDecl, CopyBuilder, EnumDecl, FieldDecl, Prelude};
use crate::targets::CodeWriter;

pub fn prelude(w: &mut CodeWriter, prelude: &Prelude) {
    w.line("import 'dart:io';");
    w.line("import 'dart:convert';");
    if prelude.client_imports {
        w.line("import 'package:http/http.dart';");
    }
    for ext in &prelude.extension_imports {
        w.line(&format!("import '{}.dart';", ext));
    }
    w.blank_line();
    w.line(&format!("const kApiUseHttps = {};", prelude.use_https));
    w.blank_line();

    if !prelude.typedefs.is_empty() {
        for alias in &prelude.typedefs {
            w.line(&format!("typedef {} = {};", alias.name, alias.target));
        }
        w.blank_line();
    }
}

pub fn enum_decl(w: &mut CodeWriter, decl: &EnumDecl) {
    w.block(&format!("enum {}", decl.name), |w| {
        w.comma_lines(decl.variants.iter().map(|(label, _)| label.clone()));
    });
    w.blank_line();

    // Both tables are total over the variants; an unknown key fails the `!`.
    w.line(&format!(
        "{} {}(String value) => const {{",
        decl.name,
        decl.from_wire_fn()
    ));
    {
        let _indent = w.indent();
        w.comma_lines(decl.variants.iter().map(|(label, wire)| {
            format!("{}: {}.{}", string_literal(wire), decl.name, label)
        }));
    }
    w.line("}[value]!;");
    w.blank_line();

    w.line(&format!(
        "String {}({} value) => const {{",
        decl.to_wire_fn(),
        decl.name
    ));
    {
        let _indent = w.indent();
        w.comma_lines(decl.variants.iter().map(|(label, wire)| {
            format!("{}.{}: {}", decl.name, label, string_literal(wire))
        }));
    }
    w.line("}[value]!;");
    w.blank_line();
}

pub fn class_decl(w: &mut CodeWriter, decl: &ClassDecl) {
    w.block(&format!("class {}", decl.name), |w| {
        for field in &decl.fields {
            w.line(&format!("final {} {};", field.ty, field.name));
        }
        if !decl.fields.is_empty() {
            w.blank_line();
        }

        // Constructor
        if decl.fields.is_empty() {
            w.line(&format!("const {}();", decl.name));
        } else {
            w.write(&format!("{}({{", decl.name));
            w.separated(&decl.fields, ", ", |w, f| {
                if !f.nullable {
                    w.write("required ");
                }
                w.write(&format!("this.{}", f.name));
            });
            w.line("});");
        }
        w.blank_line();

        // Decoder
        w.line(&format!(
            "static {n} fromJson(Map<String, dynamic> json) => {n}(",
            n = decl.name
        ));
        {
            let _indent = w.indent();
            w.comma_lines(
                decl.fields
                    .iter()
                    .map(|f| format!("{}: {}", f.name, render(&f.decode))),
            );
        }
        w.line(");");
        w.blank_line();

        // Encoder
        w.line("Map<String, dynamic> toJson() => {");
        {
            let _indent = w.indent();
            w.comma_lines(
                decl.fields
                    .iter()
                    .map(|f| format!("{}: {}", string_literal(&f.name), render(&f.encode))),
            );
        }
        w.line("};");
        w.blank_line();

        if let Some(ext) = &decl.extension {
            w.write(&format!("{e} get as{e} => {e}(", e = ext));
            w.separated(&decl.fields, ", ", |w, f| {
                w.write(&format!("{n}: {n}", n = f.name));
            });
            w.line(");");
            w.blank_line();
        }

        for (i, builder) in decl.copy_builders.iter().enumerate() {
            if i > 0 {
                w.blank_line();
            }
            copy_builder(w, builder, &decl.fields);
        }
    });
    w.blank_line();
}

/// `T copyWith({A? a, ...}) => T(a: a ?? this.a, ...);`
///
/// An omitted argument keeps the current value, so a nullable field can never be
/// reset to null through it.
fn copy_builder(w: &mut CodeWriter, builder: &CopyBuilder, fields: &[FieldDecl]) {
    if fields.is_empty() {
        w.line(&format!(
            "{} {}() => {}();",
            builder.produces, builder.method, builder.produces
        ));
        return;
    }

    w.line(&format!("{} {}({{", builder.produces, builder.method));
    {
        let _indent = w.indent();
        w.comma_lines(fields.iter().map(|f| {
            let ty = if f.ty.ends_with('?') {
                f.ty.clone()
            } else {
                format!("{}?", f.ty)
            };
            format!("{} {}", ty, f.name)
        }));
    }
    w.line(&format!("}}) => {}(", builder.produces));
    {
        let _indent = w.indent();
        w.comma_lines(
            fields
                .iter()
                .map(|f| format!("{n}: {n} ?? this.{n}", n = f.name)),
        );
    }
    w.line(");");
}
