#![deny(missing_docs)]

//! # Declaration Builder
//!
//! Builds the enum, class and alias declarations of a [`Program`](crate::ir::Program).

use crate::error::AppResult;
use crate::ir::decl::JSON_BINDING;
use crate::ir::{ClassDecl, CopyBuilder, EnumDecl, Expr, FieldDecl, TypedefDecl};
use crate::schema::{ClassDef, Schema};
use crate::synth::Synthesizer;
use tracing::debug;

/// Enums in emission order: `AuthLevel` (when auth is configured), then declared enums.
/// The exception enumeration is built separately and always emitted last.
pub fn build_enums(schema: &Schema) -> Vec<EnumDecl> {
    schema
        .auth_levels()
        .iter()
        .chain(schema.enums.values())
        .map(EnumDecl::from)
        .collect()
}

/// The merged exception enumeration.
pub fn build_exceptions(schema: &Schema) -> EnumDecl {
    EnumDecl::from(&schema.exceptions)
}

/// Typedefs as declared.
pub fn build_typedefs(schema: &Schema) -> Vec<TypedefDecl> {
    schema
        .typedefs
        .iter()
        .map(|(name, target)| TypedefDecl {
            name: name.clone(),
            target: target.clone(),
        })
        .collect()
}

/// Builds every class in declaration order.
pub fn build_classes(schema: &Schema, synth: &Synthesizer<'_>) -> AppResult<Vec<ClassDecl>> {
    schema
        .classes
        .values()
        .map(|class| build_class(schema, synth, class))
        .collect()
}

/// Builds one class: fields with their conversions, copy-builders and the extension cast.
///
/// # Arguments
///
/// * `schema` - The validated schema, for type resolution.
/// * `synth` - Conversion synthesizer.
/// * `class` - The class to build.
pub fn build_class(
    schema: &Schema,
    synth: &Synthesizer<'_>,
    class: &ClassDef,
) -> AppResult<ClassDecl> {
    let resolver = schema.resolver();
    let mut fields = Vec::with_capacity(class.fields.len());

    for (name, ty) in &class.fields {
        let resolved = resolver.resolve(ty)?;
        let decode = synth.decode(&resolved, Expr::index(Expr::var(JSON_BINDING), name))?;
        let encode = synth.encode(&resolved, Expr::var(name))?;
        fields.push(FieldDecl {
            name: name.clone(),
            ty: ty.clone(),
            nullable: resolved.is_nullable(),
            decode,
            encode,
        });
    }

    let copy_builders = match &class.extension {
        Some(ext) => vec![
            CopyBuilder {
                method: "copyBaseWith".into(),
                produces: class.name.clone(),
            },
            CopyBuilder {
                method: "copyWith".into(),
                produces: ext.clone(),
            },
        ],
        None => vec![CopyBuilder {
            method: "copyWith".into(),
            produces: class.name.clone(),
        }],
    };

    debug!(class = %class.name, fields = fields.len(), "built class declaration");
    Ok(ClassDecl {
        name: class.name.clone(),
        fields,
        extension: class.extension.clone(),
        copy_builders,
    })
}
