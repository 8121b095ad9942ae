#![deny(missing_docs)]

//! # Schema Validation
//!
//! The single pass that turns a [`SchemaDocument`] into a [`Schema`].
//!
//! Order matters: the symbol table is filled first so that every type string can be
//! resolved afterwards, and the synthetic `_authorize` endpoint is appended last so
//! that it keeps the routing position it has always had.

use crate::error::{AppError, AppResult};
use crate::schema::document::{HandledBy, SchemaDocument};
use crate::schema::model::{
    exception_identifier, AuthDef, AuthRequirement, BuiltinException, ClassDef, EndpointDef,
    EndpointKind, EnumDef, Schema, Variant, AUTHORIZE_ENDPOINT, AUTH_LEVEL_ENUM, CUSTOM_AUTH,
    EXCEPTION_ENUM, UNAUTHORIZED_LEVEL,
};
use crate::schema::symbols::{Symbol, SymbolTable};
use crate::types::TypeResolver;
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, warn};
use url::Url;

/// Client entry points that live next to the endpoint functions.
const RESERVED_CLIENT_NAMES: [&str; 2] = ["authorize", "clearToken"];

/// Dart reserved words; none of them may name a generated declaration or member.
const DART_RESERVED_WORDS: [&str; 33] = [
    "assert", "break", "case", "catch", "class", "const", "continue", "default", "do", "else",
    "enum", "extends", "false", "final", "finally", "for", "if", "in", "is", "new", "null",
    "rethrow", "return", "super", "switch", "this", "throw", "true", "try", "var", "void",
    "while", "with",
];

/// Members every Dart enum already has.
const ENUM_MEMBERS: [&str; 6] = [
    "values",
    "index",
    "hashCode",
    "runtimeType",
    "toString",
    "noSuchMethod",
];

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("Invalid regex"))
}

fn check_identifier(what: &str, name: &str) -> AppResult<()> {
    if !identifier_regex().is_match(name) {
        return Err(AppError::Schema(format!(
            "{} `{}` is not a valid identifier",
            what, name
        )));
    }
    if DART_RESERVED_WORDS.contains(&name) {
        return Err(AppError::Schema(format!(
            "{} `{}` is a Dart reserved word",
            what, name
        )));
    }
    Ok(())
}

fn check_variant(enum_name: &str, label: &str) -> AppResult<()> {
    let what = format!("variant of enum `{}`", enum_name);
    check_identifier(&what, label)?;
    if ENUM_MEMBERS.contains(&label) {
        return Err(AppError::Schema(format!(
            "{} `{}` clashes with a built-in enum member",
            what, label
        )));
    }
    Ok(())
}

/// Validates a parsed document.
///
/// # Errors
///
/// Returns `AppError::Schema` for structural violations and `AppError::Type` for type
/// strings that do not resolve.
pub fn validate(doc: SchemaDocument) -> AppResult<Schema> {
    // 1. Client base URL
    check_api_url(&doc.api_url, doc.use_https)?;

    // 2. Symbol table
    let symbols = build_symbols(&doc)?;
    let resolver = TypeResolver::new(&symbols);

    // 3. Enums
    let mut enums = IndexMap::new();
    for (name, source) in &doc.enums {
        let def = build_enum(name, source.pairs())?;
        enums.insert(name.clone(), def);
    }

    // 4. Exceptions
    let exceptions = build_exceptions(&doc.exceptions)?;

    // 5. Typedef targets (also catches cycles)
    for (name, target) in &doc.typedefs {
        resolver
            .resolve(target)
            .map_err(|e| AppError::Type(format!("typedef `{}`: {}", name, unwrap_message(e))))?;
    }

    // 6. Classes
    let mut classes = IndexMap::new();
    for (name, fields) in &doc.classes {
        for (field, ty) in fields {
            check_identifier(&format!("field of class `{}`", name), field)?;
            resolver.resolve(ty).map_err(|e| {
                AppError::Type(format!("{}.{}: {}", name, field, unwrap_message(e)))
            })?;
        }
        classes.insert(
            name.clone(),
            ClassDef {
                name: name.clone(),
                fields: fields.clone(),
                extension: doc.extensions.get(name).cloned(),
            },
        );
    }

    // 7. Auth
    let auth = match &doc.auth {
        Some(a) => {
            let mut seen = HashSet::new();
            for level in &a.levels {
                check_identifier("auth level", level)?;
                if level == UNAUTHORIZED_LEVEL || !seen.insert(level.as_str()) {
                    return Err(AppError::Schema(format!(
                        "auth level `{}` is declared twice",
                        level
                    )));
                }
            }
            resolver
                .resolve(&a.credentials)
                .map_err(|e| AppError::Type(format!("auth.in: {}", unwrap_message(e))))?;
            resolver
                .resolve(&a.token)
                .map_err(|e| AppError::Type(format!("auth.out: {}", unwrap_message(e))))?;
            Some(AuthDef {
                levels: a.levels.clone(),
                credentials: a.credentials.clone(),
                token: a.token.clone(),
            })
        }
        None => None,
    };

    // 8. Endpoints
    let mut endpoints = IndexMap::new();
    for (name, ep) in &doc.endpoints {
        check_identifier("endpoint", name)?;
        let reserved = name == AUTHORIZE_ENDPOINT
            || (auth.is_some() && RESERVED_CLIENT_NAMES.contains(&name.as_str()));
        if reserved {
            return Err(AppError::Schema(format!(
                "endpoint name `{}` is reserved",
                name
            )));
        }
        for ty in ep.input.iter().chain(ep.output.iter()) {
            resolver.resolve(ty).map_err(|e| {
                AppError::Type(format!("endpoint `{}`: {}", name, unwrap_message(e)))
            })?;
        }

        let requirement = match ep.auth_level.as_deref() {
            None | Some("none") => AuthRequirement::None,
            Some(CUSTOM_AUTH) => AuthRequirement::Custom,
            Some(level) => {
                let known = auth
                    .as_ref()
                    .map(|a| a.level_enum().ordinal(level).is_some())
                    .unwrap_or(false);
                if !known {
                    return Err(AppError::Schema(format!(
                        "endpoint `{}` requires unknown auth level `{}`",
                        name, level
                    )));
                }
                AuthRequirement::Level(level.to_string())
            }
        };

        let def = EndpointDef {
            name: name.clone(),
            input: ep.input.clone(),
            output: ep.output.clone(),
            auth: requirement,
            forward_token: ep.forward_token,
            handled_by: ep.handled_by,
            kind: EndpointKind::Declared,
        };

        if auth.is_none() && (def.requires_token() || def.handled_by == HandledBy::Auth) {
            return Err(AppError::Schema(format!(
                "endpoint `{}` needs an `auth` block (token or auth handler)",
                name
            )));
        }
        if def.input.is_none() && def.output.is_none() {
            warn!(endpoint = %name, "endpoint carries neither a request nor a response");
        }
        if def.forward_token && def.auth == AuthRequirement::None {
            warn!(endpoint = %name, "token is forwarded without any authorization check");
        }

        debug!(endpoint = %name, auth = ?def.auth, "validated endpoint");
        endpoints.insert(name.clone(), def);
    }

    if let Some(a) = &auth {
        endpoints.insert(
            AUTHORIZE_ENDPOINT.to_string(),
            EndpointDef {
                name: AUTHORIZE_ENDPOINT.to_string(),
                input: Some(a.credentials.clone()),
                output: Some(a.token.clone()),
                auth: AuthRequirement::None,
                forward_token: false,
                handled_by: HandledBy::Auth,
                kind: EndpointKind::Authorize,
            },
        );
    }

    Ok(Schema {
        api_url: doc.api_url,
        use_https: doc.use_https,
        typedefs: doc.typedefs,
        enums,
        classes,
        exceptions,
        auth,
        endpoints,
        symbols,
    })
}

fn check_api_url(api_url: &str, https: bool) -> AppResult<()> {
    let scheme = if https { "https" } else { "http" };
    let parsed = Url::parse(&format!("{}://{}", scheme, api_url))
        .map_err(|e| AppError::Schema(format!("api_url `{}` is not a host: {}", api_url, e)))?;
    if parsed.host_str().is_none() || parsed.path() != "/" || parsed.query().is_some() {
        return Err(AppError::Schema(format!(
            "api_url `{}` must be a bare host[:port]",
            api_url
        )));
    }
    Ok(())
}

fn build_symbols(doc: &SchemaDocument) -> AppResult<SymbolTable> {
    let mut symbols = SymbolTable::new();

    symbols.declare(EXCEPTION_ENUM, Symbol::Enum)?;
    if doc.auth.is_some() {
        symbols.declare(AUTH_LEVEL_ENUM, Symbol::Enum)?;
    }

    for name in doc.enums.keys() {
        check_identifier("enum", name)?;
        symbols.declare(name, Symbol::Enum)?;
    }
    for name in doc.classes.keys() {
        check_identifier("class", name)?;
        symbols.declare(
            name,
            Symbol::Class {
                extension: doc.extensions.get(name).cloned(),
            },
        )?;
    }
    for (base, ext) in &doc.extensions {
        if !doc.classes.contains_key(base) {
            return Err(AppError::Schema(format!(
                "extension `{}` extends `{}`, which is not a class",
                ext, base
            )));
        }
        check_identifier("extension", ext)?;
        symbols.declare(ext, Symbol::Extension { base: base.clone() })?;
    }
    for (name, target) in &doc.typedefs {
        check_identifier("typedef", name)?;
        symbols.declare(
            name,
            Symbol::Typedef {
                target: target.clone(),
            },
        )?;
    }
    for name in &doc.opaque {
        check_identifier("opaque type", name)?;
        symbols.declare(name, Symbol::Opaque)?;
    }

    Ok(symbols)
}

fn build_enum(name: &str, pairs: Vec<(String, String)>) -> AppResult<EnumDef> {
    if pairs.is_empty() {
        return Err(AppError::Schema(format!("enum `{}` has no variants", name)));
    }
    let mut labels = HashSet::new();
    let mut wires: IndexMap<&str, &str> = IndexMap::new();
    for (label, wire) in &pairs {
        check_variant(name, label)?;
        if !labels.insert(label.as_str()) {
            return Err(AppError::Schema(format!(
                "enum `{}` declares `{}` twice",
                name, label
            )));
        }
        if let Some(first) = wires.insert(wire.as_str(), label.as_str()) {
            return Err(AppError::Schema(format!(
                "enum `{}`: variants `{}` and `{}` share the wire-string `{}`",
                name, first, label, wire
            )));
        }
    }
    Ok(EnumDef {
        name: name.to_string(),
        variants: pairs
            .into_iter()
            .map(|(label, wire)| Variant { label, wire })
            .collect(),
    })
}

fn build_exceptions(declared: &[String]) -> AppResult<EnumDef> {
    let mut variants: Vec<Variant> = BuiltinException::ALL
        .iter()
        .map(|b| Variant {
            label: b.label(),
            wire: b.text().to_string(),
        })
        .collect();

    for text in declared {
        let label = exception_identifier(text);
        check_identifier("exception", &label)?;
        if variants.iter().any(|v| v.label == label || v.wire == *text) {
            return Err(AppError::Schema(format!(
                "exception `{}` duplicates `{}`",
                text, label
            )));
        }
        variants.push(Variant {
            label,
            wire: text.clone(),
        });
    }

    Ok(EnumDef {
        name: EXCEPTION_ENUM.to_string(),
        variants,
    })
}

/// Strips the variant prefix so nested messages read naturally.
fn unwrap_message(e: AppError) -> String {
    match e {
        AppError::Type(m)
        | AppError::Schema(m)
        | AppError::Synthesis(m)
        | AppError::General(m) => m,
        other => other.to_string(),
    }
}
