#![deny(missing_docs)]

//! # Schema Model
//!
//! The validated schema. Built once by [`crate::schema::validation::validate`] and never
//! mutated afterwards; every later stage only reads it.

use crate::schema::document::HandledBy;
use crate::schema::symbols::SymbolTable;
use crate::types::TypeResolver;
use indexmap::IndexMap;

/// Name of the generated exception enumeration.
pub const EXCEPTION_ENUM: &str = "APIException";
/// Name of the generated privilege enumeration.
pub const AUTH_LEVEL_ENUM: &str = "AuthLevel";
/// The implicit lowest privilege level.
pub const UNAUTHORIZED_LEVEL: &str = "Unauthorized";
/// Route of the synthetic token-issuing endpoint.
pub const AUTHORIZE_ENDPOINT: &str = "_authorize";
/// Marker value of `authLevel` selecting a per-endpoint predicate.
pub const CUSTOM_AUTH: &str = "Custom";

/// The six exception codes every schema starts with. Their ordinals are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinException {
    /// 0: the call succeeded.
    Success,
    /// 1: anything but POST/OPTIONS.
    UnsupportedMethod,
    /// 2: no endpoint with that path.
    UnsupportedEndpoint,
    /// 3: body or token failed to decode.
    ObjectFormatError,
    /// 4: an undeclared failure in handler code or on the client.
    InternalError,
    /// 5: the token was missing, rejected or below the required level.
    Unauthorized,
}

impl BuiltinException {
    /// All built-ins in wire order.
    pub const ALL: [BuiltinException; 6] = [
        BuiltinException::Success,
        BuiltinException::UnsupportedMethod,
        BuiltinException::UnsupportedEndpoint,
        BuiltinException::ObjectFormatError,
        BuiltinException::InternalError,
        BuiltinException::Unauthorized,
    ];

    /// Wire code of this exception.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Free-text form, which is also the wire-string.
    pub fn text(self) -> &'static str {
        match self {
            BuiltinException::Success => "Success",
            BuiltinException::UnsupportedMethod => "Unsupported method",
            BuiltinException::UnsupportedEndpoint => "Unsupported endpoint",
            BuiltinException::ObjectFormatError => "Object format error",
            BuiltinException::InternalError => "Internal error",
            BuiltinException::Unauthorized => "Unauthorized",
        }
    }

    /// Identifier form, e.g. `ObjectFormatError`.
    pub fn label(self) -> String {
        exception_identifier(self.text())
    }
}

/// Converts free exception text to an identifier: every word title-cased, spaces removed.
///
/// A letter is upper-cased when the character before it is not a letter, and
/// lower-cased otherwise, so `"not FOUND"` becomes `NotFound`.
pub fn exception_identifier(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            prev_is_letter = false;
            if ch != ' ' {
                out.push(ch);
            }
        }
    }
    out
}

/// One enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Identifier used in code.
    pub label: String,
    /// String used for map keys on the wire.
    pub wire: String,
}

/// An enumeration: declared, `AuthLevel`, or `APIException`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    /// Enum name.
    pub name: String,
    /// Variants in ordinal order.
    pub variants: Vec<Variant>,
}

impl EnumDef {
    /// Builds an enum whose wire-strings equal its labels.
    pub fn from_labels<I, S>(name: &str, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let variants = labels
            .into_iter()
            .map(|l| {
                let label = l.into();
                Variant {
                    wire: label.clone(),
                    label,
                }
            })
            .collect();
        Self {
            name: name.to_string(),
            variants,
        }
    }

    /// Ordinal of `label`.
    pub fn ordinal(&self, label: &str) -> Option<usize> {
        self.variants.iter().position(|v| v.label == label)
    }
}

/// A data class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    /// Class name.
    pub name: String,
    /// Field name -> type expression text, in declaration order.
    pub fields: IndexMap<String, String>,
    /// Extension type name, if any.
    pub extension: Option<String>,
}

/// The validated `auth` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDef {
    /// Declared levels, lowest first, without the implicit `Unauthorized`.
    pub levels: Vec<String>,
    /// Credential type.
    pub credentials: String,
    /// Token type.
    pub token: String,
}

impl AuthDef {
    /// The `AuthLevel` enum: `Unauthorized` followed by the declared levels.
    pub fn level_enum(&self) -> EnumDef {
        EnumDef::from_labels(
            AUTH_LEVEL_ENUM,
            std::iter::once(UNAUTHORIZED_LEVEL.to_string()).chain(self.levels.iter().cloned()),
        )
    }
}

/// Authorization requirement of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequirement {
    /// No token needed.
    None,
    /// Token's level must be at least this one.
    Level(String),
    /// Delegated to `<endpoint>Auth(token[, request])`.
    Custom,
}

/// Which handler method serves an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// A schema-declared endpoint, served by the interface named in `handled_by`.
    Declared,
    /// The injected `_authorize` endpoint, served by `AuthHandler.generateToken`.
    Authorize,
}

/// A validated endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDef {
    /// Route key; the request path is `/<name>`.
    pub name: String,
    /// Request payload type text.
    pub input: Option<String>,
    /// Response payload type text.
    pub output: Option<String>,
    /// Authorization requirement.
    pub auth: AuthRequirement,
    /// Whether the token is forwarded to the handler.
    pub forward_token: bool,
    /// Handler interface.
    pub handled_by: HandledBy,
    /// Declared or synthetic.
    pub kind: EndpointKind,
}

impl EndpointDef {
    /// Whether the request envelope must carry a token.
    pub fn requires_token(&self) -> bool {
        self.auth != AuthRequirement::None || self.forward_token
    }
}

/// A validated schema.
#[derive(Debug, Clone)]
pub struct Schema {
    /// API host used by the client.
    pub api_url: String,
    /// Scheme selector for the client.
    pub use_https: bool,
    /// Aliases, emitted as-is and expanded during resolution.
    pub typedefs: IndexMap<String, String>,
    /// Declared enums.
    pub enums: IndexMap<String, EnumDef>,
    /// Declared classes.
    pub classes: IndexMap<String, ClassDef>,
    /// The merged exception enumeration.
    pub exceptions: EnumDef,
    /// Auth descriptor.
    pub auth: Option<AuthDef>,
    /// Endpoints in routing order, `_authorize` last when auth is configured.
    pub endpoints: IndexMap<String, EndpointDef>,
    /// The flat namespace.
    pub symbols: SymbolTable,
}

impl Schema {
    /// A resolver bound to this schema's symbols.
    pub fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(&self.symbols)
    }

    /// The `AuthLevel` enum, when auth is configured.
    pub fn auth_levels(&self) -> Option<EnumDef> {
        self.auth.as_ref().map(AuthDef::level_enum)
    }

    /// Extension name -> base class name.
    pub fn extensions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.classes.values().filter_map(|c| {
            c.extension
                .as_deref()
                .map(|ext| (ext, c.name.as_str()))
        })
    }
}
