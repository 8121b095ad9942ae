#![deny(missing_docs)]

//! # Schema Document
//!
//! The raw, unvalidated shape of a `generate.yaml` schema document.
//!
//! These structs mirror the YAML keys one-to-one. Nothing here checks that names
//! resolve or that levels exist; see [`crate::schema::validation`] for that.

use crate::error::AppResult;
use indexmap::IndexMap;
use serde::Deserialize;

/// Top-level schema document.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDocument {
    /// Host (and optional port) the generated client talks to, e.g. `api.example.com:8080`.
    pub api_url: String,
    /// Whether the generated client uses `https`.
    #[serde(default)]
    pub use_https: bool,
    /// Type aliases, expanded textually during resolution.
    #[serde(default)]
    pub typedefs: IndexMap<String, String>,
    /// Enumerations in declaration order.
    #[serde(default)]
    pub enums: IndexMap<String, EnumSource>,
    /// Data classes: class name -> (field name -> type expression).
    #[serde(default)]
    pub classes: IndexMap<String, IndexMap<String, String>>,
    /// Extensions: base class name -> extension type name.
    #[serde(default)]
    pub extensions: IndexMap<String, String>,
    /// Free-text domain exception labels, appended after the built-ins.
    #[serde(default)]
    pub exceptions: Vec<String>,
    /// Optional authentication descriptor.
    #[serde(default)]
    pub auth: Option<AuthDocument>,
    /// Endpoints in routing order.
    #[serde(default)]
    pub endpoints: IndexMap<String, EndpointDocument>,
    /// Host-native type names allowed to pass through conversions as casts.
    #[serde(default)]
    pub opaque: Vec<String>,
}

/// The two accepted spellings of an enum body.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnumSource {
    /// `[Red, Green]`: every label is its own wire-string.
    Labels(Vec<String>),
    /// `{Red: red, Green: green}`: label -> wire-string.
    Pairs(IndexMap<String, String>),
}

impl EnumSource {
    /// Flattens either spelling into ordered `(label, wire)` pairs.
    pub fn pairs(&self) -> Vec<(String, String)> {
        match self {
            EnumSource::Labels(labels) => labels.iter().map(|l| (l.clone(), l.clone())).collect(),
            EnumSource::Pairs(map) => map.iter().map(|(l, w)| (l.clone(), w.clone())).collect(),
        }
    }
}

/// The `auth` block.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthDocument {
    /// Privilege levels from lowest to highest (`Unauthorized` is implied below them).
    #[serde(default)]
    pub levels: Vec<String>,
    /// Credential type accepted by `generateToken`.
    #[serde(rename = "in")]
    pub credentials: String,
    /// Token type returned by `generateToken`.
    #[serde(rename = "out")]
    pub token: String,
}

/// A single endpoint entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointDocument {
    /// Request payload type.
    #[serde(rename = "in", default)]
    pub input: Option<String>,
    /// Response payload type.
    #[serde(rename = "out", default)]
    pub output: Option<String>,
    /// `none`, a level name, or `Custom`.
    #[serde(rename = "authLevel", default)]
    pub auth_level: Option<String>,
    /// Pass the caller's token as the first handler argument.
    #[serde(rename = "forwardToken", default)]
    pub forward_token: bool,
    /// Which handler interface implements the endpoint.
    #[serde(rename = "handledBy", default)]
    pub handled_by: HandledBy,
}

/// Handler interface selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandledBy {
    /// The primary `APIHandler`.
    #[default]
    Main,
    /// The `AuthHandler`.
    Auth,
}

/// Parses a schema document from YAML text.
pub fn parse_schema_document(yaml: &str) -> AppResult<SchemaDocument> {
    Ok(serde_yaml::from_str(yaml)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_document() {
        let doc = parse_schema_document("api_url: localhost:8080\n").unwrap();
        assert_eq!(doc.api_url, "localhost:8080");
        assert!(!doc.use_https);
        assert!(doc.endpoints.is_empty());
        assert!(doc.auth.is_none());
    }

    #[test]
    fn test_enum_spellings() {
        let yaml = r#"
api_url: x
enums:
  Color: [Red, Green]
  Mood:
    Happy: happy
    Sad: "very sad"
"#;
        let doc = parse_schema_document(yaml).unwrap();
        assert_eq!(
            doc.enums["Color"].pairs(),
            vec![("Red".into(), "Red".into()), ("Green".into(), "Green".into())]
        );
        assert_eq!(
            doc.enums["Mood"].pairs(),
            vec![
                ("Happy".into(), "happy".into()),
                ("Sad".into(), "very sad".into())
            ]
        );
    }

    #[test]
    fn test_endpoint_keys() {
        let yaml = r#"
api_url: x
endpoints:
  login:
    in: Credentials
    out: String
    authLevel: Admin
    forwardToken: true
    handledBy: auth
  ping: {}
"#;
        let doc = parse_schema_document(yaml).unwrap();
        let login = &doc.endpoints["login"];
        assert_eq!(login.input.as_deref(), Some("Credentials"));
        assert_eq!(login.output.as_deref(), Some("String"));
        assert_eq!(login.auth_level.as_deref(), Some("Admin"));
        assert!(login.forward_token);
        assert_eq!(login.handled_by, HandledBy::Auth);

        let ping = &doc.endpoints["ping"];
        assert!(ping.input.is_none());
        assert_eq!(ping.handled_by, HandledBy::Main);
    }

    #[test]
    fn test_unknown_handler_is_rejected() {
        let yaml = "api_url: x\nendpoints:\n  a:\n    handledBy: somewhere\n";
        assert!(parse_schema_document(yaml).is_err());
    }
}
