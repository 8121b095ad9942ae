//! # Runtime Errors
//!
//! Faults raised while evaluating generated conversions. These are what the emitted
//! code would throw; the dispatcher and the client map them onto wire exception codes.

use derive_more::Display;

/// A failure of generated code at run time.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum RuntimeError {
    /// A name was read before being bound.
    #[display("unbound name `{_0}`")]
    Unbound(String),

    /// A value had the wrong shape for the conversion applied to it.
    #[display("expected {expected}, found {found}")]
    TypeMismatch {
        /// What the conversion needed.
        expected: String,
        /// What it got.
        found: String,
    },

    /// A wire-string missing from an enum's lookup table.
    #[display("`{wire}` is not a variant of {enum_name}")]
    UnknownVariant {
        /// The enum.
        enum_name: String,
        /// The offending wire-string.
        wire: String,
    },

    /// An ordinal outside an enum's variant list.
    #[display("{ordinal} is not an ordinal of {enum_name}")]
    OrdinalOutOfRange {
        /// The enum.
        enum_name: String,
        /// The offending ordinal.
        ordinal: i64,
    },

    /// A map key string that does not parse as the key type.
    #[display("cannot parse map key `{key}` as {ty}")]
    KeyParse {
        /// The key string.
        key: String,
        /// The key type.
        ty: String,
    },

    /// A name the program does not declare.
    #[display("unknown declaration `{_0}`")]
    UnknownDeclaration(String),

    /// A value with no JSON form (a typed enum or object left unencoded, a non-string key).
    #[display("value is not JSON-encodable: {_0}")]
    NotEncodable(String),

    /// A body that is not UTF-8 or not JSON.
    #[display("malformed body: {_0}")]
    MalformedBody(String),

    /// A client call to an endpoint the program does not contain.
    #[display("unknown endpoint `{_0}`")]
    UnknownEndpoint(String),

    /// A client call missing its request payload.
    #[display("endpoint `{_0}` takes a request")]
    MissingRequest(String),
}

impl std::error::Error for RuntimeError {}

/// Helper type alias for runtime results.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
