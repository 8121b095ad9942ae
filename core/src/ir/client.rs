#![deny(missing_docs)]

//! # Client Plan
//!
//! One [`ClientStub`] per endpoint plus the session-level auth entry points.

use crate::ir::server::Binding;

/// Name bound to the caller-supplied request payload.
pub const REQUEST_PARAM: &str = "request";
/// Name bound to the session token inside a stub.
pub const TOKEN_LOCAL: &str = "token";
/// Name bound to the decoded response envelope.
pub const RESPONSE_BINDING: &str = "res";

/// Where the API lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase {
    /// Use `https`.
    pub https: bool,
    /// Host and optional port.
    pub host: String,
}

impl ApiBase {
    /// `http` or `https`.
    pub fn scheme(&self) -> &'static str {
        if self.https {
            "https"
        } else {
            "http"
        }
    }
}

/// One client entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientStub {
    /// Function name, equal to the endpoint name.
    pub name: String,
    /// Request payload, encoded from `request`.
    pub request: Option<Binding>,
    /// Token, encoded from the session token.
    pub token: Option<Binding>,
    /// Response payload, decoded from `res['data']`.
    pub response: Option<Binding>,
}

impl ClientStub {
    /// Path the stub posts to.
    pub fn path(&self) -> String {
        format!("/{}", self.name)
    }

    /// Whether the stub sends a body at all.
    pub fn sends_body(&self) -> bool {
        self.request.is_some() || self.token.is_some()
    }
}

/// `authorize` / `clearToken` support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAuth {
    /// Credential type.
    pub credentials: String,
    /// Token type stored in the session.
    pub token: String,
    /// Stub called by `authorize`.
    pub authorize_stub: String,
}

/// The complete client side.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientPlan {
    /// API location.
    pub base: ApiBase,
    /// Stubs in endpoint order.
    pub stubs: Vec<ClientStub>,
    /// Session auth support.
    pub auth: Option<ClientAuth>,
}

impl ClientPlan {
    /// Finds a stub by endpoint name.
    pub fn stub(&self, name: &str) -> Option<&ClientStub> {
        self.stubs.iter().find(|s| s.name == name)
    }
}
