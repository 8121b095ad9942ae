#![deny(missing_docs)]

//! # Server Plan
//!
//! The dispatch state machine, one [`RoutePlan`] per endpoint, plus the abstract
//! handler interfaces the host implements.
//!
//! ```text
//! Received -> MethodChecked -> Routed -> Parsed -> Authorized -> Invoked -> Responded
//!     \____________\______________\_________\___________\____________/
//!                         early exit with an error code
//! ```

use crate::ir::expr::Expr;

/// Name bound to the decoded request envelope.
pub const BODY_BINDING: &str = "reqBody";
/// Name bound to the decoded request payload.
pub const REQUEST_BINDING: &str = "reqData";
/// Name bound to the decoded token.
pub const TOKEN_BINDING: &str = "token";
/// Name bound to the handler's return value.
pub const RESULT_BINDING: &str = "result";

/// CORS headers written before anything else.
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "X-Requested-With"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// A typed value and its conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// Type as written in the schema.
    pub ty: String,
    /// Decode (for inputs) or encode (for outputs) expression.
    pub conversion: Expr,
}

/// A parameter of a handler method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: String,
}

/// An abstract method the host implements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerMethod {
    /// Method name.
    pub name: String,
    /// Return type, `None` for `void`.
    pub returns: Option<String>,
    /// Parameters in call order.
    pub params: Vec<Param>,
}

/// An abstract interface (`APIHandler` or `AuthHandler`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerInterface {
    /// Interface name.
    pub name: String,
    /// Methods in declaration order.
    pub methods: Vec<HandlerMethod>,
}

/// Which interface a call goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerTarget {
    /// `APIHandler`.
    Main,
    /// `AuthHandler`.
    Auth,
}

/// An argument of the handler call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallArg {
    /// The decoded token.
    Token,
    /// The decoded request payload.
    Request,
}

/// The `Invoked` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerCall {
    /// Interface receiving the call.
    pub target: HandlerTarget,
    /// Method name.
    pub method: String,
    /// Arguments, token first when forwarded.
    pub args: Vec<CallArg>,
}

/// The `Authorized` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthGate {
    /// No check.
    Open,
    /// `validateToken(token)` must not be below `required`.
    Level {
        /// Required `AuthLevel` label.
        required: String,
        /// Its ordinal.
        ordinal: usize,
    },
    /// `<predicate>(token[, request])` must return true.
    Custom {
        /// Predicate method on `AuthHandler`.
        predicate: String,
        /// Whether the request payload is passed too.
        with_request: bool,
    },
}

/// Everything needed to serve one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    /// Endpoint name; matched against the path `/<endpoint>`.
    pub endpoint: String,
    /// Request payload decoded from `reqBody['data']`.
    pub request: Option<Binding>,
    /// Token decoded from `reqBody['token']`.
    pub token: Option<Binding>,
    /// Authorization gate.
    pub gate: AuthGate,
    /// Handler call.
    pub call: HandlerCall,
    /// Response payload encoded from the handler result.
    pub response: Option<Binding>,
}

impl RoutePlan {
    /// Request path served by this route.
    pub fn path(&self) -> String {
        format!("/{}", self.endpoint)
    }

    /// Whether the body has to be read and decoded at all.
    pub fn reads_body(&self) -> bool {
        self.request.is_some() || self.token.is_some()
    }
}

/// The complete server side.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerPlan {
    /// `APIHandler`.
    pub main: HandlerInterface,
    /// `AuthHandler`, when auth is configured.
    pub auth: Option<HandlerInterface>,
    /// Routes in routing order.
    pub routes: Vec<RoutePlan>,
}

impl ServerPlan {
    /// Finds the route serving `path`.
    pub fn route(&self, path: &str) -> Option<&RoutePlan> {
        self.routes.iter().find(|r| r.path() == path)
    }
}
