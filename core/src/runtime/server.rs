#![deny(missing_docs)]

//! # Reference Dispatcher
//!
//! Executes a [`ServerPlan`] the way the emitted `handleRequest` does, against an
//! in-process [`ApiHost`] and [`ResponseSink`].
//!
//! The envelope is computed first and written by a single `respond` call at the end,
//! so every path produces exactly one write (or none, for OPTIONS) and one close.

use crate::ir::server::{BODY_BINDING, CORS_HEADERS, RESULT_BINDING};
use crate::ir::{AuthGate, CallArg, HandlerTarget, Program, RoutePlan, ServerPlan};
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::eval::{Evaluator, Scope};
use crate::runtime::value::Value;
use crate::schema::BuiltinException;
use std::fmt;
use tracing::{debug, warn};

/// An incoming HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method.
    pub method: String,
    /// Request path, e.g. `/echo`.
    pub path: String,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl Request {
    /// A POST request with a text body.
    pub fn post(path: &str, body: &str) -> Self {
        Self {
            method: "POST".into(),
            path: path.into(),
            body: body.as_bytes().to_vec(),
        }
    }
}

/// Where the response goes.
pub trait ResponseSink {
    /// Adds a header.
    fn add_header(&mut self, name: &str, value: &str);
    /// Writes body text.
    fn write(&mut self, body: &str);
    /// Finishes the response.
    fn close(&mut self);
}

/// A sink that records everything, for assertions.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingResponse {
    /// Headers in order.
    pub headers: Vec<(String, String)>,
    /// Every `write` call.
    pub writes: Vec<String>,
    /// Number of `close` calls.
    pub closes: usize,
}

impl RecordingResponse {
    /// The single written body, when exactly one write happened.
    pub fn body(&self) -> Option<&str> {
        match self.writes.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    /// The `code` of the written envelope.
    pub fn code(&self) -> Option<i64> {
        let envelope = Value::parse(self.body()?).ok()?;
        match envelope.get("code").ok()? {
            Value::Int(code) => Some(code),
            _ => None,
        }
    }
}

impl ResponseSink for RecordingResponse {
    fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn write(&mut self, body: &str) {
        self.writes.push(body.to_string());
    }

    fn close(&mut self) {
        self.closes += 1;
    }
}

/// How a handler call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerFault {
    /// The handler threw a declared exception, by label (e.g. `NotFound`).
    Declared(String),
    /// Anything else.
    Internal(String),
}

impl fmt::Display for HandlerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerFault::Declared(label) => write!(f, "APIException.{}", label),
            HandlerFault::Internal(msg) => f.write_str(msg),
        }
    }
}

/// The host's implementation of `APIHandler` and `AuthHandler`.
pub trait ApiHost {
    /// Calls `method` on the interface selected by `target`.
    ///
    /// # Arguments
    ///
    /// * `target` - `Main` for `APIHandler`, `Auth` for `AuthHandler`.
    /// * `method` - Method name (`validateToken`, `<endpoint>Auth`, an endpoint name).
    /// * `args` - Decoded arguments in declaration order.
    ///
    /// Returns `Value::Null` for `void` methods.
    fn call(
        &mut self,
        target: HandlerTarget,
        method: &str,
        args: &[Value],
    ) -> Result<Value, HandlerFault>;
}

/// States a request passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Headers written.
    Received,
    /// Method is POST.
    MethodChecked,
    /// Path matched a route.
    Routed,
    /// Body and token decoded.
    Parsed,
    /// Gate passed.
    Authorized,
    /// Handler returned.
    Invoked,
    /// Response finalized.
    Responded,
}

/// Executes server plans.
#[derive(Debug)]
pub struct Dispatcher<'p> {
    plan: &'p ServerPlan,
    eval: Evaluator<'p>,
}

impl<'p> Dispatcher<'p> {
    /// A dispatcher for `program`. Fails when the program has no server half.
    pub fn new(program: &'p Program) -> RuntimeResult<Self> {
        let plan = program
            .server
            .as_ref()
            .ok_or_else(|| RuntimeError::UnknownDeclaration("handleRequest".into()))?;
        Ok(Self {
            plan,
            eval: Evaluator::new(program),
        })
    }

    /// The evaluator, for inspecting conversion counts.
    pub fn evaluator(&self) -> &Evaluator<'p> {
        &self.eval
    }

    /// Handles one request, returning the stages visited.
    pub fn handle(
        &self,
        request: &Request,
        host: &mut dyn ApiHost,
        sink: &mut dyn ResponseSink,
    ) -> Vec<Stage> {
        let mut trace = vec![Stage::Received];
        for (name, value) in CORS_HEADERS {
            sink.add_header(name, value);
        }

        let envelope = match request.method.as_str() {
            "OPTIONS" => None,
            "POST" => {
                trace.push(Stage::MethodChecked);
                Some(self.dispatch(request, host, &mut trace))
            }
            other => {
                debug!(method = other, "unsupported method");
                Some(failure(BuiltinException::UnsupportedMethod))
            }
        };

        respond(sink, envelope);
        trace.push(Stage::Responded);
        trace
    }

    fn dispatch(
        &self,
        request: &Request,
        host: &mut dyn ApiHost,
        trace: &mut Vec<Stage>,
    ) -> Value {
        let Some(route) = self.plan.route(&request.path) else {
            debug!(path = %request.path, "unsupported endpoint");
            return failure(BuiltinException::UnsupportedEndpoint);
        };
        trace.push(Stage::Routed);

        // 1. Parse
        let (request_data, token) = match self.parse(route, &request.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(endpoint = %route.endpoint, error = %e, "object format error");
                return failure(BuiltinException::ObjectFormatError);
            }
        };
        trace.push(Stage::Parsed);

        // 2. Authorize, invoke, encode: every failure here is a handler failure
        match self.invoke(route, request_data, token, host, trace) {
            Ok(envelope) => envelope,
            Err(HandlerFault::Declared(label)) => {
                match self.eval.program().exceptions.ordinal(&label) {
                    Some(code) => code_envelope(code),
                    None => {
                        warn!(label = %label, "handler raised an undeclared exception");
                        failure(BuiltinException::InternalError)
                    }
                }
            }
            Err(HandlerFault::Internal(msg)) => {
                warn!(
                    endpoint = %route.endpoint,
                    error = %msg,
                    "unhandled exception from handler"
                );
                failure(BuiltinException::InternalError)
            }
        }
    }

    fn parse(
        &self,
        route: &RoutePlan,
        body: &[u8],
    ) -> RuntimeResult<(Option<Value>, Option<Value>)> {
        if !route.reads_body() {
            return Ok((None, None));
        }
        let text =
            std::str::from_utf8(body).map_err(|e| RuntimeError::MalformedBody(e.to_string()))?;
        let mut scope = Scope::with(BODY_BINDING, Value::parse(text)?);

        let request = route
            .request
            .as_ref()
            .map(|b| self.eval.eval(&b.conversion, &mut scope))
            .transpose()?;
        let token = route
            .token
            .as_ref()
            .map(|b| self.eval.eval(&b.conversion, &mut scope))
            .transpose()?;
        Ok((request, token))
    }

    fn invoke(
        &self,
        route: &RoutePlan,
        request: Option<Value>,
        token: Option<Value>,
        host: &mut dyn ApiHost,
        trace: &mut Vec<Stage>,
    ) -> Result<Value, HandlerFault> {
        let token_arg = token.clone().unwrap_or(Value::Null);
        let request_arg = request.clone().unwrap_or(Value::Null);

        match &route.gate {
            AuthGate::Open => {}
            AuthGate::Level { ordinal, .. } => {
                let level =
                    host.call(HandlerTarget::Auth, "validateToken", &[token_arg.clone()])?;
                match level {
                    Value::Enum { ordinal: actual, .. } if actual < *ordinal => {
                        return Ok(failure(BuiltinException::Unauthorized))
                    }
                    Value::Enum { .. } => {}
                    other => {
                        return Err(HandlerFault::Internal(format!(
                            "validateToken returned {}",
                            other.kind()
                        )))
                    }
                }
            }
            AuthGate::Custom {
                predicate,
                with_request,
            } => {
                let mut args = vec![token_arg.clone()];
                if *with_request {
                    args.push(request_arg.clone());
                }
                match host.call(HandlerTarget::Auth, predicate, &args)? {
                    Value::Bool(true) => {}
                    Value::Bool(false) => return Ok(failure(BuiltinException::Unauthorized)),
                    other => {
                        return Err(HandlerFault::Internal(format!(
                            "{} returned {}",
                            predicate,
                            other.kind()
                        )))
                    }
                }
            }
        }
        trace.push(Stage::Authorized);

        let args: Vec<Value> = route
            .call
            .args
            .iter()
            .map(|a| match a {
                CallArg::Token => token_arg.clone(),
                CallArg::Request => request_arg.clone(),
            })
            .collect();
        let result = host.call(route.call.target, &route.call.method, &args)?;
        trace.push(Stage::Invoked);

        let success = BuiltinException::Success.ordinal();
        match &route.response {
            Some(binding) => {
                let data = self
                    .eval
                    .eval_with(&binding.conversion, RESULT_BINDING, result)
                    .map_err(|e| HandlerFault::Internal(e.to_string()))?;
                Ok(Value::object([
                    ("data", data),
                    ("code", Value::Int(success as i64)),
                ]))
            }
            None => Ok(code_envelope(success)),
        }
    }
}

fn code_envelope(code: usize) -> Value {
    Value::object([("code", Value::Int(code as i64))])
}

fn failure(exception: BuiltinException) -> Value {
    code_envelope(exception.ordinal())
}

/// Writes at most one envelope, then closes. An envelope that cannot be encoded is
/// replaced by `InternalError`.
fn respond(sink: &mut dyn ResponseSink, envelope: Option<Value>) {
    if let Some(envelope) = envelope {
        let body = envelope.to_json_string().unwrap_or_else(|e| {
            warn!(error = %e, "response encoding error");
            format!(
                "{{\"code\":{}}}",
                BuiltinException::InternalError.ordinal()
            )
        });
        sink.write(&body);
    }
    sink.close();
}
