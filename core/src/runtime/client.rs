#![deny(missing_docs)]

//! # Reference Client
//!
//! Executes [`ClientPlan`] stubs the way the emitted `API.<endpoint>` functions do,
//! over a pluggable [`Transport`].
//!
//! Every failure reaches the caller through the session's error hook exactly once:
//! a non-success code is reported as itself, a transport or decoding failure as
//! `InternalError`, and a missing token as `Unauthorized` before anything is sent.

use crate::ir::client::{REQUEST_PARAM, RESPONSE_BINDING, TOKEN_LOCAL};
use crate::ir::{ClientPlan, ClientStub, Program};
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::eval::{Evaluator, Scope};
use crate::runtime::value::Value;
use crate::schema::BuiltinException;
use derive_more::{Display, From};
use std::fmt;
use tracing::debug;
use url::Url;

/// A wire exception as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("APIException.{label} ({code})")]
pub struct ApiFailure {
    /// Ordinal in the exception enumeration.
    pub code: usize,
    /// Variant label.
    pub label: String,
}

/// Failure of a client call.
#[derive(Debug, Clone, PartialEq, Display, From)]
pub enum ClientError {
    /// Reported through the session hook.
    #[display("{_0}")]
    Api(ApiFailure),
    /// The call itself was malformed (unknown endpoint, missing request).
    #[display("{_0}")]
    Runtime(RuntimeError),
}

impl std::error::Error for ClientError {}

/// Sends a request and returns the raw response body.
pub trait Transport {
    /// POSTs `body` (if any) to `url`.
    fn post(&mut self, url: &Url, body: Option<&str>) -> Result<String, String>;
}

/// Per-caller state: the held token and the error hook.
#[derive(Default)]
pub struct ClientSession {
    /// The token obtained by `authorize`, if any.
    pub token: Option<Value>,
    on_error: Option<Box<dyn FnMut(&ApiFailure)>>,
}

impl fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSession")
            .field("token", &self.token)
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl ClientSession {
    /// A session without token or hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session reporting failures to `hook`.
    pub fn with_error_hook(hook: impl FnMut(&ApiFailure) + 'static) -> Self {
        Self {
            token: None,
            on_error: Some(Box::new(hook)),
        }
    }

    /// Forgets the held token.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Reports `failure` to the hook and returns it as an error.
    fn fail<T>(&mut self, failure: ApiFailure) -> Result<T, ClientError> {
        debug!(%failure, "client call failed");
        if let Some(hook) = self.on_error.as_mut() {
            hook(&failure);
        }
        Err(ClientError::Api(failure))
    }
}

/// Executes client stubs.
#[derive(Debug)]
pub struct ClientRuntime<'p> {
    plan: &'p ClientPlan,
    eval: Evaluator<'p>,
}

impl<'p> ClientRuntime<'p> {
    /// A runtime for `program`. Fails when the program has no client half.
    pub fn new(program: &'p Program) -> RuntimeResult<Self> {
        let plan = program
            .client
            .as_ref()
            .ok_or_else(|| RuntimeError::UnknownDeclaration("API".into()))?;
        Ok(Self {
            plan,
            eval: Evaluator::new(program),
        })
    }

    /// The evaluator, for inspecting conversion counts.
    pub fn evaluator(&self) -> &Evaluator<'p> {
        &self.eval
    }

    /// Endpoint URL of `stub`.
    pub fn url(&self, stub: &ClientStub) -> Result<Url, url::ParseError> {
        let base = Url::parse(&format!(
            "{}://{}",
            self.plan.base.scheme(),
            self.plan.base.host
        ))?;
        base.join(&stub.path())
    }

    fn failure(&self, code: usize) -> ApiFailure {
        let label = self
            .eval
            .program()
            .exceptions
            .variants
            .get(code)
            .map(|(label, _)| label.clone())
            .unwrap_or_default();
        ApiFailure { code, label }
    }

    fn builtin(&self, exception: BuiltinException) -> ApiFailure {
        self.failure(exception.ordinal())
    }

    /// Calls `endpoint`.
    ///
    /// # Arguments
    ///
    /// * `session` - Token and error hook.
    /// * `transport` - Where the request goes.
    /// * `endpoint` - Endpoint name.
    /// * `request` - Typed request payload, required when the endpoint takes one.
    ///
    /// Returns the typed response, or `Value::Null` when the endpoint has none.
    pub fn call(
        &self,
        session: &mut ClientSession,
        transport: &mut dyn Transport,
        endpoint: &str,
        request: Option<Value>,
    ) -> Result<Value, ClientError> {
        let stub = self
            .plan
            .stub(endpoint)
            .ok_or_else(|| RuntimeError::UnknownEndpoint(endpoint.to_string()))?;

        // 1. Token
        let token = match (&stub.token, &session.token) {
            (Some(_), None) => {
                return session.fail(self.builtin(BuiltinException::Unauthorized));
            }
            (Some(_), Some(token)) => Some(token.clone()),
            (None, _) => None,
        };

        // 2. Request envelope
        let mut scope = Scope::new();
        if stub.request.is_some() {
            let value =
                request.ok_or_else(|| RuntimeError::MissingRequest(endpoint.to_string()))?;
            scope.push(REQUEST_PARAM, value);
        }
        let body = match self.request_body(stub, &mut scope, token) {
            Ok(body) => body,
            Err(e) => {
                debug!(endpoint, error = %e, "request encoding failed");
                return session.fail(self.builtin(BuiltinException::InternalError));
            }
        };

        // 3. Transport
        let response = match self.exchange(stub, transport, body.as_deref()) {
            Ok(response) => response,
            Err(e) => {
                debug!(endpoint, error = %e, "transport failed");
                return session.fail(self.builtin(BuiltinException::InternalError));
            }
        };

        // 4. Code
        let code = match response.get("code") {
            Ok(Value::Int(code)) if code >= 0 && (code as usize) < self.exception_count() => {
                code as usize
            }
            _ => return session.fail(self.builtin(BuiltinException::InternalError)),
        };
        if code != BuiltinException::Success.ordinal() {
            return session.fail(self.failure(code));
        }

        // 5. Payload
        match &stub.response {
            Some(binding) => {
                match self
                    .eval
                    .eval_with(&binding.conversion, RESPONSE_BINDING, response)
                {
                    Ok(value) => Ok(value),
                    Err(e) => {
                        debug!(endpoint, error = %e, "response decoding failed");
                        session.fail(self.builtin(BuiltinException::InternalError))
                    }
                }
            }
            None => Ok(Value::Null),
        }
    }

    /// Calls `_authorize` and stores the returned token in `session`.
    pub fn authorize(
        &self,
        session: &mut ClientSession,
        transport: &mut dyn Transport,
        credentials: Value,
    ) -> Result<(), ClientError> {
        let auth = self
            .plan
            .auth
            .as_ref()
            .ok_or_else(|| RuntimeError::UnknownDeclaration("authorize".into()))?;
        let token = self.call(session, transport, &auth.authorize_stub, Some(credentials))?;
        session.token = Some(token);
        Ok(())
    }

    fn exception_count(&self) -> usize {
        self.eval.program().exceptions.variants.len()
    }

    fn request_body(
        &self,
        stub: &ClientStub,
        scope: &mut Scope,
        token: Option<Value>,
    ) -> RuntimeResult<Option<String>> {
        if !stub.sends_body() {
            return Ok(None);
        }
        let mut envelope = Vec::new();
        if let Some(binding) = &stub.request {
            envelope.push((Value::str("data"), self.eval.eval(&binding.conversion, scope)?));
        }
        if let (Some(binding), Some(token)) = (&stub.token, token) {
            scope.push(TOKEN_LOCAL, token);
            let encoded = self.eval.eval(&binding.conversion, scope);
            scope.pop();
            envelope.push((Value::str("token"), encoded?));
        }
        Value::Map(envelope).to_json_string().map(Some)
    }

    fn exchange(
        &self,
        stub: &ClientStub,
        transport: &mut dyn Transport,
        body: Option<&str>,
    ) -> Result<Value, String> {
        let url = self.url(stub).map_err(|e| e.to_string())?;
        let text = transport.post(&url, body)?;
        Value::parse(&text).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{build_program, GenerationTarget};
    use crate::schema::Schema;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Canned {
        reply: Result<String, String>,
        sent: Vec<(String, Option<String>)>,
    }

    impl Transport for Canned {
        fn post(&mut self, url: &Url, body: Option<&str>) -> Result<String, String> {
            self.sent.push((url.to_string(), body.map(str::to_string)));
            self.reply.clone()
        }
    }

    fn program() -> Program {
        let schema = Schema::from_yaml(
            r#"
api_url: localhost:8080
auth:
  levels: [User]
  in: String
  out: String
endpoints:
  ping: {}
  count: { out: int, authLevel: User }
"#,
        )
        .unwrap();
        build_program(&schema, GenerationTarget::Frontend).unwrap()
    }

    #[test]
    fn test_url_uses_scheme_host_and_name() {
        let program = program();
        let client = ClientRuntime::new(&program).unwrap();
        let stub = program.client.as_ref().unwrap().stub("ping").unwrap();
        assert_eq!(
            client.url(stub).unwrap().as_str(),
            "http://localhost:8080/ping"
        );
    }

    #[test]
    fn test_missing_token_fails_without_sending() {
        let program = program();
        let client = ClientRuntime::new(&program).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut session =
            ClientSession::with_error_hook(move |f| sink.borrow_mut().push(f.clone()));
        let mut transport = Canned {
            reply: Ok(r#"{"code":0,"data":1}"#.into()),
            sent: Vec::new(),
        };

        let err = client
            .call(&mut session, &mut transport, "count", None)
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::Api(ApiFailure {
                code: 5,
                label: "Unauthorized".into()
            })
        );
        assert!(transport.sent.is_empty());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_authorize_stores_token_and_sends_it() {
        let program = program();
        let client = ClientRuntime::new(&program).unwrap();
        let mut session = ClientSession::new();
        let mut transport = Canned {
            reply: Ok(r#"{"data":"t0k","code":0}"#.into()),
            sent: Vec::new(),
        };
        client
            .authorize(&mut session, &mut transport, Value::str("secret"))
            .unwrap();
        assert_eq!(session.token, Some(Value::str("t0k")));
        assert_eq!(
            transport.sent[0],
            (
                "http://localhost:8080/_authorize".to_string(),
                Some(r#"{"data":"secret"}"#.to_string())
            )
        );

        transport.reply = Ok(r#"{"data":7,"code":0}"#.into());
        let count = client
            .call(&mut session, &mut transport, "count", None)
            .unwrap();
        assert_eq!(count, Value::Int(7));
        assert_eq!(transport.sent[1].1.as_deref(), Some(r#"{"token":"t0k"}"#));

        session.clear_token();
        assert!(session.token.is_none());
    }

    #[test]
    fn test_transport_failure_is_internal_error() {
        let program = program();
        let client = ClientRuntime::new(&program).unwrap();
        let mut session = ClientSession::new();
        let mut transport = Canned {
            reply: Err("connection refused".into()),
            sent: Vec::new(),
        };
        let err = client
            .call(&mut session, &mut transport, "ping", None)
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::Api(ApiFailure {
                code: 4,
                label: "InternalError".into()
            })
        );
        assert_eq!(transport.sent[0].1, None);
    }

    #[test]
    fn test_unknown_endpoint_is_not_reported_to_the_hook() {
        let program = program();
        let client = ClientRuntime::new(&program).unwrap();
        let mut session = ClientSession::with_error_hook(|_| panic!("hook must not run"));
        let mut transport = Canned {
            reply: Ok("{}".into()),
            sent: Vec::new(),
        };
        let err = client
            .call(&mut session, &mut transport, "nope", None)
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::Runtime(RuntimeError::UnknownEndpoint("nope".into()))
        );
    }
}
