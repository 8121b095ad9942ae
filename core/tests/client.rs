use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;
use thaum_core::ir::HandlerTarget;
use thaum_core::runtime::{
    ApiFailure, ApiHost, ClientError, ClientRuntime, ClientSession, Dispatcher, HandlerFault,
    RecordingResponse, Request, Transport, Value,
};
use thaum_core::{build_program, GenerationTarget, Program, Schema};
use url::Url;

const SCHEMA: &str = r#"
api_url: localhost:8080
classes:
  Point: { x: int, y: int }
auth:
  levels: [User, Admin]
  in: String
  out: String
endpoints:
  echo: { in: Point, out: Point }
  secret: { out: Point, authLevel: Admin }
  whoami: { out: String, authLevel: User, forwardToken: true }
"#;

struct Host;

impl ApiHost for Host {
    fn call(
        &mut self,
        _: HandlerTarget,
        method: &str,
        args: &[Value],
    ) -> Result<Value, HandlerFault> {
        match method {
            "generateToken" => Ok(Value::str("user-token")),
            "validateToken" => Ok(Value::Enum {
                ty: "AuthLevel".into(),
                ordinal: 1,
            }),
            _ => Ok(args.last().cloned().unwrap_or(Value::Null)),
        }
    }
}

/// Delivers requests straight to an in-process dispatcher.
struct Loopback<'p> {
    dispatcher: Dispatcher<'p>,
    requests: usize,
}

impl Transport for Loopback<'_> {
    fn post(&mut self, url: &Url, body: Option<&str>) -> Result<String, String> {
        self.requests += 1;
        let mut sink = RecordingResponse::default();
        self.dispatcher.handle(
            &Request::post(url.path(), body.unwrap_or("")),
            &mut Host,
            &mut sink,
        );
        sink.body()
            .map(str::to_string)
            .ok_or_else(|| "empty response".to_string())
    }
}

fn program() -> Program {
    let schema = Schema::from_yaml(SCHEMA).unwrap();
    build_program(&schema, GenerationTarget::Thaum).unwrap()
}

fn point(x: i64, y: i64) -> Value {
    let mut fields = indexmap::IndexMap::new();
    fields.insert("x".to_string(), Value::Int(x));
    fields.insert("y".to_string(), Value::Int(y));
    Value::Object {
        ty: "Point".into(),
        fields,
    }
}

fn recording_session() -> (ClientSession, Rc<RefCell<Vec<ApiFailure>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let session = ClientSession::with_error_hook(move |f| sink.borrow_mut().push(f.clone()));
    (session, seen)
}

#[test]
fn test_round_trip_through_dispatcher() {
    let program = program();
    let client = ClientRuntime::new(&program).unwrap();
    let mut transport = Loopback {
        dispatcher: Dispatcher::new(&program).unwrap(),
        requests: 0,
    };
    let (mut session, seen) = recording_session();

    let echoed = client
        .call(&mut session, &mut transport, "echo", Some(point(3, 4)))
        .unwrap();
    assert_eq!(echoed, point(3, 4));
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_authorize_then_forward_token() {
    let program = program();
    let client = ClientRuntime::new(&program).unwrap();
    let mut transport = Loopback {
        dispatcher: Dispatcher::new(&program).unwrap(),
        requests: 0,
    };
    let (mut session, _) = recording_session();

    client
        .authorize(&mut session, &mut transport, Value::str("pw"))
        .unwrap();
    assert_eq!(session.token, Some(Value::str("user-token")));

    let who = client
        .call(&mut session, &mut transport, "whoami", None)
        .unwrap();
    assert_eq!(who, Value::str("user-token"));
}

#[test]
fn test_failure_reports_once_and_skips_decoding() {
    let program = program();
    let client = ClientRuntime::new(&program).unwrap();
    let mut transport = Loopback {
        dispatcher: Dispatcher::new(&program).unwrap(),
        requests: 0,
    };
    let (mut session, seen) = recording_session();
    session.token = Some(Value::str("user-token"));

    let err = client
        .call(&mut session, &mut transport, "secret", None)
        .unwrap_err();

    let unauthorized = ApiFailure {
        code: 5,
        label: "Unauthorized".into(),
    };
    assert_eq!(err, ClientError::Api(unauthorized.clone()));
    assert_eq!(*seen.borrow(), vec![unauthorized]);
    assert_eq!(client.evaluator().conversions(), 0);
}

#[test]
fn test_missing_token_sends_nothing() {
    let program = program();
    let client = ClientRuntime::new(&program).unwrap();
    let mut transport = Loopback {
        dispatcher: Dispatcher::new(&program).unwrap(),
        requests: 0,
    };
    let (mut session, seen) = recording_session();

    let err = client
        .call(&mut session, &mut transport, "whoami", None)
        .unwrap_err();
    assert!(matches!(err, ClientError::Api(ApiFailure { code: 5, .. })));
    assert_eq!(transport.requests, 0);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn test_missing_request_payload_is_a_caller_error() {
    let program = program();
    let client = ClientRuntime::new(&program).unwrap();
    let mut transport = Loopback {
        dispatcher: Dispatcher::new(&program).unwrap(),
        requests: 0,
    };
    let (mut session, seen) = recording_session();

    assert!(matches!(
        client.call(&mut session, &mut transport, "echo", None),
        Err(ClientError::Runtime(_))
    ));
    assert!(seen.borrow().is_empty());
    assert_eq!(transport.requests, 0);
}

/// Replies with a fixed body.
struct Canned(&'static str);

impl Transport for Canned {
    fn post(&mut self, _: &Url, _: Option<&str>) -> Result<String, String> {
        Ok(self.0.to_string())
    }
}

#[test]
fn test_undecodable_payload_reports_internal_error_once() {
    let program = program();
    let client = ClientRuntime::new(&program).unwrap();
    let (mut session, seen) = recording_session();

    let err = client
        .call(
            &mut session,
            &mut Canned(r#"{"data":{"x":"a"},"code":0}"#),
            "echo",
            Some(point(1, 2)),
        )
        .unwrap_err();

    let internal = ApiFailure {
        code: 4,
        label: "InternalError".into(),
    };
    assert_eq!(err, ClientError::Api(internal.clone()));
    assert_eq!(*seen.borrow(), vec![internal]);
}
