//! # Reference Runtime
//!
//! An interpreter for a built [`crate::ir::Program`] that behaves like the emitted
//! code: the dispatcher answers requests, the client runs stubs over a transport,
//! and both evaluate the same conversion expressions the printer renders.
//!
//! - **value**: the dynamic value model.
//! - **eval**: the expression evaluator with a conversion counter.
//! - **server**: the request dispatcher.
//! - **client**: the client stubs and session.

pub mod client;
pub mod error;
pub mod eval;
pub mod server;
pub mod value;

pub use client::{ApiFailure, ClientError, ClientRuntime, ClientSession, Transport};
pub use error::{RuntimeError, RuntimeResult};
pub use eval::{Evaluator, Scope};
pub use server::{
    ApiHost, Dispatcher, HandlerFault, RecordingResponse, Request, ResponseSink, Stage,
};
pub use value::Value;
