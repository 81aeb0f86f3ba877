//! QScript Eval - evaluator and embedding engine.
//!
//! This crate runs checked QScript programs and exposes the runtime to a
//! host application.
//!
//! # Architecture
//!
//! - [`Engine`]: the host-facing facade (`evaluate`, `call`, globals,
//!   host objects, lifecycle)
//! - `interpreter`: the environment (scope chain, `this`, heap, Type arena)
//!   and the statement/expression walkers
//! - `builtins`: global functions, constants and builtin class members
//! - [`OutputSink`]: where `print` and `debug` write
//!
//! Statements produce a `Completion`; expressions produce
//! `Result<Value, Thrown>`. Uncaught throws cross the engine boundary as
//! [`EvalError`].

mod builtins;
mod completion;
mod config;
mod engine;
mod errors;
mod interpreter;
mod output;
mod tracing_setup;

pub use config::EvalConfig;
pub use engine::{Engine, InterruptHook};
pub use errors::EngineError;
pub use output::{BufferSink, OutputSink};
pub use tracing_setup::init_tracing;

pub use qs_diagnostic::{Diagnostic, ErrorCode, Severity};
pub use qs_object::{
    ErrorKind, EvalError, HostObject, NativeContext, NativeFunction, Thrown, Value,
};
