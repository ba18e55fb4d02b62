//! Execution tracing.
//!
//! A trait-based hook system rather than a `log`/`tracing` dependency:
//! with [`NoopTracer`] every hook call is inlined away, so a non-tracing
//! embedder pays nothing for this module's existence.

use crate::{intern::StringId, value::Value};

/// Trace event emitted at a hook point.
#[derive(Debug, Clone)]
pub enum TraceEvent {
    Call { name: Option<StringId>, argc: usize },
    Return { value: Value },
    Raise { message: String },
    IterExhausted,
}

/// Hook points fired around call dispatch and iterator exhaustion.
///
/// | Tracer | Purpose |
/// |---|---|
/// | [`NoopTracer`] | zero-cost no-op, the default |
/// | [`StderrTracer`] | human-readable trace to stderr |
pub trait VmTracer {
    fn on_call(&mut self, _name: Option<StringId>, _argc: usize) {}
    fn on_return(&mut self, _value: Value) {}
    fn on_raise(&mut self, _message: &str) {}
    fn on_iter_exhausted(&mut self) {}
}

/// Zero-cost default: every hook is an empty function the optimizer
/// deletes entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl VmTracer for NoopTracer {}

/// Prints each event to stderr as it happens. Useful for debugging an
/// embedding without wiring up a real logging framework.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrTracer;

impl VmTracer for StderrTracer {
    fn on_call(&mut self, name: Option<StringId>, argc: usize) {
        eprintln!("call: name_id={name:?} argc={argc}");
    }

    fn on_return(&mut self, value: Value) {
        eprintln!("return: {value:?}");
    }

    fn on_raise(&mut self, message: &str) {
        eprintln!("raise: {message}");
    }

    fn on_iter_exhausted(&mut self) {
        eprintln!("iter exhausted");
    }
}
