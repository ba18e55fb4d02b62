//! Native built-in functions: `print`, `len`, `abs`, `range`, and
//! `__repl_print__`, plus the bound methods (`list.append`, `str.join`,
//! `str.format`) [`crate::attr`] surfaces through attribute/method
//! resolution.

mod abs;
mod build_class;
mod len;
mod list_append;
mod print;
mod range;
mod repl_print;
mod str_format;
mod str_join;

pub use build_class::build_class;
pub use list_append::list_append;

use crate::{
    exception::RunResult,
    heap::{Heap, Object},
    intern::Interns,
    types::QstrTable,
    value::Value,
};

/// The three bound-method natives reachable via `load_attr`/`load_method`
/// on `str`/`list` receivers.
///
/// Installed once at startup so attribute lookup just copies one of
/// these `Value`s rather than allocating a fresh native-function object
/// on every access.
#[derive(Debug, Clone, Copy)]
pub struct CoreMethods {
    pub list_append: Value,
    pub str_join: Value,
    pub str_format: Value,
}

impl CoreMethods {
    /// # Errors
    /// Propagates a resource error from the embedder's allocation tracker.
    pub fn install(heap: &mut Heap) -> RunResult<Self> {
        Ok(Self {
            list_append: Value::Ref(heap.allocate(Object::Fun2(list_append::list_append))?),
            str_join: Value::Ref(heap.allocate(Object::Fun2(str_join::str_join))?),
            // `rt_make_function_var(1, …)`: the receiver string is a
            // mandatory fixed argument ahead of the variadic substitution
            // values.
            str_format: Value::Ref(heap.allocate(Object::FunVar { f: str_format::str_format, min_args: 1 })?),
        })
    }
}

/// Installs the handful of functions reachable by plain name lookup in
/// `builtins`: `print`, `len`, `abs`, `range`, `__repl_print__`.
///
/// `__build_class__` is deliberately **not** installed here. The
/// original reaches it through a dedicated `LOAD_BUILD_CLASS` opcode
/// rather than ordinary name resolution; this crate follows suit via
/// [`crate::Runtime::load_build_class`] instead of a by-name lookup.
///
/// # Errors
/// Propagates a resource error from the embedder's allocation tracker.
pub fn install(heap: &mut Heap, interns: &mut Interns) -> RunResult<QstrTable<Value>> {
    let mut builtins = QstrTable::new();
    // `print` accepts zero arguments, unlike `range`/`str.format`.
    builtins.insert(interns.intern("print"), Value::Ref(heap.allocate(Object::FunVar { f: print::print, min_args: 0 })?));
    builtins.insert(interns.intern("len"), Value::Ref(heap.allocate(Object::Fun1(len::len))?));
    builtins.insert(interns.intern("abs"), Value::Ref(heap.allocate(Object::Fun1(abs::abs))?));
    builtins.insert(interns.intern("range"), Value::Ref(heap.allocate(Object::FunVar { f: range::range, min_args: 1 })?));
    builtins.insert(interns.intern("__repl_print__"), Value::Ref(heap.allocate(Object::Fun1(repl_print::repl_print))?));
    Ok(builtins)
}
