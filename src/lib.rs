//! Object model and runtime core for a small embeddable dynamic-language
//! interpreter.
//!
//! This crate is the leaf the rest of an interpreter is built on: tagged
//! values, the open-addressed table every namespace/dict/class body
//! uses, operator dispatch, the function-call protocol, and the
//! iterator protocol. The bytecode execution engine and the
//! lexer/parser/emitter that feeds it are external collaborators this
//! crate only defines a seam for (see [`function::BytecodeEngine`]).

mod attr;
mod builtins;
mod call;
mod exception;
mod export;
mod expressions;
mod format;
mod function;
mod heap;
mod intern;
mod iter;
mod namespace;
mod py_hash;
mod resource;
mod tracer;
mod types;
mod value;

pub use crate::{
    call::{AsmFn, NativeFn0, NativeFn1, NativeFn2, NativeFnN, NativeFnVar},
    exception::{ExcArg, ExcType, RunError, RunResult, SimpleException},
    export::ExportSlot,
    expressions::{BinaryOp, CompareOp, UnaryOp},
    function::{BytecodeEngine, CodeId, CodeKind, CodeRegistry, NativeKind, MAIN_MODULE_CODE_ID},
    heap::{BoundMethod, GenInstance, GenState, GenWrap, Heap, HeapId, Object, RangeIter, RangeObj, ResumeOutcome},
    intern::{Interns, StringId, WellKnownNames},
    namespace::Namespaces,
    resource::{LimitedTracker, NoLimitTracker, ResourceError, ResourceTracker},
    tracer::{NoopTracer, StderrTracer, TraceEvent, VmTracer},
    types::{Map, QstrTable, Set},
    value::{ConstKind, Value},
};

use crate::builtins::CoreMethods;

/// The whole runtime core, owned by an embedding host: heap, namespaces,
/// interner, code registry, and the well-known names/bound-method
/// natives the dispatch operations below need.
///
/// Does not own a [`BytecodeEngine`]: every operation that might need to
/// run bytecode (`call_function_n`, a generator's `iternext`,
/// `load_build_class`) takes one by `&mut dyn BytecodeEngine` instead.
/// The engine is this crate's one external collaborator; owning it here
/// would force every embedder to have a concrete engine type available
/// before a `Runtime` could even exist.
#[derive(Debug)]
pub struct Runtime {
    pub heap: Heap,
    pub namespaces: Namespaces,
    pub interns: Interns,
    pub registry: CodeRegistry,
    pub names: WellKnownNames,
    core: CoreMethods,
}

impl Runtime {
    /// Builds a fresh runtime: empty namespaces except `builtins`
    /// (populated with `print`/`len`/`abs`/`range`/`__repl_print__`), an
    /// empty code registry (id 1 reserved for the main module), and the
    /// well-known-name handles/bound-method natives installed.
    ///
    /// # Errors
    /// Propagates a resource error from `tracker` rejecting one of the
    /// startup allocations.
    pub fn new(tracker: impl ResourceTracker + 'static) -> RunResult<Self> {
        let mut heap = Heap::new(tracker);
        let mut interns = Interns::new();
        let names = WellKnownNames::new(&mut interns);
        let core = CoreMethods::install(&mut heap)?;
        let mut namespaces = Namespaces::new();
        namespaces.builtins = builtins::install(&mut heap, &mut interns)?;
        Ok(Self {
            heap,
            namespaces,
            interns,
            registry: CodeRegistry::new(),
            names,
            core,
        })
    }

    // Export table (§6), in `ExportSlot`'s fixed order.

    /// `ExportSlot::LoadConstDec`.
    pub fn load_const_dec(&mut self, text: &str) -> RunResult<Value> {
        format::load_const_dec(text, &mut self.heap)
    }

    /// `ExportSlot::LoadConstStr`.
    pub fn load_const_str(&mut self, text: &str) -> RunResult<Value> {
        format::load_const_str(text, &mut self.heap)
    }

    /// `ExportSlot::LoadName`.
    pub fn load_name(&self, name: StringId) -> RunResult<Value> {
        self.namespaces.load_name(name, &self.interns)
    }

    /// `ExportSlot::LoadGlobal`.
    pub fn load_global(&self, name: StringId) -> RunResult<Value> {
        self.namespaces.load_global(name, &self.interns)
    }

    /// `ExportSlot::LoadBuildClass`.
    pub fn load_build_class(&mut self, engine: &mut dyn BytecodeEngine, body_callable: Value, class_name: StringId) -> RunResult<Value> {
        builtins::build_class(&mut self.heap, engine, &mut self.namespaces, &self.interns, &self.names, body_callable, class_name)
    }

    /// `ExportSlot::LoadAttr`.
    pub fn load_attr(&mut self, base: Value, name: StringId) -> RunResult<Value> {
        attr::load_attr(base, name, &mut self.heap, &self.names, &self.core)
    }

    /// `ExportSlot::LoadMethod`.
    pub fn load_method(&mut self, base: Value, name: StringId) -> RunResult<(Value, Option<Value>)> {
        attr::load_method(base, name, &mut self.heap, &self.names, &self.core, &self.interns)
    }

    /// `ExportSlot::StoreName`.
    pub fn store_name(&mut self, name: StringId, value: Value) {
        self.namespaces.store_name(name, value);
    }

    /// `ExportSlot::StoreAttr`.
    pub fn store_attr(&mut self, base: Value, name: StringId, value: Value) -> RunResult<()> {
        attr::store_attr(base, name, value, &mut self.heap)
    }

    /// `ExportSlot::StoreSubscr`.
    pub fn store_subscr(&mut self, base: Value, index: Value, value: Value) -> RunResult<()> {
        expressions::subscr_store(base, index, value, &mut self.heap)
    }

    /// `ExportSlot::IsTrue`.
    #[must_use]
    pub fn is_true(&self, v: Value) -> bool {
        expressions::is_true(v, &self.heap)
    }

    /// `ExportSlot::UnaryOp`.
    pub fn unary_op(&mut self, op: UnaryOp, v: Value) -> RunResult<Value> {
        expressions::unary_op(op, v, &mut self.heap)
    }

    /// `ExportSlot::BuildTuple`.
    pub fn build_tuple(&mut self, items: Vec<Value>) -> RunResult<Value> {
        Ok(Value::Ref(self.heap.allocate(Object::Tuple(items))?))
    }

    /// `ExportSlot::BuildList`.
    pub fn build_list(&mut self, items: Vec<Value>) -> RunResult<Value> {
        Ok(Value::Ref(self.heap.allocate(Object::List(items))?))
    }

    /// `ExportSlot::ListAppend`.
    pub fn list_append(&mut self, list: Value, item: Value) -> RunResult<Value> {
        builtins::list_append(&mut self.heap, list, item)
    }

    /// `ExportSlot::BuildMap`.
    pub fn build_map(&mut self) -> RunResult<Value> {
        Ok(Value::Ref(self.heap.allocate(Object::Map(Map::new()))?))
    }

    /// `ExportSlot::StoreMap`.
    pub fn store_map(&mut self, map: Value, key: Value, value: Value) -> RunResult<()> {
        let Value::Ref(id) = map else {
            return Err(ExcType::type_error("store_map target is not a dict"));
        };
        if !matches!(self.heap.get(id), Object::Map(_)) {
            return Err(ExcType::type_error("store_map target is not a dict"));
        }
        let Object::Map(slot) = self.heap.get_mut(id) else { unreachable!() };
        let mut owned = std::mem::take(slot);
        let result = owned.insert(key, value, &self.heap);
        let Object::Map(slot) = self.heap.get_mut(id) else { unreachable!() };
        *slot = owned;
        result.map(|_| ())
    }

    /// `ExportSlot::BuildSet`.
    pub fn build_set(&mut self) -> RunResult<Value> {
        Ok(Value::Ref(self.heap.allocate(Object::Set(Set::new()))?))
    }

    /// `ExportSlot::StoreSet`.
    pub fn store_set(&mut self, set: Value, value: Value) -> RunResult<()> {
        let Value::Ref(id) = set else {
            return Err(ExcType::type_error("store_set target is not a set"));
        };
        if !matches!(self.heap.get(id), Object::Set(_)) {
            return Err(ExcType::type_error("store_set target is not a set"));
        }
        let Object::Set(slot) = self.heap.get_mut(id) else { unreachable!() };
        let mut owned = std::mem::take(slot);
        let result = owned.add(value, &self.heap);
        let Object::Set(slot) = self.heap.get_mut(id) else { unreachable!() };
        *slot = owned;
        result.map(|_| ())
    }

    /// `ExportSlot::MakeFunctionFromId`.
    pub fn make_function_from_id(&mut self, id: CodeId) -> RunResult<Value> {
        function::make_function_from_id(&self.registry, id, &mut self.heap)
    }

    /// `ExportSlot::CallFunctionN`.
    pub fn call_function_n(&mut self, engine: &mut dyn BytecodeEngine, callee: Value, argv: &[Value]) -> RunResult<Value> {
        call::call_function_n(&mut self.heap, engine, callee, argv)
    }

    /// `ExportSlot::CallMethodN`.
    pub fn call_method_n(&mut self, engine: &mut dyn BytecodeEngine, method: Value, argv: &[Value]) -> RunResult<Value> {
        call::call_method_n(&mut self.heap, engine, method, argv)
    }

    /// `ExportSlot::BinaryOp`.
    pub fn binary_op(&mut self, op: BinaryOp, a: Value, b: Value) -> RunResult<Value> {
        expressions::binary_op(op, a, b, &mut self.heap)
    }

    /// `ExportSlot::CompareOp`.
    pub fn compare_op(&self, op: CompareOp, a: Value, b: Value) -> RunResult<Value> {
        expressions::compare_op(op, a, b, &self.heap)
    }

    /// `ExportSlot::GetIter`.
    pub fn getiter(&mut self, v: Value) -> RunResult<Value> {
        iter::getiter(v, &mut self.heap)
    }

    /// `ExportSlot::IterNext`.
    pub fn iternext(&mut self, engine: &mut dyn BytecodeEngine, it: Value) -> RunResult<Value> {
        iter::iternext(it, &mut self.heap, engine)
    }

    /// The generator-`__next__` seam: not part of the fixed export
    /// table, since only a bytecode engine recognizing a `__next__`
    /// method call needs it (see [`crate::attr::load_method`]'s doc
    /// comment).
    pub fn next_builtin(&mut self, engine: &mut dyn BytecodeEngine, it: Value) -> RunResult<Value> {
        iter::next_builtin(it, &mut self.heap, engine)
    }
}
