//! The function-call protocol: native function pointer signatures, the
//! reversed-argv calling convention for fixed-arity callables, and the
//! inline-assembly marshaling boundary.
//!
//! The reversed convention (`argv[n-1]` holds the first positional
//! argument) exists because it aliases a downward-growing VM value stack
//! in the original runtime — pushing arguments left-to-right naturally
//! lays them out in reverse relative to a stack base pointer. This crate
//! keeps that convention at the native-function boundary since an
//! external bytecode engine is expected to produce argv that way, and
//! normalizes to forward order only where a callee needs it (FUN_VAR,
//! GEN_WRAP resume).

use smallvec::SmallVec;

use crate::{
    exception::{ExcType, RunResult},
    heap::{BoundMethod, GenInstance, GenState, Heap, Object, ResumeOutcome},
    value::Value,
};

/// A 0-argument native callable.
pub type NativeFn0 = fn(&mut Heap) -> RunResult<Value>;
/// A 1-argument native callable. `arg` is the sole positional argument.
pub type NativeFn1 = fn(&mut Heap, Value) -> RunResult<Value>;
/// A 2-argument native callable, receiver-first is not implied here:
/// `args` is `[argv[1], argv[0]]` already resolved by the caller — see
/// [`call_function_n`].
pub type NativeFn2 = fn(&mut Heap, Value, Value) -> RunResult<Value>;
/// A fixed-arity-`n` native callable, `argv` given in the reversed
/// convention (`argv[n-1]` is the first positional argument).
pub type NativeFnN = fn(&mut Heap, &[Value]) -> RunResult<Value>;
/// A variadic native callable. Unlike the fixed-arity kinds, `args` here
/// is already normalized to forward positional order, since variadic
/// callees overwhelmingly want to iterate "first arg to last".
pub type NativeFnVar = fn(&mut Heap, &[Value]) -> RunResult<Value>;

/// An inline-assembly / JIT-compiled entry point, fixed at 0-3 raw
/// machine-word arguments and a raw machine-word return, per the
/// marshaling boundary in [`convert_obj_for_inline_asm`]/
/// [`convert_val_from_inline_asm`].
#[derive(Debug, Clone, Copy)]
pub enum AsmFn {
    Fn0(fn() -> usize),
    Fn1(fn(usize) -> usize),
    Fn2(fn(usize, usize) -> usize),
    Fn3(fn(usize, usize, usize) -> usize),
}

/// Converts a boxed [`Value`] into the raw machine word an inline-asm
/// entry point expects.
///
/// Only small ints and the `None`/bool singletons convert; anything else
/// (heap-resident kinds) is rejected, since the assembled code has no
/// way to interpret a heap handle.
///
/// # Errors
/// Returns a `TypeError` if `v` can't be represented as a raw word.
pub fn convert_obj_for_inline_asm(v: Value) -> RunResult<usize> {
    match v {
        Value::SmallInt(n) => Ok(n as usize),
        Value::Const(crate::value::ConstKind::True) => Ok(1),
        Value::Const(crate::value::ConstKind::False) | Value::Const(crate::value::ConstKind::None) => Ok(0),
        _ => Err(ExcType::type_error("unsupported type for inline assembly function argument")),
    }
}

/// Converts a raw machine word returned from an inline-asm entry point
/// back into a [`Value`], always as a plain integer: the assembled code
/// has no way to signal "this word is actually a bool/None", so the
/// caller-side wrapper is responsible for any further interpretation.
#[must_use]
pub fn convert_val_from_inline_asm(raw: usize) -> Value {
    Value::SmallInt(raw as i64)
}

/// Normalizes a reversed-convention argv slice (`argv[n-1]` is the first
/// positional argument) to forward order.
///
/// Inline capacity of 4 covers the overwhelming majority of calls
/// without spilling to the heap, matching the teacher's use of
/// `SmallVec` for hot call-argument buffers.
#[must_use]
pub fn reverse_argv(argv: &[Value]) -> SmallVec<[Value; 4]> {
    argv.iter().rev().copied().collect()
}

/// Calls `callee` with `argv` given in the reversed convention.
///
/// Dispatches across every call-target kind: native fixed-arity/variadic
/// functions, bytecode functions (via an external [`crate::function::BytecodeEngine`]),
/// inline-assembly entry points, generator templates/instances, and
/// bound methods.
///
/// # Errors
/// Returns a `TypeError` if `callee` is not callable or called with the
/// wrong arity, or propagates whatever error the callee raises.
pub fn call_function_n(
    heap: &mut Heap,
    engine: &mut dyn crate::function::BytecodeEngine,
    callee: Value,
    argv: &[Value],
) -> RunResult<Value> {
    heap.enter_call()?;
    heap.vm_tracer_mut().on_call(None, argv.len());
    let result = call_function_n_dispatch(heap, engine, callee, argv);
    heap.exit_call();
    match &result {
        Ok(v) => heap.vm_tracer_mut().on_return(*v),
        Err(e) => heap.vm_tracer_mut().on_raise(&e.to_string()),
    }
    result
}

fn call_function_n_dispatch(
    heap: &mut Heap,
    engine: &mut dyn crate::function::BytecodeEngine,
    callee: Value,
    argv: &[Value],
) -> RunResult<Value> {
    let Value::Ref(id) = callee else {
        return Err(ExcType::type_error("object is not callable"));
    };
    match *heap.get(id) {
        Object::Fun0(f) => {
            if !argv.is_empty() {
                return Err(arity_error(0, argv.len()));
            }
            f(heap)
        }
        Object::Fun1(f) => {
            if argv.len() != 1 {
                return Err(arity_error(1, argv.len()));
            }
            f(heap, argv[0])
        }
        Object::Fun2(f) => {
            if argv.len() != 2 {
                return Err(arity_error(2, argv.len()));
            }
            // argv[1] is the first positional arg, argv[0] the second.
            f(heap, argv[1], argv[0])
        }
        Object::FunN { f, n_args } => {
            if argv.len() != n_args {
                return Err(arity_error(n_args, argv.len()));
            }
            f(heap, argv)
        }
        Object::FunVar { f, min_args } => {
            if argv.len() < min_args {
                return Err(min_arity_error(min_args, argv.len()));
            }
            let forward = reverse_argv(argv);
            f(heap, &forward)
        }
        Object::FunBc { code, n_args } => {
            if argv.len() != n_args {
                return Err(arity_error(n_args, argv.len()));
            }
            let forward = reverse_argv(argv);
            engine.run(code, &forward, heap)
        }
        Object::FunAsm(asm) => call_asm(asm, argv),
        Object::GenWrap(wrap) => {
            if argv.len() != wrap.n_args {
                return Err(arity_error(wrap.n_args, argv.len()));
            }
            let forward = reverse_argv(argv);
            instantiate_generator(heap, wrap, &forward)
        }
        Object::BoundMethod(bound) => call_bound_method(heap, engine, bound, argv),
        Object::Class { .. } => instantiate_class(heap, id, argv),
        ref other => Err(ExcType::type_error(format!("'{}' object is not callable", other.kind_name()))),
    }
}

/// A bare `CLASS(...)` call with no constructor dispatch: per §4.4, only
/// the zero-argument case is supported — it allocates a fresh OBJ whose
/// members start out empty and whose class pointer is `callee` itself.
/// Any arguments mean the caller wanted `__init__`-style construction,
/// which this crate doesn't model.
fn instantiate_class(heap: &mut Heap, class_id: crate::heap::HeapId, argv: &[Value]) -> RunResult<Value> {
    if !argv.is_empty() {
        return Err(ExcType::type_error("class instantiation with constructor arguments is not supported"));
    }
    let id = heap.allocate(Object::Instance { class: class_id, attrs: crate::types::QstrTable::new() })?;
    Ok(Value::Ref(id))
}

/// Calls `callee.name(...)` where `callee` already resolved to a method
/// value via attribute lookup (see [`crate::attr::load_method`]).
///
/// # Errors
/// See [`call_function_n`].
pub fn call_method_n(heap: &mut Heap, engine: &mut dyn crate::function::BytecodeEngine, method: Value, argv: &[Value]) -> RunResult<Value> {
    call_function_n(heap, engine, method, argv)
}

fn call_asm(asm: AsmFn, argv: &[Value]) -> RunResult<Value> {
    let raw: Vec<usize> = argv.iter().rev().copied().map(convert_obj_for_inline_asm).collect::<RunResult<_>>()?;
    let result = match (asm, raw.as_slice()) {
        (AsmFn::Fn0(f), []) => f(),
        (AsmFn::Fn1(f), [a]) => f(*a),
        (AsmFn::Fn2(f), [a, b]) => f(*a, *b),
        (AsmFn::Fn3(f), [a, b, c]) => f(*a, *b, *c),
        _ => return Err(ExcType::type_error("inline assembly function called with wrong arity")),
    };
    Ok(convert_val_from_inline_asm(result))
}

fn instantiate_generator(heap: &mut Heap, wrap: crate::heap::GenWrap, forward_argv: &[Value]) -> RunResult<Value> {
    // Frame size is `1 + state_size`: slot 0 holds the underlying FUN_BC
    // (boxed as a small int), slots 1.. hold the forward-order arguments.
    let mut state = vec![Value::NONE; 1 + wrap.n_state];
    state[0] = Value::SmallInt(i64::from(wrap.underlying.raw()));
    for (slot, arg) in state[1..].iter_mut().zip(forward_argv.iter()) {
        *slot = *arg;
    }
    let instance = GenInstance {
        underlying: wrap.underlying,
        state,
        ip: 0,
        sp: 0,
        gen_state: GenState::New,
    };
    let id = heap.allocate(Object::GenInstance(instance))?;
    Ok(Value::Ref(id))
}

fn call_bound_method(heap: &mut Heap, engine: &mut dyn crate::function::BytecodeEngine, bound: BoundMethod, argv: &[Value]) -> RunResult<Value> {
    // The receiver becomes an implicit extra trailing slot in the
    // reversed convention (it would be argv[n], the slot past the
    // explicit args, since it's logically the *first* positional
    // argument once forwarded).
    let mut extended: SmallVec<[Value; 4]> = SmallVec::with_capacity(argv.len() + 1);
    extended.extend_from_slice(argv);
    extended.push(bound.receiver);
    call_function_n(heap, engine, Value::Ref(bound.func), &extended)
}

/// Resumes a suspended generator with `sent_value` (ignored on first
/// resume). Mutating the generator's saved state is the caller's
/// responsibility via an external bytecode engine; this function only
/// manages the state-machine transitions and terminal idempotence.
///
/// # Errors
/// Returns a `TypeError` if `gen` resumed is already `Finished` more
/// than once in a way the caller didn't already short-circuit via
/// [`ResumeOutcome::Returned`].
pub fn resume_generator(
    heap: &mut Heap,
    engine: &mut dyn crate::function::BytecodeEngine,
    gen_id: crate::heap::HeapId,
    _sent_value: Value,
) -> RunResult<ResumeOutcome> {
    let (underlying, mut state, mut ip, mut sp) = match heap.get(gen_id) {
        Object::GenInstance(inst) if inst.gen_state == GenState::Finished => {
            return Ok(ResumeOutcome::Raised(crate::exception::SimpleException::new_msg(
                ExcType::StopIteration,
                String::new(),
            )));
        }
        Object::GenInstance(inst) => (inst.underlying, inst.state.clone(), inst.ip, inst.sp),
        other => return Err(ExcType::type_error(format!("'{}' object is not a generator", other.kind_name()))),
    };
    if let Object::GenInstance(inst) = heap.get_mut(gen_id) {
        inst.gen_state = GenState::Running;
    }
    // §4.7: the engine resumes against `&state[1]` — slot 0 holds the
    // underlying callable, not part of the execution frame.
    let outcome = engine.resume(underlying, &mut state[1..], &mut ip, &mut sp, heap);
    if let Object::GenInstance(inst) = heap.get_mut(gen_id) {
        inst.state = state;
        inst.ip = ip;
        inst.sp = sp;
        inst.gen_state = match &outcome {
            Ok(ResumeOutcome::Yielded(_)) => GenState::Suspended,
            _ => GenState::Finished,
        };
    }
    outcome
}

fn arity_error(expected: usize, got: usize) -> crate::exception::RunError {
    ExcType::type_error(format!("function takes {expected} positional arguments but {got} were given"))
}

/// `rt_call_function_n`'s `n_args < o->u_fun.n_args` check for a
/// `FUN_VAR` callable: `min_args` names a floor, not an exact count.
fn min_arity_error(min_args: usize, got: usize) -> crate::exception::RunError {
    ExcType::type_error(format!("function takes at least {min_args} positional arguments but {got} were given"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{LimitedTracker, NoLimitTracker};

    struct NoopEngine;
    impl crate::function::BytecodeEngine for NoopEngine {
        fn run(&mut self, _code: crate::function::CodeId, _argv: &[Value], _heap: &mut Heap) -> RunResult<Value> {
            unreachable!("no test here calls into bytecode")
        }
    }

    /// A toy engine that yields `state[0]` once, then returns `None` on
    /// the second resume — enough to exercise the `Yielded`/`Returned`
    /// split `resume_generator` threads through `ip`/`sp`.
    struct YieldOnceEngine;
    impl crate::function::BytecodeEngine for YieldOnceEngine {
        fn run(&mut self, _code: crate::function::CodeId, _argv: &[Value], _heap: &mut Heap) -> RunResult<Value> {
            unreachable!("this test only resumes, never calls run")
        }
        fn resume(
            &mut self,
            _code: crate::function::CodeId,
            state: &mut [Value],
            ip: &mut usize,
            _sp: &mut usize,
            _heap: &mut Heap,
        ) -> RunResult<ResumeOutcome> {
            if *ip == 0 {
                *ip = 1;
                Ok(ResumeOutcome::Yielded(state[0]))
            } else {
                Ok(ResumeOutcome::Returned(Value::NONE))
            }
        }
    }

    #[test]
    fn resume_generator_yields_then_returns_and_finishes() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let mut engine = YieldOnceEngine;
        let wrap = crate::heap::GenWrap { underlying: crate::function::MAIN_MODULE_CODE_ID, n_args: 1, n_state: 3 };
        let forward = vec![Value::SmallInt(99)];
        let gen = instantiate_generator(&mut heap, wrap, &forward).unwrap();
        let Value::Ref(gen_id) = gen else { panic!("expected heap ref") };

        match resume_generator(&mut heap, &mut engine, gen_id, Value::NONE).unwrap() {
            ResumeOutcome::Yielded(v) => assert_eq!(v, Value::SmallInt(99)),
            other => panic!("expected Yielded, got {other:?}"),
        }
        let Object::GenInstance(inst) = heap.get(gen_id) else { panic!("expected GenInstance") };
        assert_eq!(inst.gen_state, GenState::Suspended);

        match resume_generator(&mut heap, &mut engine, gen_id, Value::NONE).unwrap() {
            ResumeOutcome::Returned(v) => assert_eq!(v, Value::NONE),
            other => panic!("expected Returned, got {other:?}"),
        }
        let Object::GenInstance(inst) = heap.get(gen_id) else { panic!("expected GenInstance") };
        assert_eq!(inst.gen_state, GenState::Finished);

        // Resuming again on a finished generator raises StopIteration
        // rather than re-invoking the engine.
        match resume_generator(&mut heap, &mut engine, gen_id, Value::NONE).unwrap() {
            ResumeOutcome::Raised(exc) => assert_eq!(exc.kind, ExcType::StopIteration),
            other => panic!("expected Raised(StopIteration), got {other:?}"),
        }
    }

    #[test]
    fn a_vm_tracer_installed_on_the_heap_observes_call_and_return() {
        use std::{cell::Cell, rc::Rc};

        struct RecordingTracer {
            calls: Rc<Cell<usize>>,
            returns: Rc<Cell<usize>>,
        }
        impl crate::tracer::VmTracer for RecordingTracer {
            fn on_call(&mut self, _name: Option<crate::intern::StringId>, _argc: usize) {
                self.calls.set(self.calls.get() + 1);
            }
            fn on_return(&mut self, _value: Value) {
                self.returns.set(self.returns.get() + 1);
            }
        }

        let calls = Rc::new(Cell::new(0));
        let returns = Rc::new(Cell::new(0));
        let mut heap: Heap = Heap::new(NoLimitTracker).with_vm_tracer(RecordingTracer { calls: calls.clone(), returns: returns.clone() });
        let mut engine = NoopEngine;
        fn noop(_heap: &mut Heap) -> RunResult<Value> {
            Ok(Value::NONE)
        }
        let f = heap.allocate(Object::Fun0(noop)).unwrap();
        call_function_n(&mut heap, &mut engine, Value::Ref(f), &[]).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(returns.get(), 1);
    }

    #[test]
    fn nested_calls_are_rejected_past_the_tracker_s_call_depth_ceiling() {
        let mut heap: Heap = Heap::new(LimitedTracker::new(1000, 1000, 1));
        let mut engine = NoopEngine;
        fn accepts_receiver(_heap: &mut Heap, _receiver: Value) -> RunResult<Value> {
            Ok(Value::NONE)
        }
        let inner = heap.allocate(Object::Fun1(accepts_receiver)).unwrap();
        let outer_bound = heap.allocate(Object::BoundMethod(BoundMethod { receiver: Value::NONE, func: inner })).unwrap();
        // BoundMethod dispatch recurses into call_function_n once more to
        // reach the Fun1 receiver, so depth reaches 2 while the ceiling is 1.
        assert!(call_function_n(&mut heap, &mut engine, Value::Ref(outer_bound), &[]).is_err());
        // A plain, non-nested call still fits under the same ceiling.
        assert!(call_function_n(&mut heap, &mut engine, Value::Ref(inner), &[Value::NONE]).is_ok());
    }

    #[test]
    fn reverse_argv_flips_order() {
        let argv = [Value::SmallInt(3), Value::SmallInt(2), Value::SmallInt(1)];
        let forward = reverse_argv(&argv);
        assert_eq!(forward.as_slice(), &[Value::SmallInt(1), Value::SmallInt(2), Value::SmallInt(3)]);
    }

    #[test]
    fn asm_conversion_round_trips_small_ints() {
        assert_eq!(convert_obj_for_inline_asm(Value::SmallInt(7)).unwrap(), 7);
        assert_eq!(convert_val_from_inline_asm(7), Value::SmallInt(7));
    }

    #[test]
    fn class_called_with_no_args_instantiates_an_object() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let mut interns = crate::intern::Interns::new();
        let class_id = heap
            .allocate(Object::Class {
                name: interns.intern("C"),
                members: crate::types::QstrTable::new(),
                base: None,
            })
            .unwrap();
        let v = instantiate_class(&mut heap, class_id, &[]).unwrap();
        let Value::Ref(id) = v else { panic!("expected heap ref") };
        let Object::Instance { class, .. } = heap.get(id) else { panic!("expected Instance") };
        assert_eq!(*class, class_id);
    }

    #[test]
    fn class_called_with_args_is_a_type_error() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let mut interns = crate::intern::Interns::new();
        let class_id = heap
            .allocate(Object::Class {
                name: interns.intern("C"),
                members: crate::types::QstrTable::new(),
                base: None,
            })
            .unwrap();
        assert!(instantiate_class(&mut heap, class_id, &[Value::SmallInt(1)]).is_err());
    }

    #[test]
    fn generator_instantiation_lays_out_forward_args() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let wrap = crate::heap::GenWrap {
            underlying: crate::function::MAIN_MODULE_CODE_ID,
            n_args: 2,
            n_state: 5,
        };
        let forward = vec![Value::SmallInt(10), Value::SmallInt(20)];
        let v = instantiate_generator(&mut heap, wrap, &forward).unwrap();
        let Value::Ref(id) = v else { panic!("expected ref") };
        let Object::GenInstance(inst) = heap.get(id) else { panic!("expected GenInstance") };
        assert_eq!(inst.state[0], Value::SmallInt(i64::from(crate::function::MAIN_MODULE_CODE_ID.raw())));
        assert_eq!(inst.state[1], Value::SmallInt(10));
        assert_eq!(inst.state[2], Value::SmallInt(20));
        assert_eq!(inst.state.len(), 6); // 1 + n_state(5)
    }
}
