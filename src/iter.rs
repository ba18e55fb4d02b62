//! The iterator protocol: `getiter`/`iternext` over ranges, tuples,
//! lists, and generators.
//!
//! `iternext` on a generator delegates to the call protocol's resume
//! entry point; every other kind advances an owned cursor object
//! allocated by `getiter`. `StopIteration` is returned as an ordinary
//! value, never raised, except at the one generator-next-builtin seam
//! (`builtins::next::gen_instance_next`) per §4.7/§7.

use crate::{
    exception::{ExcType, RunResult},
    heap::{GenState, Heap, Object, RangeIter, ResumeOutcome},
    value::Value,
};

/// `getiter`: maps a value to a fresh iterator value.
///
/// # Errors
/// `TypeError` if `v`'s kind has no iterator.
pub fn getiter(v: Value, heap: &mut Heap) -> RunResult<Value> {
    match v {
        Value::Ref(id) => match heap.get(id) {
            Object::GenInstance(_) => Ok(v),
            Object::Range(r) => {
                let it = RangeIter { next: r.start, stop: r.stop, step: r.step, exhausted: false };
                Ok(Value::Ref(heap.allocate(Object::RangeIter(it))?))
            }
            Object::Tuple(_) => Ok(Value::Ref(heap.allocate(Object::TupleIter { items: id, next: 0 })?)),
            Object::List(_) => Ok(Value::Ref(heap.allocate(Object::ListIter { items: id, next: 0 })?)),
            other => Err(ExcType::type_error(format!("'{}' object is not iterable", other.kind_name()))),
        },
        _ => Err(ExcType::type_error(format!("'{}' object is not iterable", value_kind_name(v)))),
    }
}

fn value_kind_name(v: Value) -> &'static str {
    match v {
        Value::SmallInt(_) => "int",
        Value::Const(crate::value::ConstKind::True | crate::value::ConstKind::False) => "bool",
        Value::Const(crate::value::ConstKind::None) => "NoneType",
        Value::Const(_) => "object",
        Value::Ref(_) => unreachable!("Ref handled by caller"),
    }
}

/// `iternext`: advances `it` in place, returning either the next value
/// or [`Value::STOP_ITERATION`].
///
/// Idempotent at exhaustion: calling again on an already-exhausted
/// range/tuple/list iterator, or an already-[`GenState::Finished`]
/// generator, keeps returning `StopIteration` rather than erroring.
///
/// # Errors
/// `TypeError` if `it` is not an iterator; propagates whatever the
/// bytecode engine raises while resuming a generator.
pub fn iternext(it: Value, heap: &mut Heap, engine: &mut dyn crate::function::BytecodeEngine) -> RunResult<Value> {
    let Value::Ref(id) = it else {
        return Err(ExcType::type_error("not an iterator"));
    };
    let result = match heap.get(id) {
        Object::RangeIter(_) => Ok(range_iter_next(heap, id)),
        Object::TupleIter { .. } | Object::ListIter { .. } => Ok(seq_iter_next(heap, id)),
        Object::GenInstance(_) => gen_iter_next(heap, engine, id),
        other => Err(ExcType::type_error(format!("'{}' object is not an iterator", other.kind_name()))),
    };
    if matches!(result, Ok(Value::STOP_ITERATION)) {
        heap.vm_tracer_mut().on_iter_exhausted();
    }
    result
}

fn range_iter_next(heap: &mut Heap, id: crate::heap::HeapId) -> Value {
    let Object::RangeIter(cur) = heap.get_mut(id) else { unreachable!() };
    if cur.exhausted {
        return Value::STOP_ITERATION;
    }
    let has_next = if cur.step > 0 { cur.next < cur.stop } else { cur.step < 0 && cur.next > cur.stop };
    if !has_next {
        cur.exhausted = true;
        return Value::STOP_ITERATION;
    }
    let out = cur.next;
    cur.next += cur.step;
    Value::SmallInt(out)
}

fn seq_iter_next(heap: &mut Heap, id: crate::heap::HeapId) -> Value {
    let (items_id, cur) = match heap.get(id) {
        Object::TupleIter { items, next } | Object::ListIter { items, next } => (*items, *next),
        _ => unreachable!(),
    };
    let len = match heap.get(items_id) {
        Object::Tuple(items) | Object::List(items) => items.len(),
        _ => unreachable!(),
    };
    if cur >= len {
        return Value::STOP_ITERATION;
    }
    let out = match heap.get(items_id) {
        Object::Tuple(items) | Object::List(items) => items[cur],
        _ => unreachable!(),
    };
    match heap.get_mut(id) {
        Object::TupleIter { next, .. } | Object::ListIter { next, .. } => *next += 1,
        _ => unreachable!(),
    }
    out
}

fn gen_iter_next(heap: &mut Heap, engine: &mut dyn crate::function::BytecodeEngine, id: crate::heap::HeapId) -> RunResult<Value> {
    if let Object::GenInstance(inst) = heap.get(id) {
        if inst.gen_state == GenState::Finished {
            return Ok(Value::STOP_ITERATION);
        }
    }
    match crate::call::resume_generator(heap, engine, id, Value::NONE)? {
        ResumeOutcome::Yielded(v) => Ok(v),
        // A generator returning anything maps to StopIteration; carrying
        // the return value out through StopIteration's payload is an
        // explicit TODO per §4.7/§9 (the original never implements it
        // either).
        ResumeOutcome::Returned(_) => Ok(Value::STOP_ITERATION),
        ResumeOutcome::Raised(exc) => Err(exc.into()),
    }
}

/// The generator-`__next__` built-in: the one place `StopIteration` is
/// promoted from a sentinel value to a raised exception, per
/// `rt_gen_instance_next` in the original runtime.
///
/// A bytecode engine dispatching `gen.__next__()` or `next(gen)` against
/// a [`Object::GenInstance`] receiver calls this directly, since resuming
/// a generator needs engine access that no native-callable signature in
/// [`crate::call`] carries.
///
/// # Errors
/// `StopIteration` once the generator is exhausted; otherwise whatever
/// [`iternext`] returns.
pub fn next_builtin(it: Value, heap: &mut Heap, engine: &mut dyn crate::function::BytecodeEngine) -> RunResult<Value> {
    let v = iternext(it, heap, engine)?;
    if v == Value::STOP_ITERATION {
        Err(crate::exception::SimpleException::new_msg(ExcType::StopIteration, String::new()).into())
    } else {
        Ok(v)
    }
}
