//! Integration tests for the iterator protocol: `getiter`/`iternext`
//! over ranges and sequences, and `StopIteration`'s idempotent-sentinel
//! behavior.

use mamba_rt::{BytecodeEngine, CodeId, Heap, NoLimitTracker, Object, Runtime, RunResult, Value};

struct NoopEngine;

impl BytecodeEngine for NoopEngine {
    fn run(&mut self, _code: CodeId, _argv: &[Value], _heap: &mut Heap) -> RunResult<Value> {
        unreachable!("no generator code runs in these tests")
    }
}

// =============================================================================
// 1. Range iteration
// =============================================================================

/// `range(3)` yields `0, 1, 2` then `StopIteration`, and stays exhausted
/// on further calls.
#[test]
fn range_iterator_yields_then_stays_exhausted() {
    let mut rt = Runtime::new(NoLimitTracker).unwrap();
    let mut engine = NoopEngine;
    let range = rt.heap.allocate(Object::Range(mamba_rt::RangeObj { start: 0, stop: 3, step: 1 })).unwrap();
    let it = rt.getiter(Value::Ref(range)).unwrap();

    let mut seen = vec![];
    loop {
        let v = rt.iternext(&mut engine, it).unwrap();
        if v == Value::STOP_ITERATION {
            break;
        }
        seen.push(v);
    }
    assert_eq!(seen, vec![Value::SmallInt(0), Value::SmallInt(1), Value::SmallInt(2)]);
    assert_eq!(rt.iternext(&mut engine, it).unwrap(), Value::STOP_ITERATION, "exhausted iterator should keep returning StopIteration");
}

// =============================================================================
// 2. List iteration
// =============================================================================

/// Iterating a list yields its items in order without mutating the
/// underlying list.
#[test]
fn list_iterator_yields_items_without_mutating_the_list() {
    let mut rt = Runtime::new(NoLimitTracker).unwrap();
    let mut engine = NoopEngine;
    let list = rt.build_list(vec![Value::SmallInt(1), Value::SmallInt(2)]).unwrap();
    let it = rt.getiter(list).unwrap();
    assert_eq!(rt.iternext(&mut engine, it).unwrap(), Value::SmallInt(1));
    assert_eq!(rt.iternext(&mut engine, it).unwrap(), Value::SmallInt(2));
    assert_eq!(rt.iternext(&mut engine, it).unwrap(), Value::STOP_ITERATION);

    let Value::Ref(id) = list else { panic!("expected heap ref") };
    let Object::List(items) = rt.heap.get(id) else { panic!("expected list") };
    assert_eq!(items.as_slice(), &[Value::SmallInt(1), Value::SmallInt(2)], "iterating must not consume the list");
}

// =============================================================================
// 3. Non-iterables
// =============================================================================

/// Calling `getiter` on a plain int is a `TypeError`, not a panic.
#[test]
fn getiter_on_a_non_iterable_is_an_error() {
    let mut rt = Runtime::new(NoLimitTracker).unwrap();
    assert!(rt.getiter(Value::SmallInt(5)).is_err());
}

// =============================================================================
// 4. The generator-next built-in promotes StopIteration to a raise
// =============================================================================

/// `next_builtin` on an already-exhausted iterator raises `StopIteration`
/// as an actual exception rather than handing back the sentinel value —
/// the one seam where the sentinel gets promoted.
#[test]
fn next_builtin_raises_stop_iteration_once_exhausted() {
    let mut rt = Runtime::new(NoLimitTracker).unwrap();
    let mut engine = NoopEngine;
    let range = rt.heap.allocate(Object::Range(mamba_rt::RangeObj { start: 0, stop: 0, step: 1 })).unwrap();
    let it = rt.getiter(Value::Ref(range)).unwrap();
    assert!(rt.next_builtin(&mut engine, it).is_err());
}
