//! Implementation of the `range` built-in.

use crate::{
    exception::{ExcType, RunResult},
    heap::{Heap, Object, RangeObj},
    value::Value,
};

/// `range(stop)`, `range(start, stop)`, or `range(start, stop, step)`.
///
/// Registered as a `FUN_VAR` builtin with `min_args: 1`, so the
/// dispatcher (`call.rs`) already rejects a zero-argument call before it
/// ever reaches here. The upper bound of three arguments, and the
/// nonzero-step rule, are `range`'s own and still checked below.
///
/// # Errors
/// `TypeError` if called with more than three arguments, or if any
/// argument isn't an integer; `TypeError` if `step` is zero.
pub fn range(heap: &mut Heap, args: &[Value]) -> RunResult<Value> {
    let ints: Vec<i64> = args
        .iter()
        .map(|v| v.as_small_int().ok_or_else(|| ExcType::type_error("range() arguments must be integers")))
        .collect::<RunResult<_>>()?;
    let (start, stop, step) = match ints.as_slice() {
        [stop] => (0, *stop, 1),
        [start, stop] => (*start, *stop, 1),
        [start, stop, step] => {
            if *step == 0 {
                return Err(ExcType::type_error("range() arg 3 must not be zero"));
            }
            (*start, *stop, *step)
        }
        _ => return Err(ExcType::type_error("range expected 1 to 3 arguments")),
    };
    Ok(Value::Ref(heap.allocate(Object::Range(RangeObj { start, stop, step }))?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::NoLimitTracker;

    #[test]
    fn single_arg_is_the_stop_bound() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let v = range(&mut heap, &[Value::SmallInt(3)]).unwrap();
        let Value::Ref(id) = v else { panic!() };
        let Object::Range(r) = heap.get(id) else { panic!() };
        assert_eq!((r.start, r.stop, r.step), (0, 3, 1));
    }

    #[test]
    fn three_args_give_start_stop_step() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let v = range(&mut heap, &[Value::SmallInt(10), Value::SmallInt(0), Value::SmallInt(-2)]).unwrap();
        let Value::Ref(id) = v else { panic!() };
        let Object::Range(r) = heap.get(id) else { panic!() };
        assert_eq!((r.start, r.stop, r.step), (10, 0, -2));
    }

    #[test]
    fn zero_args_is_a_type_error() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        assert!(range(&mut heap, &[]).is_err());
    }

    #[test]
    fn zero_step_is_a_type_error() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        assert!(range(&mut heap, &[Value::SmallInt(0), Value::SmallInt(5), Value::SmallInt(0)]).is_err());
    }
}
