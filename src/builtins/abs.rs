//! Implementation of the `abs` built-in.
//!
//! Grounded on the original's `abs` builtin, trimmed to the kinds this
//! crate actually models: int, bool, float, complex. No `LongInt`
//! promotion on `i64::MIN` overflow and no `Fraction` support, since
//! neither bignums nor fractions are in scope here.

use crate::{
    exception::{ExcType, RunResult},
    heap::{Heap, Object},
    value::{ConstKind, Value},
};

/// `abs(x)`: magnitude of an int/bool/float/complex.
pub fn abs(heap: &mut Heap, arg: Value) -> RunResult<Value> {
    match arg {
        Value::SmallInt(n) => Ok(Value::SmallInt(n.wrapping_abs())),
        Value::Const(ConstKind::True) => Ok(Value::SmallInt(1)),
        Value::Const(ConstKind::False) => Ok(Value::SmallInt(0)),
        Value::Ref(id) => {
            let result = match heap.get(id) {
                Object::Float(f) => f.abs(),
                Object::Complex { re, im } => re.hypot(*im),
                other => return Err(bad_operand(other.kind_name())),
            };
            Ok(Value::Ref(heap.allocate(Object::Float(result))?))
        }
        _ => Err(bad_operand(value_kind_name(arg))),
    }
}

fn bad_operand(kind: &str) -> crate::exception::RunError {
    ExcType::type_error(format!("bad operand type for abs(): '{kind}'"))
}

fn value_kind_name(v: Value) -> &'static str {
    match v {
        Value::SmallInt(_) => "int",
        Value::Const(ConstKind::True | ConstKind::False) => "bool",
        Value::Const(ConstKind::None) => "NoneType",
        Value::Const(_) => "object",
        Value::Ref(_) => unreachable!("Ref handled by caller"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::NoLimitTracker;

    #[test]
    fn negative_int_becomes_positive() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        assert_eq!(abs(&mut heap, Value::SmallInt(-7)).unwrap(), Value::SmallInt(7));
    }

    #[test]
    fn complex_magnitude_is_hypot() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let c = heap.allocate(Object::Complex { re: 3.0, im: 4.0 }).unwrap();
        let v = abs(&mut heap, Value::Ref(c)).unwrap();
        let Value::Ref(id) = v else { panic!("expected float ref") };
        let Object::Float(f) = heap.get(id) else { panic!("expected float") };
        assert!((*f - 5.0).abs() < 1e-9);
    }

    #[test]
    fn bool_true_abs_is_one() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        assert_eq!(abs(&mut heap, Value::TRUE).unwrap(), Value::SmallInt(1));
    }

    #[test]
    fn string_has_no_abs() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let s = heap.allocate(Object::Str("x".into())).unwrap();
        assert!(abs(&mut heap, Value::Ref(s)).is_err());
    }
}
