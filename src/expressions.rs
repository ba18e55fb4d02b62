//! Operator dispatch: unary, binary, compare, and subscript load/store.
//!
//! Dispatch order for binary ops follows §4.2 of the object model exactly:
//! subscript first, then small-int/small-int, then complex, then float,
//! then string `+`, else `TypeError`. Nothing here tries to be more
//! general than the contract — the power operator, for instance, stays
//! restricted to exponent 2 per the object model's own open question.

use crate::{
    exception::{ExcType, RunResult},
    heap::{Heap, Object},
    py_hash::py_eq,
    value::{ConstKind, Value},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Pos,
    Neg,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Subscript load (`a[b]`). Dispatched first, per §4.2 item 1 — the
    /// original routes `BINARY_SUBSCR` through the same `mp_binary_op`
    /// switch as arithmetic, rather than a separate opcode.
    Subscr,
    Add,
    Sub,
    Mul,
    TrueDiv,
    FloorDiv,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    LShift,
    RShift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Truthiness test (`is_true` in the export table).
#[must_use]
pub fn is_true(v: Value, heap: &Heap) -> bool {
    match v {
        Value::SmallInt(n) => n != 0,
        Value::Const(ConstKind::True) => true,
        Value::Const(ConstKind::False | ConstKind::None | ConstKind::NotImplemented) => false,
        Value::Const(ConstKind::Ellipsis | ConstKind::StopIteration) => true,
        Value::Ref(id) => match heap.get(id) {
            Object::Str(s) => !s.is_empty(),
            Object::List(items) => !items.is_empty(),
            Object::Tuple(items) => !items.is_empty(),
            Object::Set(s) => !s.is_empty(),
            Object::Map(m) => !m.is_empty(),
            Object::Float(f) => *f != 0.0,
            _ => true,
        },
    }
}

/// # Errors
/// Returns a `TypeError` if `op` doesn't apply to `v`'s kind.
pub fn unary_op(op: UnaryOp, v: Value, heap: &mut Heap) -> RunResult<Value> {
    if op == UnaryOp::Not {
        return Ok(Value::from_bool(!is_true(v, heap)));
    }
    match (op, v) {
        (UnaryOp::Pos, Value::SmallInt(n)) => Ok(Value::SmallInt(n)),
        (UnaryOp::Neg, Value::SmallInt(n)) => Ok(Value::SmallInt(-n)),
        (UnaryOp::Invert, Value::SmallInt(n)) => Ok(Value::SmallInt(!n)),
        (UnaryOp::Pos | UnaryOp::Neg, Value::Ref(id)) => {
            let float = match heap.get(id) {
                Object::Float(f) => Some(*f),
                _ => None,
            };
            match float {
                Some(f) => {
                    let result = if op == UnaryOp::Neg { -f } else { f };
                    let id = heap.allocate(Object::Float(result))?;
                    Ok(Value::Ref(id))
                }
                None => Err(type_error_unary(op, heap.get(id).kind_name())),
            }
        }
        (UnaryOp::Invert, Value::Ref(id)) => Err(type_error_unary(op, heap.get(id).kind_name())),
        _ => Err(type_error_unary(op, value_kind_name(v, heap))),
    }
}

fn type_error_unary(op: UnaryOp, kind: &str) -> crate::exception::RunError {
    let sym = match op {
        UnaryOp::Not => "not",
        UnaryOp::Pos => "+",
        UnaryOp::Neg => "-",
        UnaryOp::Invert => "~",
    };
    ExcType::type_error(format!("bad operand type for unary {sym}: '{kind}'"))
}

fn value_kind_name(v: Value, heap: &Heap) -> &'static str {
    match v {
        Value::SmallInt(_) => "int",
        Value::Const(ConstKind::True | ConstKind::False) => "bool",
        Value::Const(ConstKind::None) => "NoneType",
        Value::Const(ConstKind::NotImplemented) => "NotImplementedType",
        Value::Const(ConstKind::Ellipsis) => "ellipsis",
        Value::Const(ConstKind::StopIteration) => "StopIteration",
        Value::Ref(id) => heap.get(id).kind_name(),
    }
}

/// # Errors
/// Returns a `TypeError` if `op` doesn't apply to the combination of
/// `a`'s and `b`'s kinds, following the §4.2 dispatch order.
pub fn binary_op(op: BinaryOp, a: Value, b: Value, heap: &mut Heap) -> RunResult<Value> {
    if op == BinaryOp::Subscr {
        return subscr_load(a, b, heap);
    }
    if let (Some(x), Some(y)) = (a.as_small_int(), b.as_small_int()) {
        return int_binary_op(op, x, y, heap);
    }
    if let (Some((ar, ai)), Some((br, bi))) = (as_complex(a, heap), as_complex(b, heap)) {
        return complex_binary_op(op, ar, ai, br, bi, heap);
    }
    if let (Some(x), Some(y)) = (as_float(a, heap), as_float(b, heap)) {
        return float_binary_op(op, x, y, heap);
    }
    if op == BinaryOp::Add {
        if let (Some(x), Some(y)) = (as_str(a, heap), as_str(b, heap)) {
            let mut out = String::with_capacity(x.len() + y.len());
            out.push_str(x);
            out.push_str(y);
            let id = heap.intern_str(&out)?;
            return Ok(Value::Ref(id));
        }
    }
    Err(type_error_binary(op, value_kind_name(a, heap), value_kind_name(b, heap)))
}

fn int_binary_op(op: BinaryOp, x: i64, y: i64, heap: &mut Heap) -> RunResult<Value> {
    match op {
        BinaryOp::Subscr => unreachable!("dispatched before int_binary_op in binary_op"),
        BinaryOp::Add => Ok(Value::SmallInt(x.wrapping_add(y))),
        BinaryOp::Sub => Ok(Value::SmallInt(x.wrapping_sub(y))),
        BinaryOp::Mul => Ok(Value::SmallInt(x.wrapping_mul(y))),
        BinaryOp::BitAnd => Ok(Value::SmallInt(x & y)),
        BinaryOp::BitOr => Ok(Value::SmallInt(x | y)),
        BinaryOp::BitXor => Ok(Value::SmallInt(x ^ y)),
        BinaryOp::LShift => Ok(Value::SmallInt(x.wrapping_shl(y as u32))),
        BinaryOp::RShift => Ok(Value::SmallInt(x.wrapping_shr(y as u32))),
        BinaryOp::FloorDiv => {
            if y == 0 {
                return Err(ExcType::zero_division_error("integer division or modulo by zero"));
            }
            // §4.2 item 2 specifies C semantics (truncating toward zero),
            // not Python's floor-toward-negative-infinity.
            Ok(Value::SmallInt(x.wrapping_div(y)))
        }
        BinaryOp::Mod => {
            if y == 0 {
                return Err(ExcType::zero_division_error("integer division or modulo by zero"));
            }
            Ok(Value::SmallInt(x.wrapping_rem(y)))
        }
        BinaryOp::TrueDiv => {
            if y == 0 {
                return Err(ExcType::zero_division_error("division by zero"));
            }
            // true-div always promotes to float, per §4.2.2.
            let id = heap.allocate(Object::Float(x as f64 / y as f64))?;
            Ok(Value::Ref(id))
        }
        BinaryOp::Pow => {
            // Only exponent 2 is supported; everything else is an open
            // question the object model says to preserve, not guess at.
            if y == 2 {
                Ok(Value::SmallInt(x.wrapping_mul(x)))
            } else {
                Err(ExcType::type_error("pow() is only implemented for exponent 2"))
            }
        }
    }
}

fn as_float(v: Value, heap: &Heap) -> Option<f64> {
    match v {
        Value::SmallInt(n) => Some(n as f64),
        Value::Const(ConstKind::True) => Some(1.0),
        Value::Const(ConstKind::False) => Some(0.0),
        Value::Ref(id) => match heap.get(id) {
            Object::Float(f) => Some(*f),
            _ => None,
        },
        _ => None,
    }
}

fn as_complex(v: Value, heap: &Heap) -> Option<(f64, f64)> {
    match v {
        Value::Ref(id) => match heap.get(id) {
            Object::Complex { re, im } => Some((*re, *im)),
            _ => None,
        },
        _ => None,
    }
}

fn as_str<'h>(v: Value, heap: &'h Heap) -> Option<&'h str> {
    match v {
        Value::Ref(id) => match heap.get(id) {
            Object::Str(s) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

fn float_binary_op(op: BinaryOp, x: f64, y: f64, heap: &mut Heap) -> RunResult<Value> {
    let result = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::TrueDiv => {
            if y == 0.0 {
                return Err(ExcType::zero_division_error("float division by zero"));
            }
            x / y
        }
        BinaryOp::FloorDiv => {
            if y == 0.0 {
                return Err(ExcType::zero_division_error("float floor division by zero"));
            }
            (x / y).floor()
        }
        _ => return Err(ExcType::type_error("unsupported operand type(s) for operator involving float")),
    };
    let id = heap.allocate(Object::Float(result))?;
    Ok(Value::Ref(id))
}

fn complex_binary_op(op: BinaryOp, ar: f64, ai: f64, br: f64, bi: f64, heap: &mut Heap) -> RunResult<Value> {
    let (re, im) = match op {
        BinaryOp::Add => (ar + br, ai + bi),
        BinaryOp::Sub => (ar - br, ai - bi),
        BinaryOp::Mul => (ar * br - ai * bi, ar * bi + ai * br),
        // Complex division is an explicit stub per the object model's
        // open questions.
        BinaryOp::TrueDiv => return Err(ExcType::type_error("complex division is not implemented")),
        _ => return Err(ExcType::type_error("unsupported operand type(s) for operator involving complex")),
    };
    let id = heap.allocate(Object::Complex { re, im })?;
    Ok(Value::Ref(id))
}

fn type_error_binary(op: BinaryOp, ka: &str, kb: &str) -> crate::exception::RunError {
    let sym = binary_op_symbol(op);
    ExcType::type_error(format!("unsupported operand type(s) for {sym}: '{ka}' and '{kb}'"))
}

fn binary_op_symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Subscr => "[]",
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::TrueDiv => "/",
        BinaryOp::FloorDiv => "//",
        BinaryOp::Mod => "%",
        BinaryOp::Pow => "**",
        BinaryOp::BitAnd => "&",
        BinaryOp::BitOr => "|",
        BinaryOp::BitXor => "^",
        BinaryOp::LShift => "<<",
        BinaryOp::RShift => ">>",
    }
}

/// # Errors
/// Returns a `TypeError` if `op` is an ordered comparison and `a`/`b`
/// aren't both small-ints or both coercible to float.
pub fn compare_op(op: CompareOp, a: Value, b: Value, heap: &Heap) -> RunResult<Value> {
    match op {
        CompareOp::Eq => Ok(Value::from_bool(py_eq(a, b, heap))),
        CompareOp::Ne => Ok(Value::from_bool(!py_eq(a, b, heap))),
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            if let (Some(x), Some(y)) = (a.as_small_int(), b.as_small_int()) {
                return Ok(Value::from_bool(apply_ordering(op, x.cmp(&y))));
            }
            if let (Some(x), Some(y)) = (as_float(a, heap), as_float(b, heap)) {
                let Some(ordering) = x.partial_cmp(&y) else {
                    return Err(ExcType::type_error("comparison involving NaN"));
                };
                return Ok(Value::from_bool(apply_ordering(op, ordering)));
            }
            Err(ExcType::type_error(format!(
                "'{}' not supported between instances of '{}' and '{}'",
                compare_op_symbol(op),
                value_kind_name(a, heap),
                value_kind_name(b, heap)
            )))
        }
    }
}

fn apply_ordering(op: CompareOp, ordering: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};
    match (op, ordering) {
        (CompareOp::Lt, Less) | (CompareOp::Le, Less | Equal) | (CompareOp::Gt, Greater) | (CompareOp::Ge, Greater | Equal) => true,
        _ => false,
    }
}

fn compare_op_symbol(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "==",
        CompareOp::Ne => "!=",
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
    }
}

/// Normalizes a subscript index per §4.3: must be a small-int (bools
/// count as 0/1), negative indices add `len`, out-of-range is an
/// `IndexError`.
///
/// # Errors
/// `TypeError` if `index` isn't an integer; `IndexError` if out of range
/// after normalization.
pub fn normalize_index(index: Value, len: usize, heap: &Heap) -> RunResult<usize> {
    let Some(raw) = index.as_small_int() else {
        return Err(ExcType::type_error(format!(
            "list indices must be integers, not '{}'",
            value_kind_name(index, heap)
        )));
    };
    let normalized = if raw < 0 { raw + len as i64 } else { raw };
    if normalized < 0 || normalized as usize >= len {
        return Err(ExcType::index_error("list index out of range"));
    }
    Ok(normalized as usize)
}

/// `SUBSCR` load: tuple/list indexing or map lookup.
///
/// # Errors
/// See [`normalize_index`] for sequences; `KeyError` on a missing map
/// key; `TypeError` for any other base kind.
pub fn subscr_load(base: Value, index: Value, heap: &Heap) -> RunResult<Value> {
    match base {
        Value::Ref(id) => match heap.get(id) {
            Object::List(items) => Ok(items[normalize_index(index, items.len(), heap)?]),
            Object::Tuple(items) => Ok(items[normalize_index(index, items.len(), heap)?]),
            Object::Map(map) => map.get(index, heap)?.ok_or_else(|| key_error(index, heap)),
            other => Err(ExcType::type_error(format!("'{}' object is not subscriptable", other.kind_name()))),
        },
        _ => Err(ExcType::type_error(format!("'{}' object is not subscriptable", value_kind_name(base, heap)))),
    }
}

/// `store_subscr`: list item assignment (index normalization) or map
/// insert-or-update.
///
/// # Errors
/// See [`subscr_load`].
pub fn subscr_store(base: Value, index: Value, value: Value, heap: &mut Heap) -> RunResult<()> {
    let Value::Ref(id) = base else {
        return Err(ExcType::type_error(format!(
            "'{}' object does not support item assignment",
            value_kind_name(base, heap)
        )));
    };
    if let Object::List(items) = heap.get(id) {
        let idx = normalize_index(index, items.len(), heap)?;
        let Object::List(items) = heap.get_mut(id) else { unreachable!() };
        items[idx] = value;
        return Ok(());
    }
    if matches!(heap.get(id), Object::Map(_)) {
        let Object::Map(map) = heap.get_mut(id) else { unreachable!() };
        // `Map::insert` needs `&Heap` to hash/compare, but we're already
        // holding `heap` mutably to reach this map; swap it out, mutate
        // against `heap` as shared, then swap it back in.
        let mut owned = std::mem::take(map);
        let result = owned.insert(index, value, heap);
        if let Object::Map(slot) = heap.get_mut(id) {
            *slot = owned;
        }
        return result.map(|_| ());
    }
    Err(ExcType::type_error(format!(
        "'{}' object does not support item assignment",
        heap.get(id).kind_name()
    )))
}

fn key_error(index: Value, heap: &Heap) -> crate::exception::RunError {
    match index {
        Value::Ref(id) => match heap.get(id) {
            Object::Str(s) => ExcType::key_error(format!("'{s}'")),
            _ => ExcType::key_error("key not found"),
        },
        Value::SmallInt(n) => ExcType::key_error(n.to_string()),
        _ => ExcType::key_error("key not found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::NoLimitTracker;

    #[test]
    fn int_add_and_mul() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        assert_eq!(int_binary_op(BinaryOp::Add, 2, 3, &mut heap).unwrap(), Value::SmallInt(5));
        assert_eq!(int_binary_op(BinaryOp::Mul, 2, 3, &mut heap).unwrap(), Value::SmallInt(6));
    }

    #[test]
    fn pow_only_supports_exponent_two() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        assert_eq!(int_binary_op(BinaryOp::Pow, 3, 2, &mut heap).unwrap(), Value::SmallInt(9));
        assert!(int_binary_op(BinaryOp::Pow, 3, 3, &mut heap).is_err());
    }

    #[test]
    fn true_div_promotes_to_float() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let v = binary_op(BinaryOp::TrueDiv, Value::SmallInt(7), Value::SmallInt(2), &mut heap).unwrap();
        let Value::Ref(id) = v else { panic!("expected float ref") };
        let Object::Float(f) = heap.get(id) else { panic!("expected float") };
        assert!((*f - 3.5).abs() < 1e-9);
    }

    #[test]
    fn string_concat_allocates_new_string() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let a = heap.allocate(Object::Str("foo".into())).unwrap();
        let b = heap.allocate(Object::Str("bar".into())).unwrap();
        let v = binary_op(BinaryOp::Add, Value::Ref(a), Value::Ref(b), &mut heap).unwrap();
        let Value::Ref(id) = v else { panic!("expected str ref") };
        let Object::Str(s) = heap.get(id) else { panic!("expected str") };
        assert_eq!(&**s, "foobar");
    }

    #[test]
    fn negative_index_normalizes_from_end() {
        let heap: Heap = Heap::new(NoLimitTracker);
        assert_eq!(normalize_index(Value::SmallInt(-1), 3, &heap).unwrap(), 2);
        assert!(normalize_index(Value::SmallInt(5), 3, &heap).is_err());
    }

    #[test]
    fn subscript_list_and_out_of_range() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let list = heap.allocate(Object::List(vec![Value::SmallInt(10), Value::SmallInt(20), Value::SmallInt(30)])).unwrap();
        assert_eq!(subscr_load(Value::Ref(list), Value::SmallInt(0), &heap).unwrap(), Value::SmallInt(10));
        assert!(subscr_load(Value::Ref(list), Value::SmallInt(99), &heap).is_err());
    }

    #[test]
    fn binary_op_dispatches_subscr_to_subscr_load() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let list = heap.allocate(Object::List(vec![Value::SmallInt(10), Value::SmallInt(20)])).unwrap();
        let v = binary_op(BinaryOp::Subscr, Value::Ref(list), Value::SmallInt(1), &mut heap).unwrap();
        assert_eq!(v, Value::SmallInt(20));
    }

    #[test]
    fn bool_true_equal_int_one() {
        let heap: Heap = Heap::new(NoLimitTracker);
        let v = compare_op(CompareOp::Eq, Value::TRUE, Value::SmallInt(1), &heap).unwrap();
        assert_eq!(v, Value::TRUE);
    }
}
