//! Integration tests for the tagged `Value` representation and the
//! operator dispatch built on top of it.

use mamba_rt::{BinaryOp, CompareOp, NoLimitTracker, Object, Runtime, UnaryOp, Value};

// =============================================================================
// 1. Truthiness
// =============================================================================

/// Zero, `None`, `False`, and empty containers are all falsy; everything
/// else is truthy.
#[test]
fn is_true_follows_pythonic_falsiness() {
    let mut rt = Runtime::new(NoLimitTracker).unwrap();
    assert!(!rt.is_true(Value::SmallInt(0)));
    assert!(rt.is_true(Value::SmallInt(1)));
    assert!(!rt.is_true(Value::NONE));
    assert!(!rt.is_true(Value::FALSE));
    assert!(rt.is_true(Value::TRUE));

    let empty_list = rt.build_list(vec![]).unwrap();
    assert!(!rt.is_true(empty_list));
    let full_list = rt.build_list(vec![Value::SmallInt(1)]).unwrap();
    assert!(rt.is_true(full_list));
}

// =============================================================================
// 2. Unary operators
// =============================================================================

/// `not x` inverts truthiness regardless of `x`'s underlying kind.
#[test]
fn not_inverts_truthiness() {
    let mut rt = Runtime::new(NoLimitTracker).unwrap();
    assert_eq!(rt.unary_op(UnaryOp::Not, Value::SmallInt(0)).unwrap(), Value::TRUE);
    assert_eq!(rt.unary_op(UnaryOp::Not, Value::SmallInt(5)).unwrap(), Value::FALSE);
}

/// Unary minus negates an int in place, no allocation required.
#[test]
fn unary_negate_flips_sign_of_a_small_int() {
    let mut rt = Runtime::new(NoLimitTracker).unwrap();
    assert_eq!(rt.unary_op(UnaryOp::Neg, Value::SmallInt(7)).unwrap(), Value::SmallInt(-7));
}

// =============================================================================
// 3. Binary/compare operators
// =============================================================================

/// `True + 1 == 2`: bool acts as 0/1 in arithmetic, per the hash/equality
/// contract this crate implements for the object model's dict/set keys.
#[test]
fn bool_participates_in_arithmetic_as_zero_or_one() {
    let mut rt = Runtime::new(NoLimitTracker).unwrap();
    let v = rt.binary_op(BinaryOp::Add, Value::TRUE, Value::SmallInt(1)).unwrap();
    assert_eq!(v, Value::SmallInt(2));
}

/// True division always promotes to a float, even when the inputs divide
/// evenly.
#[test]
fn true_division_always_yields_a_float() {
    let mut rt = Runtime::new(NoLimitTracker).unwrap();
    let v = rt.binary_op(BinaryOp::TrueDiv, Value::SmallInt(4), Value::SmallInt(2)).unwrap();
    let Value::Ref(id) = v else { panic!("expected a float ref, got {v:?}") };
    let Object::Float(f) = rt.heap.get(id) else { panic!("expected Object::Float") };
    assert!((*f - 2.0).abs() < 1e-12, "expected 2.0, got {f}");
}

/// Division by zero is a runtime error, not a panic.
#[test]
fn true_division_by_zero_is_an_error_not_a_panic() {
    let mut rt = Runtime::new(NoLimitTracker).unwrap();
    assert!(rt.binary_op(BinaryOp::TrueDiv, Value::SmallInt(1), Value::SmallInt(0)).is_err());
}

/// `compare_op` is ordinary int comparison for two small ints.
#[test]
fn compare_op_orders_small_ints_numerically() {
    let rt = Runtime::new(NoLimitTracker).unwrap();
    assert_eq!(rt.compare_op(CompareOp::Lt, Value::SmallInt(1), Value::SmallInt(2)).unwrap(), Value::TRUE);
    assert_eq!(rt.compare_op(CompareOp::Lt, Value::SmallInt(2), Value::SmallInt(1)).unwrap(), Value::FALSE);
}
