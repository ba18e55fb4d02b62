//! Hash and equality contract for OBJ-regime keys (§3.1).
//!
//! Deliberately much simpler than CPython-compatible content hashing: a
//! bool hashes and compares as its underlying 0/1, a string's identity is
//! its interned handle, and only a handful of kinds are hashable at all.
//! This is what lets the same [`crate::types::Map`] engine serve as both
//! a dict and a set without caring about value content beyond this
//! contract.

use crate::{
    heap::{Heap, Object},
    value::{ConstKind, Value},
};

/// Whether `v` is hashable under this runtime's rules: small ints, bools,
/// the CONST singletons, and interned strings. Everything else (lists,
/// dicts, floats, user instances, ...) is not.
#[must_use]
pub fn is_hashable(v: Value, heap: &Heap) -> bool {
    match v {
        Value::SmallInt(_) | Value::Const(_) => true,
        Value::Ref(id) => matches!(heap.get(id), Object::Str(_)),
    }
}

/// Computes the hash of `v`, per the §3.1 contract. Panics if `v` is not
/// hashable; callers must check [`is_hashable`] first (or rely on the map
/// engine's own check at insertion time).
#[must_use]
pub fn py_hash(v: Value, heap: &Heap) -> u64 {
    match v {
        Value::SmallInt(n) => hash_i64(n),
        Value::Const(ConstKind::True) => hash_i64(1),
        Value::Const(ConstKind::False) => hash_i64(0),
        Value::Const(kind) => hash_const_kind(kind),
        Value::Ref(id) => match heap.get(id) {
            Object::Str(_) => hash_string_identity(id),
            other => panic!("unhashable type: '{}'", other.kind_name()),
        },
    }
}

fn hash_i64(n: i64) -> u64 {
    // identity-ish hash: small ints hash to themselves so that hash(0) ==
    // hash(false) and hash(1) == hash(true) trivially hold.
    n as u64
}

fn hash_const_kind(kind: ConstKind) -> u64 {
    // Distinct, stable hashes for the remaining singletons. None/Ellipsis/
    // NotImplemented/StopIteration are not required to collide with
    // anything; only bool's aliasing onto int is contractually required.
    match kind {
        ConstKind::None => 0xDEAD_0000,
        ConstKind::NotImplemented => 0xDEAD_0001,
        ConstKind::Ellipsis => 0xDEAD_0002,
        ConstKind::StopIteration => 0xDEAD_0003,
        ConstKind::True | ConstKind::False => unreachable!("handled above"),
    }
}

fn hash_string_identity(id: crate::heap::HeapId) -> u64 {
    // Equality is handle equality, so hash must be a function of the
    // handle alone, not the string bytes. This only coincides with
    // content equality because every `Object::Str` reaches the heap
    // through `Heap::intern_str`, which dedups by content first — see
    // that function's doc comment.
    u64::from(id.raw()).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Equality under the §3.1 contract: bool compares as 0/1 against ints,
/// strings compare by interned handle, anything else mixed-kind is
/// unequal. Two strings of equal content always carry the same handle
/// (`Heap::intern_str`), so handle equality here is content equality.
#[must_use]
pub fn py_eq(a: Value, b: Value, heap: &Heap) -> bool {
    match (a.as_small_int(), b.as_small_int()) {
        (Some(x), Some(y)) => return x == y,
        _ => {}
    }
    match (a, b) {
        (Value::Const(ka), Value::Const(kb)) => ka == kb,
        (Value::Ref(ida), Value::Ref(idb)) => match (heap.get(ida), heap.get(idb)) {
            (Object::Str(_), Object::Str(_)) => ida == idb,
            _ => false,
        },
        _ => false,
    }
}
