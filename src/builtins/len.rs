//! Implementation of the `len` built-in.

use crate::{
    exception::{ExcType, RunResult},
    heap::{Heap, Object},
    value::{ConstKind, Value},
};

/// `len(obj)`: the element count of a str/list/tuple/set/dict.
///
/// A string's length is its `char` count, not its byte count — the
/// original counts codepoints, not storage bytes.
pub fn len(heap: &mut Heap, arg: Value) -> RunResult<Value> {
    let Value::Ref(id) = arg else {
        return Err(no_len_error(value_kind_name(arg)));
    };
    let n = match heap.get(id) {
        Object::Str(s) => s.chars().count(),
        Object::List(items) | Object::Tuple(items) => items.len(),
        Object::Set(set) => set.len(),
        Object::Map(map) => map.len(),
        other => return Err(no_len_error(other.kind_name())),
    };
    Ok(Value::SmallInt(n.try_into().expect("container length overflowed i64")))
}

fn no_len_error(kind: &str) -> crate::exception::RunError {
    ExcType::type_error(format!("object of type '{kind}' has no len()"))
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
    fn list_len_counts_elements() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let list = heap.allocate(Object::List(vec![Value::SmallInt(10), Value::SmallInt(20), Value::SmallInt(30)])).unwrap();
        assert_eq!(len(&mut heap, Value::Ref(list)).unwrap(), Value::SmallInt(3));
    }

    #[test]
    fn str_len_counts_chars_not_bytes() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let s = heap.allocate(Object::Str("héllo".into())).unwrap();
        assert_eq!(len(&mut heap, Value::Ref(s)).unwrap(), Value::SmallInt(5));
    }

    #[test]
    fn int_has_no_len() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        assert!(len(&mut heap, Value::SmallInt(1)).is_err());
    }
}
