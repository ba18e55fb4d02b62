//! Implementation of the bound `str.join` method.

use crate::{
    exception::{ExcType, RunResult},
    heap::{Heap, Object},
    value::Value,
};

/// `"sep".join(iterable_of_str)`, grounded on `rt_str_join`: only tuples
/// and lists of strings are accepted, matching the original's restriction
/// to `O_TUPLE`/`O_LIST` arguments.
pub fn str_join(heap: &mut Heap, self_in: Value, arg: Value) -> RunResult<Value> {
    let Value::Ref(self_id) = self_in else {
        return Err(ExcType::type_error("str.join() called on a non-string receiver"));
    };
    let Object::Str(sep) = heap.get(self_id) else {
        return Err(ExcType::type_error("str.join() called on a non-string receiver"));
    };
    let sep = sep.clone();

    let Value::Ref(arg_id) = arg else {
        return Err(bad_arg());
    };
    let items = match heap.get(arg_id) {
        Object::Tuple(items) | Object::List(items) => items.clone(),
        _ => return Err(bad_arg()),
    };

    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let Value::Ref(item_id) = item else {
            return Err(bad_arg());
        };
        let Object::Str(s) = heap.get(item_id) else {
            return Err(bad_arg());
        };
        parts.push(s.to_string());
    }

    let joined = parts.join(&sep);
    Ok(Value::Ref(heap.intern_str(&joined)?))
}

fn bad_arg() -> crate::exception::RunError {
    ExcType::type_error("?str.join expecting a list of str's")
}
