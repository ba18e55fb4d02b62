//! Implementation of the bound `list.append` method.

use crate::{
    exception::{ExcType, RunResult},
    heap::{Heap, Object},
    value::Value,
};

/// `list.append(value)`, grounded on `rt_list_append`. Returns `None`,
/// matching CPython.
pub fn list_append(heap: &mut Heap, self_in: Value, arg: Value) -> RunResult<Value> {
    let Value::Ref(id) = self_in else {
        return Err(ExcType::type_error("list.append() called on a non-list receiver"));
    };
    match heap.get_mut(id) {
        Object::List(items) => {
            items.push(arg);
            Ok(Value::NONE)
        }
        _ => Err(ExcType::type_error("list.append() called on a non-list receiver")),
    }
}
