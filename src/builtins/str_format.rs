//! Implementation of the bound `str.format` method.

use crate::{
    exception::{ExcType, RunResult},
    format::py_repr,
    heap::{Heap, Object},
    value::Value,
};

/// `"template".format(*args)`, grounded on `rt_str_format`: scans the
/// template for `{{`/`{}` and substitutes positional arguments in
/// order via [`py_repr`] (so a string argument comes out quoted, same
/// as `py_obj_print_helper` substituting into the original).
///
/// `args[0]` is the receiver string; `args[1..]` are the substitution
/// values, already in forward positional order.
pub fn str_format(heap: &mut Heap, args: &[Value]) -> RunResult<Value> {
    let [receiver, rest @ ..] = args else {
        return Err(ExcType::type_error("str.format() missing receiver"));
    };
    let Value::Ref(id) = receiver else {
        return Err(ExcType::type_error("str.format() called on a non-string receiver"));
    };
    let Object::Str(template) = heap.get(*id) else {
        return Err(ExcType::type_error("str.format() called on a non-string receiver"));
    };
    let template = template.clone();

    let mut out = String::with_capacity(template.len());
    let mut arg_i = 0;
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('{') => out.push('{'),
            Some('}') => {
                let Some(&value) = rest.get(arg_i) else {
                    return Err(ExcType::index_error("tuple index out of range"));
                };
                out.push_str(&py_repr(value, heap));
                arg_i += 1;
            }
            Some(other) => {
                out.push('{');
                out.push(other);
            }
            None => out.push('{'),
        }
    }
    Ok(Value::Ref(heap.intern_str(&out)?))
}
