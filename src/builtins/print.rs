//! Implementation of the `print` built-in.

use crate::{exception::RunResult, format::py_str, heap::Heap, value::Value};

/// `print(*args)`: joins with single spaces, strings rendered unquoted,
/// other values through the polymorphic printer, trailing newline.
/// Always returns `None`.
///
/// `args` is already normalized to forward positional order (this is a
/// `FUN_VAR` builtin).
pub fn print(heap: &mut Heap, args: &[Value]) -> RunResult<Value> {
    println!("{}", build_line(args, heap));
    Ok(Value::NONE)
}

fn build_line(args: &[Value], heap: &Heap) -> String {
    let mut out = String::new();
    for (i, &v) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&py_str(v, heap));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{heap::Object, resource::NoLimitTracker};

    #[test]
    fn joins_multiple_args_with_single_spaces_and_unquotes_strings() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let s = heap.allocate(Object::Str("hi".into())).unwrap();
        let line = build_line(&[Value::Ref(s), Value::SmallInt(1)], &heap);
        assert_eq!(line, "hi 1");
    }

    #[test]
    fn empty_args_produce_an_empty_line() {
        let heap: Heap = Heap::new(NoLimitTracker);
        assert_eq!(build_line(&[], &heap), "");
    }
}
