//! Implementation of the `__repl_print__` built-in.

use crate::{exception::RunResult, format::py_repr, heap::Heap, value::Value};

/// `__repl_print__(value)`: prints `value`'s repr and a trailing newline
/// unless `value` is `None`, then returns `value` unchanged.
///
/// Returning the argument rather than `None` is a deliberate deviation
/// from `print`'s contract: a REPL front-end driving this crate wants
/// the evaluated expression's value back (e.g. to bind it to `_`), not
/// a fresh `None` every statement.
pub fn repl_print(heap: &mut Heap, arg: Value) -> RunResult<Value> {
    if arg != Value::NONE {
        println!("{}", py_repr(arg, heap));
    }
    Ok(arg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::NoLimitTracker;

    #[test]
    fn returns_its_argument_unchanged() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        assert_eq!(repl_print(&mut heap, Value::SmallInt(42)).unwrap(), Value::SmallInt(42));
        assert_eq!(repl_print(&mut heap, Value::NONE).unwrap(), Value::NONE);
    }
}
