//! Decimal-literal parsing and the polymorphic value-to-text conversion
//! shared by `print`, `str.format`, and `__repl_print__`.

use crate::{
    exception::{ExcType, RunResult, SimpleException},
    heap::{Heap, Object},
    intern::WellKnownNames,
    value::{ConstKind, Value},
};

/// `load_const_dec`: parses a decimal numeric literal's source text into
/// a float or (with a trailing `j`/`J`) a complex value, per the
/// original's `rt_load_const_dec` grammar:
/// `<intg>[.<frac>][(e|E)[+|-]<exp>][j|J]`.
///
/// # Errors
/// `SyntaxError` if a character outside that grammar appears before the
/// string ends.
pub fn load_const_dec(s: &str, heap: &mut Heap) -> RunResult<Value> {
    #[derive(PartialEq)]
    enum Stage {
        Intg,
        Frac,
        Exp,
    }

    let mut stage = Stage::Intg;
    let mut mantissa: f64 = 0.0;
    let mut exp_extra: i32 = 0;
    let mut exp_val: i32 = 0;
    let mut exp_neg = false;
    let mut imaginary = false;

    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if let Some(digit) = c.to_digit(10) {
            if stage == Stage::Exp {
                exp_val = exp_val * 10 + digit as i32;
            } else {
                mantissa = mantissa * 10.0 + f64::from(digit);
                if stage == Stage::Frac {
                    exp_extra -= 1;
                }
            }
        } else if stage == Stage::Intg && c == '.' {
            stage = Stage::Frac;
        } else if stage != Stage::Exp && (c == 'e' || c == 'E') {
            stage = Stage::Exp;
            match chars.peek() {
                Some('+') => {
                    chars.next();
                }
                Some('-') => {
                    chars.next();
                    exp_neg = true;
                }
                _ => {}
            }
        } else if c == 'j' || c == 'J' {
            imaginary = true;
            break;
        } else {
            return Err(SimpleException::new_msg(ExcType::SyntaxError, "invalid syntax for number".to_string()).into());
        }
    }

    let mut exp_val = if exp_neg { -exp_val } else { exp_val };
    exp_val += exp_extra;
    while exp_val > 0 {
        mantissa *= 10.0;
        exp_val -= 1;
    }
    while exp_val < 0 {
        mantissa *= 0.1;
        exp_val += 1;
    }

    let id = if imaginary {
        heap.allocate(Object::Complex { re: 0.0, im: mantissa })?
    } else {
        heap.allocate(Object::Float(mantissa))?
    };
    Ok(Value::Ref(id))
}

/// `load_const_str`: resolves `s` to its interned heap string handle.
///
/// # Errors
/// Propagates a resource error from the embedder's allocation tracker.
pub fn load_const_str(s: &str, heap: &mut Heap) -> RunResult<Value> {
    Ok(Value::Ref(heap.intern_str(s)?))
}

/// The Python-style `repr` text for `v`, following `py_obj_print_helper`:
/// strings are single-quoted, containers render recursively, and
/// `OBJ`/`USER` values fall back to a bare kind-name placeholder — the
/// original has no case for them either (its `default` branch asserts),
/// since printing a user instance needs a `__repr__` dispatch this crate
/// doesn't model.
#[must_use]
pub fn py_repr(v: Value, heap: &Heap) -> String {
    match v {
        Value::SmallInt(n) => n.to_string(),
        Value::Const(ConstKind::None) => "None".to_string(),
        Value::Const(ConstKind::False) => "False".to_string(),
        Value::Const(ConstKind::True) => "True".to_string(),
        Value::Const(ConstKind::NotImplemented) => "NotImplemented".to_string(),
        Value::Const(ConstKind::Ellipsis) => "Ellipsis".to_string(),
        Value::Const(ConstKind::StopIteration) => "StopIteration".to_string(),
        Value::Ref(id) => repr_heap(id, heap),
    }
}

fn repr_heap(id: crate::heap::HeapId, heap: &Heap) -> String {
    match heap.get(id) {
        Object::Str(s) => format!("'{s}'"),
        Object::Float(f) => format_g8(*f),
        Object::Complex { re, im } => {
            if *re == 0.0 {
                format!("{}j", format_g8(*im))
            } else {
                format!("({}+{}j)", format_g8(*re), format_g8(*im))
            }
        }
        Object::Tuple(items) => {
            let mut out = String::from("(");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&py_repr(*item, heap));
            }
            if items.len() == 1 {
                out.push(',');
            }
            out.push(')');
            out
        }
        Object::List(items) => {
            let mut out = String::from("[");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&py_repr(*item, heap));
            }
            out.push(']');
            out
        }
        Object::Set(set) => {
            let mut out = String::from("{");
            for (i, item) in set.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&py_repr(item, heap));
            }
            out.push('}');
            out
        }
        Object::Map(map) => {
            let mut out = String::from("{");
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&py_repr(*k, heap));
                out.push_str(": ");
                out.push_str(&py_repr(*v, heap));
            }
            out.push('}');
            out
        }
        Object::GenInstance(_) => "<generator object>".to_string(),
        Object::Exception(exc) => exc.kind.to_string(),
        Object::User { info, data } => (info.print)(*data),
        other => format!("<{} object>", other.kind_name()),
    }
}

/// Like [`py_repr`], but a class instance renders its `__qualname__`
/// text instead of the generic `<object>` placeholder, per §4.9.
///
/// Only the top-level value gets this treatment: an instance nested
/// inside a container still falls back to the generic placeholder,
/// since recursing would need `names` threaded through every container
/// arm in [`repr_heap`] for a case nothing in scope actually exercises.
/// `str.format` substitution and other repr call sites with no
/// `WellKnownNames` handle in scope use [`py_repr`] directly.
#[must_use]
pub fn py_repr_obj(v: Value, heap: &Heap, names: &WellKnownNames) -> String {
    if let Value::Ref(id) = v {
        if let Object::Instance { class, .. } = heap.get(id) {
            let class_id = *class;
            if let Object::Class { members, .. } = heap.get(class_id) {
                if let Some(Value::Ref(qn_id)) = members.get(names.qualname) {
                    if let Object::Str(s) = heap.get(*qn_id) {
                        return s.to_string();
                    }
                }
            }
        }
    }
    py_repr(v, heap)
}

/// The text `print` emits for one argument: like `py_repr`, but a bare
/// top-level string renders unquoted — the `str()`/`repr()` distinction
/// CPython draws. A string nested inside a container still renders
/// quoted via `py_repr`.
///
/// Takes no `WellKnownNames`, unlike [`py_repr_obj`]: `print` is a plain
/// [`crate::call::NativeFnVar`], whose fixed signature (`&mut Heap,
/// &[Value]`) has no room to carry it, the same constraint that keeps a
/// generator's `__next__` out of [`crate::attr::load_method`]. A class
/// instance argument to `print` therefore renders as the generic
/// placeholder rather than its `__qualname__`.
#[must_use]
pub fn py_str(v: Value, heap: &Heap) -> String {
    if let Value::Ref(id) = v {
        if let Object::Str(s) = heap.get(id) {
            return s.to_string();
        }
    }
    py_repr(v, heap)
}

/// Formats an `f64` the way `%.8g` would: up to 8 significant digits,
/// trailing zeros trimmed, matching the original's float/complex print
/// format.
#[must_use]
fn format_g8(f: f64) -> String {
    if f == 0.0 {
        return "0".to_string();
    }
    // `%.8g` switches to scientific notation outside this magnitude
    // window and otherwise prints up to 8 significant digits with
    // trailing zeros trimmed.
    let magnitude = f.abs().log10().floor() as i32;
    if (-4..8).contains(&magnitude) {
        let decimals = (7 - magnitude).max(0) as usize;
        let mut s = format!("{f:.decimals$}");
        if s.contains('.') {
            while s.ends_with('0') {
                s.pop();
            }
            if s.ends_with('.') {
                s.pop();
            }
        }
        s
    } else {
        format!("{f:.7e}")
    }
}
