//! `__build_class__`: runs a class body against a fresh namespace and
//! wraps the result into a [`Object::Class`].
//!
//! Reachable only through [`crate::Runtime::load_build_class`], not the
//! ordinary `builtins` name lookup — the original dispatches it via a
//! dedicated `LOAD_BUILD_CLASS` opcode rather than a `NAME` lookup,
//! since the body callable always comes straight from a just-emitted
//! `MAKE_FUNCTION`, never from a name a user could shadow.

use crate::{
    call::call_function_n,
    exception::RunResult,
    function::BytecodeEngine,
    heap::{Heap, Object},
    intern::{Interns, StringId, WellKnownNames},
    namespace::Namespaces,
    types::QstrTable,
    value::Value,
};

/// `__build_class__(body_callable, class_name)` per §4.10: swaps in a
/// fresh QSTR map as locals, runs `body_callable` with a single `None`
/// sentinel positional argument (the original passes the would-be
/// `__qualname__`/cell args; with no closures or nested-qualname
/// tracking in scope here, `None` is the one value every class body
/// ignores), restores the prior locals, and wraps the finished body
/// namespace into a [`Object::Class`].
///
/// If the body didn't set its own `__qualname__` member, one is added
/// from `class_name`'s interned text, so [`crate::format::py_repr_obj`]
/// always has something to print.
///
/// # Errors
/// Propagates whatever `body_callable` raises (after restoring locals),
/// or a resource error allocating the class.
pub fn build_class(
    heap: &mut Heap,
    engine: &mut dyn BytecodeEngine,
    namespaces: &mut Namespaces,
    interns: &Interns,
    names: &WellKnownNames,
    body_callable: Value,
    class_name: StringId,
) -> RunResult<Value> {
    let prior = namespaces.enter_class_body();
    let body_result = call_function_n(heap, engine, body_callable, &[Value::NONE]);
    let mut members = namespaces.exit_class_body(prior);
    body_result?;

    if members.get(names.qualname).is_none() {
        let qn_id = heap.intern_str(interns.get(class_name))?;
        members.insert(names.qualname, Value::Ref(qn_id));
    }

    let class_id = heap.allocate(Object::Class { name: class_name, members, base: None })?;
    Ok(Value::Ref(class_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::NoLimitTracker;

    struct NoopEngine;
    impl BytecodeEngine for NoopEngine {
        fn run(&mut self, _code: crate::function::CodeId, _argv: &[Value], _heap: &mut Heap) -> RunResult<Value> {
            unreachable!("test callables never go through the bytecode engine")
        }
    }

    fn store_x(heap: &mut Heap, _arg: Value) -> RunResult<Value> {
        Ok(Value::SmallInt(1))
    }

    #[test]
    fn qualname_defaults_to_class_name_when_body_leaves_it_unset() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let mut interns = Interns::new();
        let names = WellKnownNames::new(&mut interns);
        let mut namespaces = Namespaces::new();
        let class_name = interns.intern("Point");
        let body = Value::Ref(heap.allocate(Object::Fun1(store_x)).unwrap());
        let mut engine = NoopEngine;

        let v = build_class(&mut heap, &mut engine, &mut namespaces, &interns, &names, body, class_name).unwrap();
        let Value::Ref(id) = v else { panic!("expected heap ref") };
        let Object::Class { members, .. } = heap.get(id) else { panic!("expected Class") };
        let Some(Value::Ref(qn_id)) = members.get(names.qualname).copied() else {
            panic!("expected __qualname__ to be set")
        };
        let Object::Str(s) = heap.get(qn_id) else { panic!("expected str") };
        assert_eq!(&**s, "Point");
    }

    #[test]
    fn class_body_locals_do_not_leak_into_the_surrounding_scope() {
        let mut heap: Heap = Heap::new(NoLimitTracker);
        let mut interns = Interns::new();
        let names = WellKnownNames::new(&mut interns);
        let mut namespaces = Namespaces::new();
        let outer_name = interns.intern("outer");
        namespaces.locals.insert(outer_name, Value::SmallInt(99));
        let class_name = interns.intern("C");
        let body = Value::Ref(heap.allocate(Object::Fun1(store_x)).unwrap());
        let mut engine = NoopEngine;

        build_class(&mut heap, &mut engine, &mut namespaces, &interns, &names, body, class_name).unwrap();
        assert_eq!(namespaces.locals.get(outer_name), Some(&Value::SmallInt(99)));
    }

    #[test]
    fn body_exception_still_restores_prior_locals() {
        fn raising(_heap: &mut Heap, _arg: Value) -> RunResult<Value> {
            Err(crate::exception::ExcType::type_error("boom"))
        }

        let mut heap: Heap = Heap::new(NoLimitTracker);
        let mut interns = Interns::new();
        let names = WellKnownNames::new(&mut interns);
        let mut namespaces = Namespaces::new();
        let outer_name = interns.intern("outer");
        namespaces.locals.insert(outer_name, Value::SmallInt(7));
        let class_name = interns.intern("C");
        let body = Value::Ref(heap.allocate(Object::Fun1(raising)).unwrap());
        let mut engine = NoopEngine;

        assert!(build_class(&mut heap, &mut engine, &mut namespaces, &interns, &names, body, class_name).is_err());
        assert_eq!(namespaces.locals.get(outer_name), Some(&Value::SmallInt(7)));
    }
}
