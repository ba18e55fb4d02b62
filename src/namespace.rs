//! Three-tier name resolution (locals → globals → builtins) and
//! `__build_class__`.
//!
//! The original runtime keeps `locals`/`globals`/`builtins` as three
//! process-wide pointers (`map_locals`, `map_globals`, `map_builtins` in
//! `runtime.c`). This crate threads the same three maps through one
//! owned [`Namespaces`] struct instead of true globals, per spec.md's
//! own design note that a reimplementation should expose a registry
//! object rather than file-scope statics, so a host can run more than
//! one interpreter instance.

use crate::{
    exception::{ExcType, RunResult},
    intern::{Interns, StringId},
    types::QstrTable,
    value::Value,
};

/// The three co-existing namespace maps.
///
/// `locals == globals` at the top level of a module — callers model
/// that by pointing both at the same map until a call pushes a fresh
/// local scope (out of scope here: scope push/pop belongs to the
/// bytecode engine, which hands this crate whichever map is currently
/// active).
#[derive(Debug, Default)]
pub struct Namespaces {
    pub locals: QstrTable<Value>,
    pub globals: QstrTable<Value>,
    pub builtins: QstrTable<Value>,
}

impl Namespaces {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `load_name`: locals, then globals, then builtins.
    ///
    /// # Errors
    /// `NameError` naming `name` if it's bound in none of the three.
    pub fn load_name(&self, name: StringId, interns: &Interns) -> RunResult<Value> {
        self.locals
            .get(name)
            .or_else(|| self.globals.get(name))
            .or_else(|| self.builtins.get(name))
            .copied()
            .ok_or_else(|| name_error(name, interns))
    }

    /// `load_global`: skips locals.
    ///
    /// # Errors
    /// `NameError` naming `name` if it's bound in neither globals nor
    /// builtins.
    pub fn load_global(&self, name: StringId, interns: &Interns) -> RunResult<Value> {
        self.globals.get(name).or_else(|| self.builtins.get(name)).copied().ok_or_else(|| name_error(name, interns))
    }

    /// `store_name`: always locals.
    pub fn store_name(&mut self, name: StringId, value: Value) {
        self.locals.insert(name, value);
    }

    /// `store_global`: always globals.
    pub fn store_global(&mut self, name: StringId, value: Value) {
        self.globals.insert(name, value);
    }

    /// Swaps in a fresh QSTR map as `locals`, for a class body about to
    /// execute, returning the map that was active before the swap so
    /// the caller can restore it afterward.
    pub fn enter_class_body(&mut self) -> QstrTable<Value> {
        std::mem::replace(&mut self.locals, QstrTable::new())
    }

    /// Restores `prior` as `locals`, returning the class body map that
    /// was active (now the finished class's namespace).
    pub fn exit_class_body(&mut self, prior: QstrTable<Value>) -> QstrTable<Value> {
        std::mem::replace(&mut self.locals, prior)
    }
}

fn name_error(name: StringId, interns: &Interns) -> crate::exception::RunError {
    ExcType::name_error(format!("name '{}' is not defined", interns.get(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_name_checks_locals_then_globals_then_builtins() {
        let mut interns = Interns::new();
        let x = interns.intern("x");
        let y = interns.intern("y");
        let z = interns.intern("z");
        let mut ns = Namespaces::new();
        ns.builtins.insert(x, Value::SmallInt(1));
        ns.globals.insert(y, Value::SmallInt(2));
        ns.locals.insert(x, Value::SmallInt(3));
        assert_eq!(ns.load_name(x, &interns).unwrap(), Value::SmallInt(3));
        assert_eq!(ns.load_name(y, &interns).unwrap(), Value::SmallInt(2));
        assert!(ns.load_name(z, &interns).is_err());
    }

    #[test]
    fn load_global_skips_locals() {
        let mut interns = Interns::new();
        let x = interns.intern("x");
        let mut ns = Namespaces::new();
        ns.locals.insert(x, Value::SmallInt(1));
        ns.globals.insert(x, Value::SmallInt(2));
        assert_eq!(ns.load_global(x, &interns).unwrap(), Value::SmallInt(2));
    }

    #[test]
    fn class_body_swap_round_trips_locals() {
        let mut interns = Interns::new();
        let x = interns.intern("x");
        let mut ns = Namespaces::new();
        ns.locals.insert(x, Value::SmallInt(1));
        let prior = ns.enter_class_body();
        assert!(ns.locals.is_empty());
        let y = interns.intern("y");
        ns.locals.insert(y, Value::SmallInt(2));
        let class_body = ns.exit_class_body(prior);
        assert_eq!(ns.locals.get(x), Some(&Value::SmallInt(1)));
        assert_eq!(class_body.get(y), Some(&Value::SmallInt(2)));
    }
}
