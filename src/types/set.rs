//! The general-purpose OBJ-regime set, backed by the same open-
//! addressing engine as [`crate::types::map::Map`] with `()` values.

use crate::{
    heap::Heap,
    py_hash::{is_hashable, py_eq, py_hash},
    types::table::Table,
    value::Value,
};

#[derive(Debug, Clone, Default)]
pub struct Set {
    table: Table<Value, ()>,
}

impl Set {
    #[must_use]
    pub fn new() -> Self {
        Self { table: Table::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// # Errors
    /// Returns a `TypeError` if `value` is not hashable.
    pub fn contains(&self, value: Value, heap: &Heap) -> crate::exception::RunResult<bool> {
        if !is_hashable(value, heap) {
            return Err(unhashable_error(value, heap));
        }
        Ok(self.table.lookup(value, |k| py_hash(k, heap), |a, b| py_eq(a, b, heap)).is_some())
    }

    /// Adds `value` to the set. Returns `true` if it was newly inserted.
    ///
    /// # Errors
    /// Returns a `TypeError` if `value` is not hashable.
    pub fn add(&mut self, value: Value, heap: &Heap) -> crate::exception::RunResult<bool> {
        if !is_hashable(value, heap) {
            return Err(unhashable_error(value, heap));
        }
        Ok(self.table.insert(value, (), |k| py_hash(k, heap), |a, b| py_eq(a, b, heap)).is_none())
    }

    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        self.table.iter().map(|(k, ())| *k)
    }
}

fn unhashable_error(value: Value, heap: &Heap) -> crate::exception::RunError {
    let kind = match value {
        Value::Ref(id) => heap.get(id).kind_name(),
        _ => "object",
    };
    crate::exception::ExcType::type_error(format!("unhashable type: '{kind}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::NoLimitTracker;

    #[test]
    fn add_then_contains_round_trips() {
        let heap: Heap = Heap::new(NoLimitTracker);
        let mut s = Set::new();
        assert!(s.add(Value::SmallInt(1), &heap).unwrap());
        assert!(!s.add(Value::SmallInt(1), &heap).unwrap());
        assert!(s.contains(Value::SmallInt(1), &heap).unwrap());
        assert!(!s.contains(Value::SmallInt(2), &heap).unwrap());
    }

    #[test]
    fn true_and_one_collide() {
        let heap: Heap = Heap::new(NoLimitTracker);
        let mut s = Set::new();
        s.add(Value::TRUE, &heap).unwrap();
        assert!(!s.add(Value::SmallInt(1), &heap).unwrap());
        assert_eq!(s.len(), 1);
    }
}
