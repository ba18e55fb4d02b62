//! The general-purpose OBJ-regime dict: `Value` keys hashed and compared
//! per the §3.1 hash/equality contract, backed by the same open-
//! addressing engine as every other associative container here.

use crate::{
    heap::Heap,
    py_hash::{is_hashable, py_eq, py_hash},
    types::table::Table,
    value::Value,
};

/// A dict value: `{key: value, ...}` with insertion-order-agnostic
/// storage (iteration order follows slot order, not insertion order —
/// this crate does not promise Python's insertion-ordering guarantee
/// since nothing in scope depends on it).
#[derive(Debug, Clone, Default)]
pub struct Map {
    table: Table<Value, Value>,
}

impl Map {
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
    /// Returns a `TypeError` if `key` is not hashable.
    pub fn get(&self, key: Value, heap: &Heap) -> crate::exception::RunResult<Option<Value>> {
        if !is_hashable(key, heap) {
            return Err(unhashable_error(key, heap));
        }
        Ok(self.table.lookup(key, |k| py_hash(k, heap), |a, b| py_eq(a, b, heap)).copied())
    }

    /// Inserts `key -> value`. If an equal key is already present, the
    /// stored key object is left unchanged and only the value updates —
    /// see `{True: 'a'}` then inserting `1 -> 'b'` retains `True` as the
    /// stored key.
    ///
    /// # Errors
    /// Returns a `TypeError` if `key` is not hashable.
    pub fn insert(&mut self, key: Value, value: Value, heap: &Heap) -> crate::exception::RunResult<Option<Value>> {
        if !is_hashable(key, heap) {
            return Err(unhashable_error(key, heap));
        }
        Ok(self.table.insert(key, value, |k| py_hash(k, heap), |a, b| py_eq(a, b, heap)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.table.iter()
    }
}

fn unhashable_error(key: Value, heap: &Heap) -> crate::exception::RunError {
    let kind = match key {
        Value::Ref(id) => heap.get(id).kind_name(),
        _ => "object",
    };
    crate::exception::ExcType::type_error(format!("unhashable type: '{kind}'"))
}
