//! Resource limits: the in-process "configuration" surface for embedders.
//!
//! There is no on-disk config format here — an embedder builds a
//! [`LimitedTracker`] with whatever ceilings it wants and hands it to a
//! [`crate::heap::Heap`] at construction time.

use std::fmt;

/// Error returned when a resource limit is exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceError {
    HeapObjects { limit: usize, count: usize },
    MapEntries { limit: usize, count: usize },
    CallDepth { limit: usize, depth: usize },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeapObjects { limit, count } => write!(f, "heap object limit exceeded: {count} > {limit}"),
            Self::MapEntries { limit, count } => write!(f, "map entry limit exceeded: {count} > {limit}"),
            Self::CallDepth { limit, depth } => write!(f, "call depth limit exceeded: {depth} > {limit}"),
        }
    }
}

impl std::error::Error for ResourceError {}

/// Hook points an embedder can use to bound this crate's resource usage.
///
/// Mirrors the teacher's `ResourceTracker` seam: a trait the heap and map
/// call into, with a zero-overhead default ([`NoLimitTracker`]) and a
/// configurable alternative ([`LimitedTracker`]).
pub trait ResourceTracker: fmt::Debug {
    /// Called before each heap allocation, given an approximate size in
    /// bytes.
    fn on_allocate(&mut self, size_hint: usize) -> Result<(), ResourceError>;

    /// Called before growing an existing container (map/set rehash,
    /// list/tuple growth) by `additional` entries.
    fn on_container_grow(&mut self, additional: usize) -> Result<(), ResourceError> {
        self.on_allocate(additional)
    }

    /// Called before pushing a new call frame.
    fn on_call(&mut self, depth: usize) -> Result<(), ResourceError>;
}

// `ResourceTracker: fmt::Debug` only obligates each *concrete*
// implementor to provide `Debug`; the type-erased `dyn ResourceTracker`
// trait object still needs its own impl before `Heap` (which stores one
// behind a `Box`) can derive `Debug`.
impl fmt::Debug for dyn ResourceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<dyn ResourceTracker>")
    }
}

/// A tracker that never rejects anything. The default for embedders that
/// don't need sandboxing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLimitTracker;

impl ResourceTracker for NoLimitTracker {
    fn on_allocate(&mut self, _size_hint: usize) -> Result<(), ResourceError> {
        Ok(())
    }

    fn on_call(&mut self, _depth: usize) -> Result<(), ResourceError> {
        Ok(())
    }
}

/// A tracker that enforces fixed ceilings, for embedding this runtime in
/// a sandbox.
#[derive(Debug, Clone, Copy)]
pub struct LimitedTracker {
    pub max_heap_objects: usize,
    pub max_map_entries: usize,
    pub max_call_depth: usize,
    heap_objects: usize,
    map_entries: usize,
}

impl LimitedTracker {
    #[must_use]
    pub fn new(max_heap_objects: usize, max_map_entries: usize, max_call_depth: usize) -> Self {
        Self {
            max_heap_objects,
            max_map_entries,
            max_call_depth,
            heap_objects: 0,
            map_entries: 0,
        }
    }
}

impl ResourceTracker for LimitedTracker {
    fn on_allocate(&mut self, _size_hint: usize) -> Result<(), ResourceError> {
        self.heap_objects += 1;
        if self.heap_objects > self.max_heap_objects {
            return Err(ResourceError::HeapObjects {
                limit: self.max_heap_objects,
                count: self.heap_objects,
            });
        }
        Ok(())
    }

    fn on_container_grow(&mut self, additional: usize) -> Result<(), ResourceError> {
        self.map_entries += additional;
        if self.map_entries > self.max_map_entries {
            return Err(ResourceError::MapEntries {
                limit: self.max_map_entries,
                count: self.map_entries,
            });
        }
        Ok(())
    }

    fn on_call(&mut self, depth: usize) -> Result<(), ResourceError> {
        if depth > self.max_call_depth {
            return Err(ResourceError::CallDepth {
                limit: self.max_call_depth,
                depth,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_limit_tracker_never_rejects() {
        let mut t = NoLimitTracker;
        assert!(t.on_allocate(1_000_000).is_ok());
        assert!(t.on_call(1_000_000).is_ok());
    }

    #[test]
    fn limited_tracker_rejects_past_ceiling() {
        let mut t = LimitedTracker::new(2, 10, 10);
        assert!(t.on_allocate(0).is_ok());
        assert!(t.on_allocate(0).is_ok());
        assert!(t.on_allocate(0).is_err());
    }
}
