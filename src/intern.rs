//! `qstr` interning service: a bidirectional mapping between a small integer
//! handle and a string.
//!
//! Two interned strings compare equal iff their handles compare equal, which is
//! what lets [`StringId`] stand in directly for a string in hash tables and
//! identifier comparisons without touching the underlying bytes.

use ahash::AHashMap;

/// Interned string handle ("qstr" in the terminology of the original runtime).
///
/// Cheap to copy and compare: equality and hashing are on the raw index, never
/// on string content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(u32);

impl StringId {
    /// Returns the raw index backing this handle.
    ///
    /// Exposed for embedders that need to store handles compactly (e.g. a
    /// bytecode emitter writing operands into a code blob).
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Bidirectional string interner.
///
/// Strings go in once and are never removed: the runtime has no notion of
/// unloading a name. Lookup by handle is O(1) via direct indexing; lookup by
/// content is O(1) amortized via the reverse hash map.
#[derive(Debug, Default)]
pub struct Interns {
    strings: Vec<Box<str>>,
    by_str: AHashMap<Box<str>, StringId>,
}

impl Interns {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `s`, returning its (possibly newly-assigned) handle.
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(&id) = self.by_str.get(s) {
            return id;
        }
        let id = StringId(self.strings.len().try_into().expect("interned string table overflowed u32"));
        self.strings.push(s.into());
        self.by_str.insert(s.into(), id);
        id
    }

    /// Resolves a handle back to its string content.
    ///
    /// # Panics
    /// Panics if `id` was not produced by this `Interns` instance.
    #[must_use]
    pub fn get(&self, id: StringId) -> &str {
        &self.strings[id.0 as usize]
    }

    /// Looks up the handle for `s` without interning it.
    #[must_use]
    pub fn find(&self, s: &str) -> Option<StringId> {
        self.by_str.get(s).copied()
    }
}

/// Handles for the handful of identifier strings this crate's core
/// compares against directly (method-resolution dispatch, dunder
/// lookups) rather than through ordinary namespace/attribute lookup.
///
/// Interning these once at startup means every later comparison is a
/// cheap `StringId` equality instead of a string compare — the same
/// reasoning the QSTR regime applies everywhere else.
#[derive(Debug, Clone, Copy)]
pub struct WellKnownNames {
    pub append: StringId,
    pub join: StringId,
    pub format: StringId,
    pub dunder_next: StringId,
    pub qualname: StringId,
}

impl WellKnownNames {
    #[must_use]
    pub fn new(interns: &mut Interns) -> Self {
        Self {
            append: interns.intern("append"),
            join: interns.intern("join"),
            format: interns.intern("format"),
            dunder_next: interns.intern("__next__"),
            qualname: interns.intern("__qualname__"),
        }
    }
}
