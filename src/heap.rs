//! The heap arena: storage for every runtime value that needs identity
//! beyond what fits in an immediate [`crate::value::Value`].
//!
//! Objects are never explicitly freed. The arena is a push-only `Vec`; the
//! embedding host is assumed to run this crate inside a GC'd or
//! arena-scoped environment that reclaims the whole heap at once, so there
//! is no `free`/`dec_ref` path here at all.

use ahash::AHashMap;

use crate::{
    call::{AsmFn, NativeFn0, NativeFn1, NativeFn2, NativeFnN, NativeFnVar},
    exception::SimpleException,
    function::CodeId,
    intern::StringId,
    resource::ResourceTracker,
    tracer::{NoopTracer, VmTracer},
    types::{Map, Set},
    value::Value,
};

/// Handle to a heap-resident object.
///
/// An index into the arena's backing `Vec`. Cheap to copy; never reused,
/// since the arena never frees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeapId(u32);

impl HeapId {
    /// Raw index backing this handle, for callers that need a stable
    /// integer to hash or store compactly (e.g. the identity hash used
    /// for interned strings).
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A half-open range object, e.g. `range(10)` or `range(1, 10, 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeObj {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl RangeObj {
    /// Number of elements this range produces. Zero if the step carries
    /// `start` away from `stop` immediately.
    #[must_use]
    pub fn len(&self) -> usize {
        if self.step > 0 {
            if self.stop <= self.start {
                0
            } else {
                ((self.stop - self.start - 1) / self.step + 1) as usize
            }
        } else if self.step < 0 {
            if self.stop >= self.start {
                0
            } else {
                ((self.start - self.stop - 1) / (-self.step) + 1) as usize
            }
        } else {
            0
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Live iteration state over a [`RangeObj`].
#[derive(Debug, Clone, Copy)]
pub struct RangeIter {
    pub next: i64,
    pub stop: i64,
    pub step: i64,
    pub exhausted: bool,
}

/// A bound function: an underlying callable plus its receiver, produced
/// by attribute lookup on a class instance (`obj.method`).
#[derive(Debug, Clone, Copy)]
pub struct BoundMethod {
    pub receiver: Value,
    pub func: HeapId,
}

/// One entry in a [`UserInfo`] method table: a host-extension method,
/// selected by arity per §4.6's "kind selects 1-arg or 2-arg wrapping".
/// Arity counts include the receiver, matching how `list.append`/
/// `str.join` are already wrapped as plain [`NativeFn1`]/[`NativeFn2`]
/// values elsewhere in this crate.
#[derive(Debug, Clone, Copy)]
pub enum UserMethod {
    /// Self-only call, e.g. `obj.method()`.
    Arity1(NativeFn1),
    /// Self plus one positional argument, e.g. `obj.method(x)`.
    Arity2(NativeFn2),
}

/// The vtable a [`Object::User`] instance's `info` descriptor points at:
/// a type name for error/print text and a linear method table
/// [`crate::attr::load_method`]'s USER case searches by name, per §3.1's
/// "info descriptor" and §4.6's "linear search of the info descriptor's
/// method table by C-string name".
#[derive(Debug)]
pub struct UserInfo {
    pub type_name: &'static str,
    /// §4.9: "USER delegates to its `info->print`".
    pub print: fn([usize; 2]) -> String,
    pub methods: &'static [(&'static str, UserMethod)],
}

/// The GEN_WRAP template: a not-yet-instantiated generator function.
///
/// Calling it produces a fresh [`GenInstance`] rather than running the
/// body immediately.
#[derive(Debug, Clone, Copy)]
pub struct GenWrap {
    pub underlying: CodeId,
    pub n_args: usize,
    pub n_state: usize,
}

/// Outcome of resuming a [`GenInstance`].
#[derive(Debug, Clone)]
pub enum ResumeOutcome {
    Yielded(Value),
    Returned(Value),
    Raised(SimpleException),
}

/// Running state of the generator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenState {
    New,
    Suspended,
    Running,
    Finished,
}

/// A live generator frame: the GEN_WRAP template's owned local state plus
/// a resume point.
///
/// `state[0]` holds the underlying FUN_BC code id (boxed as a small int),
/// `state[1..1+n_args]` the forward-order call arguments, with the
/// remainder reserved for locals and the operand stack. Total frame size
/// is `1 + state_size` where `state_size = max(n_locals, 3) + n_stack`,
/// per `make_function_from_id`.
#[derive(Debug, Clone)]
pub struct GenInstance {
    pub underlying: CodeId,
    pub state: Vec<Value>,
    pub ip: usize,
    pub sp: usize,
    pub gen_state: GenState,
}

/// Heap-resident object kinds.
///
/// Mirrors the role of the teacher's `HeapData` enum (defined in its
/// `heap.rs`): every variant wraps one value kind that needs an arena
/// identity rather than fitting inline in [`Value`].
#[derive(Debug)]
pub enum Object {
    Str(Box<str>),
    Float(f64),
    Complex { re: f64, im: f64 },
    Range(RangeObj),
    RangeIter(RangeIter),
    Tuple(Vec<Value>),
    List(Vec<Value>),
    TupleIter { items: HeapId, next: usize },
    ListIter { items: HeapId, next: usize },
    Set(Set),
    Map(Map),
    Exception(SimpleException),
    Fun0(NativeFn0),
    Fun1(NativeFn1),
    Fun2(NativeFn2),
    FunN { f: NativeFnN, n_args: usize },
    /// A variadic native callable plus its minimum fixed arity
    /// (`rt_make_function_var(n_fixed_args, f)`'s `n_args`, enforced by
    /// `rt_call_function_n` before the call ever reaches the function
    /// body — see §3.1/§4.4).
    FunVar { f: NativeFnVar, min_args: usize },
    FunBc { code: CodeId, n_args: usize },
    FunAsm(AsmFn),
    GenWrap(GenWrap),
    GenInstance(GenInstance),
    BoundMethod(BoundMethod),
    /// A user-defined class: name, QSTR-keyed member map, base class (if
    /// any).
    Class {
        name: StringId,
        members: crate::types::QstrTable<Value>,
        base: Option<HeapId>,
    },
    /// An instance of a user-defined class: the class and a QSTR-keyed
    /// per-instance member map (§3.1: "OBJ" kind's payload is a CLASS
    /// pointer plus a QSTR-keyed member map, the same regime a class
    /// body's own namespace uses — not the general OBJ-keyed `Map`).
    Instance { class: HeapId, attrs: crate::types::QstrTable<Value> },
    /// An opaque host-extension object (§3.1's "USER" kind): an `info`
    /// vtable plus two machine words of extension data the host
    /// interprets however it likes.
    User { info: &'static UserInfo, data: [usize; 2] },
}

impl Object {
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "str",
            Self::Float(_) => "float",
            Self::Complex { .. } => "complex",
            Self::Range(_) => "range",
            Self::RangeIter(_) => "range_iterator",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
            Self::TupleIter { .. } => "tuple_iterator",
            Self::ListIter { .. } => "list_iterator",
            Self::Set(_) => "set",
            Self::Map(_) => "dict",
            Self::Exception(_) => "exception",
            Self::Fun0(_) | Self::Fun1(_) | Self::Fun2(_) | Self::FunN { .. } | Self::FunVar { .. } | Self::FunBc { .. } | Self::FunAsm(_) => "function",
            Self::GenWrap(_) => "function",
            Self::GenInstance(_) => "generator",
            Self::BoundMethod(_) => "method",
            Self::Class { .. } => "type",
            Self::Instance { .. } => "object",
            Self::User { info, .. } => info.type_name,
        }
    }
}

// VmTracer carries no Debug bound (NoopTracer is meant to cost nothing,
// not even a vtable-dispatched fmt impl), so Heap's derived Debug needs
// this the same way it needs one for `dyn ResourceTracker`.
impl std::fmt::Debug for dyn VmTracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<dyn VmTracer>")
    }
}

/// Push-only heap arena.
///
/// Holds its [`ResourceTracker`] behind a trait object rather than a
/// type parameter: a generic `Heap<T>` would have to propagate `T`
/// through every function in the crate that ever touches the heap,
/// including the [`crate::function::BytecodeEngine`] trait-object seam,
/// which cannot itself be generic. One boxed tracker keeps the rest of
/// the crate's signatures concrete.
#[derive(Debug)]
pub struct Heap {
    objects: Vec<Object>,
    tracker: Box<dyn ResourceTracker>,
    vm_tracer: Box<dyn VmTracer>,
    call_depth: usize,
    /// Content-addressed cache of interned string values: every
    /// `Object::Str` reachable through [`Self::intern_str`] is deduped
    /// here, so two strings of equal content always share one `HeapId`.
    /// Mirrors the original runtime's `py_obj_new_str(qstr)`, where a
    /// string *value* is never anything but a qstr handle — this crate's
    /// `Object::Str` plays that role, with this map standing in for the
    /// qstr table's own dedup.
    str_interns: AHashMap<Box<str>, HeapId>,
}

impl Heap {
    #[must_use]
    pub fn new(tracker: impl ResourceTracker + 'static) -> Self {
        Self {
            objects: Vec::new(),
            tracker: Box::new(tracker),
            vm_tracer: Box::new(NoopTracer),
            call_depth: 0,
            str_interns: AHashMap::new(),
        }
    }

    /// Swaps in a non-default [`VmTracer`], e.g. [`crate::tracer::StderrTracer`]
    /// for a host that wants a cheap execution trace.
    #[must_use]
    pub fn with_vm_tracer(mut self, tracer: impl VmTracer + 'static) -> Self {
        self.vm_tracer = Box::new(tracer);
        self
    }

    /// Enters one call frame, checking the embedder's call-depth ceiling.
    /// Pair with [`Self::exit_call`] around the call-protocol dispatch.
    ///
    /// Rolls the depth counter back before returning an error, so a
    /// rejected call leaves `call_depth` exactly where it found it —
    /// callers short-circuit via `?` on this call and never reach
    /// [`Self::exit_call`], so this function cannot leave the leftover
    /// increment for them to clean up.
    ///
    /// # Errors
    /// Returns a resource error if the tracker rejects this depth.
    pub fn enter_call(&mut self) -> Result<(), crate::resource::ResourceError> {
        self.call_depth += 1;
        self.tracker.on_call(self.call_depth).inspect_err(|_| self.call_depth -= 1)
    }

    /// Leaves the call frame most recently entered via [`Self::enter_call`].
    pub fn exit_call(&mut self) {
        self.call_depth -= 1;
    }

    #[must_use]
    pub fn vm_tracer_mut(&mut self) -> &mut dyn VmTracer {
        self.vm_tracer.as_mut()
    }

    /// Allocates `obj`, returning its handle.
    ///
    /// # Errors
    /// Returns a resource error if the embedder's tracker rejects the
    /// allocation (e.g. a heap-object-count ceiling).
    pub fn allocate(&mut self, obj: Object) -> Result<HeapId, crate::resource::ResourceError> {
        self.tracker.on_allocate(std::mem::size_of::<Object>())?;
        let idx = self.objects.len();
        self.objects.push(obj);
        Ok(HeapId(idx.try_into().expect("heap arena overflowed u32 index space")))
    }

    /// Returns the handle for a string value equal to `s`, allocating a
    /// fresh `Object::Str` only the first time this content is seen.
    ///
    /// Every string *value* this crate produces — literals, concatenation
    /// results, `str.join`/`str.format` output, attribute names re-read as
    /// strings — must go through here rather than a bare
    /// `heap.allocate(Object::Str(..))`, or [`crate::py_hash::py_eq`]'s
    /// "equal iff interned handles equal" contract silently breaks for
    /// that call site.
    ///
    /// # Errors
    /// Returns a resource error if the embedder's tracker rejects the
    /// allocation, only on a true cache miss.
    pub fn intern_str(&mut self, s: &str) -> Result<HeapId, crate::resource::ResourceError> {
        if let Some(&id) = self.str_interns.get(s) {
            return Ok(id);
        }
        let id = self.allocate(Object::Str(s.into()))?;
        self.str_interns.insert(s.into(), id);
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: HeapId) -> &Object {
        &self.objects[id.0 as usize]
    }

    #[must_use]
    pub fn get_mut(&mut self, id: HeapId) -> &mut Object {
        &mut self.objects[id.0 as usize]
    }

    #[must_use]
    pub fn tracker_mut(&mut self) -> &mut dyn ResourceTracker {
        self.tracker.as_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
