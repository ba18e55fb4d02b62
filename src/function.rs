//! The process-wide code registry and the call-target kinds it hands
//! out.
//!
//! `CodeId` is an opaque handle into a fixed-at-setup-time array of code
//! descriptors, populated once via `assign_*_code`. Id `1` is reserved
//! for the main module, matching the original runtime's convention.

use crate::{
    call::{AsmFn, NativeFn0, NativeFn1, NativeFn2, NativeFnN, NativeFnVar},
    exception::RunResult,
    heap::{GenWrap, Heap, HeapId, Object, ResumeOutcome},
    value::Value,
};

/// Handle into the code registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodeId(u32);

impl CodeId {
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Reserved id for the main module's top-level code.
pub const MAIN_MODULE_CODE_ID: CodeId = CodeId(1);

/// What kind of callable a [`CodeId`] resolves to.
#[derive(Debug, Clone, Copy)]
pub enum CodeKind {
    /// No code assigned yet (a forward-declared id).
    None,
    /// Bytecode, interpreted by an external [`BytecodeEngine`].
    Byte { n_args: usize, n_locals: usize, n_stack: usize, is_generator: bool },
    /// A fixed-arity or variadic native Rust function.
    Native(NativeKind),
    /// An inline-assembly / JIT-compiled entry point.
    InlineAsm(AsmFn),
}

#[derive(Debug, Clone, Copy)]
pub enum NativeKind {
    Fn0(NativeFn0),
    Fn1(NativeFn1),
    Fn2(NativeFn2),
    FnN { f: NativeFnN, n_args: usize },
    /// `rt_make_function_var(n_fixed_args, f)`: `min_args` is the
    /// minimum number of positional arguments the dispatcher enforces
    /// before ever calling `f`.
    FnVar { f: NativeFnVar, min_args: usize },
}

/// One entry in the code registry.
#[derive(Debug, Clone, Copy)]
pub struct CodeDescriptor {
    pub kind: CodeKind,
}

/// The process-wide registry of code descriptors.
///
/// Populated once at setup time via [`Self::assign`]; consumed by
/// [`make_function_from_id`] whenever a `MAKE_FUNCTION`-equivalent
/// operation needs to wrap a code id into a callable [`Value`].
#[derive(Debug, Default)]
pub struct CodeRegistry {
    entries: Vec<CodeDescriptor>,
}

impl CodeRegistry {
    #[must_use]
    pub fn new() -> Self {
        // id 0 is unused, id 1 (MAIN_MODULE_CODE_ID) is reserved for the
        // main module and pre-populated as CodeKind::None until the host
        // assigns it.
        Self {
            entries: vec![CodeDescriptor { kind: CodeKind::None }, CodeDescriptor { kind: CodeKind::None }],
        }
    }

    /// Reserves a fresh id with no code assigned yet.
    pub fn reserve(&mut self) -> CodeId {
        let id = self.entries.len();
        self.entries.push(CodeDescriptor { kind: CodeKind::None });
        CodeId(id.try_into().expect("code registry overflowed u32 index space"))
    }

    /// Assigns `kind` to `id`, previously returned by [`Self::reserve`]
    /// or equal to [`MAIN_MODULE_CODE_ID`].
    pub fn assign(&mut self, id: CodeId, kind: CodeKind) {
        self.entries[id.0 as usize].kind = kind;
    }

    #[must_use]
    pub fn get(&self, id: CodeId) -> CodeKind {
        self.entries[id.0 as usize].kind
    }

    /// `get_unique_code_id(is_main)` from §6's emitter contract:
    /// [`MAIN_MODULE_CODE_ID`] iff `is_main`, else a freshly reserved id.
    ///
    /// Calling this with `is_main = true` more than once just hands back
    /// `MAIN_MODULE_CODE_ID` again without reserving anything new,
    /// matching the original's "id 1 is reserved" contract rather than
    /// panicking on a double-call the emitter is not expected to make.
    pub fn get_unique_code_id(&mut self, is_main: bool) -> CodeId {
        if is_main {
            MAIN_MODULE_CODE_ID
        } else {
            self.reserve()
        }
    }

    /// `assign_byte_code(id, n_args, n_locals, n_stack, is_generator)`.
    /// The bytecode blob itself (`code`/`len` in §6) is owned by the
    /// external bytecode engine, not this registry — see
    /// [`BytecodeEngine`]'s doc comment — so only the descriptor fields
    /// this crate needs to dispatch calls are recorded here.
    pub fn assign_byte_code(&mut self, id: CodeId, n_args: usize, n_locals: usize, n_stack: usize, is_generator: bool) {
        self.assign(id, CodeKind::Byte { n_args, n_locals, n_stack, is_generator });
    }

    /// `assign_native_code(id, kind, n_args)` for `FUN_N`/`FUN_VAR`/
    /// `FUN_0`/`FUN_1`/`FUN_2` native entries (arity for the fixed-0/1/2
    /// kinds is implied by the function-pointer type itself, so the
    /// explicit arity field is only carried by [`NativeKind::FnN`]'s
    /// `n_args` and [`NativeKind::FnVar`]'s `min_args`).
    pub fn assign_native_code(&mut self, id: CodeId, kind: NativeKind) {
        self.assign(id, CodeKind::Native(kind));
    }

    /// `assign_inline_asm_code(id, entry)`.
    pub fn assign_inline_asm_code(&mut self, id: CodeId, entry: AsmFn) {
        self.assign(id, CodeKind::InlineAsm(entry));
    }
}

/// External collaborator: the bytecode execution engine.
///
/// Out of scope for this crate (the instruction dispatch loop, the
/// lexer/parser/emitter that produces bytecode) — this trait is the
/// seam a host plugs an engine into. A trait object rather than a
/// generic parameter on [`crate::Runtime`], because native function
/// pointers stored inside [`Object`]/[`Value`] need one fixed,
/// non-generic signature to live in a plain enum variant; threading an
/// engine type parameter through every value and call site would color
/// the whole crate for no benefit.
pub trait BytecodeEngine {
    /// Runs the bytecode at `code` with `argv` already in forward
    /// positional order, returning its result.
    fn run(&mut self, code: CodeId, argv: &[Value], heap: &mut Heap) -> RunResult<Value>;

    /// Resumes a suspended generator frame, mirroring §6's
    /// `execute_bytecode_resume(ip*, state_base, sp*) -> yielded?` contract:
    /// `state` is the frame's `state[1..]` slice (locals plus operand
    /// stack, with slot 0 — the underlying callable — already stripped by
    /// the caller), `ip`/`sp` are the saved instruction/stack pointers,
    /// threaded through by `&mut` so the caller can persist whatever the
    /// engine leaves them at.
    ///
    /// Default implementation: an engine that doesn't model suspension at
    /// all just runs to completion once and reports `Returned`/`Raised`,
    /// never `Yielded` — adequate for a host whose bytecode never
    /// contains a `yield`. A real engine overrides this to actually
    /// suspend mid-frame.
    fn resume(&mut self, code: CodeId, state: &mut [Value], ip: &mut usize, sp: &mut usize, heap: &mut Heap) -> RunResult<ResumeOutcome> {
        let _ = (ip, sp);
        match self.run(code, state, heap) {
            Ok(v) => Ok(ResumeOutcome::Returned(v)),
            Err(crate::exception::RunError::Exception(exc)) => Ok(ResumeOutcome::Raised(exc)),
            Err(other) => Err(other),
        }
    }
}

/// Wraps `id` into a callable [`Value`], following the original's
/// `make_function_from_id`. Generators get wrapped in a [`GenWrap`]
/// template rather than a plain code reference; its frame size is
/// `max(n_locals, 3) + n_stack`, carried exactly from the original's
/// `n_state` computation (the floor of 3 covers the generator's own
/// bookkeeping slots even when a generator body declares no locals).
///
/// # Errors
/// Propagates heap allocation failures from the embedder's resource
/// tracker.
pub fn make_function_from_id(registry: &CodeRegistry, id: CodeId, heap: &mut Heap) -> RunResult<Value> {
    let kind = registry.get(id);
    let heap_id: HeapId = match kind {
        CodeKind::None => unreachable!("make_function_from_id called on an unassigned code id"),
        CodeKind::Byte { n_args, n_locals, n_stack, is_generator } if is_generator => {
            let n_state = n_locals.max(3) + n_stack;
            heap.allocate(Object::GenWrap(GenWrap { underlying: id, n_args, n_state }))?
        }
        CodeKind::Byte { n_args, .. } => heap.allocate(Object::FunBc { code: id, n_args })?,
        CodeKind::Native(NativeKind::Fn0(f)) => heap.allocate(Object::Fun0(f))?,
        CodeKind::Native(NativeKind::Fn1(f)) => heap.allocate(Object::Fun1(f))?,
        CodeKind::Native(NativeKind::Fn2(f)) => heap.allocate(Object::Fun2(f))?,
        CodeKind::Native(NativeKind::FnN { f, n_args }) => heap.allocate(Object::FunN { f, n_args })?,
        CodeKind::Native(NativeKind::FnVar { f, min_args }) => heap.allocate(Object::FunVar { f, min_args })?,
        CodeKind::InlineAsm(f) => heap.allocate(Object::FunAsm(f))?,
    };
    Ok(Value::Ref(heap_id))
}
