//! Stack growth for deep recursion.
//!
//! Sequencing a scope sequences its statements, which resolve expressions,
//! which may instantiate generics, which sequence whole declarations again.
//! Deeply nested input can exhaust the native stack along that cycle, so each
//! recursive entry point runs inside [`ensure_sufficient_stack`].
//!
//! - **Native targets** grow the stack on demand through `stacker`.
//! - **WASM targets** call straight through.

/// Grow when less than this much stack remains (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the remaining space is below the red
/// zone.
///
/// ```text
/// fn sequence_scope(&mut self) -> SemaResult<ProgramNode> {
///     ensure_sufficient_stack(|| {
///         // ... may call sequence_scope again ...
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
