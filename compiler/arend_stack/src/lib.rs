//! Stack growth for deep recursion.
//!
//! Parsing, resolution and elaboration all recurse over user-written nesting.
//! On native targets `stacker` grows the stack when less than [`RED_ZONE`]
//! remains; on WASM this is a passthrough.

/// Minimum stack space to keep available (100KB).
pub const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
pub const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if it is nearly exhausted.
#[cfg(not(target_arch = "wasm32"))]
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[cfg(target_arch = "wasm32")]
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
