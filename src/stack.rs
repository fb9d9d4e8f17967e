//! Stack growth for deeply recursive evaluation.
//!
//! Evaluation recurses once per nested S-Expression and once per lambda call,
//! so a recursive user function can exhaust the thread stack long before it
//! runs out of memory. Wrapping the recursive step in
//! [`ensure_sufficient_stack`] moves onto a fresh segment when little is left.

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
