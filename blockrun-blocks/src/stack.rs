// Blockrun Stack Growth
// Deeply nested block trees are walked recursively; grow the stack on demand

/// Run `f`, growing the stack first if less than the red zone remains
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    const RED_ZONE: usize = 100 * 1024;
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
