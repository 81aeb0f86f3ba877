//! Stack safety for the recursive parser, resolver and tree-walking evaluator.
//!
//! Two separate limits apply to script execution:
//!
//! - The *native* stack is grown on demand with [`ensure_sufficient_stack`],
//!   so deeply nested expressions never overflow the host thread.
//! - The *script* call depth is counted with [`DepthCounter`]; exceeding the
//!   configured maximum turns into a catchable script error instead of a crash.
//!
//! On `wasm32` the native growth is a passthrough.

/// Grow once less than this much native stack remains (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated stack segment (2MB).
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the native stack if it is close to exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Returned by [`DepthCounter::enter`] when the limit would be exceeded.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct DepthExceeded {
    pub limit: usize,
}

/// Counts nested script calls against a fixed limit.
#[derive(Clone, Debug)]
pub struct DepthCounter {
    depth: usize,
    limit: usize,
}

impl DepthCounter {
    pub fn new(limit: usize) -> Self {
        DepthCounter { depth: 0, limit }
    }

    /// Enter one level. Fails without changing the depth when the limit is hit.
    pub fn enter(&mut self) -> Result<(), DepthExceeded> {
        if self.depth >= self.limit {
            return Err(DepthExceeded { limit: self.limit });
        }
        self.depth += 1;
        Ok(())
    }

    /// Leave one level. Saturates at zero.
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    /// Forget all nesting, e.g. after an aborted top-level evaluation.
    pub fn reset(&mut self) {
        self.depth = 0;
    }
}

#[cfg(test)]
mod tests;
