//! Engine configuration.

/// Knobs fixed when an environment is initialized.
#[derive(Clone, Debug)]
pub struct EvalConfig {
    /// Script call depth at which a `RangeError` is raised.
    pub max_recursion_depth: usize,
    /// Reject non-declaration statements at global level.
    pub forbid_global_statements: bool,
    /// Live instance count above which a collection runs after each
    /// top-level evaluation. `0` disables automatic collection.
    pub gc_threshold: usize,
    /// Register the `print` and `debug` globals.
    pub debug_globals: bool,
    /// Longest array a script may grow; going past it raises a `RangeError`.
    /// Elements are stored densely, so this bounds the allocation an index
    /// or `length` write can request.
    pub max_array_length: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_recursion_depth: 1000,
            forbid_global_statements: false,
            gc_threshold: 4096,
            debug_globals: true,
            max_array_length: 1 << 22,
        }
    }
}

impl EvalConfig {
    #[inline]
    pub fn max_recursion_depth(&self) -> usize {
        self.max_recursion_depth
    }

    /// Whether a collection is due with `live` instances on the heap.
    #[inline]
    pub fn wants_collection(&self, live: usize) -> bool {
        self.gc_threshold != 0 && live > self.gc_threshold
    }

    #[must_use]
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_array_length(mut self, length: usize) -> Self {
        self.max_array_length = length;
        self
    }

    #[must_use]
    pub fn with_forbidden_global_statements(mut self) -> Self {
        self.forbid_global_statements = true;
        self
    }

    #[must_use]
    pub fn with_gc_threshold(mut self, threshold: usize) -> Self {
        self.gc_threshold = threshold;
        self
    }

    #[must_use]
    pub fn without_debug_globals(mut self) -> Self {
        self.debug_globals = false;
        self
    }
}
