//! Stack safety for deeply recursive parsing, compilation and evaluation.
//!
//! Two separate guards:
//! - [`ensure_sufficient_stack`] grows the native stack on demand, so deeply
//!   nested source does not crash the process.
//! - [`DepthLimit`] bounds *language-level* recursion (user function calls),
//!   turning runaway recursion into an ordinary error instead of exhausting
//!   memory while the stack keeps growing.
//!
//! # Platform Support
//!
//! - **Native targets**: uses `stacker` to grow the stack.
//! - **WASM targets**: no-op passthrough.

/// Grow the stack when less than this remains (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each stack segment allocated on growth (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first allocating a new stack segment if the current one is
/// nearly exhausted.
///
/// # Example
///
/// ```text
/// fn evaluate(&mut self, expr: &Expression) -> EvalResult {
///     ensure_sufficient_stack(|| self.evaluate_inner(expr))
/// }
/// ```
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

/// Error returned when a [`DepthLimit`] is exceeded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepthExceeded {
    pub limit: usize,
}

impl std::fmt::Display for DepthExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "maximum call depth of {} exceeded", self.limit)
    }
}

impl std::error::Error for DepthExceeded {}

/// Counter for nested calls with a hard ceiling.
///
/// `enter` before descending and `exit` after returning (on success *and*
/// failure paths).
#[derive(Debug, Clone)]
pub struct DepthLimit {
    current: usize,
    limit: usize,
}

impl DepthLimit {
    pub fn new(limit: usize) -> Self {
        DepthLimit { current: 0, limit }
    }

    /// Record one more level of nesting.
    pub fn enter(&mut self) -> Result<(), DepthExceeded> {
        if self.current >= self.limit {
            return Err(DepthExceeded { limit: self.limit });
        }
        self.current += 1;
        Ok(())
    }

    /// Leave one level of nesting.
    pub fn exit(&mut self) {
        debug_assert!(self.current > 0, "DepthLimit::exit without matching enter");
        self.current = self.current.saturating_sub(1);
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_recursion() {
        fn deep_recurse(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { deep_recurse(n - 1) + 1 })
        }

        assert_eq!(deep_recurse(100_000), 100_000);
    }

    #[test]
    fn test_works_with_result_type() {
        let result: Result<i32, &str> = ensure_sufficient_stack(|| Ok(123));
        assert_eq!(result, Ok(123));
    }

    #[test]
    fn test_depth_limit() {
        let mut depth = DepthLimit::new(2);
        assert!(depth.enter().is_ok());
        assert!(depth.enter().is_ok());
        assert_eq!(depth.enter(), Err(DepthExceeded { limit: 2 }));
        assert_eq!(depth.current(), 2);
        depth.exit();
        assert!(depth.enter().is_ok());
    }

    #[test]
    fn test_depth_exceeded_message() {
        let err = DepthExceeded { limit: 10 };
        assert_eq!(err.to_string(), "maximum call depth of 10 exceeded");
    }
}
