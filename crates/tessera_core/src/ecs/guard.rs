//! # Mutation Guard
//!
//! Reentrancy counter raised while a component type is being iterated.
//! Structural mutation entry points check it and fail fast instead of
//! breaking buffer density under a running iteration.

use std::cell::Cell;

/// Per-type iteration depth counter.
#[derive(Debug, Default)]
pub(crate) struct MutationGuard {
    depth: Cell<u32>,
}

impl MutationGuard {
    /// Checks whether an iteration over the type is in progress.
    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.depth.get() > 0
    }

    /// Raises the guard until the returned scope is dropped.
    #[inline]
    pub(crate) fn enter(&self) -> IterationScope<'_> {
        self.depth.set(self.depth.get() + 1);
        IterationScope { guard: self }
    }
}

/// Lowers the guard on drop, including during unwinding.
pub(crate) struct IterationScope<'a> {
    guard: &'a MutationGuard,
}

impl Drop for IterationScope<'_> {
    fn drop(&mut self) {
        let depth = self.guard.depth.get();
        debug_assert!(depth > 0, "iteration scope dropped twice");
        self.guard.depth.set(depth.saturating_sub(1));
    }
}
