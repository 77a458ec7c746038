//! Arena and thread-local storage (§4.A).
//!
//! Two allocation regimes exist in this system:
//!
//! - A **function arena** (owned by each `tb_ir::Function`, backed by
//!   `bumpalo`) whose lifetime equals the function's — dropping the function
//!   drops every node and extra it allocated, en masse.
//! - A **per-thread temporary storage** ([`TempArena`]) used for scratch
//!   allocations bounded to a single pass or scheduling run, with explicit
//!   savepoint/restore rewinding.
//!
//! Per the design notes, global mutable state (`tid`, `tb__arena`,
//! `tb_thread_storage`) is replaced here with an explicit [`ThreadContext`]
//! that callers thread through core operations rather than reading from
//! thread-locals implicitly; `tid` minting itself remains thread-local since
//! it exists purely to hand out a stable identity per OS thread.

mod temp;
mod tid;

pub use temp::{Savepoint, TempArena, TempArenaError, DEFAULT_TEMPORARY_STORAGE_SIZE};
pub use tid::{local_tid, total_tid};

/// Bundles the per-thread state a compiling thread carries through the
/// pipeline: its minted id and its scratch arena.
pub struct ThreadContext {
    pub tid: usize,
    pub scratch: TempArena,
}

impl ThreadContext {
    /// Mint (or fetch) this thread's id and attach a fresh scratch arena.
    pub fn current() -> Self {
        Self {
            tid: local_tid(),
            scratch: TempArena::with_default_capacity(),
        }
    }

    pub fn with_scratch_capacity(capacity: usize) -> Self {
        Self {
            tid: local_tid(),
            scratch: TempArena::new(capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_context_carries_this_threads_tid() {
        let ctx = ThreadContext::current();
        assert_eq!(ctx.tid, local_tid());
        assert!(ctx.scratch.is_empty());
    }
}
