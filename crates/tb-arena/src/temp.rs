//! Per-thread temporary storage: a fixed-capacity byte stack with
//! savepoint/restore checkpoints.
//!
//! This is the safe-Rust analogue of the original's thread-local scratch
//! arena (`tb_thread_storage`): single-threaded from its owner's point of
//! view, used for scratch allocations whose lifetime is bounded by one pass
//! or one block's scheduling pass. A [`Savepoint`] is an opaque token; the
//! only legal operation on it is [`TempArena::restore`], which rewinds the
//! high-water mark back to where the token was taken.

use thiserror::Error;

/// Default capacity, matching the original's `TB_TEMPORARY_STORAGE_SIZE`.
pub const DEFAULT_TEMPORARY_STORAGE_SIZE: usize = 1 << 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TempArenaError {
    #[error("temporary storage overflow: {requested} bytes requested, {available} available")]
    Overflow { requested: usize, available: usize },
    #[error("pop of {requested} bytes exceeds current length {len}")]
    Underflow { requested: usize, len: usize },
}

/// An opaque rewind point produced by [`TempArena::savepoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Savepoint(usize);

pub struct TempArena {
    buf: Vec<u8>,
    capacity: usize,
}

impl TempArena {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_TEMPORARY_STORAGE_SIZE)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Push `bytes`, returning `Err` instead of panicking on overflow.
    pub fn try_push(&mut self, bytes: &[u8]) -> Result<(), TempArenaError> {
        if self.buf.len() + bytes.len() > self.capacity {
            return Err(TempArenaError::Overflow {
                requested: bytes.len(),
                available: self.capacity - self.buf.len(),
            });
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Push `bytes`, panicking on overflow. Mirrors the original `push`,
    /// which asserts rather than returning an error: callers at this layer
    /// are expected to have sized their scratch usage against the arena's
    /// fixed capacity ahead of time.
    pub fn push(&mut self, bytes: &[u8]) {
        self.try_push(bytes)
            .unwrap_or_else(|e| panic!("temporary storage overflow: {e}"));
    }

    /// Remove and return the last `n` bytes.
    pub fn pop(&mut self, n: usize) -> Result<Vec<u8>, TempArenaError> {
        if n > self.buf.len() {
            return Err(TempArenaError::Underflow {
                requested: n,
                len: self.buf.len(),
            });
        }
        let split_at = self.buf.len() - n;
        Ok(self.buf.split_off(split_at))
    }

    /// Borrow the last `n` bytes without removing them.
    pub fn peek(&self, n: usize) -> Option<&[u8]> {
        if n > self.buf.len() {
            return None;
        }
        Some(&self.buf[self.buf.len() - n..])
    }

    /// Take a rewind point at the current high-water mark.
    pub fn savepoint(&self) -> Savepoint {
        Savepoint(self.buf.len())
    }

    /// Rewind to a previously taken savepoint. Restoring past a later
    /// savepoint taken on the same arena (i.e. `token.0 > self.len()`) is a
    /// caller bug and panics, mirroring an invariant violation in §7.
    pub fn restore(&mut self, token: Savepoint) {
        assert!(
            token.0 <= self.buf.len(),
            "restore to a savepoint ahead of the current high-water mark"
        );
        self.buf.truncate(token.0);
    }
}
