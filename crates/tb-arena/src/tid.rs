//! Process-wide thread id minting.
//!
//! Mirrors the original `tb__get_local_tid`: ids are minted once per thread by
//! atomic increment and handed out zero-based, but the thread-local cache
//! stores `minted + 1` so that `0` can mean "unset" without colliding with a
//! real id.

use std::sync::atomic::{AtomicUsize, Ordering};

static TOTAL_TID: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    static TID_CACHE: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Returns this thread's 0-based id, minting a fresh one on first use.
///
/// No two threads ever observe the same id; the id is stable for the
/// lifetime of the thread.
pub fn local_tid() -> usize {
    TID_CACHE.with(|cache| {
        let cached = cache.get();
        if cached != 0 {
            return cached - 1;
        }
        let new_id = TOTAL_TID.fetch_add(1, Ordering::Relaxed);
        cache.set(new_id + 1);
        new_id
    })
}

/// Number of distinct threads that have ever called [`local_tid`].
pub fn total_tid() -> usize {
    TOTAL_TID.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tid_is_stable_within_a_thread() {
        let a = local_tid();
        let b = local_tid();
        assert_eq!(a, b);
    }

    #[test]
    fn tids_mint_zero_based_and_unique_across_threads() {
        let before = total_tid();
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(local_tid))
            .collect();
        let mut ids: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4, "every spawned thread must mint a distinct tid");
        assert!(total_tid() >= before + 4);
    }
}
