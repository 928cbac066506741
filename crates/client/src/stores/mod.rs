//! State stores: named, independently fetchable slices of client state.
//!
//! Each store wraps its state in `RwLock` behind an `Arc`'d inner so
//! handles clone cheaply and operations never hold a lock across an
//! `.await`. Responses apply in completion order; [`SeqGuard`] keeps a
//! slow early response from clobbering the result of a later one.

pub mod cart;
pub mod catalog;
pub mod ui;
pub mod user;

pub use cart::{CartState, CartStore};
pub use catalog::{CatalogState, CatalogStore};
pub use ui::{Notice, NoticeLevel, UiState, UiStore};
pub use user::{UserState, UserStore};

use std::sync::atomic::{AtomicU64, Ordering};

/// Sequence guard for one logical resource.
///
/// Completion order, not call order, decides which response lands last,
/// so each request takes a ticket up front and a response is applied
/// only if nothing newer has been applied already.
#[derive(Debug, Default)]
pub(crate) struct SeqGuard {
    issued: AtomicU64,
    applied: AtomicU64,
}

impl SeqGuard {
    /// Take a ticket for a request about to be issued.
    pub(crate) fn stamp(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Try to claim the apply slot for `seq`. Returns `false` when a
    /// later-stamped response already applied, in which case the caller
    /// must drop its (stale) payload.
    pub(crate) fn try_apply(&self, seq: u64) -> bool {
        self.applied.fetch_max(seq, Ordering::SeqCst) <= seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_guard_in_order() {
        let guard = SeqGuard::default();
        let first = guard.stamp();
        let second = guard.stamp();
        assert!(guard.try_apply(first));
        assert!(guard.try_apply(second));
    }

    #[test]
    fn test_seq_guard_rejects_stale() {
        let guard = SeqGuard::default();
        let first = guard.stamp();
        let second = guard.stamp();
        // Second request's response lands first.
        assert!(guard.try_apply(second));
        assert!(!guard.try_apply(first));
    }

    #[test]
    fn test_seq_guard_reapply_same_ticket() {
        let guard = SeqGuard::default();
        let seq = guard.stamp();
        assert!(guard.try_apply(seq));
        assert!(guard.try_apply(seq));
    }
}
