//! UI preference store: theme, panels, and transient notices.
//!
//! Pure local state. Only the dark-mode flag is durable (write-through
//! to persisted storage); everything else lives for the session. Other
//! stores push their success/error notices here instead of panicking or
//! printing.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::StorageHandle;

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A transient user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// UI preference state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub dark_mode: bool,
    pub sidebar_open: bool,
    pub search_open: bool,
    /// Insertion-ordered, newest first.
    pub notices: Vec<Notice>,
    pub unread_count: u32,
}

/// UI preference store. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct UiStore {
    inner: Arc<UiInner>,
}

struct UiInner {
    storage: StorageHandle,
    state: RwLock<UiState>,
}

impl UiStore {
    pub(crate) fn new(storage: StorageHandle) -> Self {
        let state = UiState {
            dark_mode: storage.dark_mode(),
            ..UiState::default()
        };
        Self {
            inner: Arc::new(UiInner {
                storage,
                state: RwLock::new(state),
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> UiState {
        self.read(Clone::clone)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Theme & panels
    // ─────────────────────────────────────────────────────────────────────

    /// Current dark-mode flag.
    #[must_use]
    pub fn dark_mode(&self) -> bool {
        self.read(|state| state.dark_mode)
    }

    /// Flip dark mode and persist the new value. Returns the new flag.
    pub fn toggle_dark_mode(&self) -> bool {
        let enabled = self.write(|state| {
            state.dark_mode = !state.dark_mode;
            state.dark_mode
        });
        self.inner.storage.set_dark_mode(enabled);
        enabled
    }

    /// Set dark mode explicitly and persist it.
    pub fn set_dark_mode(&self, enabled: bool) {
        self.write(|state| state.dark_mode = enabled);
        self.inner.storage.set_dark_mode(enabled);
    }

    pub fn toggle_sidebar(&self) -> bool {
        self.write(|state| {
            state.sidebar_open = !state.sidebar_open;
            state.sidebar_open
        })
    }

    pub fn set_sidebar_open(&self, open: bool) {
        self.write(|state| state.sidebar_open = open);
    }

    pub fn toggle_search(&self) -> bool {
        self.write(|state| {
            state.search_open = !state.search_open;
            state.search_open
        })
    }

    pub fn set_search_open(&self, open: bool) {
        self.write(|state| state.search_open = open);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Notices
    // ─────────────────────────────────────────────────────────────────────

    /// Push a notice (newest first). Returns its ID.
    pub fn notify(&self, level: NoticeLevel, message: impl Into<String>) -> Uuid {
        let notice = Notice {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            read: false,
            created_at: Utc::now(),
        };
        let id = notice.id;
        self.write(|state| {
            state.notices.insert(0, notice);
            state.unread_count += 1;
        });
        id
    }

    pub(crate) fn notify_success(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Success, message);
    }

    pub(crate) fn notify_error(&self, message: impl Into<String>) {
        self.notify(NoticeLevel::Error, message);
    }

    /// Mark one notice read; the unread counter never goes below zero.
    pub fn mark_read(&self, id: Uuid) {
        self.write(|state| {
            if let Some(notice) = state.notices.iter_mut().find(|n| n.id == id)
                && !notice.read
            {
                notice.read = true;
                state.unread_count = state.unread_count.saturating_sub(1);
            }
        });
    }

    /// Mark everything read.
    pub fn mark_all_read(&self) {
        self.write(|state| {
            for notice in &mut state.notices {
                notice.read = true;
            }
            state.unread_count = 0;
        });
    }

    /// Drop all notices.
    pub fn clear_notices(&self) {
        self.write(|state| {
            state.notices.clear();
            state.unread_count = 0;
        });
    }

    /// Number of unread notices.
    #[must_use]
    pub fn unread_count(&self) -> u32 {
        self.read(|state| state.unread_count)
    }

    fn read<R>(&self, f: impl FnOnce(&UiState) -> R) -> R {
        f(&self
            .inner
            .state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }

    fn write<R>(&self, f: impl FnOnce(&mut UiState) -> R) -> R {
        f(&mut self
            .inner
            .state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }
}
