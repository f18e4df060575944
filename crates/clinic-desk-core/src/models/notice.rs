//! Transient user-facing notices (toasts).

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Notice severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    /// Sticky until dismissed
    Loading,
}

/// A notice raised by a flow for the shell to display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn loading(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Loading,
            message: message.into(),
        }
    }
}

/// Sink for notices. Implemented by the shell's toaster.
pub trait Notifier {
    /// Show a notice.
    fn notify(&self, notice: Notice);

    /// Remove any sticky (loading) notices.
    fn dismiss(&self);
}

/// In-memory notifier. Keeps every notice raised, plus the sticky ones still showing.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    inner: Mutex<BoardState>,
}

#[derive(Debug, Default)]
struct BoardState {
    history: Vec<Notice>,
    sticky: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notices raised so far, oldest first.
    pub fn history(&self) -> Vec<Notice> {
        self.inner
            .lock()
            .map(|state| state.history.clone())
            .unwrap_or_default()
    }

    /// Loading notices not yet dismissed.
    pub fn sticky(&self) -> Vec<Notice> {
        self.inner
            .lock()
            .map(|state| state.sticky.clone())
            .unwrap_or_default()
    }

    /// Most recent notice, if any.
    pub fn last(&self) -> Option<Notice> {
        self.inner
            .lock()
            .ok()
            .and_then(|state| state.history.last().cloned())
    }

    /// Drain the history (the shell calls this after rendering).
    pub fn take(&self) -> Vec<Notice> {
        self.inner
            .lock()
            .map(|mut state| std::mem::take(&mut state.history))
            .unwrap_or_default()
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, notice: Notice) {
        if let Ok(mut state) = self.inner.lock() {
            if notice.kind == NoticeKind::Loading {
                state.sticky.push(notice.clone());
            }
            state.history.push(notice);
        }
    }

    fn dismiss(&self) {
        if let Ok(mut state) = self.inner.lock() {
            state.sticky.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_records_in_order() {
        let board = NoticeBoard::new();
        board.notify(Notice::success("saved"));
        board.notify(Notice::error("failed"));

        let history = board.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].kind, NoticeKind::Success);
        assert_eq!(board.last(), Some(Notice::error("failed")));
    }

    #[test]
    fn test_dismiss_clears_loading_only() {
        let board = NoticeBoard::new();
        board.notify(Notice::loading("Backing up..."));
        assert_eq!(board.sticky().len(), 1);

        board.dismiss();
        assert!(board.sticky().is_empty());
        assert_eq!(board.history().len(), 1);

        assert_eq!(board.take().len(), 1);
        assert!(board.history().is_empty());
    }
}
