//! Transient, dismissible notifications (mutation outcomes).

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Queue of pending notices, drained by the shell on each frame.
#[derive(Debug, Clone, Default)]
pub struct NoticeQueue {
    pending: Arc<Mutex<VecDeque<Notice>>>,
}

impl NoticeQueue {
    pub fn push(&self, notice: Notice) {
        self.pending.lock().push_back(notice);
    }

    /// Take every pending notice, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        self.pending.lock().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_notices_in_order() {
        let queue = NoticeQueue::default();
        queue.push(Notice::success("first"));
        queue.push(Notice::error("second"));

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[1].severity, Severity::Error);
        assert!(queue.is_empty());
    }
}
