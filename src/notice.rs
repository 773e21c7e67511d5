//! Transient user notices.
//!
//! Views push notices; the front end drains and shows them. Background
//! writes hold a [`WeakNotices`] so their outcome is dropped once the view
//! that issued them is gone.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn exam_deleted(name: &str) -> Self {
        Self::info("Exam Deleted", format!("\"{}\" has been removed.", name))
    }

    pub fn exam_delete_failed() -> Self {
        Self::error("Error", "Failed to delete exam.")
    }

    pub fn exam_added() -> Self {
        Self::info("Success!", "Your exam has been added.")
    }

    pub fn auth_required() -> Self {
        Self::error("Authentication Error", "You must be logged in to add an exam.")
    }

    pub fn exam_add_failed() -> Self {
        Self::error("Error", "Could not add your exam. Please try again.")
    }

    pub fn write_failed(what: &str) -> Self {
        Self::error("Error", format!("Failed to {}.", what))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Queue of notices owned by a view.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    queue: Arc<Mutex<Vec<Notice>>>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notice: Notice) {
        debug!(title = %notice.title, "Notice queued");
        self.queue.lock().push(notice);
    }

    /// Take every queued notice, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.queue.lock())
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub fn downgrade(&self) -> WeakNotices {
        WeakNotices {
            queue: Arc::downgrade(&self.queue),
        }
    }
}

/// Non-owning handle; pushes after every [`Notices`] clone is gone are dropped.
#[derive(Debug, Clone)]
pub struct WeakNotices {
    queue: Weak<Mutex<Vec<Notice>>>,
}

impl WeakNotices {
    /// Returns false when the owning view is gone.
    pub fn push(&self, notice: Notice) -> bool {
        match self.queue.upgrade() {
            Some(queue) => {
                queue.lock().push(notice);
                true
            }
            None => {
                debug!(title = %notice.title, "Notice discarded, view closed");
                false
            }
        }
    }
}
