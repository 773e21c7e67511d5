//! Views
//!
//! Subscription-driven state for the exam list, per-exam cards and item
//! editors. Views are driven from one task: callers `poll()` to apply pending
//! snapshots and read state back. Writes are spawned on the tokio runtime and
//! return a [`PendingWrite`] that may be awaited or dropped.

pub mod exam_card;
pub mod exam_list;
pub mod item_editor;

pub use exam_card::ExamCard;
pub use exam_list::ExamListView;
pub use item_editor::ItemEditor;

use crate::error::ExamError;
use crate::notice::{Notice, WeakNotices};
use std::future::Future;
use tokio::task::JoinHandle;
use tracing::warn;

/// Handle to a fire-and-forget write.
///
/// Dropping the handle does not cancel the write.
#[derive(Debug)]
pub struct PendingWrite {
    handle: JoinHandle<Result<(), ExamError>>,
}

impl PendingWrite {
    /// Spawn `write`. A failure is logged and reported to `notices` if the
    /// view is still alive.
    pub(crate) fn spawn<F>(what: &'static str, notices: WeakNotices, write: F) -> Self
    where
        F: Future<Output = Result<(), ExamError>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let result = write.await;
            if let Err(e) = &result {
                warn!(operation = what, error = %e, "Write failed");
                notices.push(Notice::write_failed(what));
            }
            result
        });
        Self { handle }
    }

    /// Wait for the write and return its outcome.
    pub async fn settle(self) -> Result<(), ExamError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(ExamError::WriteAborted(e.to_string())),
        }
    }
}
