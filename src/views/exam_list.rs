//! The signed-in user's exam list.

use crate::exam::{Exam, ExamPartition};
use crate::repository::{decode_exams, ExamRepository};
use crate::session::SessionContext;
use crate::store::{SnapshotEvent, Subscription};
use crate::types::UserId;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Live list of exams ordered by date.
///
/// The subscription is keyed on the session user: whenever [`bind`] sees a
/// different user (including sign-out) the old subscription is closed before
/// a new one is opened.
///
/// [`bind`]: ExamListView::bind
pub struct ExamListView {
    repo: ExamRepository,
    session: SessionContext,
    scope: Option<Option<UserId>>,
    subscription: Option<Subscription>,
    exams: Vec<Exam>,
    loading: bool,
}

impl ExamListView {
    pub fn new(repo: ExamRepository, session: SessionContext) -> Self {
        Self {
            repo,
            session,
            scope: None,
            subscription: None,
            exams: Vec::new(),
            loading: true,
        }
    }

    /// Reconcile the subscription with the current session user.
    pub fn bind(&mut self) {
        if self.session.is_loading() {
            return;
        }
        let user = self.session.user();
        if self.scope.as_ref() == Some(&user) {
            return;
        }
        self.close();
        self.scope = Some(user.clone());
        self.exams.clear();

        let Some(user) = user else {
            self.loading = false;
            return;
        };
        match self.repo.subscribe_exams(&user) {
            Ok(subscription) => {
                debug!(uid = %user, subscription = subscription.id(), "Exam list subscribed");
                self.subscription = Some(subscription);
                self.loading = true;
            }
            Err(e) => {
                warn!(uid = %user, error = %e, "Exam list subscription failed");
                self.loading = false;
            }
        }
    }

    /// Apply every queued snapshot. Returns true if state changed.
    pub fn poll(&mut self) -> bool {
        self.bind();
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        let events = subscription.drain();
        let changed = !events.is_empty();
        for event in events {
            self.apply(event);
        }
        changed
    }

    fn apply(&mut self, event: SnapshotEvent) {
        match event {
            SnapshotEvent::Snapshot(docs) => {
                self.exams = decode_exams(&docs);
            }
            SnapshotEvent::Error(e) => {
                warn!(error = %e, "Exam list snapshot failed");
                self.exams.clear();
            }
        }
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Exams in date order, as last delivered.
    pub fn exams(&self) -> &[Exam] {
        &self.exams
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Upcoming/past split evaluated at `now`.
    pub fn partition_at(&self, now: DateTime<Utc>) -> ExamPartition {
        ExamPartition::at(&self.exams, now)
    }

    /// Card order at `now`: upcoming first, then past.
    pub fn ordered_at(&self, now: DateTime<Utc>) -> Vec<Exam> {
        self.partition_at(now).ordered().cloned().collect()
    }

    /// Close the subscription. Later `bind` calls reopen one.
    pub fn close(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }
        self.scope = None;
    }
}

impl Drop for ExamListView {
    fn drop(&mut self) {
        self.close();
    }
}
