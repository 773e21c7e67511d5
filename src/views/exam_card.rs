//! One exam card and its live item list.

use crate::error::ExamError;
use crate::exam::Exam;
use crate::item::{CommitPolicy, ExamItem, FieldName, ItemField, ItemType};
use crate::notice::{Notice, Notices};
use crate::repository::{decode_items, CascadeReport, ExamRepository};
use crate::session::SessionContext;
use crate::store::{SnapshotEvent, Subscription};
use crate::types::{DocId, UserId};
use crate::views::item_editor::ItemEditor;
use crate::views::PendingWrite;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, warn};

pub struct ExamCard {
    repo: ExamRepository,
    session: SessionContext,
    notices: Notices,
    exam: Exam,
    scope: Option<Option<UserId>>,
    subscription: Option<Subscription>,
    editors: Vec<ItemEditor>,
    loading: bool,
    edit_mode: bool,
    is_deleting: bool,
}

impl ExamCard {
    pub fn new(repo: ExamRepository, session: SessionContext, notices: Notices, exam: Exam) -> Self {
        Self {
            repo,
            session,
            notices,
            exam,
            scope: None,
            subscription: None,
            editors: Vec::new(),
            loading: true,
            edit_mode: false,
            is_deleting: false,
        }
    }

    pub fn exam(&self) -> &Exam {
        &self.exam
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    /// Keep the item subscription keyed on (user, exam).
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
        self.editors.clear();

        let Some(user) = user else {
            self.loading = false;
            return;
        };
        match self.repo.subscribe_items(&user, &self.exam.id) {
            Ok(subscription) => {
                debug!(exam = %self.exam.id, subscription = subscription.id(), "Card subscribed");
                self.subscription = Some(subscription);
                self.loading = true;
            }
            Err(e) => {
                warn!(exam = %self.exam.id, error = %e, "Item subscription failed");
                self.loading = false;
            }
        }
    }

    /// Apply queued item snapshots. Returns true if state changed.
    pub fn poll(&mut self) -> bool {
        self.bind();
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        let events = subscription.drain();
        let changed = !events.is_empty();
        for event in events {
            match event {
                SnapshotEvent::Snapshot(docs) => self.replace_items(decode_items(&docs)),
                SnapshotEvent::Error(e) => {
                    warn!(exam = %self.exam.id, error = %e, "Item snapshot failed");
                    self.editors.clear();
                }
            }
            self.loading = false;
        }
        changed
    }

    /// Replace the item list with a snapshot; remote values overwrite local ones.
    fn replace_items(&mut self, items: Vec<ExamItem>) {
        let mut previous: HashMap<DocId, ItemEditor> = self
            .editors
            .drain(..)
            .map(|editor| (editor.id().clone(), editor))
            .collect();
        self.editors = items
            .into_iter()
            .map(|item| match previous.remove(&item.id) {
                Some(mut editor) => {
                    editor.apply_remote(item);
                    editor
                }
                None => ItemEditor::new(item),
            })
            .collect();
    }

    pub fn items(&self) -> &[ItemEditor] {
        &self.editors
    }

    pub fn item(&self, item_id: &DocId) -> Option<&ItemEditor> {
        self.editors.iter().find(|e| e.id() == item_id)
    }

    fn item_mut(&mut self, item_id: &DocId) -> Result<&mut ItemEditor, ExamError> {
        self.editors
            .iter_mut()
            .find(|e| e.id() == item_id)
            .ok_or_else(|| ExamError::ItemNotFound(item_id.clone()))
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.exam.is_past(now)
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn toggle_edit_mode(&mut self) -> bool {
        self.edit_mode = !self.edit_mode;
        self.edit_mode
    }

    pub fn is_deleting(&self) -> bool {
        self.is_deleting
    }

    /// Add an item of `item_type` at the end of the current local list.
    pub fn add_item(&self, item_type: ItemType) -> Result<PendingWrite, ExamError> {
        let user = self.session.require_user()?;
        let order = self.editors.len() as i64;
        let repo = self.repo.clone();
        let exam_id = self.exam.id.clone();
        let exam_date = self.exam.date;
        Ok(PendingWrite::spawn(
            "add item",
            self.notices.downgrade(),
            async move {
                repo.add_item(&user, &exam_id, item_type, order, exam_date, Utc::now())
                    .await
                    .map(|_| ())
            },
        ))
    }

    /// Keystroke-level edit. Local only; see [`blur`](Self::blur).
    pub fn input(&mut self, item_id: &DocId, field: &ItemField) -> Result<(), ExamError> {
        self.item_mut(item_id)?.input(field)
    }

    /// Focus left a text field: write its displayed value.
    pub fn blur(&mut self, item_id: &DocId, name: FieldName) -> Result<PendingWrite, ExamError> {
        let editor = self.item_mut(item_id)?;
        let value = editor
            .value(name)
            .ok_or_else(|| ExamError::FieldNotApplicable {
                field: name.as_str(),
                item_type: editor.displayed().item_type().as_str(),
            })?;
        self.commit_field(item_id, value)
    }

    /// Flip a checklist item and write it immediately.
    pub fn toggle_checked(&mut self, item_id: &DocId) -> Result<PendingWrite, ExamError> {
        let editor = self.item_mut(item_id)?;
        let current = match editor.value(FieldName::Checked) {
            Some(ItemField::Checked(checked)) => checked,
            _ => {
                return Err(ExamError::FieldNotApplicable {
                    field: FieldName::Checked.as_str(),
                    item_type: editor.displayed().item_type().as_str(),
                })
            }
        };
        self.commit_field(item_id, ItemField::Checked(!current))
    }

    /// Pick a new date and write it immediately.
    pub fn set_date(
        &mut self,
        item_id: &DocId,
        date: DateTime<Utc>,
    ) -> Result<PendingWrite, ExamError> {
        self.commit_field(item_id, ItemField::Date(date))
    }

    /// Apply `field` locally and write it.
    ///
    /// Without a signed-in user nothing changes and `AuthRequired` is
    /// returned; no notice is raised.
    pub fn commit_field(
        &mut self,
        item_id: &DocId,
        field: ItemField,
    ) -> Result<PendingWrite, ExamError> {
        let user = self.session.require_user()?;
        self.item_mut(item_id)?.input(&field)?;
        debug!(
            item = %item_id,
            field = %field.name(),
            immediate = field.name().commit_policy() == CommitPolicy::Immediate,
            "Committing field"
        );
        let repo = self.repo.clone();
        let exam_id = self.exam.id.clone();
        let item_id = item_id.clone();
        Ok(PendingWrite::spawn(
            "update item",
            self.notices.downgrade(),
            async move { repo.update_item_field(&user, &exam_id, &item_id, &field).await },
        ))
    }

    pub fn delete_item(&self, item_id: &DocId) -> Result<PendingWrite, ExamError> {
        let user = self.session.require_user()?;
        if self.item(item_id).is_none() {
            return Err(ExamError::ItemNotFound(item_id.clone()));
        }
        let repo = self.repo.clone();
        let exam_id = self.exam.id.clone();
        let item_id = item_id.clone();
        Ok(PendingWrite::spawn(
            "delete item",
            self.notices.downgrade(),
            async move { repo.delete_item(&user, &exam_id, &item_id).await },
        ))
    }

    /// Cascade-delete this exam, reporting the outcome as a notice.
    pub async fn delete_exam(&mut self) -> Result<CascadeReport, ExamError> {
        let user = self.session.require_user()?;
        self.is_deleting = true;
        let result = self.repo.delete_exam(&user, &self.exam.id).await;
        self.is_deleting = false;
        match &result {
            Ok(_) => self.notices.push(Notice::exam_deleted(&self.exam.name)),
            Err(_) => self.notices.push(Notice::exam_delete_failed()),
        }
        result
    }

    pub fn close(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.close();
        }
        self.scope = None;
    }
}

impl Drop for ExamCard {
    fn drop(&mut self) {
        self.close();
    }
}
