//! Per-item optimistic editing state.

use crate::error::ExamError;
use crate::item::{edit_controls, render_view, EditControl, ExamItem, FieldName, ItemField, ItemView};
use crate::sync::Reconciled;
use crate::types::DocId;
use chrono::{DateTime, Utc};

/// An item as shown in a card: last snapshot plus local edits.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEditor {
    state: Reconciled<ExamItem>,
}

impl ItemEditor {
    pub fn new(item: ExamItem) -> Self {
        Self {
            state: Reconciled::new(item),
        }
    }

    pub fn id(&self) -> &DocId {
        &self.state.remote().id
    }

    pub fn displayed(&self) -> &ExamItem {
        self.state.displayed()
    }

    pub fn remote(&self) -> &ExamItem {
        self.state.remote()
    }

    pub fn has_pending(&self) -> bool {
        self.state.has_pending()
    }

    /// Local-only edit; nothing is written.
    pub fn input(&mut self, field: &ItemField) -> Result<(), ExamError> {
        // Validate against the displayed copy first so a rejected edit
        // leaves no pending copy behind.
        let mut candidate = self.displayed().clone();
        candidate.apply(field)?;
        self.state.edit_local(|item| *item = candidate);
        Ok(())
    }

    /// Displayed value of a field, as it would be committed.
    pub fn value(&self, name: FieldName) -> Option<ItemField> {
        self.displayed().field(name)
    }

    pub fn apply_remote(&mut self, item: ExamItem) {
        self.state.apply_remote(item);
    }

    pub fn render_view(&self, now: DateTime<Utc>) -> ItemView {
        render_view(self.displayed(), now)
    }

    pub fn edit_controls(&self) -> Vec<EditControl> {
        edit_controls(self.displayed())
    }
}
