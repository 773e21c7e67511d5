//! Exam repository: typed exam/item operations over a [`DocumentStore`].

use crate::error::ExamError;
use crate::exam::{Exam, NewExam};
use crate::item::{ExamItem, ItemField, ItemKind, ItemType};
use crate::store::{
    path, Direction, Document, DocumentStore, Query, Subscription, WriteBatch,
};
use crate::types::{DocId, UserId};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of a cascading exam delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeReport {
    pub items_deleted: usize,
}

pub fn exams_query(user: &UserId) -> Query {
    Query::collection(path::exams(user)).order_by("date", Direction::Ascending)
}

pub fn items_query(user: &UserId, exam_id: &DocId) -> Query {
    Query::collection(path::items(user, exam_id)).order_by("order", Direction::Ascending)
}

/// Decode every document, skipping (and logging) ones that do not parse.
pub fn decode_exams(docs: &[Document]) -> Vec<Exam> {
    docs.iter()
        .filter_map(|doc| match Exam::from_document(doc) {
            Ok(exam) => Some(exam),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable exam");
                None
            }
        })
        .collect()
}

pub fn decode_items(docs: &[Document]) -> Vec<ExamItem> {
    docs.iter()
        .filter_map(|doc| match ExamItem::from_document(doc) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable item");
                None
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct ExamRepository {
    store: Arc<dyn DocumentStore>,
}

impl ExamRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub async fn create_exam(&self, user: &UserId, exam: &NewExam) -> Result<DocId, ExamError> {
        let id = self
            .store
            .add_document(&path::exams(user), exam.to_write_fields())
            .await?;
        info!(exam = %id, name = %exam.name, "Exam created");
        Ok(id)
    }

    /// All exams ordered by date ascending.
    pub async fn list_exams(&self, user: &UserId) -> Result<Vec<Exam>, ExamError> {
        let docs = self.store.read_once(&exams_query(user)).await?;
        Ok(decode_exams(&docs))
    }

    pub async fn get_exam(&self, user: &UserId, exam_id: &DocId) -> Result<Exam, ExamError> {
        let target = path::exam(user, exam_id);
        let docs = self
            .store
            .read_once(&Query::collection(path::exams(user)))
            .await?;
        let doc = docs
            .iter()
            .find(|d| d.path == target)
            .ok_or_else(|| ExamError::ExamNotFound(exam_id.clone()))?;
        Exam::from_document(doc)
    }

    /// Delete an exam and every item under it.
    ///
    /// Items are read once and removed in a single atomic batch; the exam
    /// document is deleted afterwards. A failure in any phase aborts the rest.
    pub async fn delete_exam(
        &self,
        user: &UserId,
        exam_id: &DocId,
    ) -> Result<CascadeReport, ExamError> {
        let items = Query::collection(path::items(user, exam_id));
        let children = self.store.read_once(&items).await.map_err(|e| {
            error!(exam = %exam_id, error = %e, "Cascade read failed");
            e
        })?;

        let mut batch = WriteBatch::new();
        for child in &children {
            batch.delete(child.path.clone());
        }
        let items_deleted = batch.len();
        debug!(exam = %exam_id, items = items_deleted, "Committing item deletes");
        self.store.commit_batch(batch).await.map_err(|e| {
            error!(exam = %exam_id, error = %e, "Cascade batch failed");
            e
        })?;

        self.store
            .delete_document(&path::exam(user, exam_id))
            .await
            .map_err(|e| {
                error!(exam = %exam_id, error = %e, "Exam delete failed after items were removed");
                e
            })?;
        info!(exam = %exam_id, items_deleted, "Exam deleted");
        Ok(CascadeReport { items_deleted })
    }

    /// Items ordered by `order` ascending.
    pub async fn list_items(
        &self,
        user: &UserId,
        exam_id: &DocId,
    ) -> Result<Vec<ExamItem>, ExamError> {
        let docs = self.store.read_once(&items_query(user, exam_id)).await?;
        Ok(decode_items(&docs))
    }

    /// Create an item of `item_type` with its defaults at position `order`.
    pub async fn add_item(
        &self,
        user: &UserId,
        exam_id: &DocId,
        item_type: ItemType,
        order: i64,
        exam_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<ExamItem, ExamError> {
        let mut item = ExamItem::new(
            DocId::default(),
            order,
            ItemKind::default_for(item_type, exam_date, now),
        );
        let id = self
            .store
            .add_document(&path::items(user, exam_id), item.to_write_fields()?)
            .await?;
        debug!(exam = %exam_id, item = %id, item_type = %item_type, order, "Item added");
        item.id = id;
        Ok(item)
    }

    /// Write a single field. Fails with `ItemNotFound` if the item is gone.
    pub async fn update_item_field(
        &self,
        user: &UserId,
        exam_id: &DocId,
        item_id: &DocId,
        field: &ItemField,
    ) -> Result<(), ExamError> {
        self.store
            .update_document(&path::item(user, exam_id, item_id), field.to_write_fields())
            .await
            .map_err(|e| match e {
                crate::error::StoreError::NotFound(_) => ExamError::ItemNotFound(item_id.clone()),
                other => other.into(),
            })
    }

    pub async fn delete_item(
        &self,
        user: &UserId,
        exam_id: &DocId,
        item_id: &DocId,
    ) -> Result<(), ExamError> {
        self.store
            .delete_document(&path::item(user, exam_id, item_id))
            .await?;
        debug!(exam = %exam_id, item = %item_id, "Item deleted");
        Ok(())
    }

    pub fn subscribe_exams(&self, user: &UserId) -> Result<Subscription, ExamError> {
        self.store
            .subscribe(exams_query(user))
            .map_err(|e| ExamError::Subscription(e.to_string()))
    }

    pub fn subscribe_items(
        &self,
        user: &UserId,
        exam_id: &DocId,
    ) -> Result<Subscription, ExamError> {
        self.store
            .subscribe(items_query(user, exam_id))
            .map_err(|e| ExamError::Subscription(e.to_string()))
    }
}
