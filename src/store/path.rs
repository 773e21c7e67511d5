//! Collection and document paths.
//!
//! Paths alternate collection and document segments:
//! `users/{uid}/exams/{examId}/items/{itemId}`. A collection path has an odd
//! number of segments, a document path an even number.

use crate::error::StoreError;
use crate::types::{DocId, UserId};
use std::fmt;

fn validate_segments(raw: &str) -> Result<usize, StoreError> {
    if raw.is_empty() {
        return Err(StoreError::InvalidPath("empty path".to_string()));
    }
    let mut count = 0;
    for segment in raw.split('/') {
        if segment.is_empty() {
            return Err(StoreError::InvalidPath(format!(
                "empty segment in '{}'",
                raw
            )));
        }
        count += 1;
    }
    Ok(count)
}

/// Path to a collection of documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let count = validate_segments(raw)?;
        if count % 2 == 0 {
            return Err(StoreError::InvalidPath(format!(
                "'{}' names a document, not a collection",
                raw
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Document with the given id inside this collection.
    pub fn doc(&self, id: &DocId) -> DocPath {
        DocPath(format!("{}/{}", self.0, id))
    }

    /// Key prefix shared by every document stored directly in this collection.
    pub(crate) fn key_prefix(&self) -> String {
        format!("{}/", self.0)
    }

    /// Whether `doc` is a direct child of this collection.
    pub fn contains(&self, doc: &DocPath) -> bool {
        doc.collection() == *self
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path to a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(String);

impl DocPath {
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let count = validate_segments(raw)?;
        if count % 2 != 0 {
            return Err(StoreError::InvalidPath(format!(
                "'{}' names a collection, not a document",
                raw
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn id(&self) -> DocId {
        let id = self.0.rsplit('/').next().unwrap_or_default();
        DocId::new(id)
    }

    /// Collection this document lives in.
    pub fn collection(&self) -> CollectionPath {
        match self.0.rfind('/') {
            Some(idx) => CollectionPath(self.0[..idx].to_string()),
            None => CollectionPath(self.0.clone()),
        }
    }

    /// Sub-collection nested under this document.
    pub fn child(&self, name: &str) -> CollectionPath {
        CollectionPath(format!("{}/{}", self.0, name))
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `users/{uid}/exams`
pub fn exams(user: &UserId) -> CollectionPath {
    CollectionPath(format!("users/{}/exams", user))
}

/// `users/{uid}/exams/{examId}`
pub fn exam(user: &UserId, exam_id: &DocId) -> DocPath {
    exams(user).doc(exam_id)
}

/// `users/{uid}/exams/{examId}/items`
pub fn items(user: &UserId, exam_id: &DocId) -> CollectionPath {
    exam(user, exam_id).child("items")
}

/// `users/{uid}/exams/{examId}/items/{itemId}`
pub fn item(user: &UserId, exam_id: &DocId, item_id: &DocId) -> DocPath {
    items(user, exam_id).doc(item_id)
}
