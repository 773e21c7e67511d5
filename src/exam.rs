//! Exam records and upcoming/past partitioning.

use crate::error::ExamError;
use crate::store::{Document, WriteFields};
use crate::types::{iso_instant, to_iso, DocId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An exam as stored under `users/{uid}/exams/{examId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    #[serde(skip)]
    pub id: DocId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(with = "iso_instant")]
    pub date: DateTime<Utc>,
    pub image_url: String,
    /// Assigned by the store; absent only for legacy documents.
    #[serde(default, with = "iso_instant::option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Exam {
    pub fn from_document(doc: &Document) -> Result<Self, ExamError> {
        let mut exam: Exam = doc.decode().map_err(|e| ExamError::Decode {
            path: doc.path.to_string(),
            reason: e.to_string(),
        })?;
        exam.id = doc.id();
        Ok(exam)
    }

    /// Strictly before `now`.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.date < now
    }
}

/// Validated input for a new exam document.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExam {
    pub name: String,
    pub subtitle: Option<String>,
    pub date: DateTime<Utc>,
    pub image_url: String,
}

impl NewExam {
    /// Fields for `add_document`, with `createdAt` left to the store clock.
    pub fn to_write_fields(&self) -> WriteFields {
        let mut fields = WriteFields::new()
            .set("name", self.name.clone())
            .set("date", to_iso(&self.date))
            .set("imageUrl", self.image_url.clone())
            .server_timestamp("createdAt");
        if let Some(subtitle) = &self.subtitle {
            fields = fields.set("subtitle", subtitle.clone());
        }
        fields
    }
}

/// Exams split by whether their date has passed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExamPartition {
    pub upcoming: Vec<Exam>,
    pub past: Vec<Exam>,
}

impl ExamPartition {
    /// Split `exams`, preserving their relative order within each group.
    pub fn at(exams: &[Exam], now: DateTime<Utc>) -> Self {
        let (past, upcoming): (Vec<Exam>, Vec<Exam>) =
            exams.iter().cloned().partition(|e| e.is_past(now));
        Self { upcoming, past }
    }

    /// Display order: upcoming first, then past.
    pub fn ordered(&self) -> impl Iterator<Item = &Exam> {
        self.upcoming.iter().chain(self.past.iter())
    }

    pub fn len(&self) -> usize {
        self.upcoming.len() + self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
