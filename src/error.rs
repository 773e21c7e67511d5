//! Error types for the ExamWise exam tracker.

use crate::types::DocId;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid document path: {0}")]
    InvalidPath(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Per-field validation messages produced by the add-exam form schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        // First failing rule wins for a field.
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, msg)| format!("{}: {}", field, msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Application-level errors
#[derive(Debug, Error)]
pub enum ExamError {
    #[error("Authentication required: sign in before making changes")]
    AuthRequired,

    #[error("Invalid exam: {0}")]
    Validation(FormErrors),

    #[error("Exam not found: {0}")]
    ExamNotFound(DocId),

    #[error("Item not found: {0}")]
    ItemNotFound(DocId),

    #[error("Field '{field}' does not apply to '{item_type}' items")]
    FieldNotApplicable {
        field: &'static str,
        item_type: &'static str,
    },

    #[error("Unknown item type: {0}")]
    UnknownItemType(String),

    #[error("Unknown item field: {0}")]
    UnknownField(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to decode document {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Subscription failed: {0}")]
    Subscription(String),

    #[error("Background write did not complete: {0}")]
    WriteAborted(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<config::ConfigError> for ExamError {
    fn from(err: config::ConfigError) -> Self {
        ExamError::Config(err.to_string())
    }
}
