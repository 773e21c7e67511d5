//! Exam items
//!
//! An item is one widget on an exam card. The seven widget kinds form a closed
//! sum type, [`ItemKind`], persisted with an internal `type` tag. The tag is
//! fixed at creation; edits only ever change a variant's fields.

pub mod field;
pub mod render;

pub use field::{CommitPolicy, FieldName, ItemField};
pub use render::{edit_controls, render_view, BadgeTone, ControlKind, EditControl, ItemView};

use crate::error::ExamError;
use crate::store::{Document, WriteFields};
use crate::types::{iso_instant, DocId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type tag of an item, without its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    TitleDate,
    TitleCheckbox,
    Countdown,
    Eligibility,
    Payment,
    ButtonLink,
    TitleDescription,
}

impl ItemType {
    /// Entries of the "Add Item" menu, in display order.
    pub const MENU: [ItemType; 7] = [
        ItemType::Countdown,
        ItemType::TitleDate,
        ItemType::TitleCheckbox,
        ItemType::TitleDescription,
        ItemType::Eligibility,
        ItemType::Payment,
        ItemType::ButtonLink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::TitleDate => "title-date",
            ItemType::TitleCheckbox => "title-checkbox",
            ItemType::Countdown => "countdown",
            ItemType::Eligibility => "eligibility",
            ItemType::Payment => "payment",
            ItemType::ButtonLink => "button-link",
            ItemType::TitleDescription => "title-description",
        }
    }

    pub fn menu_label(&self) -> &'static str {
        match self {
            ItemType::TitleDate => "Title + Date",
            ItemType::TitleCheckbox => "Title + Checkbox",
            ItemType::Countdown => "Countdown",
            ItemType::Eligibility => "Eligibility Status",
            ItemType::Payment => "Payment Status",
            ItemType::ButtonLink => "Button Link",
            ItemType::TitleDescription => "Title + Description",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = ExamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemType::MENU
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ExamError::UnknownItemType(s.to_string()))
    }
}

/// Variant-specific fields of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ItemKind {
    /// Named milestone date.
    TitleDate {
        title: String,
        #[serde(with = "iso_instant")]
        date: DateTime<Utc>,
    },
    TitleCheckbox {
        title: String,
        #[serde(default)]
        checked: bool,
    },
    /// Live countdown to a target instant.
    Countdown {
        #[serde(default)]
        title: String,
        #[serde(with = "iso_instant")]
        date: DateTime<Utc>,
    },
    Eligibility { title: String, status: String },
    Payment { title: String, status: String },
    ButtonLink { label: String, url: String },
    TitleDescription {
        title: String,
        #[serde(default)]
        description: String,
    },
}

impl ItemKind {
    pub fn item_type(&self) -> ItemType {
        match self {
            ItemKind::TitleDate { .. } => ItemType::TitleDate,
            ItemKind::TitleCheckbox { .. } => ItemType::TitleCheckbox,
            ItemKind::Countdown { .. } => ItemType::Countdown,
            ItemKind::Eligibility { .. } => ItemType::Eligibility,
            ItemKind::Payment { .. } => ItemType::Payment,
            ItemKind::ButtonLink { .. } => ItemType::ButtonLink,
            ItemKind::TitleDescription { .. } => ItemType::TitleDescription,
        }
    }

    /// Fields a freshly added item of `item_type` starts with.
    ///
    /// Countdowns target the exam date; milestones start at `now`.
    pub fn default_for(item_type: ItemType, exam_date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        match item_type {
            ItemType::TitleDate => ItemKind::TitleDate {
                title: "New Milestone".to_string(),
                date: now,
            },
            ItemType::TitleCheckbox => ItemKind::TitleCheckbox {
                title: "New Task".to_string(),
                checked: false,
            },
            ItemType::Countdown => ItemKind::Countdown {
                title: "Countdown".to_string(),
                date: exam_date,
            },
            ItemType::Eligibility => ItemKind::Eligibility {
                title: "Eligibility".to_string(),
                status: "Pending".to_string(),
            },
            ItemType::Payment => ItemKind::Payment {
                title: "Fee Payment".to_string(),
                status: "Due".to_string(),
            },
            ItemType::ButtonLink => ItemKind::ButtonLink {
                label: "Official Website".to_string(),
                url: "#".to_string(),
            },
            ItemType::TitleDescription => ItemKind::TitleDescription {
                title: "New Title".to_string(),
                description: "Enter your description here.".to_string(),
            },
        }
    }
}

/// An item document: identity, display order and typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamItem {
    #[serde(skip)]
    pub id: DocId,
    pub order: i64,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl ExamItem {
    pub fn new(id: DocId, order: i64, kind: ItemKind) -> Self {
        Self { id, order, kind }
    }

    pub fn item_type(&self) -> ItemType {
        self.kind.item_type()
    }

    pub fn from_document(doc: &Document) -> Result<Self, ExamError> {
        let mut item: ExamItem = doc.decode().map_err(|e| ExamError::Decode {
            path: doc.path.to_string(),
            reason: e.to_string(),
        })?;
        item.id = doc.id();
        Ok(item)
    }

    /// Stored fields (everything but the id).
    pub fn to_write_fields(&self) -> Result<WriteFields, ExamError> {
        Ok(WriteFields::from_serializable(self)?)
    }
}
