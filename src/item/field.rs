//! Field-level edits on items.

use crate::error::ExamError;
use crate::item::{ExamItem, ItemKind};
use crate::store::WriteFields;
use crate::types::{parse_instant, to_iso};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// When an edited field is written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Text inputs: local only while typing, written when focus leaves.
    OnBlur,
    /// Toggles and date pickers: written on change.
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName {
    Title,
    Date,
    Checked,
    Status,
    Label,
    Url,
    Description,
}

impl FieldName {
    pub const ALL: [FieldName; 7] = [
        FieldName::Title,
        FieldName::Date,
        FieldName::Checked,
        FieldName::Status,
        FieldName::Label,
        FieldName::Url,
        FieldName::Description,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Title => "title",
            FieldName::Date => "date",
            FieldName::Checked => "checked",
            FieldName::Status => "status",
            FieldName::Label => "label",
            FieldName::Url => "url",
            FieldName::Description => "description",
        }
    }

    pub fn commit_policy(&self) -> CommitPolicy {
        match self {
            FieldName::Checked | FieldName::Date => CommitPolicy::Immediate,
            FieldName::Title
            | FieldName::Status
            | FieldName::Label
            | FieldName::Url
            | FieldName::Description => CommitPolicy::OnBlur,
        }
    }

    /// Parse a raw textual value for this field.
    pub fn parse_value(&self, raw: &str) -> Result<ItemField, ExamError> {
        match self {
            FieldName::Title => Ok(ItemField::Title(raw.to_string())),
            FieldName::Status => Ok(ItemField::Status(raw.to_string())),
            FieldName::Label => Ok(ItemField::Label(raw.to_string())),
            FieldName::Url => Ok(ItemField::Url(raw.to_string())),
            FieldName::Description => Ok(ItemField::Description(raw.to_string())),
            FieldName::Date => parse_instant(raw)
                .map(ItemField::Date)
                .ok_or_else(|| ExamError::InvalidValue {
                    field: "date",
                    reason: format!("'{}' is not a date (expected YYYY-MM-DD or RFC 3339)", raw),
                }),
            FieldName::Checked => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(ItemField::Checked(true)),
                "false" | "no" | "0" | "off" => Ok(ItemField::Checked(false)),
                other => Err(ExamError::InvalidValue {
                    field: "checked",
                    reason: format!("'{}' is not a boolean", other),
                }),
            },
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = ExamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ExamError::UnknownField(s.to_string()))
    }
}

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemField {
    Title(String),
    Date(DateTime<Utc>),
    Checked(bool),
    Status(String),
    Label(String),
    Url(String),
    Description(String),
}

impl ItemField {
    pub fn name(&self) -> FieldName {
        match self {
            ItemField::Title(_) => FieldName::Title,
            ItemField::Date(_) => FieldName::Date,
            ItemField::Checked(_) => FieldName::Checked,
            ItemField::Status(_) => FieldName::Status,
            ItemField::Label(_) => FieldName::Label,
            ItemField::Url(_) => FieldName::Url,
            ItemField::Description(_) => FieldName::Description,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ItemField::Title(v)
            | ItemField::Status(v)
            | ItemField::Label(v)
            | ItemField::Url(v)
            | ItemField::Description(v) => Value::String(v.clone()),
            ItemField::Date(d) => Value::String(to_iso(d)),
            ItemField::Checked(b) => Value::Bool(*b),
        }
    }

    /// Single-field partial update.
    pub fn to_write_fields(&self) -> WriteFields {
        WriteFields::new().set(self.name().as_str(), self.to_json())
    }
}

impl ItemKind {
    /// Editable fields of this variant.
    pub fn field_names(&self) -> &'static [FieldName] {
        match self {
            ItemKind::TitleDate { .. } | ItemKind::Countdown { .. } => {
                &[FieldName::Title, FieldName::Date]
            }
            ItemKind::TitleCheckbox { .. } => &[FieldName::Title, FieldName::Checked],
            ItemKind::Eligibility { .. } | ItemKind::Payment { .. } => {
                &[FieldName::Title, FieldName::Status]
            }
            ItemKind::ButtonLink { .. } => &[FieldName::Label, FieldName::Url],
            ItemKind::TitleDescription { .. } => &[FieldName::Title, FieldName::Description],
        }
    }

    /// Current value of `name`, if this variant has it.
    pub fn get(&self, name: FieldName) -> Option<ItemField> {
        match (self, name) {
            (
                ItemKind::TitleDate { title, .. }
                | ItemKind::TitleCheckbox { title, .. }
                | ItemKind::Countdown { title, .. }
                | ItemKind::Eligibility { title, .. }
                | ItemKind::Payment { title, .. }
                | ItemKind::TitleDescription { title, .. },
                FieldName::Title,
            ) => Some(ItemField::Title(title.clone())),
            (
                ItemKind::TitleDate { date, .. } | ItemKind::Countdown { date, .. },
                FieldName::Date,
            ) => Some(ItemField::Date(*date)),
            (ItemKind::TitleCheckbox { checked, .. }, FieldName::Checked) => {
                Some(ItemField::Checked(*checked))
            }
            (
                ItemKind::Eligibility { status, .. } | ItemKind::Payment { status, .. },
                FieldName::Status,
            ) => Some(ItemField::Status(status.clone())),
            (ItemKind::ButtonLink { label, .. }, FieldName::Label) => {
                Some(ItemField::Label(label.clone()))
            }
            (ItemKind::ButtonLink { url, .. }, FieldName::Url) => Some(ItemField::Url(url.clone())),
            (ItemKind::TitleDescription { description, .. }, FieldName::Description) => {
                Some(ItemField::Description(description.clone()))
            }
            _ => None,
        }
    }

    /// Overwrite one field. Never changes the variant.
    pub fn set(&mut self, field: &ItemField) -> Result<(), ExamError> {
        match (&mut *self, field) {
            (
                ItemKind::TitleDate { title, .. }
                | ItemKind::TitleCheckbox { title, .. }
                | ItemKind::Countdown { title, .. }
                | ItemKind::Eligibility { title, .. }
                | ItemKind::Payment { title, .. }
                | ItemKind::TitleDescription { title, .. },
                ItemField::Title(v),
            ) => *title = v.clone(),
            (
                ItemKind::TitleDate { date, .. } | ItemKind::Countdown { date, .. },
                ItemField::Date(v),
            ) => *date = *v,
            (ItemKind::TitleCheckbox { checked, .. }, ItemField::Checked(v)) => *checked = *v,
            (
                ItemKind::Eligibility { status, .. } | ItemKind::Payment { status, .. },
                ItemField::Status(v),
            ) => *status = v.clone(),
            (ItemKind::ButtonLink { label, .. }, ItemField::Label(v)) => *label = v.clone(),
            (ItemKind::ButtonLink { url, .. }, ItemField::Url(v)) => *url = v.clone(),
            (ItemKind::TitleDescription { description, .. }, ItemField::Description(v)) => {
                *description = v.clone()
            }
            (kind, field) => {
                return Err(ExamError::FieldNotApplicable {
                    field: field.name().as_str(),
                    item_type: kind.item_type().as_str(),
                })
            }
        }
        Ok(())
    }
}

impl ExamItem {
    pub fn field(&self, name: FieldName) -> Option<ItemField> {
        self.kind.get(name)
    }

    pub fn apply(&mut self, field: &ItemField) -> Result<(), ExamError> {
        self.kind.set(field)
    }
}
