//! View and edit rendering for items.
//!
//! Both dispatch exhaustively on [`ItemKind`]; adding a variant fails to
//! compile until it has a view and an edit form.

use crate::countdown::TimeLeft;
use crate::item::{CommitPolicy, ExamItem, FieldName, ItemField, ItemKind};
use chrono::{DateTime, Utc};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Positive,
    Neutral,
}

impl BadgeTone {
    pub fn for_status(status: &str) -> Self {
        match status {
            "Paid" | "Eligible" => BadgeTone::Positive,
            _ => BadgeTone::Neutral,
        }
    }
}

/// Read-mode presentation of an item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemView {
    Countdown {
        title: String,
        time_left: TimeLeft,
    },
    Milestone {
        title: String,
        date: DateTime<Utc>,
    },
    Checklist {
        title: String,
        checked: bool,
    },
    Status {
        title: String,
        status: String,
        tone: BadgeTone,
    },
    Link {
        label: String,
        url: String,
    },
    Note {
        title: String,
        description: String,
    },
}

pub fn render_view(item: &ExamItem, now: DateTime<Utc>) -> ItemView {
    match &item.kind {
        ItemKind::Countdown { title, date } => ItemView::Countdown {
            title: title.clone(),
            time_left: TimeLeft::until(*date, now),
        },
        ItemKind::TitleDate { title, date } => ItemView::Milestone {
            title: title.clone(),
            date: *date,
        },
        ItemKind::TitleCheckbox { title, checked } => ItemView::Checklist {
            title: title.clone(),
            checked: *checked,
        },
        ItemKind::Eligibility { title, status } | ItemKind::Payment { title, status } => {
            ItemView::Status {
                title: title.clone(),
                status: status.clone(),
                tone: BadgeTone::for_status(status),
            }
        }
        ItemKind::ButtonLink { label, url } => ItemView::Link {
            label: label.clone(),
            url: url.clone(),
        },
        ItemKind::TitleDescription { title, description } => ItemView::Note {
            title: title.clone(),
            description: description.clone(),
        },
    }
}

impl fmt::Display for ItemView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemView::Countdown { title, time_left } => {
                if title.is_empty() {
                    write!(f, "{}", time_left)
                } else {
                    write!(f, "{}: {}", title, time_left)
                }
            }
            ItemView::Milestone { title, date } => {
                write!(f, "{} [{}]", title, date.format("%b %-d"))
            }
            ItemView::Checklist { title, checked } => {
                let mark = if *checked { "x" } else { " " };
                write!(f, "[{}] {}", mark, title)
            }
            ItemView::Status { title, status, .. } => write!(f, "{}: {}", title, status),
            ItemView::Link { label, url } => write!(f, "<{}> {}", label, url),
            ItemView::Note { title, description } => write!(f, "{}\n    {}", title, description),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text { placeholder: Option<&'static str> },
    TextArea { placeholder: Option<&'static str> },
    DatePicker,
}

/// One input in an item's edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct EditControl {
    pub field: FieldName,
    pub control: ControlKind,
    pub value: ItemField,
    pub commit: CommitPolicy,
}

fn control(item: &ExamItem, field: FieldName, control: ControlKind) -> Option<EditControl> {
    item.field(field).map(|value| EditControl {
        field,
        control,
        value,
        commit: field.commit_policy(),
    })
}

/// Edit-mode form for an item.
///
/// Checklist items expose only their title here; the checkbox itself is
/// toggled from read mode.
pub fn edit_controls(item: &ExamItem) -> Vec<EditControl> {
    use ControlKind::*;
    let plain = Text { placeholder: None };
    let specs: Vec<(FieldName, ControlKind)> = match &item.kind {
        ItemKind::Countdown { .. } => vec![
            (FieldName::Title, Text { placeholder: Some("Title") }),
            (FieldName::Date, DatePicker),
        ],
        ItemKind::TitleDate { .. } => vec![(FieldName::Title, plain), (FieldName::Date, DatePicker)],
        ItemKind::TitleCheckbox { .. } => vec![(FieldName::Title, plain)],
        ItemKind::Eligibility { .. } | ItemKind::Payment { .. } => {
            vec![(FieldName::Title, plain), (FieldName::Status, plain)]
        }
        ItemKind::ButtonLink { .. } => vec![
            (FieldName::Label, Text { placeholder: Some("Button Label") }),
            (FieldName::Url, Text { placeholder: Some("https://...") }),
        ],
        ItemKind::TitleDescription { .. } => vec![
            (FieldName::Title, Text { placeholder: Some("Title") }),
            (FieldName::Description, TextArea { placeholder: Some("Description") }),
        ],
    };
    specs
        .into_iter()
        .filter_map(|(field, kind)| control(item, field, kind))
        .collect()
}
