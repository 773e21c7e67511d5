//! Exam command presentation: list and detail text/json.

use super::item::{format_items_text, item_json};
use super::shared::{format_section_heading, to_pretty_json};
use crate::countdown::TimeLeft;
use crate::exam::{Exam, ExamPartition};
use crate::types::to_iso;
use crate::views::ItemEditor;
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{Attribute, Cell, Table};
use serde_json::{json, Value};

pub(crate) fn exam_json(exam: &Exam) -> Value {
    json!({
        "id": exam.id,
        "name": exam.name,
        "subtitle": exam.subtitle,
        "date": to_iso(&exam.date),
        "imageUrl": exam.image_url,
        "createdAt": exam.created_at.as_ref().map(to_iso),
    })
}

fn exam_table(exams: &[Exam], now: DateTime<Utc>, past: bool) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["ID", "Name", "Subtitle", "Date", "Time left"]);
    for exam in exams {
        let time_left = if past {
            "-".to_string()
        } else {
            format!("{}d", TimeLeft::until(exam.date, now).days)
        };
        let row = vec![
            exam.id.to_string(),
            exam.name.clone(),
            exam.subtitle.clone().unwrap_or_default(),
            exam.date.format("%Y-%m-%d").to_string(),
            time_left,
        ];
        if past {
            table.add_row(
                row.into_iter()
                    .map(|v| Cell::new(v).add_attribute(Attribute::Dim))
                    .collect::<Vec<_>>(),
            );
        } else {
            table.add_row(row);
        }
    }
    table
}

pub fn format_exam_list_text(partition: &ExamPartition, now: DateTime<Utc>) -> String {
    if partition.is_empty() {
        return "No exams yet. Add one with 'examwise exam add --name <name> --date <date>'."
            .to_string();
    }
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Upcoming")));
    if partition.upcoming.is_empty() {
        out.push_str("  None\n\n");
    } else {
        out.push_str(&format!("{}\n\n", exam_table(&partition.upcoming, now, false)));
    }
    if !partition.past.is_empty() {
        out.push_str(&format!("{}\n\n", format_section_heading("Past")));
        out.push_str(&format!("{}\n\n", exam_table(&partition.past, now, true)));
    }
    out.push_str(&format!(
        "Total: {} exam(s), {} upcoming",
        partition.len(),
        partition.upcoming.len()
    ));
    out
}

pub fn format_exam_list_json(partition: &ExamPartition) -> String {
    let out = json!({
        "upcoming": partition.upcoming.iter().map(exam_json).collect::<Vec<_>>(),
        "past": partition.past.iter().map(exam_json).collect::<Vec<_>>(),
        "total": partition.len(),
    });
    to_pretty_json(&out)
}

pub fn format_exam_detail_text(exam: &Exam, items: &[ItemEditor], now: DateTime<Utc>) -> String {
    let mut out = format!("{}\n", format_section_heading(&exam.name));
    if let Some(subtitle) = &exam.subtitle {
        out.push_str(&format!("  {}\n", subtitle));
    }
    out.push_str(&format!("  Date: {}", exam.date.format("%A, %B %-d, %Y")));
    if exam.is_past(now) {
        out.push_str(" (past)");
    }
    out.push_str(&format!("\n  Image: {}\n  ID: {}\n\n", exam.image_url, exam.id));
    out.push_str(&format_items_text(items, now));
    out
}

pub fn format_exam_detail_json(exam: &Exam, items: &[ItemEditor]) -> String {
    let mut value = exam_json(exam);
    value["items"] = Value::Array(items.iter().map(|e| item_json(e.displayed())).collect());
    to_pretty_json(&value)
}
