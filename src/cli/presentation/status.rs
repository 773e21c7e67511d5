//! Status command presentation.

use super::shared::{format_section_heading, to_pretty_json};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub session: String,
    pub user: Option<String>,
    pub workspace: PathBuf,
    pub store_path: PathBuf,
    pub upcoming: usize,
    pub past: usize,
}

pub fn format_status_text(report: &StatusReport) -> String {
    let mut out = format!("{}\n", format_section_heading("ExamWise Status"));
    out.push_str(&format!("  Session: {}\n", report.session));
    if let Some(user) = &report.user {
        out.push_str(&format!("  User: {}\n", user));
    }
    out.push_str(&format!("  Workspace: {}\n", report.workspace.display()));
    out.push_str(&format!("  Store: {}\n", report.store_path.display()));
    out.push_str(&format!(
        "  Exams: {} upcoming, {} past",
        report.upcoming, report.past
    ));
    out
}

pub fn format_status_json(report: &StatusReport) -> String {
    to_pretty_json(&serde_json::to_value(report).unwrap_or_default())
}
