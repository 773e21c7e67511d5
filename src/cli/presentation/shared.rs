//! Shared presentation helpers.

use crate::notice::{Notice, NoticeLevel};
use owo_colors::OwoColorize;

/// Section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// One line per notice; errors are highlighted.
pub fn format_notices(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|n| match n.level {
            NoticeLevel::Info => format!("{} {}", n.title.green(), n.description),
            NoticeLevel::Error => format!("{} {}", n.title.red().bold(), n.description),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn to_pretty_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
