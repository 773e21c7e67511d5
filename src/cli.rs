//! CLI domain: parse, route, output, and presentation only.
//! No domain logic; the route table dispatches to views and the repository.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, ExamCommands, ItemCommands};
pub use presentation::{
    format_exam_detail_json, format_exam_detail_text, format_exam_list_json,
    format_exam_list_text, format_item_types_text, format_items_text, format_notices,
    format_section_heading, format_status_json, format_status_text, StatusReport,
};
pub use route::RunContext;
