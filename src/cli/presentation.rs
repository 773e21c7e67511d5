//! CLI presentation: text and json formatters per command family.

mod exam;
mod item;
mod shared;
mod status;

pub use exam::{
    format_exam_detail_json, format_exam_detail_text, format_exam_list_json,
    format_exam_list_text,
};
pub use item::{format_item_types_text, format_items_text};
pub use shared::{format_notices, format_section_heading};
pub use status::{format_status_json, format_status_text, StatusReport};
