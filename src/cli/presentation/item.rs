//! Item presentation: card item list and the add-item menu.

use crate::item::{ExamItem, ItemKind, ItemType};
use crate::views::ItemEditor;
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde_json::{json, Value};

pub(crate) fn item_json(item: &ExamItem) -> Value {
    let mut value = serde_json::to_value(item).unwrap_or_else(|_| json!({}));
    value["id"] = json!(item.id);
    value
}

pub fn format_items_text(items: &[ItemEditor], now: DateTime<Utc>) -> String {
    if items.is_empty() {
        return "No items. Add one with 'examwise item add <exam-id> <type>'.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "ID", "Type", "Item"]);
    for editor in items {
        let item = editor.displayed();
        table.add_row(vec![
            item.order.to_string(),
            item.id.to_string(),
            item.item_type().to_string(),
            editor.render_view(now).to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_item_types_text() -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Type", "Menu label", "Fields"]);
    let now = Utc::now();
    for item_type in ItemType::MENU {
        let fields: Vec<&str> = ItemKind::default_for(item_type, now, now)
            .field_names()
            .iter()
            .map(|f| f.as_str())
            .collect();
        table.add_row(vec![
            item_type.as_str().to_string(),
            item_type.menu_label().to_string(),
            fields.join(", "),
        ]);
    }
    table.to_string()
}
