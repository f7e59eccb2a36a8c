use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::binder::surface::NoticeKind;

pub fn render_grid(header: &[String], rows: &[Vec<String>]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    for row in rows {
        table.add_row(row.clone());
    }
    table.to_string()
}

pub fn render_notice(kind: NoticeKind, message: &str) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    let cell = match kind {
        NoticeKind::Info => Cell::new(message),
        NoticeKind::Error => Cell::new(message).fg(Color::Red),
    };
    table.add_row(Row::from(vec![cell]));
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_contains_header_and_cells() {
        let rendered = render_grid(
            &["Food".to_string(), "Qty".to_string()],
            &[vec!["Oats".to_string(), "2".to_string()]],
        );
        assert!(rendered.contains("Food"));
        assert!(rendered.contains("Oats"));
        assert!(rendered.lines().count() >= 5);
    }

    #[test]
    fn notice_keeps_message_text() {
        let rendered = render_notice(NoticeKind::Error, "Error connecting to backend.");
        assert!(rendered.contains("Error connecting to backend."));
    }
}
