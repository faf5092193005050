//! Container table rendering

use comfy_table::{Cell, Table};
use docklist_core::inventory::{Field, NOT_AVAILABLE, TableView};

use super::colors::status_color;

/// Build a terminal table from a projected report
///
/// Status cells are colored by container state; missing values are dimmed.
pub fn render_table(view: &TableView) -> Table {
    let mut table = Table::new();
    table.set_header(view.headers.clone());

    for row in &view.rows {
        let cells = view.fields.iter().zip(row).map(|(field, value)| {
            let cell = Cell::new(value);
            if value == NOT_AVAILABLE {
                return cell.add_attribute(comfy_table::Attribute::Dim);
            }
            match field {
                Field::Status => cell.fg(status_color(value)),
                _ => cell,
            }
        });
        table.add_row(cells.collect::<Vec<_>>());
    }

    table
}
