use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use std::fmt;

use crate::data::datatable::{DataValue, Record};
use crate::data::tableau_data::TableauData;

/// Render records as a text table. Columns are the union of all record keys
/// in order of first appearance; a record lacking a column shows an empty
/// cell and a null value shows `NULL`.
pub fn render_table<'a>(records: impl IntoIterator<Item = &'a Record>) -> Table {
    let records: Vec<&Record> = records.into_iter().collect();

    let mut field_names: Vec<&str> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !field_names.contains(&key) {
                field_names.push(key);
            }
        }
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        field_names
            .iter()
            .map(|f| Cell::new(f).add_attribute(Attribute::Bold)),
    );

    for record in &records {
        let row: Vec<String> = field_names
            .iter()
            .map(|field| match record.get(field) {
                Some(DataValue::Null) => "NULL".to_string(),
                Some(value) => value.to_string(),
                None => String::new(),
            })
            .collect();
        table.add_row(row);
    }

    table
}

impl fmt::Display for TableauData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(no records)");
        }
        write!(f, "{}", render_table(self))
    }
}
