use std::iter::FusedIterator;
use std::sync::Arc;
use tracing::trace;

use crate::data::datatable::{DataValue, Record};
use crate::data::datavalue_compare::datavalues_equal;
use crate::data::tableau_data::TableauData;
use crate::error::Result;

/// Lazy iterator over the groups produced by `TableauData::by`.
///
/// Each step scans forward to the next value of the column not seen yet and
/// gathers every later record sharing it. A record missing the column yields
/// an error when the scan reaches it, after which the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct GroupBy<'a> {
    rows: &'a [Arc<Record>],
    column: String,
    cursor: usize,
    seen: Vec<&'a DataValue>,
    done: bool,
}

impl<'a> GroupBy<'a> {
    pub(crate) fn new(rows: &'a [Arc<Record>], column: &str) -> Self {
        Self {
            rows,
            column: column.to_string(),
            cursor: 0,
            seen: Vec::new(),
            done: false,
        }
    }

    /// Name of the column being grouped on
    pub fn column(&self) -> &str {
        &self.column
    }

    fn next_group(&mut self) -> Option<Result<TableauData>> {
        let rows = self.rows;

        while self.cursor < rows.len() {
            let start = self.cursor;
            self.cursor += 1;

            let key = match rows[start].get_required(&self.column, start) {
                Ok(key) => key,
                Err(e) => return Some(Err(e)),
            };
            if self.seen.iter().any(|seen| datavalues_equal(seen, key)) {
                continue;
            }
            self.seen.push(key);

            let mut members = vec![Arc::clone(&rows[start])];
            for (position, row) in rows.iter().enumerate().skip(start + 1) {
                match row.get_required(&self.column, position) {
                    Ok(value) if datavalues_equal(value, key) => members.push(Arc::clone(row)),
                    Ok(_) => {}
                    Err(e) => return Some(Err(e)),
                }
            }

            trace!(
                "group {} on '{}' = {:?} has {} records",
                self.seen.len(),
                self.column,
                key,
                members.len()
            );
            return Some(Ok(TableauData::from_shared(members)));
        }

        None
    }
}

impl Iterator for GroupBy<'_> {
    type Item = Result<TableauData>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let next = self.next_group();
        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }
        next
    }
}

impl FusedIterator for GroupBy<'_> {}
