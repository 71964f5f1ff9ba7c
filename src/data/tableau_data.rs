//! `TableauData`: an immutable, ordered collection of records with a small
//! SQL-like query surface.
//!
//! ```
//! use tableau_data::{DataValue, Record, TableauData};
//!
//! let data: TableauData = [("widget", "blue"), ("widget", "red"), ("bar", "green")]
//!     .into_iter()
//!     .map(|(kind, color)| Record::from_iter([("type", kind), ("color", color)]))
//!     .collect();
//!
//! let red_or_green = data.filter(|row| {
//!     matches!(row["color"].as_str(), Some("red") | Some("green"))
//! });
//! assert_eq!(red_or_green.len(), 2);
//!
//! for group in data.by("type") {
//!     let group = group.unwrap();
//!     assert!(group.len() >= 1);
//! }
//! assert_eq!(
//!     data.distinct("type").unwrap(),
//!     vec![DataValue::from("widget"), DataValue::from("bar")]
//! );
//! ```

use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::iter::FusedIterator;
use std::ops::Index;
use std::sync::Arc;
use tracing::debug;

use crate::data::datatable::{DataValue, Record};
use crate::data::datavalue_compare::{compare_datavalues, datavalues_equal, ordering_class};
use crate::data::group_by::GroupBy;
use crate::error::{Result, TableauDataError};

/// An ordered collection of records.
///
/// Every query returns a new collection; the receiver is never modified.
/// Records are shared between derived collections, so filtering, sorting and
/// grouping only copy pointers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableauData {
    rows: Vec<Arc<Record>>,
}

impl TableauData {
    /// Wrap a list of records. The collection takes ownership, so later
    /// changes to the caller's data cannot leak in.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            rows: records.into_iter().map(Arc::new).collect(),
        }
    }

    pub(crate) fn from_shared(rows: Vec<Arc<Record>>) -> Self {
        Self { rows }
    }

    /// Build a collection from an array of JSON objects, for data that does
    /// not come through the Tableau converter
    pub fn from_json_values(values: &[JsonValue]) -> Result<Self> {
        values
            .iter()
            .enumerate()
            .map(|(position, value)| {
                value
                    .as_object()
                    .map(Record::from_json_object)
                    .ok_or(TableauDataError::NotAnObject { record: position })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over the records in order. Each call starts a fresh pass.
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            inner: self.rows.iter(),
        }
    }

    pub fn iter(&self) -> Rows<'_> {
        self.rows()
    }

    /// Iterate over single-field records holding only `column`
    pub fn project<'a>(&'a self, column: &'a str) -> impl Iterator<Item = Result<Record>> + 'a {
        self.rows.iter().enumerate().map(move |(position, row)| {
            row.get_required(column, position)
                .map(|value| Record::from_iter([(column, value.clone())]))
        })
    }

    /// Keep the records for which `predicate` returns true (SQL `WHERE`)
    #[doc(alias = "where")]
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&Record) -> bool,
    {
        let rows: Vec<Arc<Record>> = self
            .rows
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect();

        debug!("filter kept {} of {} records", rows.len(), self.rows.len());
        Self::from_shared(rows)
    }

    /// Like `filter` for predicates that can fail. The first error is
    /// returned exactly as the predicate produced it.
    pub fn try_filter<F, E>(&self, mut predicate: F) -> std::result::Result<Self, E>
    where
        F: FnMut(&Record) -> std::result::Result<bool, E>,
    {
        let mut rows = Vec::new();
        for row in &self.rows {
            if predicate(row)? {
                rows.push(Arc::clone(row));
            }
        }
        Ok(Self::from_shared(rows))
    }

    /// Sort by the given columns, compared left to right.
    ///
    /// The sort is stable in both directions: `reverse` flips the order of
    /// distinct keys while records with equal keys keep their relative order.
    /// Nulls sort first; a column mixing kinds that cannot be ordered against
    /// each other (say numbers and strings) is an `Ordering` error.
    pub fn sort<S: AsRef<str>>(&self, by: &[S], reverse: bool) -> Result<Self> {
        let columns: Vec<&str> = by.iter().map(AsRef::as_ref).collect();
        debug!("sorting {} records by {:?} (reverse={})", self.len(), columns, reverse);

        let keys = self
            .rows
            .iter()
            .enumerate()
            .map(|(position, row)| {
                columns
                    .iter()
                    .map(|column| row.get_required(column, position))
                    .collect::<Result<Vec<&DataValue>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        for (k, column) in columns.iter().enumerate() {
            check_comparable(keys.iter().map(|key| key[k]), column)?;
        }

        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| {
            let ordering = compare_keys(&keys[a], &keys[b]);
            if reverse {
                ordering.reverse()
            } else {
                ordering
            }
        });

        Ok(Self::from_shared(
            order.into_iter().map(|i| Arc::clone(&self.rows[i])).collect(),
        ))
    }

    /// Unique values of `column` in order of first appearance
    pub fn distinct(&self, column: &str) -> Result<Vec<DataValue>> {
        let mut values: Vec<DataValue> = Vec::new();
        for (position, row) in self.rows.iter().enumerate() {
            let value = row.get_required(column, position)?;
            if !values.iter().any(|seen| datavalues_equal(seen, value)) {
                values.push(value.clone());
            }
        }
        Ok(values)
    }

    /// Split into one collection per distinct value of `column` (SQL
    /// `GROUP BY`), in order of first appearance. Groups are produced lazily;
    /// call `by` again to scan again.
    pub fn by(&self, column: &str) -> GroupBy<'_> {
        GroupBy::new(&self.rows, column)
    }

    /// Record at `index`; negative indices count back from the end
    pub fn get(&self, index: isize) -> Result<&Record> {
        let len = self.rows.len();
        let resolved = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index as usize).filter(|&i| i < len)
        };

        resolved
            .and_then(|i| self.rows.get(i))
            .map(|row| row.as_ref())
            .ok_or(TableauDataError::IndexOutOfRange { index, len })
    }

    pub fn first(&self) -> Option<&Record> {
        self.rows.first().map(|row| row.as_ref())
    }

    pub fn last(&self) -> Option<&Record> {
        self.rows.last().map(|row| row.as_ref())
    }

    /// Records in `start..end`. Missing bounds mean the start or end of the
    /// collection, negative bounds count back from the end, and out-of-range
    /// bounds are clamped, so this never fails.
    pub fn slice(&self, start: Option<isize>, end: Option<isize>) -> Self {
        let len = self.rows.len();
        let start = start.map_or(0, |b| clamp_bound(b, len));
        let end = end.map_or(len, |b| clamp_bound(b, len));

        if start >= end {
            return Self::default();
        }
        Self::from_shared(self.rows[start..end].to_vec())
    }

    /// Copy the records out into a plain vector
    pub fn to_vec(&self) -> Vec<Record> {
        self.rows.iter().map(|row| Record::clone(row)).collect()
    }
}

/// Fail if a sort column holds values that cannot be ordered against each
/// other, so the comparator handed to `sort_by` is always a total order
fn check_comparable<'a>(
    values: impl Iterator<Item = &'a DataValue>,
    column: &str,
) -> Result<()> {
    let mut first: Option<(&'static str, &DataValue)> = None;
    for value in values {
        let Some(class) = ordering_class(value) else {
            continue;
        };
        match first {
            None => first = Some((class, value)),
            Some((seen, seen_value)) if seen != class => {
                return Err(TableauDataError::Ordering {
                    column: column.to_string(),
                    left: seen_value.type_name().to_string(),
                    right: value.type_name().to_string(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Compare two sort keys field by field. Only called once every column has
/// passed `check_comparable`.
fn compare_keys(a: &[&DataValue], b: &[&DataValue]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(left, right)| compare_datavalues(left, right).unwrap_or(Ordering::Equal))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn clamp_bound(bound: isize, len: usize) -> usize {
    if bound < 0 {
        len.saturating_sub(bound.unsigned_abs())
    } else {
        (bound as usize).min(len)
    }
}

impl Index<usize> for TableauData {
    type Output = Record;

    fn index(&self, index: usize) -> &Record {
        &self.rows[index]
    }
}

impl From<Vec<Record>> for TableauData {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<Record> for TableauData {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::from_shared(iter.into_iter().map(Arc::new).collect())
    }
}

/// Borrowing iterator over the records of a `TableauData`
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    inner: std::slice::Iter<'a, Arc<Record>>,
}

impl<'a> Iterator for Rows<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|row| row.as_ref())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Rows<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|row| row.as_ref())
    }
}

impl ExactSizeIterator for Rows<'_> {}

impl FusedIterator for Rows<'_> {}

impl<'a> IntoIterator for &'a TableauData {
    type Item = &'a Record;
    type IntoIter = Rows<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows()
    }
}

impl IntoIterator for TableauData {
    type Item = Record;
    type IntoIter = std::iter::Map<std::vec::IntoIter<Arc<Record>>, fn(Arc<Record>) -> Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows
            .into_iter()
            .map(Arc::unwrap_or_clone as fn(Arc<Record>) -> Record)
    }
}
