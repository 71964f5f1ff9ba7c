use thiserror::Error;

/// Errors raised while converting raw Tableau data or querying a `TableauData`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableauDataError {
    #[error("row {row} has {actual} values but {expected} columns were declared")]
    ShapeMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("cannot convert value {value:?} in column '{column}' (row {row}) to {data_type}: {reason}")]
    Conversion {
        column: String,
        row: usize,
        value: String,
        data_type: String,
        reason: String,
    },

    #[error("column '{column}' is missing from record {record}")]
    KeyMissing { column: String, record: usize },

    #[error("cannot order {left} against {right} in column '{column}'")]
    Ordering {
        column: String,
        left: String,
        right: String,
    },

    #[error("index {index} is out of range for a collection of {len} records")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("JSON value at position {record} is not an object")]
    NotAnObject { record: usize },
}

pub type Result<T> = std::result::Result<T, TableauDataError>;
