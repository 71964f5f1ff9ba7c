//! Convert data exported through the Tableau JavaScript API into typed records
//! and query them with a small SQL-like API (`by`, `filter`, `sort`,
//! `distinct`) to pull out the values a report needs.

pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod table_display;

pub use config::ConverterConfig;
pub use data::converter::{convert_raw_tableau_data, TableauConverter, TableauExport};
pub use data::datatable::{ColumnDataType, ColumnSpec, DataValue, Record};
pub use data::group_by::GroupBy;
pub use data::tableau_data::{Rows, TableauData};
pub use error::{Result, TableauDataError};
