use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use crate::config::ConverterConfig;
use crate::data::datatable::{ColumnDataType, ColumnSpec, DataValue, Record};
use crate::data::datavalue_compare::whole_number;
use crate::data::tableau_data::TableauData;
use crate::error::{Result, TableauDataError};

/// Convert raw Tableau column metadata and row arrays into typed records,
/// using the default converter settings.
///
/// Fails as a whole: if any row has the wrong shape or any value cannot be
/// coerced to its column's declared type, no records are returned.
pub fn convert_raw_tableau_data<R>(columns: &[ColumnSpec], rows: &[R]) -> Result<Vec<Record>>
where
    R: AsRef<[JsonValue]>,
{
    TableauConverter::new().convert(columns, rows)
}

/// Converts raw `getColumns()` / `getData()` output into records
#[derive(Debug, Clone, Default)]
pub struct TableauConverter {
    config: ConverterConfig,
}

impl TableauConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Converter using the settings in the user's config file, or the
    /// defaults when there is none
    pub fn from_user_config() -> anyhow::Result<Self> {
        ConverterConfig::load().map(Self::with_config)
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn convert<R>(&self, columns: &[ColumnSpec], rows: &[R]) -> Result<Vec<Record>>
    where
        R: AsRef<[JsonValue]>,
    {
        debug!(
            "Converting {} rows across {} columns",
            rows.len(),
            columns.len()
        );

        // Records are keyed in column index order regardless of metadata order
        let mut ordered: Vec<&ColumnSpec> = columns.iter().collect();
        ordered.sort_by_key(|column| column.index);

        let records = rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| self.convert_row(&ordered, row.as_ref(), row_idx))
            .collect::<Result<Vec<_>>>()?;

        debug!("Converted {} records", records.len());
        Ok(records)
    }

    fn convert_row(
        &self,
        columns: &[&ColumnSpec],
        row: &[JsonValue],
        row_idx: usize,
    ) -> Result<Record> {
        if row.len() != columns.len() {
            return Err(TableauDataError::ShapeMismatch {
                row: row_idx,
                expected: columns.len(),
                actual: row.len(),
            });
        }

        let mut record = Record::with_capacity(columns.len());
        for column in columns {
            let raw = row
                .get(column.index)
                .ok_or(TableauDataError::ShapeMismatch {
                    row: row_idx,
                    expected: column.index + 1,
                    actual: row.len(),
                })?;
            let value = self.coerce(raw, column, row_idx)?;
            trace!("row {} column '{}': {:?}", row_idx, column.name, value);
            record.insert(column.name.clone(), value);
        }

        Ok(record)
    }

    fn coerce(&self, raw: &JsonValue, column: &ColumnSpec, row: usize) -> Result<DataValue> {
        if raw.is_null() || raw.as_str() == Some(self.config.null_token.as_str()) {
            return Ok(DataValue::Null);
        }

        let fail = |reason: String| TableauDataError::Conversion {
            column: column.name.clone(),
            row,
            value: raw_text(raw),
            data_type: column.data_type.to_string(),
            reason,
        };

        match &column.data_type {
            ColumnDataType::String => Ok(DataValue::String(raw_text(raw))),
            ColumnDataType::Float => match raw {
                JsonValue::Number(n) => n
                    .as_f64()
                    .map(DataValue::Float)
                    .ok_or_else(|| fail("number out of range".to_string())),
                JsonValue::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(DataValue::Float)
                    .map_err(|e| fail(e.to_string())),
                _ => Err(fail("expected a number".to_string())),
            },
            ColumnDataType::Integer => match raw {
                JsonValue::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().and_then(whole_number))
                    .map(DataValue::Integer)
                    .ok_or_else(|| fail("not a whole number".to_string())),
                JsonValue::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(DataValue::Integer)
                    .map_err(|e| fail(e.to_string())),
                _ => Err(fail("expected an integer".to_string())),
            },
            ColumnDataType::Boolean => match raw {
                JsonValue::Bool(b) => Ok(DataValue::Boolean(*b)),
                JsonValue::String(_) | JsonValue::Number(_) => {
                    let token = raw_text(raw);
                    let token = token.trim();
                    if self.config.is_truthy(token) {
                        Ok(DataValue::Boolean(true))
                    } else if self.config.is_falsy(token) {
                        Ok(DataValue::Boolean(false))
                    } else {
                        Err(fail("unrecognised boolean token".to_string()))
                    }
                }
                _ => Err(fail("expected a boolean".to_string())),
            },
            ColumnDataType::Date => match raw {
                JsonValue::String(s) => NaiveDate::parse_from_str(s.trim(), &self.config.date_format)
                    .map(DataValue::Date)
                    .map_err(|e| fail(e.to_string())),
                _ => Err(fail("expected a date string".to_string())),
            },
            ColumnDataType::DateTime => match raw {
                JsonValue::String(s) => {
                    NaiveDateTime::parse_from_str(s.trim(), &self.config.datetime_format)
                        .map(DataValue::DateTime)
                        .map_err(|e| fail(e.to_string()))
                }
                _ => Err(fail("expected a datetime string".to_string())),
            },
            ColumnDataType::Unknown(_) => Ok(DataValue::from(raw)),
        }
    }
}

/// Text of a raw value as it appeared in the export
fn raw_text(raw: &JsonValue) -> String {
    match raw {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The column metadata and row data handed over from the Tableau JS API,
/// e.g. `{"columns": [...getColumns()], "data": [...getData()]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableauExport {
    pub columns: Vec<ColumnSpec>,
    pub data: Vec<Vec<JsonValue>>,
}

impl TableauExport {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn convert(&self, converter: &TableauConverter) -> Result<Vec<Record>> {
        converter.convert(&self.columns, &self.data)
    }

    pub fn into_tableau_data(self) -> Result<TableauData> {
        self.convert(&TableauConverter::new()).map(TableauData::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("Region", "string", 0),
            ColumnSpec::new("Sales", "float", 1),
            ColumnSpec::new("Orders", "int", 2),
            ColumnSpec::new("Returned", "bool", 3),
        ]
    }

    #[test]
    fn test_converts_declared_types() {
        let rows = vec![vec![json!("East"), json!("1200.50"), json!("12"), json!("true")]];

        let records = convert_raw_tableau_data(&columns(), &rows).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["Region"], DataValue::String("East".to_string()));
        assert_eq!(record["Sales"], DataValue::Float(1200.5));
        assert_eq!(record["Orders"], DataValue::Integer(12));
        assert_eq!(record["Returned"], DataValue::Boolean(true));
    }

    #[test]
    fn test_accepts_json_primitives() {
        let rows = vec![vec![json!("West"), json!(99.5), json!(3), json!(false)]];

        let records = convert_raw_tableau_data(&columns(), &rows).unwrap();

        assert_eq!(records[0]["Sales"], DataValue::Float(99.5));
        assert_eq!(records[0]["Orders"], DataValue::Integer(3));
        assert_eq!(records[0]["Returned"], DataValue::Boolean(false));
    }

    #[test]
    fn test_int_column_accepts_whole_json_floats() {
        let rows = vec![vec![json!("West"), json!(1.0), json!(12.0), json!(true)]];
        let records = convert_raw_tableau_data(&columns(), &rows).unwrap();
        assert_eq!(records[0]["Orders"], DataValue::Integer(12));

        for orders in [json!(12.5), json!(1e19), json!("12.0")] {
            let rows = vec![vec![json!("West"), json!(1.0), orders, json!(true)]];
            let err = convert_raw_tableau_data(&columns(), &rows).unwrap_err();
            assert!(
                matches!(err, TableauDataError::Conversion { ref column, .. } if column == "Orders"),
                "{err:?}"
            );
        }
    }

    #[test]
    fn test_null_token_becomes_null_for_any_type() {
        let rows = vec![vec![json!("%null%"), json!("%null%"), json!(null), json!("%null%")]];

        let records = convert_raw_tableau_data(&columns(), &rows).unwrap();

        assert!(records[0].values().all(DataValue::is_null));
    }

    #[test]
    fn test_columns_visited_in_index_order() {
        let columns = vec![
            ColumnSpec::new("second", "string", 1),
            ColumnSpec::new("first", "string", 0),
        ];
        let rows = vec![vec![json!("a"), json!("b")]];

        let records = convert_raw_tableau_data(&columns, &rows).unwrap();

        assert_eq!(records[0].keys().collect::<Vec<_>>(), vec!["first", "second"]);
        assert_eq!(records[0]["first"], DataValue::String("a".to_string()));
        assert_eq!(records[0]["second"], DataValue::String("b".to_string()));
    }

    #[test]
    fn test_index_beyond_row_is_shape_mismatch() {
        let columns = vec![ColumnSpec::new("only", "string", 4)];
        let rows = vec![vec![json!("a")]];

        let err = convert_raw_tableau_data(&columns, &rows).unwrap_err();
        assert!(matches!(err, TableauDataError::ShapeMismatch { row: 0, .. }));
    }

    #[test]
    fn test_date_and_datetime_columns() {
        let columns = vec![
            ColumnSpec::new("Day", "date", 0),
            ColumnSpec::new("Stamp", "datetime", 1),
        ];
        let rows = vec![vec![json!("2024-03-15"), json!("2024-03-15 08:30:00")]];

        let records = convert_raw_tableau_data(&columns, &rows).unwrap();

        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(records[0]["Day"], DataValue::Date(day));
        assert_eq!(
            records[0]["Stamp"],
            DataValue::DateTime(day.and_hms_opt(8, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_unknown_type_passes_through() {
        let columns = vec![
            ColumnSpec::new("Geo", "spatial", 0),
            ColumnSpec::new("Count", "spatial", 1),
        ];
        let rows = vec![vec![json!("POINT(1 2)"), json!(7)]];

        let records = convert_raw_tableau_data(&columns, &rows).unwrap();

        assert_eq!(records[0]["Geo"], DataValue::String("POINT(1 2)".to_string()));
        assert_eq!(records[0]["Count"], DataValue::Integer(7));
    }

    #[test]
    fn test_unrecognised_boolean_token_fails() {
        let rows = vec![vec![json!("East"), json!("1"), json!("1"), json!("perhaps")]];

        let err = convert_raw_tableau_data(&columns(), &rows).unwrap_err();
        match err {
            TableauDataError::Conversion { column, value, .. } => {
                assert_eq!(column, "Returned");
                assert_eq!(value, "perhaps");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_custom_config_tokens_and_formats() {
        let config = ConverterConfig {
            null_token: "N/A".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            ..ConverterConfig::default()
        };
        let converter = TableauConverter::with_config(config);
        let columns = vec![
            ColumnSpec::new("Day", "date", 0),
            ColumnSpec::new("Note", "string", 1),
        ];
        let rows = vec![vec![json!("15/03/2024"), json!("N/A")]];

        let records = converter.convert(&columns, &rows).unwrap();

        assert_eq!(
            records[0]["Day"],
            DataValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        assert_eq!(records[0]["Note"], DataValue::Null);
    }

    #[test]
    fn test_export_document() {
        let export = TableauExport::from_json_str(
            r#"{
                "columns": [
                    {"name": "type", "dataType": "string", "index": 0, "isReferenced": true},
                    {"name": "qty", "dataType": "int", "index": 1, "isReferenced": false}
                ],
                "data": [["widget", "4"], ["foo", "2"]]
            }"#,
        )
        .unwrap();

        let data = export.into_tableau_data().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[1]["qty"], DataValue::Integer(2));
    }
}
