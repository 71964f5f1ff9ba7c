use chrono::{NaiveDate, NaiveDateTime};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::fmt;
use std::ops::Index;

use crate::error::{Result, TableauDataError};

/// Declared type of a column, as reported by the Tableau JS API `getColumns()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnDataType {
    String,
    Float,
    Integer,
    Boolean,
    Date,
    DateTime,
    /// Any type name we do not recognise; values are passed through untouched
    Unknown(String),
}

impl ColumnDataType {
    pub fn as_str(&self) -> &str {
        match self {
            ColumnDataType::String => "string",
            ColumnDataType::Float => "float",
            ColumnDataType::Integer => "integer",
            ColumnDataType::Boolean => "boolean",
            ColumnDataType::Date => "date",
            ColumnDataType::DateTime => "datetime",
            ColumnDataType::Unknown(name) => name,
        }
    }
}

impl From<&str> for ColumnDataType {
    fn from(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "string" => ColumnDataType::String,
            "float" => ColumnDataType::Float,
            "int" | "integer" => ColumnDataType::Integer,
            "bool" | "boolean" => ColumnDataType::Boolean,
            "date" => ColumnDataType::Date,
            "datetime" => ColumnDataType::DateTime,
            _ => ColumnDataType::Unknown(name.to_string()),
        }
    }
}

impl From<String> for ColumnDataType {
    fn from(name: String) -> Self {
        ColumnDataType::from(name.as_str())
    }
}

impl From<ColumnDataType> for String {
    fn from(data_type: ColumnDataType) -> Self {
        data_type.as_str().to_string()
    }
}

impl fmt::Display for ColumnDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Column metadata as returned by `getColumns()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: ColumnDataType,
    /// Position of this column's value inside each raw row
    pub index: usize,
    /// Informational only
    #[serde(default)]
    pub is_referenced: bool,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, data_type: impl Into<ColumnDataType>, index: usize) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            index,
            is_referenced: false,
        }
    }

    pub fn with_referenced(mut self, is_referenced: bool) -> Self {
        self.is_referenced = is_referenced;
        self
    }
}

/// A single coerced cell value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Short name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::String(_) => "string",
            DataValue::Integer(_) => "integer",
            DataValue::Float(_) => "float",
            DataValue::Boolean(_) => "boolean",
            DataValue::Date(_) => "date",
            DataValue::DateTime(_) => "datetime",
            DataValue::Null => "null",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DataValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of the value; integers are widened
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Float(f) => Some(*f),
            DataValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DataValue::Date(d) => Some(*d),
            DataValue::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            DataValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            DataValue::Null => write!(f, ""),
        }
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::String(s.to_string())
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::String(s)
    }
}

impl From<i64> for DataValue {
    fn from(i: i64) -> Self {
        DataValue::Integer(i)
    }
}

impl From<f64> for DataValue {
    fn from(f: f64) -> Self {
        DataValue::Float(f)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Boolean(b)
    }
}

impl From<NaiveDate> for DataValue {
    fn from(d: NaiveDate) -> Self {
        DataValue::Date(d)
    }
}

impl From<NaiveDateTime> for DataValue {
    fn from(dt: NaiveDateTime) -> Self {
        DataValue::DateTime(dt)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DataValue::Null)
    }
}

/// JSON primitives map onto the matching variant; arrays and objects are kept
/// as their JSON text
impl From<&JsonValue> for DataValue {
    fn from(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => DataValue::Null,
            JsonValue::Bool(b) => DataValue::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    DataValue::Float(f)
                } else {
                    DataValue::String(n.to_string())
                }
            }
            JsonValue::String(s) => DataValue::String(s.clone()),
            JsonValue::Array(_) | JsonValue::Object(_) => DataValue::String(json.to_string()),
        }
    }
}

/// One row of converted data: column name to value, in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, DataValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set a field, replacing the value in place if the name already exists
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<DataValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&DataValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Like `get`, but reports a missing column as an error for record `position`
    pub fn get_required(&self, column: &str, position: usize) -> Result<&DataValue> {
        self.get(column)
            .ok_or_else(|| TableauDataError::KeyMissing {
                column: column.to_string(),
                record: position,
            })
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &DataValue> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Build a record from a JSON object, in the object's iteration order
    pub fn from_json_object(object: &serde_json::Map<String, JsonValue>) -> Self {
        object
            .iter()
            .map(|(name, value)| (name.clone(), DataValue::from(value)))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<DataValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl Index<&str> for Record {
    type Output = DataValue;

    fn index(&self, column: &str) -> &DataValue {
        match self.get(column) {
            Some(value) => value,
            None => panic!("column '{}' not present in record", column),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_data_type_names() {
        assert_eq!(ColumnDataType::from("float"), ColumnDataType::Float);
        assert_eq!(ColumnDataType::from("int"), ColumnDataType::Integer);
        assert_eq!(ColumnDataType::from("integer"), ColumnDataType::Integer);
        assert_eq!(ColumnDataType::from("bool"), ColumnDataType::Boolean);
        assert_eq!(ColumnDataType::from("DateTime"), ColumnDataType::DateTime);
        assert_eq!(
            ColumnDataType::from("spatial"),
            ColumnDataType::Unknown("spatial".to_string())
        );
        assert_eq!(String::from(ColumnDataType::from("spatial")), "spatial");
    }

    #[test]
    fn test_column_spec_from_tableau_json() {
        let spec: ColumnSpec = serde_json::from_value(json!({
            "name": "Sales",
            "dataType": "float",
            "index": 2,
            "isReferenced": true
        }))
        .unwrap();

        assert_eq!(spec.name, "Sales");
        assert_eq!(spec.data_type, ColumnDataType::Float);
        assert_eq!(spec.index, 2);
        assert!(spec.is_referenced);
    }

    #[test]
    fn test_record_keeps_insertion_order() {
        let mut record = Record::new();
        record.insert("b", 1i64);
        record.insert("a", "x");
        record.insert("b", 2i64);

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(record["b"], DataValue::Integer(2));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_get_required_reports_position() {
        let record: Record = [("type", "widget")].into_iter().collect();
        assert_eq!(
            record.get_required("color", 3),
            Err(TableauDataError::KeyMissing {
                column: "color".to_string(),
                record: 3
            })
        );
    }

    #[test]
    fn test_record_from_json_object() {
        let value = json!({"name": "Alice", "age": 30, "score": 9.5, "active": true, "note": null});
        let record = Record::from_json_object(value.as_object().unwrap());

        assert_eq!(record["name"], DataValue::String("Alice".to_string()));
        assert_eq!(record["age"], DataValue::Integer(30));
        assert_eq!(record["score"], DataValue::Float(9.5));
        assert_eq!(record["active"], DataValue::Boolean(true));
        assert_eq!(record["note"], DataValue::Null);
    }

    #[test]
    fn test_record_serializes_as_map() {
        let record: Record = [("type", DataValue::from("foo")), ("qty", DataValue::from(3i64))]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"type":"foo","qty":3}"#);
    }
}
