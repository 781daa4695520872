// 📥 Extract
// Reads the raw JSON input and the optional field configuration table.

use crate::error::{EtlError, Result};
use crate::normalize::RawRecord;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tracing::info;

// ============================================================================
// JSON INPUT
// ============================================================================

/// Load records from a file holding one JSON object or an array of them
pub fn load_records(path: &Path) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        return Err(EtlError::InputNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let records = parse_records(&content)?;

    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

pub fn parse_records(content: &str) -> Result<Vec<RawRecord>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Object(record) => Ok(vec![record]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(record) => Ok(record),
                other => Err(EtlError::InvalidInput(format!(
                    "element {} is not an object: {}",
                    index, other
                ))),
            })
            .collect(),
        other => Err(EtlError::InvalidInput(format!(
            "expected an object or an array of objects, found {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// FIELD CONFIGURATION
// ============================================================================

/// Expected-field table. Advisory only: nothing in transform consults it.
///
/// The first column names the field; an optional `required` column marks
/// fields every record should carry.
#[derive(Debug, Clone, Default)]
pub struct FieldConfig {
    pub rows: Vec<HashMap<String, String>>,
    fields: Vec<String>,
    required: Vec<String>,
}

impl FieldConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = csv::Reader::from_path(path)?;
        let config = Self::from_reader(reader)?;
        info!("Loaded field configuration from {} ({} fields)", path.display(), config.fields.len());
        Ok(config)
    }

    pub fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let name_column = headers
            .first()
            .cloned()
            .ok_or_else(|| EtlError::InvalidInput("field configuration has no header".to_string()))?;

        let mut config = FieldConfig::default();
        for result in reader.records() {
            let record = result?;
            let row: HashMap<String, String> = headers
                .iter()
                .cloned()
                .zip(record.iter().map(|v| v.trim().to_string()))
                .collect();

            let Some(name) = row.get(&name_column).filter(|n| !n.is_empty()).cloned() else {
                continue;
            };

            let required = row
                .get("required")
                .map(|v| matches!(v.to_lowercase().as_str(), "yes" | "y" | "true" | "1"))
                .unwrap_or(false);
            if required {
                config.required.push(name.clone());
            }
            config.fields.push(name);
            config.rows.push(row);
        }

        Ok(config)
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required
    }

    /// Source fields that appear in the input but not in the configuration
    pub fn unknown_fields(&self, records: &[RawRecord]) -> BTreeSet<String> {
        let known: BTreeSet<&str> = self.fields.iter().map(String::as_str).collect();
        records
            .iter()
            .flat_map(|r| r.keys())
            .filter(|key| !known.contains(key.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_single_object() {
        let records = parse_records(r#"{"address": "1 Main St"}"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["address"], json!("1 Main St"));
    }

    #[test]
    fn test_parse_array() {
        let records = parse_records(r#"[{"a": 1}, {"b": 2}, {}]"#).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_parse_rejects_scalars() {
        assert!(matches!(parse_records("42"), Err(EtlError::InvalidInput(_))));
        assert!(matches!(parse_records(r#"[{"a": 1}, 7]"#), Err(EtlError::InvalidInput(_))));
        assert!(matches!(parse_records("not json"), Err(EtlError::Json(_))));
    }

    #[test]
    fn test_missing_input_file() {
        let result = load_records(Path::new("/nonexistent/input.json"));
        assert!(matches!(result, Err(EtlError::InputNotFound(_))));
    }

    #[test]
    fn test_load_records_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"city": "Springfield"}}]"#).unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records[0]["city"], json!("Springfield"));
    }

    #[test]
    fn test_field_config() {
        let data = "Field Name,Type,Required\naddress,string,yes\ncity,string,no\n,,\nbedrooms,int,\n";
        let config = FieldConfig::from_reader(csv::Reader::from_reader(data.as_bytes())).unwrap();

        assert_eq!(config.fields(), &["address", "city", "bedrooms"]);
        assert_eq!(config.required_fields(), &["address"]);
        assert_eq!(config.rows[1]["type"], "string");

        let records = parse_records(r#"[{"address": "x", "pool": true, "sqft": 10}]"#).unwrap();
        let unknown: Vec<String> = config.unknown_fields(&records).into_iter().collect();
        assert_eq!(unknown, vec!["pool", "sqft"]);
    }
}
