// 🗄️ Relational Store - SQLite via rusqlite
// Schema script and every table batch run in their own transaction, so a
// failed batch rolls back only itself.

use crate::config::DatabaseConfig;
use crate::error::{EtlError, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, Params};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};

/// A row ready for insert: column name → non-null value
pub type Row = Map<String, Value>;

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the database named in the config
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let in_memory = config.path.as_os_str() == ":memory:";

        let conn = if in_memory {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let conn = Connection::open(&config.path)?;
            // WAL for crash recovery
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn
        };

        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        info!("Database connection established: {}", config.path.display());
        Ok(Store { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Store { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========================================================================
    // SCHEMA
    // ========================================================================

    /// Run the schema script from disk. A missing file is fatal.
    pub fn execute_script(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            error!("Schema file not found: {}", path.display());
            return Err(EtlError::SchemaNotFound(path.to_path_buf()));
        }

        let script = fs::read_to_string(path)?;
        self.execute_script_str(&script).map_err(|e| {
            error!("Error executing script {}: {}", path.display(), e);
            e
        })?;

        info!("Successfully executed script: {}", path.display());
        Ok(())
    }

    pub fn execute_script_str(&mut self, script: &str) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(script)?;
        tx.commit()?;
        Ok(())
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Insert all rows into `table` inside one transaction.
    ///
    /// Rows may carry different column sets (absent fields are already
    /// stripped), so each row gets a statement for its own columns; the
    /// statement cache makes repeated shapes cheap.
    pub fn insert_batch(&mut self, table: &str, rows: &[Row], progress_every: usize) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        for row in rows {
            let sql = insert_sql(table, row);
            let values = row.values().map(json_to_sql);

            let result = {
                let mut stmt = tx.prepare_cached(&sql)?;
                stmt.execute(params_from_iter(values))
            };

            if let Err(e) = result {
                error!("Error inserting batch into {}: {}", table, e);
                // dropping `tx` rolls the whole batch back
                return Err(e.into());
            }

            inserted += 1;
            if progress_every > 0 && inserted % progress_every == 0 {
                debug!("{}: {}/{} rows staged", table, inserted, rows.len());
            }
        }

        tx.commit()?;
        info!("Inserted {} records into {}", inserted, table);
        Ok(inserted)
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn table_count(&self, table: &str) -> Result<i64> {
        self.count(&format!("SELECT COUNT(*) FROM \"{}\"", table), [])
    }

    /// Run a `SELECT COUNT(*) ...` style query
    pub fn count<P: Params>(&self, sql: &str, params: P) -> Result<i64> {
        let count: i64 = self.conn.query_row(sql, params, |row| row.get(0))?;
        Ok(count)
    }
}

fn insert_sql(table: &str, row: &Row) -> String {
    let columns: Vec<String> = row.keys().map(|c| format!("\"{}\"", c)).collect();
    let placeholders: Vec<String> = (1..=row.len()).map(|i| format!("?{}", i)).collect();

    format!(
        "INSERT INTO \"{}\" ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// JSON scalar → SQLite value. Booleans become 0/1; nested values are
/// stored as JSON text.
pub fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

#[cfg(test)]
pub(crate) const TEST_SCHEMA: &str = include_str!("../sql/schema.sql");

/// In-memory store with the bundled schema applied
#[cfg(test)]
pub(crate) fn test_store() -> Store {
    let mut store = Store::open_in_memory().unwrap();
    store.execute_script_str(TEST_SCHEMA).unwrap();
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("row must be an object"),
        }
    }

    #[test]
    fn test_schema_creates_all_tables() {
        let store = test_store();
        for table in [
            "property_locations",
            "properties",
            "hoa_details",
            "property_valuations",
            "rehab_estimates",
        ] {
            assert_eq!(store.table_count(table).unwrap(), 0, "{} should exist", table);
        }
    }

    #[test]
    fn test_schema_script_is_idempotent() {
        let mut store = test_store();
        store.execute_script_str(TEST_SCHEMA).unwrap();
    }

    #[test]
    fn test_missing_schema_file() {
        let mut store = Store::open_in_memory().unwrap();
        let result = store.execute_script(Path::new("/nonexistent/schema.sql"));
        assert!(matches!(result, Err(EtlError::SchemaNotFound(_))));
    }

    #[test]
    fn test_insert_batch_mixed_columns() {
        let mut store = test_store();
        let rows = vec![
            row(json!({"location_id": "l1", "city": "Springfield", "latitude": 39.78})),
            row(json!({"location_id": "l2"})),
        ];

        let inserted = store.insert_batch("property_locations", &rows, 1000).unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(store.table_count("property_locations").unwrap(), 2);

        let city: Option<String> = store
            .connection()
            .query_row(
                "SELECT city FROM property_locations WHERE location_id = 'l2'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(city, None);
    }

    #[test]
    fn test_failed_batch_rolls_back() {
        let mut store = test_store();
        store
            .insert_batch("property_locations", &[row(json!({"location_id": "l1"}))], 1000)
            .unwrap();

        // Second row violates the foreign key; first row must not survive
        let rows = vec![
            row(json!({"property_id": "p1", "location_id": "l1"})),
            row(json!({"property_id": "p2", "location_id": "missing"})),
        ];
        let result = store.insert_batch("properties", &rows, 1000);

        assert!(result.is_err());
        assert_eq!(store.table_count("properties").unwrap(), 0);
        assert_eq!(store.table_count("property_locations").unwrap(), 1);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut store = test_store();
        assert_eq!(store.insert_batch("properties", &[], 1000).unwrap(), 0);
    }

    #[test]
    fn test_json_to_sql() {
        assert_eq!(json_to_sql(&json!(true)), SqlValue::Integer(1));
        assert_eq!(json_to_sql(&json!(3)), SqlValue::Integer(3));
        assert_eq!(json_to_sql(&json!(2.5)), SqlValue::Real(2.5));
        assert_eq!(json_to_sql(&json!("x")), SqlValue::Text("x".to_string()));
        assert_eq!(json_to_sql(&json!(null)), SqlValue::Null);
    }
}
