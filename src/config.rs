// ⚙️ Pipeline Configuration
// Built once at startup and passed into the store and the loader.
// Every section has defaults, so an absent TOML file means "all defaults".

use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub paths: PathsConfig,
    pub etl: EtlConfig,
    pub tables: TableNames,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file; `:memory:` opens an in-memory store
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: PathBuf::from("data/properties.db"),
            busy_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input_file: PathBuf,
    pub field_config_file: PathBuf,
    pub schema_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            input_file: PathBuf::from("data/fake_property_data.json"),
            field_config_file: PathBuf::from("data/field_config.csv"),
            schema_file: PathBuf::from("sql/schema.sql"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// Rows between progress log lines while inserting a table
    pub batch_size: usize,
    /// Attempts per table batch on transient store errors
    pub max_retries: u32,
    /// Base delay between attempts; doubles each retry
    pub retry_delay_secs: u64,
    pub validate_data: bool,
}

impl Default for EtlConfig {
    fn default() -> Self {
        EtlConfig {
            batch_size: 1000,
            max_retries: 3,
            retry_delay_secs: 1,
            validate_data: true,
        }
    }
}

/// Physical table names for each entity kind
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub locations: String,
    pub properties: String,
    pub hoa_details: String,
    pub valuations: String,
    pub rehab_estimates: String,
}

impl Default for TableNames {
    fn default() -> Self {
        TableNames {
            locations: "property_locations".to_string(),
            properties: "properties".to_string(),
            hoa_details: "hoa_details".to_string(),
            valuations: "property_valuations".to_string(),
            rehab_estimates: "rehab_estimates".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            directory: PathBuf::from("logs"),
            file: "etl.log".to_string(),
        }
    }
}

impl Config {
    /// Parse a TOML config file. Missing sections fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.check()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Config::default()),
        }
    }

    fn check(&self) -> Result<()> {
        if self.etl.batch_size == 0 {
            return Err(EtlError::Config("etl.batch_size must be at least 1".to_string()));
        }
        for name in self.tables.all() {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(EtlError::Config(format!("Invalid table name: '{}'", name)));
            }
        }
        Ok(())
    }
}

impl TableNames {
    /// Table names in load order
    pub fn all(&self) -> [&str; 5] {
        [
            self.locations.as_str(),
            self.properties.as_str(),
            self.hoa_details.as_str(),
            self.valuations.as_str(),
            self.rehab_estimates.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.etl.batch_size, 1000);
        assert_eq!(config.etl.max_retries, 3);
        assert!(config.etl.validate_data);
        assert_eq!(config.tables.locations, "property_locations");
        assert_eq!(config.tables.valuations, "property_valuations");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [database]
            path = "/tmp/test.db"

            [etl]
            max_retries = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/test.db"));
        assert_eq!(config.etl.max_retries, 5);
        assert_eq!(config.etl.batch_size, 1000);
        assert_eq!(config.paths.schema_file, PathBuf::from("sql/schema.sql"));
    }

    #[test]
    fn test_rejects_bad_table_name() {
        let result = Config::from_toml_str(
            r#"
            [tables]
            properties = "properties; DROP TABLE x"
            "#,
        );
        assert!(matches!(result, Err(EtlError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let result = Config::from_toml_str("[etl]\nbatch_size = 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = Config::from_file(Path::new("/nonexistent/etl.toml"));
        assert!(matches!(result, Err(EtlError::Config(_))));
    }
}
