// 🏗️ Property ETL Pipeline
// setup → extract → transform → load → validate, strictly sequential.
//
// Setup, extract and load failures abort the run. Transform failures skip
// single records. Validation never fails the run.

use crate::config::Config;
use crate::data_quality::{DataValidator, SummaryReport, ValidationReport};
use crate::db::Store;
use crate::extract::{load_records, FieldConfig};
use crate::loader::{LoadSummary, Loader};
use crate::normalize::{has_required_fields, RawRecord};
use crate::transform::{transform_records, TransformedBatch};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub records_extracted: usize,
    pub records_transformed: usize,
    pub records_skipped: usize,
    pub load: LoadSummary,
    pub validation: Option<ValidationReport>,
}

impl PipelineReport {
    pub fn summary(&self) -> String {
        format!(
            "{} records extracted, {} transformed, {} skipped, {} rows loaded",
            self.records_extracted,
            self.records_transformed,
            self.records_skipped,
            self.load.total()
        )
    }
}

pub struct PropertyEtl {
    config: Config,
    store: Store,
    field_config: Option<FieldConfig>,
}

impl PropertyEtl {
    /// Open the store, read the field configuration and apply the schema
    pub fn setup(config: Config) -> Result<Self> {
        info!("Setting up ETL pipeline...");

        let mut store = Store::connect(&config.database).with_context(|| {
            format!("Failed to open database {}", config.database.path.display())
        })?;

        let field_config = load_field_config(&config);

        info!("Creating database schema...");
        store
            .execute_script(&config.paths.schema_file)
            .context("Failed to create database schema")?;
        info!("Database schema created successfully");

        Ok(PropertyEtl {
            config,
            store,
            field_config,
        })
    }

    /// Use an already-open store, e.g. for validating an existing database
    pub fn with_store(config: Config, store: Store) -> Self {
        PropertyEtl {
            config,
            store,
            field_config: None,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn extract(&self) -> Result<Vec<RawRecord>> {
        info!("Extracting data from JSON file...");

        let records = load_records(&self.config.paths.input_file).with_context(|| {
            format!(
                "Failed to extract records from {}",
                self.config.paths.input_file.display()
            )
        })?;
        info!("Extracted {} records", records.len());

        if let Some(field_config) = &self.field_config {
            report_field_coverage(field_config, &records);
        }

        Ok(records)
    }

    pub fn load(&mut self, batch: &TransformedBatch) -> Result<LoadSummary> {
        Loader::new(&self.config)
            .load(&mut self.store, batch)
            .context("Failed to load data into database")
    }

    pub fn validate(&self) -> ValidationReport {
        DataValidator::new(&self.config).run_validation(&self.store)
    }

    pub fn summary_report(&self) -> SummaryReport {
        DataValidator::new(&self.config).summary_report(&self.store)
    }

    pub fn run(&mut self) -> Result<PipelineReport> {
        info!("Starting ETL pipeline...");

        let records = self.extract()?;
        let outcome = transform_records(&records);
        let load = self.load(&outcome.batch)?;

        let validation = if self.config.etl.validate_data {
            Some(self.validate())
        } else {
            None
        };

        let report = PipelineReport {
            records_extracted: records.len(),
            records_transformed: outcome.processed,
            records_skipped: outcome.skipped,
            load,
            validation,
        };

        info!("ETL pipeline completed successfully: {}", report.summary());
        Ok(report)
    }
}

/// The field configuration is optional; a missing or unreadable file only warns
fn load_field_config(config: &Config) -> Option<FieldConfig> {
    let path = &config.paths.field_config_file;
    if !path.exists() {
        warn!("Field configuration file not found: {}", path.display());
        return None;
    }

    match FieldConfig::from_path(path) {
        Ok(field_config) => Some(field_config),
        Err(e) => {
            warn!("Error reading field config {}: {}", path.display(), e);
            None
        }
    }
}

fn report_field_coverage(field_config: &FieldConfig, records: &[RawRecord]) {
    let unknown = field_config.unknown_fields(records);
    if !unknown.is_empty() {
        debug!(
            "{} source fields not in field configuration: {}",
            unknown.len(),
            unknown.into_iter().collect::<Vec<_>>().join(", ")
        );
    }

    let required = field_config.required_fields();
    if !required.is_empty() {
        let incomplete = records
            .iter()
            .filter(|r| !has_required_fields(r, required))
            .count();
        if incomplete > 0 {
            warn!(
                "{} of {} records lack a configured required field",
                incomplete,
                records.len()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TEST_SCHEMA;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, input: &str) -> Config {
        let input_path = dir.path().join("input.json");
        let schema_path = dir.path().join("schema.sql");
        fs::write(&input_path, input).unwrap();
        fs::write(&schema_path, TEST_SCHEMA).unwrap();

        let mut config = Config::default();
        config.database.path = ":memory:".into();
        config.paths.input_file = input_path;
        config.paths.schema_file = schema_path;
        config.paths.field_config_file = dir.path().join("missing.csv");
        config
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = TempDir::new().unwrap();
        let config = config_in(
            &dir,
            r#"[
                {"address": "1 Main St", "city": "Springfield", "state": "IL",
                 "bedrooms": "3", "bathrooms": "2.5", "type": "Single Family",
                 "market_value": "250000", "hoa_monthly_fee": "150"},
                {"address": "2 Oak Ave", "bedrooms": "lots"}
            ]"#,
        );

        let mut etl = PropertyEtl::setup(config).unwrap();
        let report = etl.run().unwrap();

        println!("Pipeline: {}", report.summary());

        assert_eq!(report.records_extracted, 2);
        assert_eq!(report.records_transformed, 1);
        assert_eq!(report.records_skipped, 1);
        assert_eq!(report.load.total(), 4);

        let validation = report.validation.unwrap();
        assert_eq!(validation.count_for("properties"), Some(1));
        assert_eq!(validation.count_for("Properties without locations"), Some(0));
    }

    #[test]
    fn test_missing_schema_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir, "{}");
        config.paths.schema_file = dir.path().join("nope.sql");

        assert!(PropertyEtl::setup(config).is_err());
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir, "{}");
        config.paths.input_file = dir.path().join("nope.json");

        let mut etl = PropertyEtl::setup(config).unwrap();
        assert!(etl.run().is_err());
    }

    #[test]
    fn test_validation_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir, r#"{"address": "1 Main St"}"#);
        config.etl.validate_data = false;

        let mut etl = PropertyEtl::setup(config).unwrap();
        let report = etl.run().unwrap();

        assert!(report.validation.is_none());
        assert_eq!(report.load.total(), 2);
    }
}
