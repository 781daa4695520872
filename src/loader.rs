// 🚚 Load Orchestrator
// Pushes the transformed batch into the store in foreign-key order:
// locations → properties → hoa_details → valuations → rehab_estimates.
//
// Absent fields are stripped so the store applies its own column
// defaults. Transient store errors (busy/locked/I/O) get a bounded retry
// with exponential backoff; anything else fails the run immediately.

use crate::config::{Config, EtlConfig, TableNames};
use crate::db::{Row, Store};
use crate::entities::EntityKind;
use crate::error::Result;
use crate::transform::TransformedBatch;
use serde::Serialize;
use serde_json::Value;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

// ============================================================================
// LOAD SUMMARY
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct TableLoad {
    pub kind: EntityKind,
    pub table: String,
    pub inserted: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadSummary {
    /// One entry per table, in load order
    pub tables: Vec<TableLoad>,
}

impl LoadSummary {
    pub fn inserted(&self, kind: EntityKind) -> usize {
        self.tables
            .iter()
            .find(|t| t.kind == kind)
            .map(|t| t.inserted)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.tables.iter().map(|t| t.inserted).sum()
    }
}

// ============================================================================
// LOADER
// ============================================================================

pub struct Loader {
    etl: EtlConfig,
    tables: TableNames,
}

impl Loader {
    pub fn new(config: &Config) -> Self {
        Loader {
            etl: config.etl.clone(),
            tables: config.tables.clone(),
        }
    }

    pub fn load(&self, store: &mut Store, batch: &TransformedBatch) -> Result<LoadSummary> {
        info!("Loading data into database...");

        let mut summary = LoadSummary::default();

        for kind in EntityKind::LOAD_ORDER {
            let table = kind.table(&self.tables);
            let rows = strip_absent(batch.values_of(kind)?);

            let inserted = if rows.is_empty() {
                info!("No data to load for {}", table);
                0
            } else {
                let inserted = self.insert_with_retry(store, table, &rows)?;
                info!("Loaded {} records into {}", inserted, table);
                inserted
            };

            summary.tables.push(TableLoad {
                kind,
                table: table.to_string(),
                inserted,
            });
        }

        Ok(summary)
    }

    fn insert_with_retry(&self, store: &mut Store, table: &str, rows: &[Row]) -> Result<usize> {
        let attempts = self.etl.max_retries.max(1);
        let mut attempt = 1;

        loop {
            match store.insert_batch(table, rows, self.etl.batch_size) {
                Ok(inserted) => return Ok(inserted),
                Err(e) if e.is_transient() && attempt < attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        "Transient error loading {} (attempt {}/{}): {}. Retrying in {:?}",
                        table, attempt, attempts, e, delay
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => {
                    error!("Failed to load {} after {} attempt(s): {}", table, attempt, e);
                    return Err(e);
                }
            }
        }
    }

    /// retry_delay, 2×retry_delay, 4×retry_delay, ...
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_secs(self.etl.retry_delay_secs.saturating_mul(factor))
    }
}

/// Drop null fields, then drop rows left with nothing
pub fn strip_absent(values: Vec<Value>) -> Vec<Row> {
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(mut map) => {
                map.retain(|_, v| !v.is_null());
                if map.is_empty() {
                    None
                } else {
                    Some(map)
                }
            }
            _ => None,
        })
        .collect()
}
