// Property ETL - Core Library
// Exposes all modules for use in the CLI and tests

pub mod config;
pub mod error;
pub mod logging;
pub mod normalize;      // Field Normalizer
pub mod entities;       // Record Transformer - per-entity rules
pub mod transform;      // Record Transformer - whole batch
pub mod extract;
pub mod db;
pub mod loader;         // Load Orchestrator
pub mod data_quality;   // Validator
pub mod pipeline;

// Re-export commonly used types
pub use config::{Config, DatabaseConfig, EtlConfig, LoggingConfig, PathsConfig, TableNames};
pub use error::{EtlError, Result};
pub use normalize::{
    clean_bool, clean_date, clean_numeric, clean_string, generate_id, lookup, RawRecord,
};
pub use entities::{
    transform_hoa, transform_location, transform_property, transform_rehab_estimates,
    transform_valuations, EntityKind, HoaDetail, Location, Property, RehabEstimate, Valuation,
};
pub use transform::{transform_record, transform_records, TransformOutcome, TransformedBatch};
pub use extract::{load_records, parse_records, FieldConfig};
pub use db::Store;
pub use loader::{LoadSummary, Loader};
pub use data_quality::{
    CheckGroup, DataValidator, Finding, Severity, SummaryReport, ValidationReport,
};
pub use pipeline::{PipelineReport, PropertyEtl};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
