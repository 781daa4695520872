// ✅ Data Quality Engine - post-load validation
// Read-only checks against the populated store, in four independent groups:
//
//   1. Record counts     (report only)
//   2. Foreign keys      (orphaned child rows)
//   3. Data quality      (missing/impossible values)
//   4. Business rules    (outliers for human review)
//
// Findings are advisory. Nothing here rolls back or rejects loaded data,
// and a check whose query fails is recorded and skipped.

use crate::config::{Config, TableNames};
use crate::db::Store;
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ============================================================================
// FINDINGS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckGroup {
    RecordCounts,
    ForeignKeys,
    DataQuality,
    BusinessRules,
}

impl CheckGroup {
    pub fn name(&self) -> &'static str {
        match self {
            CheckGroup::RecordCounts => "record counts",
            CheckGroup::ForeignKeys => "foreign key relationships",
            CheckGroup::DataQuality => "data quality",
            CheckGroup::BusinessRules => "business rules",
        }
    }

    /// Word used when a check finds rows
    fn noun(&self) -> &'static str {
        match self {
            CheckGroup::RecordCounts => "records",
            CheckGroup::ForeignKeys => "orphaned records",
            CheckGroup::DataQuality => "issues found",
            CheckGroup::BusinessRules => "outliers found",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // The check itself could not run
    Warning,  // Rows need operator review
    Info,     // Count or clean result
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub group: CheckGroup,
    pub name: String,
    /// None when the query failed
    pub count: Option<i64>,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn count_for(&self, name: &str) -> Option<i64> {
        self.findings
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.count)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Warning)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Critical)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} checks: {} warnings, {} failed to run",
            self.findings.len(),
            self.warnings().count(),
            self.failed_checks().count()
        )
    }
}

// ============================================================================
// CHECK DEFINITIONS
// ============================================================================

struct Check {
    name: String,
    sql: String,
}

impl Check {
    fn new(name: impl Into<String>, sql: String) -> Self {
        Check {
            name: name.into(),
            sql,
        }
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

pub struct DataValidator {
    tables: TableNames,
    current_year: i32,
}

impl DataValidator {
    pub fn new(config: &Config) -> Self {
        DataValidator {
            tables: config.tables.clone(),
            current_year: Local::now().year(),
        }
    }

    /// Pin the upper bound of the year-built check
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn run_validation(&self, store: &Store) -> ValidationReport {
        info!("Starting data validation...");

        let mut report = ValidationReport::default();
        for (group, checks) in [
            (CheckGroup::RecordCounts, self.record_count_checks()),
            (CheckGroup::ForeignKeys, self.foreign_key_checks()),
            (CheckGroup::DataQuality, self.data_quality_checks()),
            (CheckGroup::BusinessRules, self.business_rule_checks()),
        ] {
            info!("Validating {}...", group.name());
            for check in checks {
                report.findings.push(run_check(store, group, &check));
            }
        }

        info!("Data validation completed: {}", report.summary());
        report
    }

    fn record_count_checks(&self) -> Vec<Check> {
        self.tables
            .all()
            .iter()
            .map(|table| Check::new(*table, format!("SELECT COUNT(*) FROM {}", table)))
            .collect()
    }

    fn foreign_key_checks(&self) -> Vec<Check> {
        let t = &self.tables;
        let orphans = |child: &str, parent: &str, key: &str| {
            format!(
                "SELECT COUNT(*) FROM {child} c \
                 LEFT JOIN {parent} p ON c.{key} = p.{key} \
                 WHERE p.{key} IS NULL"
            )
        };

        vec![
            Check::new(
                "Properties without locations",
                orphans(&t.properties, &t.locations, "location_id"),
            ),
            Check::new(
                "HOA details without properties",
                orphans(&t.hoa_details, &t.properties, "property_id"),
            ),
            Check::new(
                "Valuations without properties",
                orphans(&t.valuations, &t.properties, "property_id"),
            ),
            Check::new(
                "Rehab estimates without properties",
                orphans(&t.rehab_estimates, &t.properties, "property_id"),
            ),
        ]
    }

    fn data_quality_checks(&self) -> Vec<Check> {
        let t = &self.tables;
        vec![
            Check::new(
                "Properties with missing required fields",
                format!(
                    "SELECT COUNT(*) FROM {} \
                     WHERE property_type IS NULL OR bedrooms IS NULL OR bathrooms IS NULL",
                    t.properties
                ),
            ),
            Check::new(
                "Locations with missing address",
                format!(
                    "SELECT COUNT(*) FROM {} \
                     WHERE address_line_1 IS NULL OR city IS NULL OR state IS NULL",
                    t.locations
                ),
            ),
            Check::new(
                "Valuations with zero or negative amounts",
                format!("SELECT COUNT(*) FROM {} WHERE valuation_amount <= 0", t.valuations),
            ),
            Check::new(
                "Properties with unrealistic year built",
                format!(
                    "SELECT COUNT(*) FROM {} WHERE year_built < 1800 OR year_built > {}",
                    t.properties, self.current_year
                ),
            ),
            Check::new(
                "Properties with negative square footage",
                format!("SELECT COUNT(*) FROM {} WHERE square_footage < 0", t.properties),
            ),
        ]
    }

    fn business_rule_checks(&self) -> Vec<Check> {
        let t = &self.tables;
        vec![
            Check::new(
                "Properties with more than 20 bedrooms",
                format!("SELECT COUNT(*) FROM {} WHERE bedrooms > 20", t.properties),
            ),
            Check::new(
                "Properties with more than 15 bathrooms",
                format!("SELECT COUNT(*) FROM {} WHERE bathrooms > 15", t.properties),
            ),
            Check::new(
                "Properties with square footage > 50000",
                format!("SELECT COUNT(*) FROM {} WHERE square_footage > 50000", t.properties),
            ),
            Check::new(
                "HOA monthly fees > $5000",
                format!("SELECT COUNT(*) FROM {} WHERE monthly_fee > 5000", t.hoa_details),
            ),
            Check::new(
                "Property valuations > $50M",
                format!(
                    "SELECT COUNT(*) FROM {} WHERE valuation_amount > 50000000",
                    t.valuations
                ),
            ),
        ]
    }

    // ========================================================================
    // SUMMARY REPORT
    // ========================================================================

    /// Distribution queries for operator review. Sections whose query
    /// fails are logged and left empty.
    pub fn summary_report(&self, store: &Store) -> SummaryReport {
        info!("Generating summary report...");
        let t = &self.tables;

        let by_type = grouped(
            store,
            "Properties by type",
            &format!(
                "SELECT property_type, COUNT(*) AS count FROM {} \
                 WHERE property_type IS NOT NULL \
                 GROUP BY property_type ORDER BY count DESC, property_type",
                t.properties
            ),
        );

        let by_state = grouped(
            store,
            "Properties by state",
            &format!(
                "SELECT pl.state, COUNT(*) AS count FROM {} p \
                 JOIN {} pl ON p.location_id = pl.location_id \
                 WHERE pl.state IS NOT NULL \
                 GROUP BY pl.state ORDER BY count DESC, pl.state",
                t.properties, t.locations
            ),
        );

        let avg_market_value_by_type = grouped(
            store,
            "Average market value by type",
            &format!(
                "SELECT p.property_type, AVG(pv.valuation_amount) AS avg_value FROM {} p \
                 JOIN {} pv ON p.property_id = pv.property_id \
                 WHERE p.property_type IS NOT NULL AND pv.valuation_type = 'market' \
                 GROUP BY p.property_type ORDER BY avg_value DESC",
                t.properties, t.valuations
            ),
        );

        SummaryReport {
            by_type,
            by_state,
            avg_market_value_by_type,
        }
    }
}

fn run_check(store: &Store, group: CheckGroup, check: &Check) -> Finding {
    match store.count(&check.sql, []) {
        Ok(count) => {
            let (severity, message) = match group {
                CheckGroup::RecordCounts => {
                    (Severity::Info, format!("{}: {} {}", check.name, count, group.noun()))
                }
                _ if count > 0 => (
                    Severity::Warning,
                    format!("{}: {} {}", check.name, count, group.noun()),
                ),
                _ => (Severity::Info, format!("{}: OK", check.name)),
            };

            match severity {
                Severity::Warning => warn!("{}", message),
                _ => info!("{}", message),
            }

            Finding {
                group,
                name: check.name.clone(),
                count: Some(count),
                severity,
                message,
            }
        }
        Err(e) => {
            let message = format!("Error validating {}: {}", check.name, e);
            error!("{}", message);
            Finding {
                group,
                name: check.name.clone(),
                count: None,
                severity: Severity::Critical,
                message,
            }
        }
    }
}

// ============================================================================
// SUMMARY REPORT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryReport {
    pub by_type: Vec<(String, f64)>,
    pub by_state: Vec<(String, f64)>,
    pub avg_market_value_by_type: Vec<(String, f64)>,
}

/// Two-column (label, number) query, logged row by row
fn grouped(store: &Store, title: &str, sql: &str) -> Vec<(String, f64)> {
    let rows = store.connection().prepare(sql).and_then(|mut stmt| {
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?
            .collect::<Result<Vec<_>, _>>();
        rows
    });

    match rows {
        Ok(rows) => {
            info!("{}:", title);
            for (label, value) in &rows {
                info!("  {}: {}", label, value);
            }
            rows
        }
        Err(e) => {
            error!("Error running summary query '{}': {}", title, e);
            Vec::new()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
