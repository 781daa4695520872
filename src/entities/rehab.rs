use crate::error::Result;
use crate::normalize::{clean_date, clean_numeric, clean_string, generate_id, optional_int, RawRecord};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Source field → estimate type, in emission order
pub const REHAB_FIELDS: [(&str, &str); 4] = [
    ("rehab_cost", "full_rehab"),
    ("repair_cost", "repair"),
    ("cosmetic_cost", "cosmetic"),
    ("structural_cost", "structural"),
];

const DEFAULT_STATUS: &str = "draft";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RehabEstimate {
    pub estimate_id: String,
    pub property_id: String,
    pub estimate_type: String,
    pub estimated_cost: f64,
    pub estimate_date: NaiveDate,
    pub contractor_name: Option<String>,
    pub work_description: Option<String>,
    pub timeline_weeks: Option<i64>,
    pub materials_cost: Option<f64>,
    pub labor_cost: Option<f64>,
    pub permit_cost: Option<f64>,
    pub contingency_percentage: Option<f64>,
    pub status: String,
}

/// One row per cost field carrying a numeric value.
///
/// Contractor, timeline, cost breakdown and contingency are shared by all
/// rows of the record; the description comes from `{field}_description`.
pub fn transform_rehab_estimates(record: &RawRecord, property_id: &str) -> Result<Vec<RehabEstimate>> {
    let costs: Vec<(&str, &str, f64)> = REHAB_FIELDS
        .iter()
        .filter_map(|(field, estimate_type)| {
            clean_numeric(record.get(*field)).map(|cost| (*field, *estimate_type, cost))
        })
        .collect();

    if costs.is_empty() {
        return Ok(Vec::new());
    }

    let estimate_date =
        clean_date(record.get("estimate_date")).unwrap_or_else(|| Local::now().date_naive());
    let timeline_weeks = optional_int(record, "timeline_weeks", &["timeline_weeks"])?;

    let estimates = costs
        .into_iter()
        .map(|(field, estimate_type, cost)| RehabEstimate {
            estimate_id: generate_id(),
            property_id: property_id.to_string(),
            estimate_type: estimate_type.to_string(),
            estimated_cost: cost,
            estimate_date,
            contractor_name: clean_string(record.get("contractor_name")),
            work_description: clean_string(record.get(&format!("{}_description", field))),
            timeline_weeks,
            materials_cost: clean_numeric(record.get("materials_cost")),
            labor_cost: clean_numeric(record.get("labor_cost")),
            permit_cost: clean_numeric(record.get("permit_cost")),
            contingency_percentage: clean_numeric(record.get("contingency_percentage")),
            status: DEFAULT_STATUS.to_string(),
        })
        .collect();

    Ok(estimates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::raw;
    use serde_json::json;

    #[test]
    fn test_shared_and_per_type_fields() {
        let record = raw(json!({
            "rehab_cost": "45000",
            "rehab_cost_description": "Full gut renovation",
            "cosmetic_cost": 8000,
            "cosmetic_cost_description": "Paint and flooring",
            "contractor_name": "Acme Builders",
            "timeline_weeks": "12",
            "materials_cost": 20000,
            "labor_cost": "22000",
            "permit_cost": 3000,
            "contingency_percentage": 10
        }));

        let estimates = transform_rehab_estimates(&record, "prop-1").unwrap();

        assert_eq!(estimates.len(), 2);
        assert_eq!(estimates[0].estimate_type, "full_rehab");
        assert_eq!(estimates[0].estimated_cost, 45000.0);
        assert_eq!(estimates[0].work_description.as_deref(), Some("Full gut renovation"));
        assert_eq!(estimates[1].estimate_type, "cosmetic");
        assert_eq!(estimates[1].work_description.as_deref(), Some("Paint and flooring"));

        for estimate in &estimates {
            assert_eq!(estimate.property_id, "prop-1");
            assert_eq!(estimate.contractor_name.as_deref(), Some("Acme Builders"));
            assert_eq!(estimate.timeline_weeks, Some(12));
            assert_eq!(estimate.labor_cost, Some(22000.0));
            assert_eq!(estimate.contingency_percentage, Some(10.0));
            assert_eq!(estimate.status, "draft");
        }
    }

    #[test]
    fn test_estimate_date_from_source_or_today() {
        let dated = raw(json!({"repair_cost": 500, "estimate_date": "2024-06-01"}));
        let undated = raw(json!({"repair_cost": 500}));

        assert_eq!(
            transform_rehab_estimates(&dated, "p").unwrap()[0].estimate_date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert_eq!(
            transform_rehab_estimates(&undated, "p").unwrap()[0].estimate_date,
            Local::now().date_naive()
        );
    }

    #[test]
    fn test_no_cost_fields() {
        let record = raw(json!({"contractor_name": "Acme"}));
        assert!(transform_rehab_estimates(&record, "p").unwrap().is_empty());
    }

    #[test]
    fn test_bad_timeline_fails_record() {
        let record = raw(json!({"repair_cost": 500, "timeline_weeks": "soon"}));
        assert!(transform_rehab_estimates(&record, "p").is_err());
    }

    #[test]
    fn test_bad_timeline_ignored_without_costs() {
        let record = raw(json!({"timeline_weeks": "soon"}));
        assert!(transform_rehab_estimates(&record, "p").unwrap().is_empty());
    }
}
