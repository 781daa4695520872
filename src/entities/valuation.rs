use crate::normalize::{clean_numeric, generate_id, RawRecord};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Source field → valuation type, in emission order
pub const VALUATION_FIELDS: [(&str, &str); 5] = [
    ("market_value", "market"),
    ("assessed_value", "assessed"),
    ("arv", "arv"),
    ("list_price", "list"),
    ("sale_price", "sale"),
];

const VALUATION_SOURCE: &str = "Import";
const CONFIDENCE_LEVEL: &str = "Medium";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub valuation_id: String,
    pub property_id: String,
    pub valuation_type: String,
    pub valuation_amount: f64,
    pub valuation_date: NaiveDate,
    pub valuation_source: String,
    pub confidence_level: String,
    pub notes: String,
}

/// One row per valuation field carrying a numeric value. Missing fields
/// produce no row rather than a NULL amount.
pub fn transform_valuations(record: &RawRecord, property_id: &str) -> Vec<Valuation> {
    let captured_on = Local::now().date_naive();

    VALUATION_FIELDS
        .iter()
        .filter_map(|(field, valuation_type)| {
            let amount = clean_numeric(record.get(*field))?;
            Some(Valuation {
                valuation_id: generate_id(),
                property_id: property_id.to_string(),
                valuation_type: valuation_type.to_string(),
                valuation_amount: amount,
                valuation_date: captured_on,
                valuation_source: VALUATION_SOURCE.to_string(),
                confidence_level: CONFIDENCE_LEVEL.to_string(),
                notes: format!("Imported from raw data field: {}", field),
            })
        })
        .collect()
}
