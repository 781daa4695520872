use crate::normalize::{clean_numeric, clean_string, generate_id, is_truthy, lookup, RawRecord};
use serde::{Deserialize, Serialize};

/// Any truthy value in one of these means the property has an HOA
pub const HOA_TRIGGER_FIELDS: [&str; 4] = ["hoa_name", "hoa_fee", "hoa_monthly_fee", "hoa_amenities"];

const MONTHLY_FEE: &[&str] = &["hoa_monthly_fee", "hoa_fee"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoaDetail {
    pub hoa_id: String,
    pub property_id: String,
    pub hoa_name: Option<String>,
    pub monthly_fee: Option<f64>,
    pub annual_fee: Option<f64>,
    pub hoa_contact_info: Option<String>,
    pub amenities: Option<String>,
    pub restrictions: Option<String>,
}

pub fn transform_hoa(record: &RawRecord, property_id: &str) -> Option<HoaDetail> {
    let has_hoa = HOA_TRIGGER_FIELDS
        .iter()
        .any(|field| record.get(*field).map(is_truthy).unwrap_or(false));

    if !has_hoa {
        return None;
    }

    Some(HoaDetail {
        hoa_id: generate_id(),
        property_id: property_id.to_string(),
        hoa_name: clean_string(record.get("hoa_name")),
        monthly_fee: clean_numeric(lookup(record, MONTHLY_FEE)),
        annual_fee: clean_numeric(record.get("hoa_annual_fee")),
        hoa_contact_info: clean_string(record.get("hoa_contact")),
        amenities: clean_string(record.get("hoa_amenities")),
        restrictions: clean_string(record.get("hoa_restrictions")),
    })
}
