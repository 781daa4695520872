use crate::error::Result;
use crate::normalize::{
    clean_bool, clean_numeric, clean_string, generate_id, lookup, optional_int, RawRecord,
};
use serde::{Deserialize, Serialize};

const PROPERTY_TYPE: &[&str] = &["property_type", "type"];
const BEDROOMS: &[&str] = &["bedrooms", "beds"];
const BATHROOMS: &[&str] = &["bathrooms", "baths"];
const SQUARE_FOOTAGE: &[&str] = &["square_footage", "sqft"];

/// The building itself, tied to exactly one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub property_id: String,
    pub location_id: String,
    pub property_type: Option<String>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<f64>,
    pub square_footage: Option<i64>,
    pub lot_size: Option<f64>,
    pub year_built: Option<i64>,
    pub garage_spaces: Option<i64>,
    pub pool: bool,
    pub fireplace: bool,
    pub basement: bool,
    pub property_condition: Option<String>,
    pub listing_status: Option<String>,
    pub mls_number: Option<String>,
}

/// Integer columns are only parsed from truthy values, so a source `0`
/// lands as NULL. A truthy non-integer rejects the record.
pub fn transform_property(record: &RawRecord, location_id: &str) -> Result<Property> {
    Ok(Property {
        property_id: generate_id(),
        location_id: location_id.to_string(),
        property_type: clean_string(lookup(record, PROPERTY_TYPE)),
        bedrooms: optional_int(record, "bedrooms", BEDROOMS)?,
        bathrooms: clean_numeric(lookup(record, BATHROOMS)),
        square_footage: optional_int(record, "square_footage", SQUARE_FOOTAGE)?,
        lot_size: clean_numeric(record.get("lot_size")),
        year_built: optional_int(record, "year_built", &["year_built"])?,
        garage_spaces: optional_int(record, "garage_spaces", &["garage_spaces"])?,
        pool: clean_bool(record.get("pool")),
        fireplace: clean_bool(record.get("fireplace")),
        basement: clean_bool(record.get("basement")),
        property_condition: clean_string(record.get("condition")),
        listing_status: clean_string(record.get("status")),
        mls_number: clean_string(record.get("mls_number")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::raw;
    use crate::error::EtlError;
    use serde_json::json;

    #[test]
    fn test_transform_property_basic() {
        let record = raw(json!({
            "type": "Single Family",
            "beds": "3",
            "baths": "2.5",
            "sqft": 1850,
            "year_built": 1994,
            "garage_spaces": 2,
            "pool": true,
            "condition": "Good",
            "status": "Active",
            "mls_number": "MLS-0042"
        }));

        let property = transform_property(&record, "loc-1").unwrap();

        assert_eq!(property.location_id, "loc-1");
        assert_eq!(property.property_type.as_deref(), Some("Single Family"));
        assert_eq!(property.bedrooms, Some(3));
        assert_eq!(property.bathrooms, Some(2.5));
        assert_eq!(property.square_footage, Some(1850));
        assert_eq!(property.year_built, Some(1994));
        assert_eq!(property.garage_spaces, Some(2));
        assert!(property.pool);
        assert!(!property.fireplace);
        assert!(!property.basement);
        assert_eq!(property.property_condition.as_deref(), Some("Good"));
        assert_eq!(property.listing_status.as_deref(), Some("Active"));
    }

    #[test]
    fn test_zero_square_footage_is_absent() {
        let record = raw(json!({"square_footage": 0, "bedrooms": 0, "garage_spaces": "0"}));
        let property = transform_property(&record, "loc-1").unwrap();

        assert_eq!(property.square_footage, None);
        assert_eq!(property.bedrooms, None);
        // "0" is a non-empty string, so it parses
        assert_eq!(property.garage_spaces, Some(0));
    }

    #[test]
    fn test_non_integer_bedrooms_fails() {
        let record = raw(json!({"bedrooms": "three"}));
        let result = transform_property(&record, "loc-1");

        match result {
            Err(EtlError::Transform { field, .. }) => assert_eq!(field, "bedrooms"),
            other => panic!("expected transform error, got {:?}", other),
        }
    }

    #[test]
    fn test_bathrooms_stay_fractional() {
        let record = raw(json!({"bathrooms": 1.5}));
        let property = transform_property(&record, "loc-1").unwrap();
        assert_eq!(property.bathrooms, Some(1.5));
    }
}
