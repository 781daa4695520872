use crate::normalize::{clean_numeric, clean_string, generate_id, lookup, RawRecord};
use serde::{Deserialize, Serialize};

const ADDRESS_LINE_1: &[&str] = &["address", "street_address"];
const ZIP_CODE: &[&str] = &["zip_code", "zip"];

/// Street address and coordinates. Always produced, every field optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: String,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub county: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub fn transform_location(record: &RawRecord) -> Location {
    Location {
        location_id: generate_id(),
        address_line_1: clean_string(lookup(record, ADDRESS_LINE_1)),
        address_line_2: clean_string(record.get("address_line_2")),
        city: clean_string(record.get("city")),
        state: clean_string(record.get("state")),
        zip_code: clean_string(lookup(record, ZIP_CODE)),
        county: clean_string(record.get("county")),
        latitude: clean_numeric(record.get("latitude")),
        longitude: clean_numeric(record.get("longitude")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::raw;
    use serde_json::json;

    #[test]
    fn test_transform_location_aliases() {
        let record = raw(json!({
            "street_address": " 42 Elm St ",
            "zip": 62704,
            "city": "Springfield",
            "latitude": "39.78",
            "longitude": -89.65
        }));

        let location = transform_location(&record);

        assert_eq!(location.address_line_1.as_deref(), Some("42 Elm St"));
        assert_eq!(location.zip_code.as_deref(), Some("62704"));
        assert_eq!(location.city.as_deref(), Some("Springfield"));
        assert_eq!(location.latitude, Some(39.78));
        assert_eq!(location.longitude, Some(-89.65));
        assert_eq!(location.state, None);
    }

    #[test]
    fn test_address_preferred_over_street_address() {
        let record = raw(json!({"address": "1 Main St", "street_address": "2 Side St",
                                "zip_code": "11111", "zip": "22222"}));
        let location = transform_location(&record);
        assert_eq!(location.address_line_1.as_deref(), Some("1 Main St"));
        assert_eq!(location.zip_code.as_deref(), Some("11111"));
    }

    #[test]
    fn test_empty_record_still_yields_location() {
        let a = transform_location(&raw(json!({})));
        let b = transform_location(&raw(json!({})));

        assert!(!a.location_id.is_empty());
        assert_ne!(a.location_id, b.location_id);
        assert_eq!(a.address_line_1, None);
        assert_eq!(a.latitude, None);
    }
}
