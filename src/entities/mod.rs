// 🏠 Entity Models
// One raw record fans out into five row-shaped entities:
//
//   Location (1) ← Property (1) ← HOA (0..1)
//                               ← Valuation (0..N)
//                               ← RehabEstimate (0..N)
//
// Every identifier is a fresh UUID minted at transform time. Optional
// fields serialize as null and are stripped by the loader before insert.

pub mod location;
pub mod property;
pub mod hoa;
pub mod valuation;
pub mod rehab;

pub use location::{transform_location, Location};
pub use property::{transform_property, Property};
pub use hoa::{transform_hoa, HoaDetail, HOA_TRIGGER_FIELDS};
pub use valuation::{transform_valuations, Valuation, VALUATION_FIELDS};
pub use rehab::{transform_rehab_estimates, RehabEstimate, REHAB_FIELDS};

use crate::config::TableNames;
use serde::{Deserialize, Serialize};

// ============================================================================
// ENTITY KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Locations,
    Properties,
    HoaDetails,
    Valuations,
    RehabEstimates,
}

impl EntityKind {
    /// Parents before children, so foreign keys always resolve
    pub const LOAD_ORDER: [EntityKind; 5] = [
        EntityKind::Locations,
        EntityKind::Properties,
        EntityKind::HoaDetails,
        EntityKind::Valuations,
        EntityKind::RehabEstimates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Locations => "locations",
            EntityKind::Properties => "properties",
            EntityKind::HoaDetails => "hoa_details",
            EntityKind::Valuations => "valuations",
            EntityKind::RehabEstimates => "rehab_estimates",
        }
    }

    /// Physical table for this kind
    pub fn table<'a>(&self, tables: &'a TableNames) -> &'a str {
        match self {
            EntityKind::Locations => tables.locations.as_str(),
            EntityKind::Properties => tables.properties.as_str(),
            EntityKind::HoaDetails => tables.hoa_details.as_str(),
            EntityKind::Valuations => tables.valuations.as_str(),
            EntityKind::RehabEstimates => tables.rehab_estimates.as_str(),
        }
    }
}

#[cfg(test)]
pub(crate) fn raw(value: serde_json::Value) -> crate::normalize::RawRecord {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("test record must be an object, got {}", other),
    }
}
