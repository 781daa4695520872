// 🔀 Record Transformer
// Fans every raw record out into the five entity groups.
//
// A record is all-or-nothing: its entities are staged locally and only
// appended to the batch once every step succeeded.

use crate::entities::{
    transform_hoa, transform_location, transform_property, transform_rehab_estimates,
    transform_valuations, EntityKind, HoaDetail, Location, Property, RehabEstimate, Valuation,
};
use crate::error::Result;
use crate::normalize::RawRecord;
use serde::Serialize;
use tracing::{debug, error, info};

// ============================================================================
// TRANSFORMED BATCH
// ============================================================================

/// Entities grouped by kind, each group in input order
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransformedBatch {
    pub locations: Vec<Location>,
    pub properties: Vec<Property>,
    pub hoa_details: Vec<HoaDetail>,
    pub valuations: Vec<Valuation>,
    pub rehab_estimates: Vec<RehabEstimate>,
}

impl TransformedBatch {
    pub fn len_of(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Locations => self.locations.len(),
            EntityKind::Properties => self.properties.len(),
            EntityKind::HoaDetails => self.hoa_details.len(),
            EntityKind::Valuations => self.valuations.len(),
            EntityKind::RehabEstimates => self.rehab_estimates.len(),
        }
    }

    /// Rows of one kind as JSON values, ready for null stripping
    pub fn values_of(&self, kind: EntityKind) -> serde_json::Result<Vec<serde_json::Value>> {
        match kind {
            EntityKind::Locations => to_values(&self.locations),
            EntityKind::Properties => to_values(&self.properties),
            EntityKind::HoaDetails => to_values(&self.hoa_details),
            EntityKind::Valuations => to_values(&self.valuations),
            EntityKind::RehabEstimates => to_values(&self.rehab_estimates),
        }
    }

    pub fn is_empty(&self) -> bool {
        EntityKind::LOAD_ORDER.iter().all(|kind| self.len_of(*kind) == 0)
    }

    fn absorb(&mut self, entities: RecordEntities) {
        self.locations.push(entities.location);
        self.properties.push(entities.property);
        self.hoa_details.extend(entities.hoa);
        self.valuations.extend(entities.valuations);
        self.rehab_estimates.extend(entities.rehab_estimates);
    }
}

fn to_values<T: Serialize>(rows: &[T]) -> serde_json::Result<Vec<serde_json::Value>> {
    rows.iter().map(serde_json::to_value).collect()
}

/// Everything one record produced
#[derive(Debug, Clone)]
pub struct RecordEntities {
    pub location: Location,
    pub property: Property,
    pub hoa: Option<HoaDetail>,
    pub valuations: Vec<Valuation>,
    pub rehab_estimates: Vec<RehabEstimate>,
}

#[derive(Debug, Clone, Default)]
pub struct TransformOutcome {
    pub batch: TransformedBatch,
    pub processed: usize,
    pub skipped: usize,
}

// ============================================================================
// TRANSFORM
// ============================================================================

/// Location → property → HOA → valuations → rehab; later steps need the
/// identifiers minted by earlier ones.
pub fn transform_record(record: &RawRecord) -> Result<RecordEntities> {
    let location = transform_location(record);
    let property = transform_property(record, &location.location_id)?;
    let hoa = transform_hoa(record, &property.property_id);
    let valuations = transform_valuations(record, &property.property_id);
    let rehab_estimates = transform_rehab_estimates(record, &property.property_id)?;

    Ok(RecordEntities {
        location,
        property,
        hoa,
        valuations,
        rehab_estimates,
    })
}

/// Transform every record; failures skip the record and are logged
pub fn transform_records(records: &[RawRecord]) -> TransformOutcome {
    info!("Transforming {} records...", records.len());

    let mut outcome = TransformOutcome::default();

    for (index, record) in records.iter().enumerate() {
        match transform_record(record) {
            Ok(entities) => {
                debug!(
                    record = index,
                    property_id = %entities.property.property_id,
                    valuations = entities.valuations.len(),
                    rehab_estimates = entities.rehab_estimates.len(),
                    "Record transformed"
                );
                outcome.batch.absorb(entities);
                outcome.processed += 1;
            }
            Err(e) => {
                error!(record = index, "Error transforming record: {}", e);
                outcome.skipped += 1;
            }
        }
    }

    info!(
        "Data transformation completed: {} processed, {} skipped",
        outcome.processed, outcome.skipped
    );
    outcome
}
