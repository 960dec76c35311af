use serde_json::Value;

use crate::catalog::error::CatalogError;
use crate::catalog::types::{OrbitalElementRecord, RawOmm};

/// Parse a catalog payload (a JSON array of OMM objects).
///
/// Records that fail validation are skipped so one bad entry cannot empty a
/// whole group.
pub fn parse_payload(payload: &str) -> Result<Vec<OrbitalElementRecord>, CatalogError> {
    let items = match serde_json::from_str::<Value>(payload)? {
        Value::Array(items) => items,
        _ => return Err(CatalogError::NotAnArray),
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let parsed = serde_json::from_value::<RawOmm>(item)
            .map_err(CatalogError::from)
            .and_then(OrbitalElementRecord::try_from);

        match parsed {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping catalog record: {}", e),
        }
    }

    Ok(records)
}
