use std::fmt;

use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::catalog::OrbitalElementRecord;
use crate::propagate::error::PropagationError;
use crate::propagate::frames::{ecef_to_scene, teme_to_ecef_position, ScenePosition};
use crate::propagate::tle::format_tle;

/// SGP4 state prepared from one element set, ready to propagate.
#[derive(Clone)]
pub struct OrbitalState {
    elements: Elements,
    constants: Constants,
}

impl fmt::Debug for OrbitalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrbitalState")
            .field("norad_id", &self.elements.norad_id)
            .field("epoch", &self.elements.datetime)
            .finish()
    }
}

impl OrbitalState {
    pub fn from_record(record: &OrbitalElementRecord) -> Result<Self, PropagationError> {
        let (line1, line2) = format_tle(record)?;
        let elements =
            Elements::from_tle(Some(record.name.clone()), line1.as_bytes(), line2.as_bytes())?;
        let constants = Constants::from_elements(&elements)?;
        Ok(Self {
            elements,
            constants,
        })
    }

    pub fn norad_id(&self) -> u64 {
        self.elements.norad_id
    }

    /// TEME position in kilometres.
    pub fn teme_at(&self, instant: DateTime<Utc>) -> Result<[f64; 3], PropagationError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&instant.naive_utc())
            .map_err(|e| PropagationError::Epoch(e.to_string()))?;

        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| PropagationError::Propagation(e.to_string()))?;

        Ok(prediction.position)
    }

    /// Earth-fixed position in kilometres.
    pub fn ecef_at(&self, instant: DateTime<Utc>) -> Result<[f64; 3], PropagationError> {
        let teme = self.teme_at(instant)?;
        let sidereal =
            sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&instant.naive_utc()));
        Ok(teme_to_ecef_position(teme, sidereal))
    }

    pub fn position_at(&self, instant: DateTime<Utc>) -> Result<ScenePosition, PropagationError> {
        let position = ecef_to_scene(self.ecef_at(instant)?);
        if position.iter().all(|c| c.is_finite()) {
            Ok(position)
        } else {
            Err(PropagationError::NonFinite)
        }
    }
}

/// Scene position of `record` at `instant`, or `None` when the element set
/// cannot be encoded or propagated.
pub fn state_at(record: &OrbitalElementRecord, instant: DateTime<Utc>) -> Option<ScenePosition> {
    match OrbitalState::from_record(record).and_then(|state| state.position_at(instant)) {
        Ok(position) => Some(position),
        Err(e) => {
            log::debug!(
                "Error calculating position for {} ({}): {}",
                record.name,
                record.norad_id,
                e
            );
            None
        }
    }
}
