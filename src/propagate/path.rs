use chrono::{DateTime, Duration, Utc};

use crate::catalog::OrbitalElementRecord;
use crate::propagate::frames::ScenePosition;
use crate::propagate::state::OrbitalState;

/// Sampling of an orbit polyline.
///
/// The step is a fixed heuristic, not derived from the orbital period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSettings {
    pub steps: usize,
    pub step: Duration,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            steps: 100,
            step: Duration::minutes(90),
        }
    }
}

/// Open polyline through the positions at `start + i * step` for
/// `i in 0..=steps`. Steps that fail to propagate are left out.
pub fn sample_path(
    state: &OrbitalState,
    start: DateTime<Utc>,
    settings: &PathSettings,
) -> Vec<ScenePosition> {
    (0..=settings.steps)
        .filter_map(|i| {
            let offset = settings.step.checked_mul(i32::try_from(i).ok()?)?;
            let instant = start.checked_add_signed(offset)?;
            state.position_at(instant).ok()
        })
        .collect()
}

pub fn sample_record_path(
    record: &OrbitalElementRecord,
    start: DateTime<Utc>,
    settings: &PathSettings,
) -> Vec<ScenePosition> {
    match OrbitalState::from_record(record) {
        Ok(state) => sample_path(&state, start, settings),
        Err(e) => {
            log::debug!("Error creating orbit path for {}: {}", record.name, e);
            Vec::new()
        }
    }
}
