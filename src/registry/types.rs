use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::CategorizedObject;
use crate::categorize::Rgb;
use crate::propagate::{OrbitalState, PathSettings, ScenePosition};

#[derive(Debug, Clone, PartialEq)]
pub struct RegistrySettings {
    pub max_satellites: usize,
    pub path: PathSettings,
    pub show_orbits: bool,
    pub show_labels: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            max_satellites: 100,
            path: PathSettings::default(),
            show_orbits: true,
            show_labels: true,
        }
    }
}

/// State of an entry's label on the sink.
///
/// `Failed` stops the registry from asking again every frame; it is reset
/// when labels are switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelResource {
    #[default]
    Absent,
    Present,
    Failed,
}

#[derive(Debug, Clone)]
pub struct TrackedSatellite {
    pub object: CategorizedObject,
    pub color: Rgb,
    /// `None` when the element set could not be turned into an SGP4 state.
    pub state: Option<OrbitalState>,
    /// Last successfully propagated position.
    pub position: Option<ScenePosition>,
    pub orbit_path: Option<Vec<ScenePosition>>,
    pub label: LabelResource,
}

impl TrackedSatellite {
    pub fn norad_id(&self) -> u32 {
        self.object.norad_id()
    }

    pub fn has_fix(&self) -> bool {
        self.position.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct RegistryDiagnostics {
    pub tracked: usize,
    pub categories: BTreeMap<String, usize>,
    pub orbit_paths: usize,
    pub labels: usize,
    pub show_orbits: bool,
    pub show_labels: bool,
    pub creation_errors: u64,
    pub propagation_failures: u64,
    pub without_fix: usize,
    /// Distinct positions after rounding to three decimals.
    pub distinct_positions: usize,
    /// More than one satellite and all of them at the same spot.
    pub stacked: bool,
}
