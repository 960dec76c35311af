//! Serializable picture of the scene, for renderers that poll.
//!
//! [`SnapshotSink`] is the scene the registry draws into. It keeps a working
//! copy and hands a finished frame to [`SharedScene`] on [`SnapshotSink::publish`],
//! so readers never see a half-updated frame.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::{CacheStats, CategorizedObject};
use crate::categorize::{Category, Rgb};
use crate::projector::LabelPlacement;
use crate::propagate::ScenePosition;
use crate::registry::{RegistryDiagnostics, SceneError, SceneSink};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SatelliteView {
    pub norad_id: u32,
    pub name: String,
    pub category: Category,
    pub group: String,
    #[schema(value_type = String, example = "#ff6b6b")]
    pub color: Rgb,
    /// Scene units (Earth radii), Y up. Absent until the first fix.
    pub position: Option<[f64; 3]>,
    pub label: Option<LabelPlacement>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrbitPathView {
    pub norad_id: u32,
    #[schema(value_type = String, example = "#4ecdc4")]
    pub color: Rgb,
    pub visible: bool,
    pub points: Vec<[f64; 3]>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneSnapshot {
    pub frame: u64,
    pub updated_at: Option<DateTime<Utc>>,
    pub visible_labels: usize,
    pub satellites: BTreeMap<u32, SatelliteView>,
    pub orbit_paths: BTreeMap<u32, OrbitPathView>,
    pub diagnostics: RegistryDiagnostics,
    /// Element cache state as of the last refresh.
    pub cache: Option<CacheStats>,
}

/// Last published frame, shared with the HTTP handlers.
#[derive(Debug, Clone, Default)]
pub struct SharedScene(Arc<Mutex<SceneSnapshot>>);

impl SharedScene {
    /// Run `f` against the current frame while holding the lock.
    pub fn read<R>(&self, f: impl FnOnce(&SceneSnapshot) -> R) -> R {
        let guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        self.read(SceneSnapshot::clone)
    }

    fn store(&self, snapshot: SceneSnapshot) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

#[derive(Debug, Default)]
pub struct SnapshotSink {
    working: SceneSnapshot,
    shared: SharedScene,
}

impl SnapshotSink {
    pub fn new(shared: SharedScene) -> Self {
        Self {
            working: SceneSnapshot::default(),
            shared,
        }
    }

    pub fn shared(&self) -> &SharedScene {
        &self.shared
    }

    pub fn working(&self) -> &SceneSnapshot {
        &self.working
    }

    pub fn set_cache_stats(&mut self, stats: CacheStats) {
        self.working.cache = Some(stats);
    }

    /// Finish the current frame and make it visible to readers.
    pub fn publish(
        &mut self,
        diagnostics: RegistryDiagnostics,
        visible_labels: usize,
        now: DateTime<Utc>,
    ) {
        self.working.frame += 1;
        self.working.updated_at = Some(now);
        self.working.visible_labels = visible_labels;
        self.working.diagnostics = diagnostics;
        self.shared.store(self.working.clone());
    }
}

fn to_array(position: &ScenePosition) -> [f64; 3] {
    [position.x, position.y, position.z]
}

impl SceneSink for SnapshotSink {
    fn add_satellite(
        &mut self,
        object: &CategorizedObject,
        position: Option<&ScenePosition>,
        color: Rgb,
    ) -> Result<(), SceneError> {
        let id = object.norad_id();
        self.working.satellites.insert(
            id,
            SatelliteView {
                norad_id: id,
                name: object.name().to_string(),
                category: object.category,
                group: object.group.clone(),
                color,
                position: position.map(to_array),
                label: None,
            },
        );
        Ok(())
    }

    fn update_satellite(&mut self, id: u32, position: &ScenePosition) {
        if let Some(view) = self.working.satellites.get_mut(&id) {
            view.position = Some(to_array(position));
        }
    }

    fn remove_satellite(&mut self, id: u32) {
        self.working.satellites.remove(&id);
    }

    fn add_orbit_path(
        &mut self,
        id: u32,
        points: &[ScenePosition],
        color: Rgb,
        visible: bool,
    ) -> Result<(), SceneError> {
        if points.len() < 2 {
            return Err(SceneError::Rejected {
                id,
                reason: format!("orbit path needs at least 2 points, got {}", points.len()),
            });
        }
        self.working.orbit_paths.insert(
            id,
            OrbitPathView {
                norad_id: id,
                color,
                visible,
                points: points.iter().map(to_array).collect(),
            },
        );
        Ok(())
    }

    fn set_orbit_visible(&mut self, id: u32, visible: bool) {
        if let Some(path) = self.working.orbit_paths.get_mut(&id) {
            path.visible = visible;
        }
    }

    fn remove_orbit_path(&mut self, id: u32) {
        self.working.orbit_paths.remove(&id);
    }

    fn create_label(&mut self, id: u32, _text: &str) -> Result<(), SceneError> {
        match self.working.satellites.get_mut(&id) {
            Some(view) => {
                view.label = Some(LabelPlacement::HIDDEN);
                Ok(())
            }
            None => Err(SceneError::Rejected {
                id,
                reason: "label for unknown satellite".into(),
            }),
        }
    }

    fn place_label(&mut self, id: u32, placement: &LabelPlacement) {
        if let Some(view) = self.working.satellites.get_mut(&id) {
            view.label = Some(*placement);
        }
    }

    fn remove_label(&mut self, id: u32) {
        if let Some(view) = self.working.satellites.get_mut(&id) {
            view.label = None;
        }
    }
}
