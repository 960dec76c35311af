use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::CategorizedObject;
use crate::categorize::Rgb;
use crate::projector::LabelPlacement;
use crate::propagate::ScenePosition;
use crate::registry::scene::{SceneError, SceneSink};

/// Sink that remembers what is currently in the scene.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub satellites: BTreeMap<u32, Option<ScenePosition>>,
    /// Point count and visibility.
    pub paths: BTreeMap<u32, (usize, bool)>,
    pub labels: BTreeMap<u32, Option<LabelPlacement>>,
    pub removed: Vec<u32>,
    pub added: usize,
    pub label_attempts: usize,
    pub reject_satellites: BTreeSet<u32>,
    pub reject_labels: BTreeSet<u32>,
}

impl RecordingSink {
    pub fn rejecting(ids: &[u32]) -> Self {
        Self {
            reject_satellites: ids.iter().copied().collect(),
            ..Self::default()
        }
    }
}

impl SceneSink for RecordingSink {
    fn add_satellite(
        &mut self,
        object: &CategorizedObject,
        position: Option<&ScenePosition>,
        _color: Rgb,
    ) -> Result<(), SceneError> {
        let id = object.norad_id();
        if self.reject_satellites.contains(&id) {
            return Err(SceneError::Rejected {
                id,
                reason: "rejected by test".into(),
            });
        }
        self.added += 1;
        self.satellites.insert(id, position.copied());
        Ok(())
    }

    fn update_satellite(&mut self, id: u32, position: &ScenePosition) {
        self.satellites.insert(id, Some(*position));
    }

    fn remove_satellite(&mut self, id: u32) {
        self.satellites.remove(&id);
        self.removed.push(id);
    }

    fn add_orbit_path(
        &mut self,
        id: u32,
        points: &[ScenePosition],
        _color: Rgb,
        visible: bool,
    ) -> Result<(), SceneError> {
        self.paths.insert(id, (points.len(), visible));
        Ok(())
    }

    fn set_orbit_visible(&mut self, id: u32, visible: bool) {
        if let Some(path) = self.paths.get_mut(&id) {
            path.1 = visible;
        }
    }

    fn remove_orbit_path(&mut self, id: u32) {
        self.paths.remove(&id);
    }

    fn create_label(&mut self, id: u32, _text: &str) -> Result<(), SceneError> {
        self.label_attempts += 1;
        if self.reject_labels.contains(&id) {
            return Err(SceneError::Rejected {
                id,
                reason: "label rejected by test".into(),
            });
        }
        self.labels.insert(id, None);
        Ok(())
    }

    fn place_label(&mut self, id: u32, placement: &LabelPlacement) {
        self.labels.insert(id, Some(*placement));
    }

    fn remove_label(&mut self, id: u32) {
        self.labels.remove(&id);
    }
}
