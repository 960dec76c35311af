use thiserror::Error;

use crate::catalog::CategorizedObject;
use crate::categorize::Rgb;
use crate::projector::LabelPlacement;
use crate::propagate::ScenePosition;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("scene rejected object {id}: {reason}")]
    Rejected { id: u32, reason: String },
}

/// The renderer side of the pipeline.
///
/// Every resource is keyed by catalog id. Removing something that does not
/// exist is a no-op.
pub trait SceneSink {
    /// `position` is `None` when the object has no fix yet.
    fn add_satellite(
        &mut self,
        object: &CategorizedObject,
        position: Option<&ScenePosition>,
        color: Rgb,
    ) -> Result<(), SceneError>;

    fn update_satellite(&mut self, id: u32, position: &ScenePosition);

    fn remove_satellite(&mut self, id: u32);

    fn add_orbit_path(
        &mut self,
        id: u32,
        points: &[ScenePosition],
        color: Rgb,
        visible: bool,
    ) -> Result<(), SceneError>;

    fn set_orbit_visible(&mut self, id: u32, visible: bool);

    fn remove_orbit_path(&mut self, id: u32);

    fn create_label(&mut self, id: u32, text: &str) -> Result<(), SceneError>;

    fn place_label(&mut self, id: u32, placement: &LabelPlacement);

    fn remove_label(&mut self, id: u32);
}
