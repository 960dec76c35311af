mod registry;
mod scene;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use registry::SatelliteRegistry;
pub use scene::{SceneError, SceneSink};
pub use types::{LabelResource, RegistryDiagnostics, RegistrySettings, TrackedSatellite};
