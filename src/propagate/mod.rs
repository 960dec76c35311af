mod error;
pub mod frames;
pub mod path;
mod state;
pub mod tle;

pub use error::PropagationError;
pub use frames::{Geodetic, ScenePosition, EARTH_RADIUS_KM};
pub use path::{sample_path, sample_record_path, PathSettings};
pub use state::{state_at, OrbitalState};
