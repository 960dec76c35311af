use nalgebra::Vector3;
use serde::Serialize;
use utoipa::ToSchema;

/// Scene scale: one unit is one mean Earth radius.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Position in the renderable frame: Earth-fixed, Earth radii, Y up.
pub type ScenePosition = Vector3<f64>;

/// Rotate a TEME position into the Earth-fixed frame by the Greenwich
/// sidereal angle.
pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

/// ECEF kilometres to scene units. The scene is Y-up, so ECEF z (the polar
/// axis) becomes scene y.
pub fn ecef_to_scene(ecef_km: [f64; 3]) -> ScenePosition {
    Vector3::new(ecef_km[0], ecef_km[2], ecef_km[1]) / EARTH_RADIUS_KM
}

pub fn scene_to_ecef(position: &ScenePosition) -> [f64; 3] {
    [
        position.x * EARTH_RADIUS_KM,
        position.z * EARTH_RADIUS_KM,
        position.y * EARTH_RADIUS_KM,
    ]
}

/// Spherical latitude/longitude/altitude over the mean Earth radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Geodetic {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

pub fn geodetic_from_ecef(ecef_km: [f64; 3]) -> Option<Geodetic> {
    let [x, y, z] = ecef_km;
    let radius = (x * x + y * y + z * z).sqrt();
    if !(radius > 0.0 && radius.is_finite()) {
        return None;
    }
    Some(Geodetic {
        latitude_deg: (z / radius).asin().to_degrees(),
        longitude_deg: y.atan2(x).to_degrees(),
        altitude_km: radius - EARTH_RADIUS_KM,
    })
}
