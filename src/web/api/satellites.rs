use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::CacheStats;
use crate::propagate::frames::{geodetic_from_ecef, scene_to_ecef};
use crate::propagate::Geodetic;
use crate::registry::RegistryDiagnostics;
use crate::snapshot::{OrbitPathView, SatelliteView};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SatelliteDetail {
    #[serde(flatten)]
    pub satellite: SatelliteView,
    /// Earth-fixed position in kilometres.
    pub ecef_km: Option<[f64; 3]>,
    /// Spherical latitude, longitude and altitude over the mean radius.
    pub geodetic: Option<Geodetic>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnosticsResponse {
    pub frame: u64,
    pub updated_at: Option<DateTime<Utc>>,
    pub visible_labels: usize,
    pub registry: RegistryDiagnostics,
}

#[utoipa::path(
    get,
    path = "/api/satellites",
    responses(
        (status = 200, description = "Tracked satellites", body = Vec<SatelliteView>)
    ),
    tag = "satellites"
)]
pub async fn list_satellites(State(state): State<AppState>) -> Json<Vec<SatelliteView>> {
    Json(state.scene.read(|s| s.satellites.values().cloned().collect()))
}

#[utoipa::path(
    get,
    path = "/api/satellites/{id}",
    params(("id" = u32, Path, description = "Catalog id")),
    responses(
        (status = 200, description = "Satellite details", body = SatelliteDetail),
        (status = 404, description = "Not tracked", body = ErrorResponse)
    ),
    tag = "satellites"
)]
pub async fn get_satellite(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<Json<SatelliteDetail>> {
    let satellite = state
        .scene
        .read(|s| s.satellites.get(&id).cloned())
        .ok_or(ApiError::NotFound("satellite_not_found"))?;

    let ecef_km = satellite
        .position
        .map(|p| scene_to_ecef(&Vector3::from(p)));
    let geodetic = ecef_km.and_then(geodetic_from_ecef);

    Ok(Json(SatelliteDetail {
        satellite,
        ecef_km,
        geodetic,
    }))
}

#[utoipa::path(
    get,
    path = "/api/satellites/{id}/path",
    params(("id" = u32, Path, description = "Catalog id")),
    responses(
        (status = 200, description = "Orbit polyline", body = OrbitPathView),
        (status = 404, description = "No orbit path for this id", body = ErrorResponse)
    ),
    tag = "satellites"
)]
pub async fn get_orbit_path(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<Json<OrbitPathView>> {
    state
        .scene
        .read(|s| s.orbit_paths.get(&id).cloned())
        .map(Json)
        .ok_or(ApiError::NotFound("orbit_path_not_found"))
}

#[utoipa::path(
    get,
    path = "/api/diagnostics",
    responses(
        (status = 200, description = "Registry diagnostics", body = DiagnosticsResponse)
    ),
    tag = "diagnostics"
)]
pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsResponse> {
    Json(state.scene.read(|s| DiagnosticsResponse {
        frame: s.frame,
        updated_at: s.updated_at,
        visible_labels: s.visible_labels,
        registry: s.diagnostics.clone(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/cache",
    responses(
        (status = 200, description = "Element cache contents", body = CacheStats),
        (status = 503, description = "No refresh has completed yet", body = ErrorResponse)
    ),
    tag = "diagnostics"
)]
pub async fn cache_stats(State(state): State<AppState>) -> ApiResult<Json<CacheStats>> {
    state
        .scene
        .read(|s| s.cache.clone())
        .map(Json)
        .ok_or(ApiError::Unavailable("cache_not_ready"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use tokio::sync::mpsc;

    use super::*;
    use crate::catalog::CategorizedObject;
    use crate::categorize::{color_for, Category};
    use crate::propagate::frames::EARTH_RADIUS_KM;
    use crate::propagate::tle::tests::iss_record;
    use crate::registry::SceneSink;
    use crate::snapshot::{SharedScene, SnapshotSink};
    use approx::assert_relative_eq;

    fn state_with_iss() -> AppState {
        let scene = SharedScene::default();
        let mut sink = SnapshotSink::new(scene.clone());
        let object = CategorizedObject::new(iss_record(), "stations");
        let color = color_for(Category::Stations);
        let position = Vector3::new(0.0, 1.0 + 400.0 / EARTH_RADIUS_KM, 0.0);
        sink.add_satellite(&object, Some(&position), color).unwrap();
        sink.add_orbit_path(25544, &[position, Vector3::x()], color, true)
            .unwrap();
        sink.publish(RegistryDiagnostics::default(), 0, iss_record().epoch);

        let (controls, _rx) = mpsc::channel(1);
        AppState { scene, controls }
    }

    #[tokio::test]
    async fn lists_published_satellites() {
        let Json(list) = list_satellites(State(state_with_iss())).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "ISS (ZARYA)");
    }

    #[tokio::test]
    async fn detail_adds_earth_fixed_coordinates() {
        let Json(detail) = get_satellite(State(state_with_iss()), Path(25544))
            .await
            .unwrap();
        let geodetic = detail.geodetic.unwrap();
        assert_relative_eq!(geodetic.latitude_deg, 90.0);
        assert_relative_eq!(geodetic.altitude_km, 400.0, epsilon = 1e-6);
        assert_relative_eq!(detail.ecef_km.unwrap()[2], EARTH_RADIUS_KM + 400.0, epsilon = 1e-6);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let err = get_satellite(State(state_with_iss()), Path(1)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let err = get_orbit_path(State(state_with_iss()), Path(1)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let Json(path) = get_orbit_path(State(state_with_iss()), Path(25544))
            .await
            .unwrap();
        assert_eq!(path.points.len(), 2);
    }

    #[tokio::test]
    async fn cache_is_unavailable_before_first_refresh() {
        let err = cache_stats(State(state_with_iss())).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn diagnostics_report_frame() {
        let Json(diag) = diagnostics(State(state_with_iss())).await;
        assert_eq!(diag.frame, 1);
    }
}
