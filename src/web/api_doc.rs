use utoipa::OpenApi;

use super::api::control::{DisplayRequest, QueuedResponse, ViewportRequest};
use super::api::error::ErrorResponse;
use super::api::satellites::{DiagnosticsResponse, SatelliteDetail};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::satellites::list_satellites,
        super::api::satellites::get_satellite,
        super::api::satellites::get_orbit_path,
        super::api::satellites::diagnostics,
        super::api::satellites::cache_stats,
        super::api::control::refresh,
        super::api::control::display,
        super::api::control::resize,
    ),
    components(
        schemas(
            SatelliteDetail,
            DiagnosticsResponse,
            DisplayRequest,
            ViewportRequest,
            QueuedResponse,
            ErrorResponse,
            crate::snapshot::SatelliteView,
            crate::snapshot::OrbitPathView,
            crate::categorize::Category,
            crate::projector::LabelPlacement,
            crate::propagate::Geodetic,
            crate::registry::RegistryDiagnostics,
            crate::catalog::CacheStats,
            crate::catalog::CacheEntryInfo,
        )
    ),
    info(
        title = "Sat-O-View State API",
        description = "Live satellite positions, orbit paths and label placement",
        version = "0.1.0"
    ),
    tags(
        (name = "satellites", description = "Tracked satellites"),
        (name = "diagnostics", description = "Registry and cache state"),
        (name = "control", description = "Refresh and display toggles")
    )
)]
pub struct ApiDoc;
