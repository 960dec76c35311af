use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app::Control;
use crate::projector::Viewport;
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct DisplayRequest {
    #[serde(default)]
    pub orbits: Option<bool>,
    #[serde(default)]
    pub labels: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ViewportRequest {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QueuedResponse {
    pub queued: Vec<String>,
}

type Accepted = (StatusCode, Json<QueuedResponse>);

fn accepted(queued: Vec<&str>) -> Accepted {
    (
        StatusCode::ACCEPTED,
        Json(QueuedResponse {
            queued: queued.into_iter().map(String::from).collect(),
        }),
    )
}

#[utoipa::path(
    post,
    path = "/api/refresh",
    responses(
        (status = 202, description = "Refresh queued", body = QueuedResponse),
        (status = 503, description = "Frame loop not running", body = ErrorResponse)
    ),
    tag = "control"
)]
pub async fn refresh(State(state): State<AppState>) -> ApiResult<Accepted> {
    state.send(Control::Refresh).await?;
    Ok(accepted(vec!["refresh"]))
}

#[utoipa::path(
    post,
    path = "/api/display",
    request_body = DisplayRequest,
    responses(
        (status = 202, description = "Visibility change queued", body = QueuedResponse),
        (status = 400, description = "Nothing to change", body = ErrorResponse),
        (status = 503, description = "Frame loop not running", body = ErrorResponse)
    ),
    tag = "control"
)]
pub async fn display(
    State(state): State<AppState>,
    Json(request): Json<DisplayRequest>,
) -> ApiResult<Accepted> {
    if request.orbits.is_none() && request.labels.is_none() {
        return Err(ApiError::Validation(
            "expected at least one of orbits, labels".into(),
        ));
    }

    let mut queued = Vec::new();
    if let Some(orbits) = request.orbits {
        state.send(Control::SetOrbits(orbits)).await?;
        queued.push("orbits");
    }
    if let Some(labels) = request.labels {
        state.send(Control::SetLabels(labels)).await?;
        queued.push("labels");
    }
    Ok(accepted(queued))
}

#[utoipa::path(
    put,
    path = "/api/viewport",
    request_body = ViewportRequest,
    responses(
        (status = 202, description = "Resize queued", body = QueuedResponse),
        (status = 400, description = "Invalid size", body = ErrorResponse),
        (status = 503, description = "Frame loop not running", body = ErrorResponse)
    ),
    tag = "control"
)]
pub async fn resize(
    State(state): State<AppState>,
    Json(request): Json<ViewportRequest>,
) -> ApiResult<Accepted> {
    let viewport = Viewport::new(request.width, request.height);
    if !viewport.is_valid() {
        return Err(ApiError::Validation(format!(
            "invalid viewport size {}x{}",
            request.width, request.height
        )));
    }

    state.send(Control::Resize(viewport)).await?;
    Ok(accepted(vec!["viewport"]))
}
