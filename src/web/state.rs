use tokio::sync::mpsc;

use crate::app::Control;
use crate::snapshot::SharedScene;
use crate::web::api::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub scene: SharedScene,
    pub controls: mpsc::Sender<Control>,
}

impl AppState {
    /// Queue a control for the frame loop.
    pub async fn send(&self, control: Control) -> Result<(), ApiError> {
        self.controls
            .send(control)
            .await
            .map_err(|_| ApiError::Unavailable("frame_loop_stopped"))
    }
}
