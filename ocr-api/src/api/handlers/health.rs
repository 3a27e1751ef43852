use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthData {
    pub status: String,
    pub engine: String,
    /// Models initialized so far.
    pub models_loaded: Vec<String>,
}

/// `GET /health`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthData> {
    let adapter = state.ocr.adapter();

    Json(HealthData {
        status: "healthy".to_string(),
        engine: adapter.engine_name().to_string(),
        models_loaded: adapter
            .cache()
            .ready_keys()
            .into_iter()
            .map(|key| key.to_string())
            .collect(),
    })
}
