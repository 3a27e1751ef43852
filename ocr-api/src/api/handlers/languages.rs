use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct LanguagesData {
    pub default: &'static str,
    pub supported: BTreeMap<&'static str, &'static str>,
}

/// `GET /languages`
pub async fn list_languages(State(state): State<AppState>) -> Json<LanguagesData> {
    let registry = state.ocr.registry();

    Json(LanguagesData {
        default: registry.default_code(),
        supported: registry.supported().collect(),
    })
}
