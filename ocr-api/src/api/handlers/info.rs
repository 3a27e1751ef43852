use axum::Json;
use serde_json::{json, Value};

/// `GET /`
pub async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "OCR API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/ocr": "POST - Submit an image for text extraction",
            "/health": "GET - Check service status",
            "/languages": "GET - List supported languages"
        }
    }))
}
