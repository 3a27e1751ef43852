use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;

use crate::error::OcrError;

/// `axum::Json` with rejections reported in the service's error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(OcrError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Query` with rejections reported in the service's error
/// shape.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(OcrError))]
pub struct AppQuery<T>(pub T);

impl From<QueryRejection> for OcrError {
    fn from(rejection: QueryRejection) -> Self {
        OcrError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for OcrError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> OcrError {
    match rejection {
        JsonRejection::JsonDataError(err) => OcrError::BadRequest(format!("Invalid JSON: {err}")),
        JsonRejection::JsonSyntaxError(err) => {
            OcrError::BadRequest(format!("JSON syntax error: {err}"))
        }
        JsonRejection::MissingJsonContentType(_) => OcrError::BadRequest(
            "Missing `Content-Type: application/json` header".to_string(),
        ),
        JsonRejection::BytesRejection(err) => {
            if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
                OcrError::PayloadTooLarge(err.body_text())
            } else {
                OcrError::BadRequest(format!("Failed to read request body: {}", err.body_text()))
            }
        }
        _ => OcrError::BadRequest(rejection.body_text()),
    }
}
