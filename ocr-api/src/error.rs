use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Hint returned alongside [`OcrError::MissingImage`].
pub const IMAGE_USAGE: &str =
    "Send the image as multipart field 'image' or as base64 in a JSON body under 'image'";

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("No image provided")]
    MissingImage,

    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(String),

    #[error("Invalid image: {0}")]
    InvalidImageFormat(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Recognition failed: {0}")]
    RecognitionFailed(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

impl OcrError {
    pub fn status(&self) -> StatusCode {
        match self {
            OcrError::MissingImage
            | OcrError::InvalidBase64(_)
            | OcrError::InvalidImageFormat(_)
            | OcrError::UnsupportedLanguage(_)
            | OcrError::BadRequest(_) => StatusCode::BAD_REQUEST,
            OcrError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            OcrError::RecognitionFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-input errors never change on retry.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

/// Wire shape of every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<&'static str>,
}

impl From<&OcrError> for ErrorBody {
    fn from(err: &OcrError) -> Self {
        Self {
            success: false,
            error: err.to_string(),
            usage: matches!(err, OcrError::MissingImage).then_some(IMAGE_USAGE),
        }
    }
}

impl IntoResponse for OcrError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            tracing::debug!(error = %self, "OCR request rejected");
        } else {
            tracing::error!(error = %self, "OCR request failed");
        }

        (self.status(), Json(ErrorBody::from(&self))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, OcrError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(OcrError::MissingImage.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            OcrError::InvalidBase64("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            OcrError::UnsupportedLanguage("xx".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            OcrError::RecognitionFailed("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert!(!OcrError::RecognitionFailed("boom".into()).is_client_error());
        assert!(OcrError::InvalidImageFormat("x".into()).is_client_error());
    }

    #[tokio::test]
    async fn test_missing_image_body_has_usage() {
        let response = OcrError::MissingImage.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "No image provided");
        assert!(json["usage"].is_string());
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = OcrError::RecognitionFailed("tensor shape".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Recognition failed: tensor shape");
        assert!(json.get("usage").is_none());
        assert!(json.get("text").is_none());
    }
}
