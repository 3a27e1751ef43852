use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::Json;
use serde::Deserialize;

use crate::api::extractors::{AppJson, AppQuery};
use crate::api::state::AppState;
use crate::error::{OcrError, Result};
use crate::ocr::{ImageInput, OcrRequest, OcrResponse};

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// JSON variant of the `/ocr` body.
#[derive(Debug, Default, Deserialize)]
pub struct OcrJsonBody {
    /// Base64 image, optionally as a `data:` URI.
    pub image: Option<String>,
    pub lang: Option<String>,
}

impl From<OcrJsonBody> for OcrRequest {
    fn from(body: OcrJsonBody) -> Self {
        Self {
            image: body.image.map(ImageInput::Base64),
            lang: body.lang,
        }
    }
}

/// `POST /ocr`
///
/// Accepts `multipart/form-data` (fields `image`, `lang`) or
/// `application/json` (`image` as base64, `lang`). `?lang=` is used when the
/// body does not name a language. Any other body counts as no image.
pub async fn recognize(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<LangQuery>,
    request: Request,
) -> Result<Json<OcrResponse>> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    let mut ocr_request = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|rejection| OcrError::BadRequest(rejection.body_text()))?;
        read_multipart(multipart).await?
    } else if is_json(&content_type) {
        let AppJson(body) = AppJson::<OcrJsonBody>::from_request(request, &state).await?;
        body.into()
    } else {
        OcrRequest::default()
    };

    if ocr_request.lang.as_deref().map_or(true, |lang| lang.trim().is_empty()) {
        ocr_request.lang = query.lang;
    }

    let response = state.ocr.process(ocr_request).await?;
    Ok(Json(response))
}

fn is_json(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    mime == "application/json" || mime.ends_with("+json")
}

async fn read_multipart(mut multipart: Multipart) -> Result<OcrRequest> {
    let mut request = OcrRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" => {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if !bytes.is_empty() {
                    request.image = Some(ImageInput::Upload(bytes.to_vec()));
                }
            }
            "lang" => {
                request.lang = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok(request)
}

fn multipart_error(err: MultipartError) -> OcrError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        OcrError::PayloadTooLarge(err.body_text())
    } else {
        OcrError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}
