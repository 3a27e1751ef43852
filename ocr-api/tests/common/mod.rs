#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use ocr_api::api::{create_router, AppState};
use ocr_api::config::{Config, OcrConfig, ServerConfig};
use ocr_api::ocr::{
    CanonicalImage, ConfidenceScale, EngineFactory, EngineOptions, Quad, RawLine,
    RecognitionEngine,
};

pub const BOUNDARY: &str = "ocr-api-test-boundary";

/// Engine that "reads" a fixed set of lines from any image.
pub struct StubEngine {
    lines: Vec<RawLine>,
    fail_with: Option<String>,
    delay: Duration,
}

impl RecognitionEngine for StubEngine {
    fn confidence_scale(&self) -> ConfidenceScale {
        ConfidenceScale::Unit
    }

    fn recognize(&self, image: &CanonicalImage) -> Result<Vec<RawLine>, String> {
        std::thread::sleep(self.delay);
        if let Some(message) = &self.fail_with {
            return Err(message.clone());
        }
        assert!(image.width() > 0 && image.height() > 0);
        Ok(self.lines.clone())
    }
}

#[derive(Clone, Default)]
pub struct StubFactory {
    pub lines: Vec<RawLine>,
    pub init_error: Option<String>,
    pub recognize_error: Option<String>,
    pub init_delay: Duration,
    pub recognize_delay: Duration,
    pub inits: Arc<AtomicUsize>,
    pub models: Arc<std::sync::Mutex<Vec<String>>>,
}

impl StubFactory {
    pub fn reading(lines: &[(&str, f64)]) -> Self {
        Self {
            lines: lines
                .iter()
                .enumerate()
                .map(|(i, (text, confidence))| RawLine {
                    text: text.to_string(),
                    confidence: *confidence,
                    bbox: Quad::from_rect(10, 10 + 40 * i as i32, 120, 30),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }
}

impl EngineFactory for StubFactory {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn create(&self, options: &EngineOptions) -> Result<Arc<dyn RecognitionEngine>, String> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        self.models
            .lock()
            .unwrap()
            .push(options.model.to_string());
        std::thread::sleep(self.init_delay);

        if let Some(message) = &self.init_error {
            return Err(message.clone());
        }
        Ok(Arc::new(StubEngine {
            lines: self.lines.clone(),
            fail_with: self.recognize_error.clone(),
            delay: self.recognize_delay,
        }))
    }
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_upload_bytes: 5 * 1024 * 1024,
        },
        ocr: OcrConfig {
            preload: false,
            ..OcrConfig::default()
        },
    }
}

pub fn app_with(config: Config, factory: StubFactory) -> axum::Router {
    let state = AppState::new(config, Arc::new(factory)).expect("valid test config");
    create_router(state)
}

/// White PNG with a dark bar where the stub pretends a word is.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for x in 10..(width - 10).max(11) {
        for y in 10..20.min(height) {
            img.put_pixel(x, y, Rgb([0, 0, 0]));
        }
    }
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .expect("encode PNG");
    out
}

pub fn multipart_body(image: Option<&[u8]>, lang: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"upload.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(lang) = lang {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"lang\"\r\n\r\n{lang}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(uri: &str, image: Option<&[u8]>, lang: Option<&str>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(image, lang)))
        .unwrap()
}

pub fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
