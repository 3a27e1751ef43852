use serde::Deserialize;
use std::env;

use crate::ocr::{EngineOptions, ModelKey};

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_non_empty(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on request body size, in bytes.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Language code used when a request does not name one.
    pub default_language: String,
    /// Serve unknown language codes with the default language instead of
    /// rejecting them.
    pub fallback_to_default: bool,
    /// Retry model initialization on the next request after a failure.
    /// When false a failed initialization is final for that model.
    pub retry_failed_init: bool,
    /// Initialize the default language model before accepting traffic.
    pub preload: bool,
    /// Recognition timeout in seconds. Zero disables the timeout.
    pub timeout_secs: u64,
    /// Largest accepted width or height of a decoded image, in pixels.
    pub max_image_dimension: u32,
    /// Directory holding the traineddata files. `None` uses the engine default.
    pub data_path: Option<String>,
    pub detection: bool,
    pub recognition: bool,
    pub angle_classification: bool,
    pub use_gpu: bool,
}

impl OcrConfig {
    /// Engine options for one model; everything but the model is shared.
    pub fn engine_options(&self, model: ModelKey) -> EngineOptions {
        EngineOptions {
            model,
            data_path: self.data_path.clone(),
            detection: self.detection,
            recognition: self.recognition,
            angle_classification: self.angle_classification,
            use_gpu: self.use_gpu,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            default_language: "fr".to_string(),
            fallback_to_default: false,
            retry_failed_init: false,
            preload: true,
            timeout_secs: 120,
            max_image_dimension: 10_000,
            data_path: None,
            detection: true,
            recognition: true,
            angle_classification: true,
            use_gpu: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let ocr_defaults = OcrConfig::default();
        Self {
            server: ServerConfig {
                host: env::var("OCR_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PORT", 5000),
                max_upload_bytes: parse_env_or("OCR_MAX_UPLOAD_BYTES", 20 * 1024 * 1024),
            },
            ocr: OcrConfig {
                default_language: env_non_empty("OCR_LANG")
                    .unwrap_or(ocr_defaults.default_language),
                fallback_to_default: parse_env_or(
                    "OCR_LANG_FALLBACK",
                    ocr_defaults.fallback_to_default,
                ),
                retry_failed_init: parse_env_or("OCR_INIT_RETRY", ocr_defaults.retry_failed_init),
                preload: parse_env_or("OCR_PRELOAD", ocr_defaults.preload),
                timeout_secs: parse_env_or("OCR_TIMEOUT", ocr_defaults.timeout_secs),
                max_image_dimension: parse_env_or(
                    "OCR_MAX_IMAGE_DIMENSION",
                    ocr_defaults.max_image_dimension,
                ),
                data_path: env_non_empty("OCR_DATA_PATH"),
                detection: parse_env_or("OCR_DETECTION", ocr_defaults.detection),
                recognition: parse_env_or("OCR_RECOGNITION", ocr_defaults.recognition),
                angle_classification: parse_env_or(
                    "OCR_USE_ANGLE_CLS",
                    ocr_defaults.angle_classification,
                ),
                use_gpu: parse_env_or("OCR_USE_GPU", ocr_defaults.use_gpu),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
