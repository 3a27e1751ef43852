//! OCR (Optical Character Recognition) Pipeline
//!
//! Turns a submitted image into recognized lines of text with confidence and
//! geometry.
//!
//! # Architecture
//!
//! - `LanguageRegistry` maps user-facing language codes to model keys
//! - `ImageDecoder` turns upload bytes or base64 into a `CanonicalImage`
//! - `EngineAdapter` builds one engine per model key on first use (through an
//!   `EngineFactory`), caches it in a `ModelCache` and normalizes confidences
//! - `aggregate` folds the engine's lines into the `OcrResponse` wire shape
//! - `OcrService` runs the steps above for one request
//!
//! The production engine is Tesseract via leptess (`TesseractFactory`); tests
//! plug in their own `EngineFactory`.
//!
//! # Usage
//!
//! ```rust,ignore
//! let service = OcrService::new(&config.ocr, Arc::new(TesseractFactory))?;
//! let response = service
//!     .process(OcrRequest { image: Some(ImageInput::Upload(bytes)), lang: None })
//!     .await?;
//! ```

mod adapter;
mod aggregate;
mod cache;
mod decoder;
mod engine;
mod language;
mod service;
mod tesseract;

pub use adapter::EngineAdapter;
pub use aggregate::{aggregate, LineDetail, OcrResponse};
pub use cache::ModelCache;
pub use decoder::{decode_base64, CanonicalImage, ImageDecoder, ImageInput};
pub use engine::{
    ConfidenceScale, EngineFactory, EngineOptions, LineResult, Point, Quad, RawLine,
    RecognitionEngine,
};
pub use language::{LanguageEntry, LanguageRegistry, ModelKey, ResolvedLanguage};
pub use service::{OcrRequest, OcrService};
pub use tesseract::{TesseractEngine, TesseractFactory};
