use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinError;
use tracing::{info, instrument};

use super::adapter::EngineAdapter;
use super::aggregate::{aggregate, OcrResponse};
use super::cache::ModelCache;
use super::decoder::{ImageDecoder, ImageInput};
use super::engine::EngineFactory;
use super::language::LanguageRegistry;
use crate::config::OcrConfig;
use crate::error::{OcrError, Result};

/// One `/ocr` call after the HTTP layer has pulled it apart.
#[derive(Debug, Clone, Default)]
pub struct OcrRequest {
    pub image: Option<ImageInput>,
    pub lang: Option<String>,
}

/// End-to-end OCR pipeline: language lookup, decode, recognition, aggregation.
#[derive(Clone)]
pub struct OcrService {
    registry: LanguageRegistry,
    decoder: ImageDecoder,
    adapter: EngineAdapter,
    timeout: Option<Duration>,
}

impl OcrService {
    pub fn new(config: &OcrConfig, factory: Arc<dyn EngineFactory>) -> Result<Self> {
        let registry =
            LanguageRegistry::new(&config.default_language, config.fallback_to_default)?;
        let cache = Arc::new(ModelCache::new(config.retry_failed_init));

        Ok(Self {
            registry,
            decoder: ImageDecoder::new(config.max_image_dimension),
            adapter: EngineAdapter::new(factory, cache, config.clone()),
            timeout: (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs)),
        })
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn adapter(&self) -> &EngineAdapter {
        &self.adapter
    }

    /// Initializes the default language model ahead of the first request.
    pub async fn preload(&self) -> Result<()> {
        let model = self.registry.default_model();
        info!(
            language = self.registry.default_code(),
            model = %model,
            "Preloading default model..."
        );
        self.adapter.engine(&model).await.map(|_| ())
    }

    #[instrument(skip_all, fields(lang = request.lang.as_deref().unwrap_or("")))]
    pub async fn process(&self, request: OcrRequest) -> Result<OcrResponse> {
        let language = self.registry.resolve(request.lang.as_deref())?;

        let decoder = self.decoder.clone();
        let input = request.image;
        let image = tokio::task::spawn_blocking(move || decoder.decode(input))
            .await
            .map_err(decode_task_error)??;

        let recognition = self.adapter.recognize(image, &language.model);
        let lines = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, recognition).await.map_err(|_| {
                OcrError::RecognitionFailed(format!(
                    "Recognition timed out after {} seconds",
                    limit.as_secs()
                ))
            })??,
            None => recognition.await?,
        };

        let response = aggregate(lines, &language.code);
        info!(
            language = %response.language,
            lines = response.lines_count,
            confidence = response.confidence,
            "OCR request completed"
        );
        Ok(response)
    }
}

/// A decode task that never finished is a server fault, whatever the input.
fn decode_task_error(err: JoinError) -> OcrError {
    OcrError::RecognitionFailed(format!("Image decoding aborted: {err}"))
}
