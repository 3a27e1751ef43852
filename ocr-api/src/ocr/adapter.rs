use std::sync::Arc;

use tracing::debug;

use super::cache::ModelCache;
use super::decoder::CanonicalImage;
use super::engine::{EngineFactory, LineResult, RecognitionEngine};
use super::language::ModelKey;
use crate::config::OcrConfig;
use crate::error::{OcrError, Result};

/// Routes recognition requests to the per-language engine, creating it on
/// first use, and normalizes what the engine returns.
#[derive(Clone)]
pub struct EngineAdapter {
    factory: Arc<dyn EngineFactory>,
    cache: Arc<ModelCache>,
    config: OcrConfig,
}

impl EngineAdapter {
    pub fn new(
        factory: Arc<dyn EngineFactory>,
        cache: Arc<ModelCache>,
        config: OcrConfig,
    ) -> Self {
        Self {
            factory,
            cache,
            config,
        }
    }

    pub fn engine_name(&self) -> &'static str {
        self.factory.name()
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Initialized engine for `key`, building it if needed.
    pub async fn engine(&self, key: &ModelKey) -> Result<Arc<dyn RecognitionEngine>> {
        let factory = Arc::clone(&self.factory);
        let options = self.config.engine_options(key.clone());
        self.cache
            .get_or_init(key, move || factory.create(&options))
            .await
    }

    pub async fn recognize(
        &self,
        image: CanonicalImage,
        key: &ModelKey,
    ) -> Result<Vec<LineResult>> {
        let engine = self.engine(key).await?;
        let model = key.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<LineResult>> {
            let (width, height) = (image.width(), image.height());
            let raw = engine
                .recognize(&image)
                .map_err(OcrError::RecognitionFailed)?;
            drop(image);

            debug!(model = %model, width, height, lines = raw.len(), "Recognition finished");

            let scale = engine.confidence_scale();
            Ok(raw
                .into_iter()
                .map(|line| LineResult {
                    text: line.text,
                    confidence: scale.to_percent(line.confidence),
                    bbox: line.bbox,
                })
                .collect())
        })
        .await
        .map_err(|e| OcrError::RecognitionFailed(format!("Recognition task panicked: {e}")))?
    }
}
