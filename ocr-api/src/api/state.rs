use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::ocr::{EngineFactory, OcrService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ocr: OcrService,
}

impl AppState {
    pub fn new(config: Config, factory: Arc<dyn EngineFactory>) -> Result<Self> {
        let ocr = OcrService::new(&config.ocr, factory)?;

        Ok(Self {
            config: Arc::new(config),
            ocr,
        })
    }
}
