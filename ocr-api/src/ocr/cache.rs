use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::engine::RecognitionEngine;
use super::language::ModelKey;
use crate::error::{OcrError, Result};

type InitResult = std::result::Result<Arc<dyn RecognitionEngine>, String>;
type EngineSlot = Arc<OnceCell<InitResult>>;

/// Process-wide map from model key to its initialized engine.
///
/// Each key owns a `OnceCell`, so concurrent first users of a key wait on a
/// single initialization while other keys proceed independently. Entries are
/// never evicted.
pub struct ModelCache {
    slots: Mutex<HashMap<ModelKey, EngineSlot>>,
    retry_failed_init: bool,
}

impl ModelCache {
    /// With `retry_failed_init` off, a failed initialization is stored and
    /// returned to every later caller of that key.
    pub fn new(retry_failed_init: bool) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            retry_failed_init,
        }
    }

    fn slot(&self, key: &ModelKey) -> EngineSlot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Returns the engine for `key`, running `init` on the blocking pool if
    /// this is the first use.
    ///
    /// Initialization runs in its own task so that a caller giving up does
    /// not abort it half way and let a second initialization start.
    pub async fn get_or_init<F>(
        &self,
        key: &ModelKey,
        init: F,
    ) -> Result<Arc<dyn RecognitionEngine>>
    where
        F: FnOnce() -> InitResult + Send + 'static,
    {
        let slot = self.slot(key);
        if let Some(ready) = slot.get() {
            return ready.clone().map_err(|e| init_error(key, &e));
        }

        let retry = self.retry_failed_init;
        let task_key = key.clone();
        let outcome = tokio::spawn(async move {
            if retry {
                slot.get_or_try_init(|| async { run_init(&task_key, init).await.map(Ok) })
                    .await
                    .and_then(|ready| ready.clone())
            } else {
                slot.get_or_init(|| run_init(&task_key, init)).await.clone()
            }
        })
        .await
        .map_err(|e| OcrError::RecognitionFailed(format!("Model initialization aborted: {e}")))?;

        outcome.map_err(|e| init_error(key, &e))
    }

    pub fn is_ready(&self, key: &ModelKey) -> bool {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .get(key)
            .and_then(|slot| slot.get())
            .is_some_and(|ready| ready.is_ok())
    }

    /// Keys whose engine initialized successfully, sorted.
    pub fn ready_keys(&self) -> Vec<ModelKey> {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<ModelKey> = slots
            .iter()
            .filter(|(_, slot)| slot.get().is_some_and(|ready| ready.is_ok()))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

async fn run_init<F>(key: &ModelKey, init: F) -> InitResult
where
    F: FnOnce() -> InitResult + Send + 'static,
{
    info!(model = %key, "Initializing recognition model...");
    let started = std::time::Instant::now();

    let result = tokio::task::spawn_blocking(init)
        .await
        .unwrap_or_else(|e| Err(format!("initialization panicked: {e}")));

    match &result {
        Ok(_) => info!(
            model = %key,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Recognition model ready"
        ),
        Err(e) => warn!(model = %key, error = %e, "Recognition model failed to initialize"),
    }
    result
}

fn init_error(key: &ModelKey, message: &str) -> OcrError {
    OcrError::RecognitionFailed(format!("Failed to initialize model '{key}': {message}"))
}
