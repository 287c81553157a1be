use crate::error::AppError;
use lectio_core::{Config, ReadingPlan, ScriptureIndex, ScriptureStore, SearchLimits};
use std::sync::Arc;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub store: Arc<ScriptureStore>,
    pub readings: Option<ReadingPlan>,
}

impl AppState {
    pub fn new(config: Config, store: ScriptureStore, readings: Option<ReadingPlan>) -> Self {
        Self {
            config,
            store: Arc::new(store),
            readings,
        }
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits::from(&self.config.search)
    }

    /// Loaded index, parsing the corpus on the blocking pool on first use.
    pub async fn scripture(&self) -> Result<Arc<ScriptureIndex>, AppError> {
        if let Some(index) = self.store.loaded() {
            return Ok(index);
        }

        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.index())
            .await
            .map_err(|err| AppError::internal(format!("corpus load task failed: {err}")))
    }

    /// Start loading the corpus without waiting for it.
    pub fn warm(&self) {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            store.index();
        });
    }
}
