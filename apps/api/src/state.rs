use std::sync::Arc;

use tokio::sync::Mutex;

use crate::analysis::ResultStore;
use crate::config::Config;
use crate::schedule::ScheduleLog;
use crate::scoring::ResumeScorer;
use crate::summary::NarrativeSummarizer;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Initialization: `main` loads the store from `config.store_path` before serving.
/// Teardown: none; every mutation is already on disk when its request returns.
#[derive(Clone)]
pub struct AppState {
    /// Every read-modify-persist sequence runs under this lock.
    pub store: Arc<Mutex<ResultStore>>,
    pub schedule: Arc<Mutex<ScheduleLog>>,
    pub scorer: Arc<ResumeScorer>,
    /// Pluggable summarizer. `LlmSummarizer` when an API key is configured.
    pub summarizer: Arc<dyn NarrativeSummarizer>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        store: ResultStore,
        scorer: ResumeScorer,
        summarizer: Arc<dyn NarrativeSummarizer>,
        config: Config,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            schedule: Arc::new(Mutex::new(ScheduleLog::new())),
            scorer: Arc::new(scorer),
            summarizer,
            config,
        }
    }
}
