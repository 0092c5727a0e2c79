use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::notifications::NotificationService;
use crate::scorecards::store::ScorecardStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generative model used by every evaluation step. Production: `LlmClient`.
    pub llm: Arc<dyn TextGenerator>,
    pub store: Arc<dyn ScorecardStore>,
    pub notifier: Arc<dyn NotificationService>,
    pub config: Config,
}
