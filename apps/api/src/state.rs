use std::sync::Arc;

use crate::analysis::pipeline::RankingPipeline;
use crate::store::SessionStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. Nothing here is mutated after startup, so concurrent
/// requests share it freely.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RankingPipeline>,
    pub sessions: Arc<dyn SessionStore>,
}
