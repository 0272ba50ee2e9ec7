use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ranked resume within an analysis run.
///
/// `score` is always present: 0.0 when extraction or embedding failed for
/// this item, in which case `error` carries the reason. `rank` is 1-based,
/// assigned after the batch is sorted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResult {
    pub filename: String,
    pub score: f32,
    pub keywords: Vec<String>,
    pub text_length: usize,
    pub rank: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One persisted batch-ranking run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSession {
    pub session_id: String,
    pub job_description: String,
    pub results: Vec<ScoredResult>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisSession {
    pub fn new(job_description: String, results: Vec<ScoredResult>) -> Self {
        Self {
            session_id: new_session_id(),
            job_description,
            results,
            created_at: Utc::now(),
        }
    }
}

/// Collision-resistant session identifier.
fn new_session_id() -> String {
    format!("session_{}", Uuid::new_v4())
}
