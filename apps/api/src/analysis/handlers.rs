use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::analysis::pipeline::ResumeItem;
use crate::errors::AppError;
use crate::models::session::{AnalysisSession, ScoredResult};
use crate::state::AppState;

/// Upload limits enforced before the pipeline runs. Mirrors the caller
/// contract: 1..=10 PDF files, each at most 5 MiB.
const MAX_RESUMES: usize = 10;
const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub session_id: String,
    pub results: Vec<ScoredResult>,
}

/// POST /api/analyze
///
/// Multipart form: one `jobDescription` text field plus up to ten `resumes`
/// PDF files. Runs the ranking pipeline, persists the session, and returns
/// the ranked results.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut job_description: Option<String> = None;
    let mut resumes: Vec<ResumeItem> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart request: {e}")))?
    {
        // `text()`/`bytes()` consume the field, so copy the metadata out first.
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("jobDescription") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable job description: {e}")))?;
                job_description = Some(text);
            }
            Some("resumes") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "resume.pdf".to_string());
                let content_type = field.content_type().map(str::to_string);
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable upload {filename}: {e}")))?;

                validate_upload(resumes.len(), &filename, content_type.as_deref(), content.len())?;
                resumes.push(ResumeItem { filename, content });
            }
            _ => {} // unknown fields are ignored
        }
    }

    let job_description = job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Job description is required".to_string()))?;

    if resumes.is_empty() {
        return Err(AppError::Validation("No resumes uploaded".to_string()));
    }

    info!("Received analysis request: {} resumes", resumes.len());
    let results = state.pipeline.run(&job_description, resumes).await?;

    let session = AnalysisSession::new(job_description, results);
    state.sessions.create(&session).await?;
    info!("Analysis complete: {}", session.session_id);

    Ok(Json(AnalyzeResponse {
        session_id: session.session_id,
        results: session.results,
    }))
}

/// GET /api/session/:session_id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<AnalysisSession>, AppError> {
    let session = state
        .sessions
        .find_by_id(&session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;
    Ok(Json(session))
}

fn validate_upload(
    already_accepted: usize,
    filename: &str,
    content_type: Option<&str>,
    size: usize,
) -> Result<(), AppError> {
    if already_accepted >= MAX_RESUMES {
        return Err(AppError::Validation(format!(
            "At most {MAX_RESUMES} resumes per request"
        )));
    }
    if content_type != Some("application/pdf") {
        return Err(AppError::Validation(format!(
            "Only PDF files are allowed ({filename})"
        )));
    }
    if size > MAX_FILE_BYTES {
        return Err(AppError::Validation(format!(
            "{filename} exceeds the 5 MB upload limit"
        )));
    }
    Ok(())
}
