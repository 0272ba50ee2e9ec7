#![allow(dead_code)]

//! Session persistence — one record per completed analysis run.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::session::{AnalysisSession, ScoredResult};

/// Key-value persistence for analysis sessions. Sessions are written once
/// and never mutated or deleted.
///
/// Carried in `AppState` as `Arc<dyn SessionStore>`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: &AnalysisSession) -> Result<(), AppError>;
    async fn find_by_id(&self, session_id: &str) -> Result<Option<AnalysisSession>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(FromRow)]
struct SessionRow {
    session_id: String,
    job_description: String,
    results: Json<Vec<ScoredResult>>,
    created_at: DateTime<Utc>,
}

impl From<SessionRow> for AnalysisSession {
    fn from(row: SessionRow) -> Self {
        AnalysisSession {
            session_id: row.session_id,
            job_description: row.job_description,
            results: row.results.0,
            created_at: row.created_at,
        }
    }
}

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the sessions table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS analysis_sessions (
                session_id      TEXT PRIMARY KEY,
                job_description TEXT NOT NULL,
                results         JSONB NOT NULL,
                created_at      TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: &AnalysisSession) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO analysis_sessions (session_id, job_description, results, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.job_description)
        .bind(Json(&session.results))
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<AnalysisSession>, AppError> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT session_id, job_description, results, created_at
             FROM analysis_sessions WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AnalysisSession::from))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory implementation (tests, local runs without Postgres)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, AnalysisSession>>,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: &AnalysisSession) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<AnalysisSession>, AppError> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let store = InMemorySessionStore::default();
        let session = AnalysisSession::new("backend role".to_string(), vec![]);
        let id = session.session_id.clone();

        store.create(&session).await.unwrap();
        let found = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.session_id, id);
        assert_eq!(found.job_description, "backend role");
    }

    #[tokio::test]
    async fn test_in_memory_unknown_id_is_none() {
        let store = InMemorySessionStore::default();
        let found = store.find_by_id("session_nope").await.unwrap();
        assert!(found.is_none());
    }
}
