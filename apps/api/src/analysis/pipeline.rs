//! Ranking pipeline — drives text extraction, embedding, similarity scoring
//! and keyword overlap for one batch of resumes against a job description.
//!
//! Resumes are processed strictly one at a time, in submission order, with
//! the pacer inserted between consecutive embedding calls. A failure on one
//! resume never aborts the batch; a failure on the job description always
//! does, since nothing can be scored without its embedding.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::analysis::extract::TextExtractor;
use crate::analysis::keywords::{extract_keywords, DEFAULT_TOP_N};
use crate::analysis::pacer::Pacer;
use crate::analysis::similarity::cosine_similarity;
use crate::embedding::{Embedder, EmbeddingError};
use crate::models::session::ScoredResult;

/// One uploaded resume: original filename plus raw file bytes.
#[derive(Debug, Clone)]
pub struct ResumeItem {
    pub filename: String,
    pub content: Bytes,
}

pub struct RankingPipeline {
    embedder: Arc<dyn Embedder>,
    extractor: Arc<dyn TextExtractor>,
    pacer: Arc<dyn Pacer>,
}

impl RankingPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        extractor: Arc<dyn TextExtractor>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            embedder,
            extractor,
            pacer,
        }
    }

    /// Runs the full batch and returns results sorted by descending score,
    /// ranks 1..=N. Fails only when the job-description embedding cannot be
    /// obtained; per-resume failures are recorded on the affected result.
    pub async fn run(
        &self,
        job_description: &str,
        resumes: Vec<ResumeItem>,
    ) -> Result<Vec<ScoredResult>, EmbeddingError> {
        info!("Generating job description embedding...");
        let job_embedding = self.embedder.embed(job_description).await?;
        info!(
            "Job embedding generated ({} dimensions)",
            job_embedding.len()
        );

        let total = resumes.len();
        let mut results = Vec::with_capacity(total);

        for (i, resume) in resumes.into_iter().enumerate() {
            info!("Processing resume {}/{}: {}", i + 1, total, resume.filename);
            results.push(
                self.process_resume(&job_embedding, job_description, i, resume)
                    .await,
            );
        }

        // Stable sort: equal scores keep submission order.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        for (i, result) in results.iter_mut().enumerate() {
            result.rank = i + 1;
        }

        Ok(results)
    }

    async fn process_resume(
        &self,
        job_embedding: &[f32],
        job_description: &str,
        index: usize,
        resume: ResumeItem,
    ) -> ScoredResult {
        let filename = resume.filename;

        let text = match self.extractor.extract(&resume.content) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping {filename}: {e}");
                return failed_result(filename, e.to_string());
            }
        };
        debug!("Extracted {} characters from {filename}", text.len());

        // Self-imposed rate limit: every embedding call after the batch's
        // first resume waits out the pacer.
        if index > 0 {
            self.pacer.pause().await;
        }

        let resume_embedding = match self.embedder.embed(&text).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!("Embedding failed for {filename}: {e}");
                return failed_result(filename, e.to_string());
            }
        };

        let score = cosine_similarity(job_embedding, &resume_embedding);
        let keywords = extract_keywords(&text, job_description, DEFAULT_TOP_N);
        info!("{filename} - score {:.1}%", score * 100.0);

        ScoredResult {
            filename,
            score,
            keywords,
            text_length: text.len(),
            rank: 0, // assigned after the batch sort
            error: None,
        }
    }
}

fn failed_result(filename: String, error: String) -> ScoredResult {
    ScoredResult {
        filename,
        score: 0.0,
        keywords: vec![],
        text_length: 0,
        rank: 0,
        error: Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::extract::ExtractError;
    use crate::analysis::pacer::NoDelayPacer;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a canned vector per exact input text; unknown text fails the
    /// way a provider fault would.
    struct MapEmbedder {
        vectors: HashMap<&'static str, Vec<f32>>,
    }

    impl MapEmbedder {
        fn new(entries: &[(&'static str, Vec<f32>)]) -> Self {
            Self {
                vectors: entries.iter().cloned().collect(),
            }
        }
    }

    #[async_trait]
    impl Embedder for MapEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or(EmbeddingError::UnexpectedFormat)
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::Api {
                status: 503,
                message: "model overloaded".to_string(),
            })
        }
    }

    /// Treats uploads as UTF-8 text; invalid bytes behave like a broken PDF.
    struct Utf8Extractor;

    impl TextExtractor for Utf8Extractor {
        fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
            String::from_utf8(bytes.to_vec()).map_err(|e| ExtractError::Pdf(e.to_string()))
        }
    }

    struct CountingPacer(AtomicUsize);

    #[async_trait]
    impl Pacer for CountingPacer {
        async fn pause(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn resume(filename: &str, text: &str) -> ResumeItem {
        ResumeItem {
            filename: filename.to_string(),
            content: Bytes::copy_from_slice(text.as_bytes()),
        }
    }

    fn pipeline(embedder: Arc<dyn Embedder>) -> RankingPipeline {
        RankingPipeline::new(embedder, Arc::new(Utf8Extractor), Arc::new(NoDelayPacer))
    }

    #[tokio::test]
    async fn test_results_sorted_by_score_with_rank_permutation() {
        let embedder = MapEmbedder::new(&[
            ("job text", vec![1.0, 0.0]),
            ("close match", vec![0.9, 0.1]),
            ("far match", vec![0.1, 0.9]),
        ]);
        let pipeline = pipeline(Arc::new(embedder));

        let results = pipeline
            .run(
                "job text",
                vec![resume("far.pdf", "far match"), resume("close.pdf", "close match")],
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].filename, "close.pdf");
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].filename, "far.pdf");
        assert_eq!(results[1].rank, 2);
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_equal_scores_keep_submission_order() {
        let embedder = MapEmbedder::new(&[
            ("job text", vec![1.0, 0.0]),
            ("twin a", vec![0.5, 0.5]),
            ("twin b", vec![0.5, 0.5]),
        ]);
        let pipeline = pipeline(Arc::new(embedder));

        let results = pipeline
            .run(
                "job text",
                vec![resume("first.pdf", "twin a"), resume("second.pdf", "twin b")],
            )
            .await
            .unwrap();

        assert_eq!(results[0].filename, "first.pdf");
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].filename, "second.pdf");
        assert_eq!(results[1].rank, 2);
    }

    #[tokio::test]
    async fn test_extraction_failure_is_isolated_per_item() {
        let embedder = MapEmbedder::new(&[
            ("job text", vec![1.0, 0.0]),
            ("good resume", vec![0.8, 0.2]),
            ("other resume", vec![0.6, 0.4]),
        ]);
        let pipeline = pipeline(Arc::new(embedder));

        let mut resumes = vec![resume("good.pdf", "good resume")];
        resumes.push(ResumeItem {
            filename: "broken.pdf".to_string(),
            content: Bytes::from_static(&[0xff, 0xfe, 0x00]),
        });
        resumes.push(resume("other.pdf", "other resume"));

        let results = pipeline.run("job text", resumes).await.unwrap();

        assert_eq!(results.len(), 3);
        let broken = results.iter().find(|r| r.filename == "broken.pdf").unwrap();
        assert_eq!(broken.score, 0.0);
        assert!(broken.keywords.is_empty());
        assert!(broken.error.is_some());
        assert_eq!(broken.rank, 3, "failed item sorts to the bottom");

        let errored = results.iter().filter(|r| r.error.is_some()).count();
        assert_eq!(errored, 1);

        let mut ranks: Vec<usize> = results.iter().map(|r| r.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_resume_embedding_failure_is_isolated() {
        // "mystery resume" has no canned vector, so its embedding call fails.
        let embedder = MapEmbedder::new(&[
            ("job text", vec![1.0, 0.0]),
            ("known resume", vec![0.9, 0.1]),
        ]);
        let pipeline = pipeline(Arc::new(embedder));

        let results = pipeline
            .run(
                "job text",
                vec![
                    resume("known.pdf", "known resume"),
                    resume("mystery.pdf", "mystery resume"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        let mystery = results.iter().find(|r| r.filename == "mystery.pdf").unwrap();
        assert_eq!(mystery.score, 0.0);
        assert!(mystery.error.is_some());
        assert!(results
            .iter()
            .find(|r| r.filename == "known.pdf")
            .unwrap()
            .error
            .is_none());
    }

    #[tokio::test]
    async fn test_job_embedding_failure_aborts_the_run() {
        let pipeline = pipeline(Arc::new(FailingEmbedder));
        let outcome = pipeline
            .run("job text", vec![resume("a.pdf", "anything")])
            .await;
        assert!(matches!(outcome, Err(EmbeddingError::Api { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_pacer_skipped_for_first_resume_only() {
        let embedder = MapEmbedder::new(&[
            ("job text", vec![1.0, 0.0]),
            ("resume a", vec![0.9, 0.1]),
            ("resume b", vec![0.8, 0.2]),
            ("resume c", vec![0.7, 0.3]),
        ]);
        let pacer = Arc::new(CountingPacer(AtomicUsize::new(0)));
        let pipeline = RankingPipeline::new(
            Arc::new(embedder),
            Arc::new(Utf8Extractor),
            pacer.clone(),
        );

        pipeline
            .run(
                "job text",
                vec![
                    resume("a.pdf", "resume a"),
                    resume("b.pdf", "resume b"),
                    resume("c.pdf", "resume c"),
                ],
            )
            .await
            .unwrap();

        assert_eq!(pacer.0.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_python_aws_example_ranks_and_keywords() {
        let job = "Looking for a Python backend engineer with AWS experience";
        let resume_a = "Python AWS backend services. Python on AWS with backend APIs.";
        let resume_b = "graphic design photoshop illustrator portfolio";

        let embedder = MapEmbedder::new(&[
            (job, vec![1.0, 0.0, 0.0]),
            (resume_a, vec![0.95, 0.05, 0.0]),
            (resume_b, vec![0.0, 0.1, 0.9]),
        ]);
        let pipeline = pipeline(Arc::new(embedder));

        let results = pipeline
            .run(job, vec![resume("a.pdf", resume_a), resume("b.pdf", resume_b)])
            .await
            .unwrap();

        assert_eq!(results[0].filename, "a.pdf");
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[1].filename, "b.pdf");
        assert_eq!(results[1].rank, 2);
        assert!(results[0].score > results[1].score);

        for kw in ["python", "aws", "backend"] {
            assert!(
                results[0].keywords.iter().any(|k| k == kw),
                "missing {kw} in {:?}",
                results[0].keywords
            );
        }
        // No overlap with the job description, so fallback document terms.
        assert!(!results[1].keywords.is_empty());
        assert!(results[1].keywords.iter().any(|k| k == "photoshop"));
    }
}
