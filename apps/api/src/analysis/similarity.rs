//! Cosine similarity between embedding vectors.

/// Computes cosine similarity between two vectors: dot product over the
/// product of Euclidean norms.
///
/// Returns 0.0 (not an error) for mismatched lengths, empty vectors, or a
/// zero-norm vector: callers must always get a rankable number. Output is
/// otherwise in [-1, 1]; no further clamping is applied.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        tracing::warn!(
            "Invalid vectors for similarity calculation ({} vs {} dims)",
            a.len(),
            b.len()
        );
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}
