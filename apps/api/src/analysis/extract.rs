//! PDF text extraction boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),
}

/// Turns an uploaded document's raw bytes into normalized plain text.
///
/// A trait seam so pipeline tests can feed plain strings instead of real
/// PDF fixtures.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Production extractor backed by `pdf-extract`.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::Pdf(e.to_string()))?;
        Ok(normalize_whitespace(&text))
    }
}

/// Collapses whitespace runs to single spaces and trims the ends.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_runs() {
        assert_eq!(
            normalize_whitespace("  Rust\n\n engineer\t\t5  years "),
            "Rust engineer 5 years"
        );
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_whitespace("   \n\t "), "");
    }

    #[test]
    fn test_garbage_bytes_fail_with_extract_error() {
        let result = PdfTextExtractor.extract(b"not a pdf at all");
        assert!(matches!(result, Err(ExtractError::Pdf(_))));
    }
}
