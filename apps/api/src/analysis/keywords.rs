//! Keyword overlap extraction — which terms a document shares with a
//! reference text, ranked by frequency in the document.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Default number of keywords surfaced per document.
pub const DEFAULT_TOP_N: usize = 5;

/// Articles, conjunctions, common auxiliaries and pronouns, excluded from
/// both the reference vocabulary and document counts.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "is", "was",
    "are", "been", "be", "have", "has", "had", "do", "does", "did", "will", "would", "could",
    "should", "may", "might", "this", "that", "these", "those", "i", "you", "he", "she", "it",
    "we", "they",
];

fn is_stop_word(word: &str) -> bool {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
        .contains(word)
}

/// Splits text into lowercase tokens: maximal runs of ASCII letters of
/// length ≥ 3. Digits, punctuation and shorter runs are dropped entirely.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_ascii_alphabetic() {
            current.push(ch.to_ascii_lowercase());
        } else if !current.is_empty() {
            if current.len() >= 3 {
                tokens.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if current.len() >= 3 {
        tokens.push(current);
    }

    tokens
}

/// Counts occurrences, preserving first-encountered order so a later stable
/// sort breaks frequency ties in favor of earlier tokens.
fn count_in_order<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<(String, u32)> {
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, u32)> = Vec::new();

    for token in tokens {
        match position.get(token) {
            Some(&i) => counts[i].1 += 1,
            None => {
                position.insert(token.to_string(), counts.len());
                counts.push((token.to_string(), 1));
            }
        }
    }

    counts
}

/// Extracts up to `top_n` keywords from `document`, ranked by how often each
/// appears, considering only terms that also occur in `reference`.
///
/// When the document shares no vocabulary with the reference at all, falls
/// back to the document's own most frequent terms, so any document with
/// words in it still gets keywords.
pub fn extract_keywords(document: &str, reference: &str, top_n: usize) -> Vec<String> {
    let doc_tokens = tokenize(document);

    let reference_vocab: HashSet<String> = tokenize(reference)
        .into_iter()
        .filter(|w| !is_stop_word(w))
        .collect();

    let mut ranked = count_in_order(
        doc_tokens
            .iter()
            .map(String::as_str)
            .filter(|w| reference_vocab.contains(*w) && !is_stop_word(w)),
    );

    if ranked.is_empty() {
        ranked = count_in_order(
            doc_tokens
                .iter()
                .map(String::as_str)
                .filter(|w| !is_stop_word(w)),
        );
    }

    ranked.sort_by(|a, b| b.1.cmp(&a.1)); // stable: ties keep insertion order
    ranked.into_iter().take(top_n).map(|(w, _)| w).collect()
}
