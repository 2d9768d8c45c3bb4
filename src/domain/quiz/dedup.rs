//! Question deduplication by word overlap.
//!
//! Two questions are compared on their significant words (lowercased,
//! punctuation stripped, stop words and short tokens dropped). Similarity is
//! the shared word count over the larger set, so a short question that is a
//! subset of a long one does not count as a duplicate.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Default similarity at or above which a question is treated as a repeat.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

const MIN_TOKEN_LEN: usize = 3;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "are", "was", "were", "what", "which", "who", "whom", "whose",
        "when", "where", "why", "how", "that", "this", "these", "those", "with", "from",
        "into", "does", "did", "has", "have", "had", "its", "their", "there", "than",
        "then", "them", "they", "you", "your", "not", "but", "can", "could", "would",
        "should", "will", "about", "following", "most", "best", "describes", "true",
        "false", "called", "known", "one", "all", "any",
    ]
    .into_iter()
    .collect()
});

/// Significant words of a question, as a set.
pub fn significant_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_TOKEN_LEN)
        .filter(|w| !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Overlap ratio in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = significant_words(a);
    let b = significant_words(b);
    overlap_ratio(&a, &b)
}

fn overlap_ratio(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let larger = a.len().max(b.len());
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    shared as f64 / larger as f64
}

/// True if `candidate` is at least `threshold` similar to any previous question.
pub fn is_duplicate<S: AsRef<str>>(candidate: &str, previous: &[S], threshold: f64) -> bool {
    let words = significant_words(candidate);
    previous
        .iter()
        .any(|p| overlap_ratio(&words, &significant_words(p.as_ref())) >= threshold)
}

/// Keeps candidates that repeat neither a previous question nor an earlier kept candidate.
///
/// `text_of` projects the question text out of the candidate type.
pub fn filter_unique<T, S, F>(candidates: Vec<T>, previous: &[S], threshold: f64, text_of: F) -> Vec<T>
where
    S: AsRef<str>,
    F: Fn(&T) -> &str,
{
    let mut seen: Vec<HashSet<String>> = previous
        .iter()
        .map(|p| significant_words(p.as_ref()))
        .collect();
    let mut kept = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let words = significant_words(text_of(&candidate));
        if seen.iter().any(|s| overlap_ratio(&words, s) >= threshold) {
            continue;
        }
        seen.push(words);
        kept.push(candidate);
    }

    kept
}
