//! Title keyword extraction

use regex::Regex;
use std::sync::OnceLock;

/// Maximum number of keywords returned per title
pub const MAX_TITLE_KEYWORDS: usize = 10;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "how", "what", "why", "when", "where", "is", "are", "you", "your", "this", "that",
];

/// Extract meaningful lowercase keywords from a video title
///
/// Punctuation is stripped, stop-words and words of two characters or fewer
/// are dropped, duplicates are removed and at most [`MAX_TITLE_KEYWORDS`] are
/// returned in title order.
pub fn extract_title_keywords(title: &str) -> Vec<String> {
    static PUNCTUATION_RE: OnceLock<Regex> = OnceLock::new();

    let re = PUNCTUATION_RE.get_or_init(|| Regex::new(r"[^\w\s]").expect("Invalid regex pattern"));

    let cleaned = re.replace_all(&title.to_lowercase(), " ").to_string();

    let mut keywords: Vec<String> = Vec::new();
    for word in cleaned.split_whitespace() {
        if word.chars().count() <= 2 || STOP_WORDS.contains(&word) {
            continue;
        }
        if keywords.iter().any(|k| k == word) {
            continue;
        }
        keywords.push(word.to_string());
        if keywords.len() == MAX_TITLE_KEYWORDS {
            break;
        }
    }
    keywords
}
