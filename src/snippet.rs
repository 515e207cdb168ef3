//! Snippet extraction and context formatting.
//!
//! Accepted chunks longer than the context budget are trimmed to the
//! sentences that carry query keywords, falling back to a character window
//! around the first keyword hit. Structural markers the parser embeds for
//! downstream consumers are stripped before the snippet leaves the engine.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::enhance::EnhancedQuery;

/// Maximum characters per returned context snippet.
pub const MAX_CONTEXT_CHARS: usize = 600;
/// Keep at most this many keyword-bearing sentences.
const MAX_SENTENCES: usize = 4;
/// Fallback window around the first keyword hit.
const WINDOW_BEFORE: usize = 200;
const WINDOW_AFTER: usize = 400;
/// Keywords considered when picking sentences.
const TOP_KEYWORDS: usize = 8;
/// Keywords probed for the fallback window.
const WINDOW_KEYWORDS: usize = 3;

static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

static MARKER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\[HEADER\]\s*",
        r"\[Section:[^\]]*\]\s*",
        r"^\[[A-Z /\-]+\] \[(?:HIGH|MEDIUM|LOW) PRIORITY\]\s*",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Remove structural markers (`[HEADER]`, `[Section: …]`, coverage-flag
/// prefixes) from text bound for the answer service.
pub fn strip_markers(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in MARKER_PATTERNS.iter() {
        out = pattern.replace_all(&out, "").into_owned();
    }
    out.trim().to_string()
}

/// Largest index `<= at` that falls on a char boundary.
fn floor_boundary(text: &str, at: usize) -> usize {
    let mut i = at.min(text.len());
    while i > 0 && !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Truncate to `max` chars at a word boundary, appending an ellipsis.
fn truncate_at_word(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let cut = floor_boundary(text, max);
    let head = &text[..cut];
    let trimmed = match head.rfind(' ') {
        Some(pos) if pos > 0 => &head[..pos],
        _ => head,
    };
    format!("{}...", trimmed.trim_end())
}

/// Trim over-length text to the sentences that carry an intent or top
/// keyword; fall back to a window around the first keyword hit when no
/// sentence qualifies.
pub fn extract_snippet(text: &str, query: &EnhancedQuery) -> String {
    let cleaned = strip_markers(text);
    if cleaned.len() <= MAX_CONTEXT_CHARS {
        return cleaned;
    }

    let lower = cleaned.to_lowercase();
    let top_keywords: Vec<&str> = query
        .keywords
        .iter()
        .take(TOP_KEYWORDS)
        .map(|k| k.as_str())
        .collect();

    // Sentence pass: keep keyword-bearing sentences up to the budget.
    let mut kept: Vec<&str> = Vec::new();
    let mut kept_len = 0usize;
    for sentence in SENTENCE_SPLIT.split(&cleaned) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        let sent_lower = sentence.to_lowercase();
        let has_intent = query.intent_boosts.keys().any(|k| sent_lower.contains(k.as_str()));
        let has_keyword = top_keywords.iter().any(|k| sent_lower.contains(k));
        if has_intent || has_keyword {
            kept.push(sentence);
            kept_len += sentence.len();
            if kept_len >= MAX_CONTEXT_CHARS || kept.len() >= MAX_SENTENCES {
                break;
            }
        }
    }

    if !kept.is_empty() {
        let joined = format!("{}.", kept.join(". "));
        return truncate_at_word(&joined, MAX_CONTEXT_CHARS);
    }

    // Window fallback around the first hit of the strongest keywords.
    for kw in query.keywords.iter().take(WINDOW_KEYWORDS) {
        if let Some(idx) = lower.find(kw.as_str()) {
            let start = floor_boundary(&cleaned, idx.saturating_sub(WINDOW_BEFORE));
            let end = floor_boundary(&cleaned, (idx + WINDOW_AFTER).min(cleaned.len()));
            let prefix = if start > 0 { "..." } else { "" };
            let window = format!("{}{}", prefix, &cleaned[start..end]);
            return truncate_at_word(&window, MAX_CONTEXT_CHARS);
        }
    }

    truncate_at_word(&cleaned, MAX_CONTEXT_CHARS)
}
