//! Block classification: header detection and coverage tagging.
//!
//! Header detection is an additive weighted-rule scorer over independent
//! visual and textual signals. The weight table is a behavioral contract —
//! downstream tests assert against exact scores, so the weights are named
//! constants and must not drift.
//!
//! Coverage tagging runs a fixed ordered list of (pattern, label, priority)
//! rules against the lowercased text, independently of header status, so
//! the ranking engine can boost or filter by classification without
//! re-scanning text.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Classification, CoverageFlag, DocumentStats};

/// Minimum total score for a block to be a header.
pub const HEADER_SCORE_MIN: i32 = 5;

/// Header signal weights. Hand-tuned in the original system; preserved
/// verbatim for behavioral parity.
pub const W_SIZE_ABOVE_THRESHOLD: i32 = 5;
pub const W_SIZE_ABOVE_MODE: i32 = 3;
pub const W_BOLD_FONT: i32 = 4;
pub const W_ITALIC_SHORT: i32 = 2;
pub const W_OFF_COLOR: i32 = 3;
pub const W_SHORT_TEXT: i32 = 2;
pub const W_MEDIUM_TEXT: i32 = 1;
pub const W_LONG_TEXT: i32 = -2;
pub const W_HEADER_PATTERN: i32 = 2;
pub const W_TITLE_CASE: i32 = 2;
pub const W_ALL_CAPS: i32 = 3;
pub const W_FALSE_POSITIVE: i32 = -5;

/// Domain header patterns, checked in priority order; only the first
/// match contributes.
static HEADER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d+\.",
        r"^\d+\.\d+",
        r"^[A-Z]\.",
        r"(?i)^(chapter|section|part|article|clause)\s+\d+",
        r"(?i)(cover|coverage|benefit|exclusion|definition|procedure)",
        r"(?i)(ambulance|emergency|medical|hospital|maternity)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Patterns that look like headers but never are: organization names,
/// contact lines, regulator ID codes, leading long digit runs.
static FALSE_POSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(company|limited|ltd|inc|corporation)",
        r"(?i)(email|website|phone|address)",
        r"UIN:|CIN:|IRDAI",
        r"^\d{4,}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Visual and textual properties of one block candidate, as seen by the
/// header scorer.
#[derive(Debug, Clone)]
pub struct BlockSignals<'a> {
    pub text: &'a str,
    pub font_size: f32,
    pub font_name: &'a str,
    pub color: u32,
    pub bold: bool,
}

/// Additive header score for one block. Pure: same inputs, same score.
pub fn header_score(signals: &BlockSignals<'_>, stats: &DocumentStats) -> i32 {
    let text = signals.text.trim();
    let mut score = 0;

    if signals.font_size > stats.header_size_threshold {
        score += W_SIZE_ABOVE_THRESHOLD;
    } else if signals.font_size > stats.mode_font_size {
        score += W_SIZE_ABOVE_MODE;
    }

    if signals.color != stats.mode_color {
        score += W_OFF_COLOR;
    }

    let font_lower = signals.font_name.to_lowercase();
    if signals.bold
        || font_lower.contains("bold")
        || font_lower.contains("heavy")
        || font_lower.contains("black")
    {
        score += W_BOLD_FONT;
    } else if font_lower.contains("italic") && text.len() < 100 {
        score += W_ITALIC_SHORT;
    }

    let len = text.len();
    if len < 50 {
        score += W_SHORT_TEXT;
    } else if len < 100 {
        score += W_MEDIUM_TEXT;
    } else if len > 300 {
        score += W_LONG_TEXT;
    }

    if HEADER_PATTERNS.iter().any(|p| p.is_match(text)) {
        score += W_HEADER_PATTERN;
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > 1 {
        let capitalized = words
            .iter()
            .filter(|w| w.len() > 2 && w.chars().next().is_some_and(|c| c.is_uppercase()))
            .count();
        if capitalized as f32 / words.len() as f32 > 0.6 {
            score += W_TITLE_CASE;
        }
    }

    if text.len() > 4 && is_all_caps(text) {
        score += W_ALL_CAPS;
    }

    if FALSE_POSITIVE_PATTERNS.iter().any(|p| p.is_match(text)) {
        score += W_FALSE_POSITIVE;
    }

    score
}

/// A block is a header iff its score reaches [`HEADER_SCORE_MIN`].
/// Text under 3 characters never qualifies.
pub fn is_header(signals: &BlockSignals<'_>, stats: &DocumentStats) -> bool {
    if signals.text.trim().len() < 3 {
        return false;
    }
    header_score(signals, stats) >= HEADER_SCORE_MIN
}

/// Uppercase with at least one letter; digits and punctuation don't count
/// against it.
fn is_all_caps(text: &str) -> bool {
    let mut has_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if c.is_lowercase() {
                return false;
            }
        }
    }
    has_alpha
}

// ============ Coverage tagging ============

struct CoverageRule {
    pattern: Regex,
    label: Classification,
    priority: u8,
}

/// Ordered coverage rule table. Declaration order is the tie-break:
/// when two rules share a priority, the first declared wins the primary
/// classification.
static COVERAGE_RULES: Lazy<Vec<CoverageRule>> = Lazy::new(|| {
    use Classification::*;
    let rules: [(&str, Classification, u8); 16] = [
        // Inclusion group
        (
            r"\b(will cover|covers|covered|coverage includes?|benefits? include|payable|reimbursable)\b",
            Inclusion,
            10,
        ),
        (r"\b(eligible|entitled|applicable|includes?|benefits?)\b", Inclusion, 8),
        (r"\b(shall pay|we pay|payment|compensation)\b", Inclusion, 9),
        (r"\b(provided|subject to)\b", Condition, 7),
        // Exclusion group
        (
            r"\b(will not cover|does not cover|not covered|excludes?|exclusions?)\b",
            Exclusion,
            10,
        ),
        (
            r"\b(not eligible|not entitled|not applicable|not payable|non-payable)\b",
            Exclusion,
            9,
        ),
        (r"\b(shall not pay|we will not pay|no payment|no compensation)\b", Exclusion, 10),
        (r"\b(except|excepting|other than|but not|however|provided that)\b", Exception, 8),
        (r"\b(limitations?|restrictions?|conditions?)\b", Limitation, 7),
        (r"\b(waiting period|deductible|co-?pay|out of pocket)\b", Limitation, 6),
        // Special hazard and process categories
        (r"\b(pre-?existing|pre-?condition)\b", PreExisting, 9),
        (r"\b(suicide|self-?harm|self-?inflicted)\b", SuicideRelated, 10),
        (r"\b(war|terrorism|nuclear|riot)\b", WarRelated, 8),
        (r"\b(maternity|pregnancy|childbirth|delivery)\b", Maternity, 8),
        (r"\b(emergency|ambulance|hospitalization)\b", Emergency, 8),
        (r"\b(claim|claims process|documentation)\b", Claims, 7),
    ];
    rules
        .iter()
        .map(|(p, label, priority)| CoverageRule {
            pattern: Regex::new(p).unwrap(),
            label: *label,
            priority: *priority,
        })
        .collect()
});

/// Result of running the coverage rule table over one block's text.
#[derive(Debug, Clone)]
pub struct CoverageAnalysis {
    pub flags: Vec<CoverageFlag>,
    pub primary_classification: Classification,
    pub max_priority: u8,
}

/// Collect every matching coverage rule as a flag. The primary
/// classification is the label of the highest-priority match; ties go to
/// the first-declared rule. No match means `General` at priority 0.
pub fn analyze_coverage(text: &str) -> CoverageAnalysis {
    let lower = text.to_lowercase();
    let mut flags = Vec::new();
    let mut primary = Classification::General;
    let mut max_priority = 0u8;

    for rule in COVERAGE_RULES.iter() {
        let matched: Vec<String> = rule
            .pattern
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect();
        if !matched.is_empty() {
            if rule.priority > max_priority {
                max_priority = rule.priority;
                primary = rule.label;
            }
            flags.push(CoverageFlag {
                label: rule.label,
                priority: rule.priority,
                matched_terms: matched,
            });
        }
    }

    CoverageAnalysis {
        flags,
        primary_classification: primary,
        max_priority,
    }
}
