//! Query enhancement: abbreviation expansion, keyword prioritization, and
//! intent detection.
//!
//! The external tagger hands us an opaque set of lowercase keywords and
//! phrases for a query. This module merges that set with the query's own
//! tokens, expands domain shorthand through a fixed abbreviation table,
//! preserves known multi-word clinical phrases, and derives per-keyword
//! intent boosts from trigger-word groups.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

/// Abbreviations and synonyms expanded into the keyword list. Matched on
/// exact word boundary, case-insensitive.
static EXPANSIONS: Lazy<Vec<(Regex, Vec<&'static str>)>> = Lazy::new(|| {
    let table: [(&str, &[&str]); 17] = [
        ("tdap", &["tetanus", "diphtheria", "pertussis", "whooping cough", "vaccination", "immunization"]),
        ("mi", &["myocardial infarction", "heart attack"]),
        ("heart attack", &["myocardial infarction", "coronary", "acute coronary syndrome"]),
        ("copd", &["chronic obstructive pulmonary disease", "emphysema", "chronic bronchitis"]),
        ("dm", &["diabetes mellitus", "diabetes"]),
        ("diabetes", &["diabetes mellitus", "hyperglycemia", "insulin"]),
        ("htn", &["hypertension", "high blood pressure"]),
        ("hypertension", &["high blood pressure", "elevated blood pressure"]),
        ("chf", &["congestive heart failure", "heart failure"]),
        ("cva", &["cerebrovascular accident", "stroke"]),
        ("stroke", &["cerebrovascular accident", "cerebral infarction"]),
        ("gerd", &["gastroesophageal reflux disease", "acid reflux"]),
        ("uti", &["urinary tract infection", "bladder infection"]),
        ("ckd", &["chronic kidney disease", "renal disease"]),
        ("diarrhea", &["diarrhoea", "gastroenteritis", "loose stool"]),
        ("traveler's diarrhea", &["travelers diarrhea", "travellers diarrhoea", "gastroenteritis"]),
        ("antibiotic", &["antibiotics", "antimicrobial", "antibacterial"]),
    ];
    table
        .iter()
        .map(|(abbrev, terms)| {
            let pattern = format!(r"\b{}\b", regex::escape(abbrev));
            (Regex::new(&pattern).unwrap(), terms.to_vec())
        })
        .collect()
});

/// Two-word clinical phrases kept intact when they appear in a query.
const IMPORTANT_PHRASES: &[&str] = &[
    "clostridium difficile",
    "c. diff",
    "myocardial infarction",
    "heart failure",
    "kidney disease",
    "heart attack",
    "blood pressure",
    "diabetes mellitus",
];

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "what", "are", "the", "is", "of", "in", "for", "and", "or", "to", "a", "an", "how",
        "when", "where", "why", "can", "does", "should", "with", "about", "which", "by",
        "from", "at", "as", "be", "has", "have", "had",
    ]
    .into_iter()
    .collect()
});

/// Trigger words and the keyword boosts they unlock.
struct IntentGroup {
    triggers: &'static [&'static str],
    boosts: &'static [(&'static str, i64)],
}

const INTENT_GROUPS: &[IntentGroup] = &[
    IntentGroup {
        triggers: &["schedule", "timing", "when", "frequency", "recommended"],
        boosts: &[
            ("schedule", 30),
            ("recommended", 30),
            ("vaccination", 25),
            ("immunization", 25),
            ("vaccine", 20),
        ],
    },
    IntentGroup {
        triggers: &["symptom", "signs", "presentation", "clinical"],
        boosts: &[("symptoms", 30), ("clinical", 25), ("presentation", 25)],
    },
    IntentGroup {
        triggers: &["treatment", "therapy", "management", "drug"],
        boosts: &[("treatment", 30), ("therapy", 25), ("management", 25)],
    },
    IntentGroup {
        triggers: &["diagnosis", "diagnostic", "criteria", "test"],
        boosts: &[("diagnosis", 30), ("diagnostic", 25), ("criteria", 25)],
    },
];

/// Maximum search keywords used for corpus scans.
const MAX_SEARCH_KEYWORDS: usize = 5;

/// An enhanced query ready for the ranking engine.
#[derive(Debug, Clone, Default)]
pub struct EnhancedQuery {
    /// All keywords, multi-word phrases first, then longer terms.
    pub keywords: Vec<String>,
    /// The subset used to drive corpus scans (phrases, then original
    /// query words, then expansions).
    pub search_keywords: Vec<String>,
    /// Extra per-keyword weight from detected query intent.
    pub intent_boosts: HashMap<String, i64>,
}

impl EnhancedQuery {
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

fn strip_token(word: &str) -> String {
    word.trim_matches(|c| matches!(c, '?' | ',' | '!' | '.')).to_lowercase()
}

/// Expand and prioritize a query into an [`EnhancedQuery`].
///
/// `tagger_keywords` is the opaque lowercase keyword/phrase set from the
/// external NLP tagger; an empty set is fine — the enhancer still works
/// from the query's own tokens.
pub fn enhance_query(query: &str, tagger_keywords: &[String]) -> EnhancedQuery {
    let query_lower = query.to_lowercase();

    // Abbreviation expansion on exact word boundaries.
    let mut expansions: Vec<String> = Vec::new();
    for (pattern, terms) in EXPANSIONS.iter() {
        if pattern.is_match(&query_lower) {
            expansions.extend(terms.iter().map(|t| t.to_string()));
        }
    }

    // Base tokens from the query itself.
    let mut base_keywords: Vec<String> = Vec::new();
    for word in query.split_whitespace() {
        let cleaned = strip_token(word);
        if cleaned.len() > 2 && !STOPWORDS.contains(cleaned.as_str()) {
            base_keywords.push(cleaned);
        }
    }

    // Preserve known two-word phrases that appear in the query.
    let query_words: Vec<&str> = query_lower.split_whitespace().collect();
    let mut phrases: Vec<String> = Vec::new();
    for pair in query_words.windows(2) {
        let phrase = format!("{} {}", pair[0], pair[1]);
        if IMPORTANT_PHRASES.iter().any(|p| phrase.contains(p)) {
            phrases.push(phrase.replace('.', "").trim().to_string());
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut keywords: Vec<String> = Vec::new();
    for kw in base_keywords
        .iter()
        .chain(expansions.iter())
        .chain(phrases.iter())
        .chain(tagger_keywords.iter())
    {
        let kw = kw.trim().to_lowercase();
        if kw.len() > 2 && seen.insert(kw.clone()) {
            keywords.push(kw);
        }
    }

    // Phrases first, then longer terms; lexicographic tie-break keeps the
    // ordering stable across runs.
    keywords.sort_by(|a, b| {
        let wa = a.split_whitespace().count();
        let wb = b.split_whitespace().count();
        wb.cmp(&wa).then(b.len().cmp(&a.len())).then(a.cmp(b))
    });

    let search_keywords = select_search_keywords(&keywords, &query_lower);
    let intent_boosts = detect_intent(&query_lower);

    EnhancedQuery {
        keywords,
        search_keywords,
        intent_boosts,
    }
}

/// Scan-keyword selection: multi-word phrases from the top keywords carry
/// the most precision, original query words the most recall, expansions
/// fill any remaining room.
fn select_search_keywords(keywords: &[String], query_lower: &str) -> Vec<String> {
    let mut search: Vec<String> = Vec::new();

    for kw in keywords.iter().take(3) {
        if kw.contains(' ') {
            search.push(kw.clone());
        }
    }

    for word in query_lower.split_whitespace() {
        let cleaned = strip_token(word);
        if cleaned.len() > 2
            && !STOPWORDS.contains(cleaned.as_str())
            && !search.contains(&cleaned)
            && search.len() < MAX_SEARCH_KEYWORDS
        {
            search.push(cleaned);
        }
    }

    if search.len() < 3 {
        for kw in keywords {
            if !search.contains(kw) && search.len() < 4 {
                search.push(kw.clone());
            }
        }
    }

    search
}

fn detect_intent(query_lower: &str) -> HashMap<String, i64> {
    let mut boosts = HashMap::new();
    for group in INTENT_GROUPS {
        if group.triggers.iter().any(|t| query_lower.contains(t)) {
            for (kw, boost) in group.boosts {
                boosts.insert(kw.to_string(), *boost);
            }
        }
    }
    boosts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopword_only_query_yields_nothing() {
        let eq = enhance_query("what is the of", &[]);
        assert!(eq.is_empty());
        assert!(eq.search_keywords.is_empty());
    }

    #[test]
    fn test_abbreviation_expands_on_word_boundary() {
        let eq = enhance_query("copd management", &[]);
        assert!(eq.keywords.iter().any(|k| k == "emphysema"));
        assert!(eq
            .keywords
            .iter()
            .any(|k| k == "chronic obstructive pulmonary disease"));
    }

    #[test]
    fn test_abbreviation_not_matched_inside_word() {
        // "scopdx" must not trigger the copd expansion.
        let eq = enhance_query("scopdx finding", &[]);
        assert!(!eq.keywords.iter().any(|k| k == "emphysema"));
    }

    #[test]
    fn test_phrases_sort_first() {
        let eq = enhance_query("heart attack risk", &[]);
        assert!(eq.keywords[0].contains(' '), "got {:?}", eq.keywords);
    }

    #[test]
    fn test_tagger_keywords_merged() {
        let eq = enhance_query("grace period", &["grace period".to_string()]);
        assert!(eq.keywords.iter().any(|k| k == "grace period"));
        assert!(eq.keywords.iter().any(|k| k == "grace"));
        assert!(eq.keywords.iter().any(|k| k == "period"));
    }

    #[test]
    fn test_intent_detection_schedule() {
        let eq = enhance_query("what is the recommended vaccination schedule", &[]);
        assert_eq!(eq.intent_boosts.get("schedule"), Some(&30));
        assert_eq!(eq.intent_boosts.get("vaccine"), Some(&20));
    }

    #[test]
    fn test_no_intent_for_plain_query() {
        let eq = enhance_query("maternity waiting period", &[]);
        assert!(eq.intent_boosts.is_empty());
    }

    #[test]
    fn test_search_keywords_capped() {
        let eq = enhance_query(
            "chronic severe persistent productive nocturnal coughing episodes lasting weeks",
            &[],
        );
        assert!(eq.search_keywords.len() <= MAX_SEARCH_KEYWORDS);
    }

    #[test]
    fn test_search_keywords_include_phrase_and_words() {
        let eq = enhance_query("heart attack symptoms", &["heart attack".to_string()]);
        assert!(eq.search_keywords.iter().any(|k| k == "heart attack"));
        assert!(eq.search_keywords.iter().any(|k| k == "heart"));
    }

    #[test]
    fn test_deterministic_ordering() {
        let a = enhance_query("diabetes treatment options", &[]);
        let b = enhance_query("diabetes treatment options", &[]);
        assert_eq!(a.keywords, b.keywords);
        assert_eq!(a.search_keywords, b.search_keywords);
    }
}
