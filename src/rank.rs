//! Multi-factor lexical ranking over a classified block corpus.
//!
//! The engine runs one store scan per search keyword, scores every
//! candidate chunk against the full enhanced query, then funnels the
//! scored set through explicit stages: exact-text dedup → sort →
//! candidate cap → relevance threshold → near-duplicate suppression →
//! page-diversity cap → snippet extraction. Each stage is a plain
//! function so it can be tested on its own.
//!
//! The weights and thresholds are hand-tuned values inherited from the
//! original system. They are a compatibility contract, not semantically
//! meaningful limits; recalibrate only with the downstream metrics in
//! hand.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::enhance::{enhance_query, EnhancedQuery};
use crate::models::{ChunkRow, RankedChunk};
use crate::snippet;
use crate::store::CorpusStore;

/// Per-occurrence weight for a top keyword.
pub const FREQ_WEIGHT: i64 = 15;
/// Flat bonus for a multi-word phrase found verbatim in the text.
pub const PHRASE_BONUS: i64 = 150;
/// Additional bonus when the phrase also appears in the header.
pub const PHRASE_HEADER_BONUS: i64 = 100;
/// Base bonus for a keyword found in the section header.
pub const HEADER_HIT: i64 = 40;
/// Extra header bonus for multi-word phrases.
pub const HEADER_PHRASE_BONUS: i64 = 60;
/// Per-keyword bonus when two or more distinct keywords are present.
pub const MULTI_KEYWORD_WEIGHT: i64 = 20;
/// Bonus when a keyword occurs within the leading window.
pub const EARLY_POSITION_BONUS: i64 = 25;
/// Leading window size for the position bonus.
pub const EARLY_WINDOW: usize = 200;
/// Bonus for text in the preferred length band.
pub const CHUNK_LENGTH_BONUS: i64 = 10;
/// Minimum best-candidate score; below it the query returns nothing and
/// the caller falls back to an ungrounded answer.
pub const MIN_RELEVANCE_SCORE: i64 = 150;
/// Candidate pool size relative to `top_k`.
pub const CANDIDATE_MULTIPLIER: usize = 4;
/// Per-keyword store scan limit.
pub const SCAN_LIMIT: usize = 800;
/// Leading characters hashed for near-duplicate suppression.
pub const DEDUP_PREFIX_CHARS: usize = 100;
/// Maximum accepted chunks per (document, page) pair.
pub const PAGE_DIVERSITY_CAP: usize = 3;

/// Keywords that contribute frequency and header scores.
const TOP_KEYWORDS: usize = 8;
/// Keywords probed for phrase and early-position bonuses.
const PHRASE_KEYWORDS: usize = 5;

/// Tuning for one ranking invocation.
#[derive(Debug, Clone)]
pub struct RankParams {
    pub top_k: usize,
    pub scan_limit: usize,
    pub candidate_multiplier: usize,
    pub min_relevance: i64,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            top_k: 5,
            scan_limit: SCAN_LIMIT,
            candidate_multiplier: CANDIDATE_MULTIPLIER,
            min_relevance: MIN_RELEVANCE_SCORE,
        }
    }
}

fn count_occurrences(haystack: &str, needle: &str) -> i64 {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count() as i64
}

/// Score one candidate chunk against the enhanced query. Pure and
/// deterministic; the corpus is never mutated.
pub fn score_chunk(text: &str, header: &str, query: &EnhancedQuery) -> i64 {
    let text_lower = text.to_lowercase();
    let header_lower = header.to_lowercase();
    let mut score = 0i64;

    // Keyword frequency, doubled for intent-matching keywords.
    for kw in query.keywords.iter().take(TOP_KEYWORDS) {
        let mut base = count_occurrences(&text_lower, kw) * FREQ_WEIGHT;
        if query.intent_boosts.contains_key(kw.as_str()) {
            base *= 2;
        }
        score += base;
    }

    // Verbatim multi-word phrase matches carry the most precision.
    for kw in query.keywords.iter().take(PHRASE_KEYWORDS) {
        if kw.contains(' ') && text_lower.contains(kw.as_str()) {
            score += PHRASE_BONUS;
            if header_lower.contains(kw.as_str()) {
                score += PHRASE_HEADER_BONUS;
            }
        }
    }

    // Header relevance.
    for kw in query.keywords.iter().take(TOP_KEYWORDS) {
        if header_lower.contains(kw.as_str()) {
            score += HEADER_HIT;
            if let Some(boost) = query.intent_boosts.get(kw.as_str()) {
                score += boost;
            }
            if kw.contains(' ') {
                score += HEADER_PHRASE_BONUS;
            }
        }
    }

    // Distinct-keyword proximity bonus.
    let unique_matches = query
        .keywords
        .iter()
        .filter(|kw| text_lower.contains(kw.as_str()))
        .count() as i64;
    if unique_matches >= 2 {
        score += unique_matches * MULTI_KEYWORD_WEIGHT;
    }

    // Early-position bonus: keywords in the leading window.
    for kw in query.keywords.iter().take(PHRASE_KEYWORDS) {
        if let Some(idx) = text_lower.find(kw.as_str()) {
            if idx < EARLY_WINDOW {
                score += EARLY_POSITION_BONUS;
            }
        }
    }

    // Intent keywords anywhere in the text.
    for (kw, boost) in &query.intent_boosts {
        if text_lower.contains(kw.as_str()) {
            score += boost;
        }
    }

    // Preferred chunk size band.
    if text.len() > 200 && text.len() < 1000 {
        score += CHUNK_LENGTH_BONUS;
    }

    score
}

/// Deduplicate by exact text, keeping the higher score, then sort by score
/// descending with a stable tie-break, and cap the candidate pool.
pub fn select_candidates(
    rows: Vec<ChunkRow>,
    query: &EnhancedQuery,
    pool_cap: usize,
) -> Vec<(i64, ChunkRow)> {
    let mut by_text: HashMap<String, (i64, ChunkRow)> = HashMap::new();
    for row in rows {
        let score = score_chunk(&row.text, &row.header, query);
        match by_text.get(&row.text) {
            Some((existing, _)) if *existing >= score => {}
            _ => {
                by_text.insert(row.text.clone(), (score, row));
            }
        }
    }

    let mut scored: Vec<(i64, ChunkRow)> = by_text.into_values().collect();
    scored.sort_by(|(sa, ra), (sb, rb)| {
        sb.cmp(sa)
            .then_with(|| ra.document.cmp(&rb.document))
            .then_with(|| ra.page.cmp(&rb.page))
            .then_with(|| ra.chunk_index.cmp(&rb.chunk_index))
    });
    scored.truncate(pool_cap);
    scored
}

fn dedup_key(text: &str) -> String {
    let prefix: String = text
        .to_lowercase()
        .chars()
        .take(DEDUP_PREFIX_CHARS)
        .collect();
    let mut hasher = Sha256::new();
    hasher.update(prefix.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Walk candidates in score order applying near-duplicate suppression and
/// the per-page diversity cap, accepting at most `top_k` chunks.
pub fn diversify(candidates: &[(i64, ChunkRow)], top_k: usize) -> Vec<(i64, ChunkRow)> {
    let mut seen_hashes: HashSet<String> = HashSet::new();
    let mut page_counts: HashMap<(String, u32), usize> = HashMap::new();
    let mut accepted: Vec<(i64, ChunkRow)> = Vec::new();

    for (score, row) in candidates {
        if accepted.len() >= top_k {
            break;
        }
        if !seen_hashes.insert(dedup_key(&row.text)) {
            continue;
        }
        let page_key = (row.document.clone(), row.page);
        let count = page_counts.entry(page_key).or_insert(0);
        if *count >= PAGE_DIVERSITY_CAP {
            continue;
        }
        *count += 1;
        accepted.push((*score, row.clone()));
    }

    accepted
}

/// Rank a corpus against a query and return citation-ready chunks.
///
/// An empty result is a first-class outcome: no keywords, or nothing
/// above the relevance threshold, both signal "no grounding found" and
/// are distinct from a store fault (the only error this surfaces).
pub async fn search_corpus<S: CorpusStore + ?Sized>(
    store: &S,
    query_text: &str,
    tagger_keywords: &[String],
    params: &RankParams,
) -> Result<Vec<RankedChunk>> {
    let query = enhance_query(query_text, tagger_keywords);
    if query.is_empty() {
        debug!("no keywords extracted, returning empty result");
        return Ok(Vec::new());
    }

    // One linear scan per search keyword. A failed scan is skipped, never
    // fatal to the whole ranking.
    let mut rows: Vec<ChunkRow> = Vec::new();
    for keyword in &query.search_keywords {
        match store.scan_contains(keyword, params.scan_limit).await {
            Ok(mut found) => rows.append(&mut found),
            Err(e) => {
                warn!(keyword = %keyword, error = %e, "keyword scan failed, skipping");
            }
        }
    }

    let pool_cap = params.top_k * params.candidate_multiplier;
    let candidates = select_candidates(rows, &query, pool_cap);

    match candidates.first() {
        None => return Ok(Vec::new()),
        Some((best, _)) if *best < params.min_relevance => {
            debug!(
                best_score = best,
                threshold = params.min_relevance,
                "best candidate below relevance threshold, returning empty result"
            );
            return Ok(Vec::new());
        }
        _ => {}
    }

    let accepted = diversify(&candidates, params.top_k);

    let chunks: Vec<RankedChunk> = accepted
        .into_iter()
        .map(|(score, row)| RankedChunk {
            snippet: snippet::extract_snippet(&row.text, &query),
            document: row.document,
            page: row.page,
            header: row.header,
            score,
        })
        .collect();

    debug!(results = chunks.len(), "ranking complete");
    Ok(chunks)
}
