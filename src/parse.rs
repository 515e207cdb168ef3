//! Per-document parsing pipeline.
//!
//! Folds one document's span blocks through normalization, statistics,
//! classification, and hierarchy tracking to produce a [`ParsedDocument`].
//! The fold is strictly sequential within a document (the hierarchy stack
//! is shared mutable state); independent documents parse in parallel.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::classify::{self, BlockSignals};
use crate::hierarchy::HierarchyTracker;
use crate::models::{Block, ParsedDocument, Span, SpanDocument};
use crate::normalize::normalize_text;
use crate::stats;

/// One source block after normalization, before classification.
#[derive(Debug, Clone)]
struct BlockCandidate {
    page: u32,
    text: String,
    font_size: f32,
    font_name: String,
    color: u32,
    bold: bool,
}

/// Aggregate one extractor block's spans: dominant font attributes by
/// frequency, text joined in span order. Returns `None` when nothing
/// survives normalization.
fn aggregate_block(spans: &[Span]) -> Option<BlockCandidate> {
    let mut pieces: Vec<String> = Vec::new();
    let mut size_counts: HashMap<i32, usize> = HashMap::new();
    let mut color_counts: HashMap<u32, usize> = HashMap::new();
    let mut font_counts: HashMap<&str, usize> = HashMap::new();
    let mut bold_spans = 0usize;

    for span in spans {
        let text = normalize_text(&span.text);
        if !text.is_empty() {
            pieces.push(text);
        }
        *size_counts
            .entry((span.font_size * 10.0).round() as i32)
            .or_insert(0) += 1;
        *color_counts.entry(span.color).or_insert(0) += 1;
        *font_counts.entry(span.font_name.as_str()).or_insert(0) += 1;
        if span.bold {
            bold_spans += 1;
        }
    }

    let text = pieces.join(" ");
    if text.is_empty() {
        return None;
    }

    let font_size = size_counts
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        .map(|(k, _)| *k as f32 / 10.0)
        .unwrap_or(stats::DEFAULT_FONT_SIZE);
    let color = color_counts
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        .map(|(k, _)| *k)
        .unwrap_or(stats::DEFAULT_COLOR);
    let font_name = font_counts
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        .map(|(k, _)| k.to_string())
        .unwrap_or_default();

    Some(BlockCandidate {
        page: spans.first().map(|s| s.page).unwrap_or(1),
        text,
        font_size,
        font_name,
        color,
        bold: bold_spans * 2 > spans.len(),
    })
}

/// Parse one document: spans → normalized candidates → document statistics
/// → classified blocks with section paths.
///
/// Zero spans (or spans that normalize to nothing) yield an empty block
/// list with default statistics, never an error.
pub fn parse_document(doc: &SpanDocument) -> ParsedDocument {
    let all_spans: Vec<Span> = doc
        .blocks
        .iter()
        .flatten()
        .map(|s| Span {
            text: normalize_text(&s.text),
            ..s.clone()
        })
        .filter(|s| !s.text.is_empty())
        .collect();
    let doc_stats = stats::analyze(&all_spans);

    let candidates: Vec<BlockCandidate> = doc
        .blocks
        .iter()
        .filter_map(|spans| aggregate_block(spans))
        .collect();

    let mut tracker = HierarchyTracker::new();
    let mut blocks = Vec::with_capacity(candidates.len());

    for cand in candidates {
        let coverage = classify::analyze_coverage(&cand.text);
        let signals = BlockSignals {
            text: &cand.text,
            font_size: cand.font_size,
            font_name: &cand.font_name,
            color: cand.color,
            bold: cand.bold,
        };
        let is_header = classify::is_header(&signals, &doc_stats);

        let (section_path, direct_header) = if is_header {
            let path = tracker.observe_header(&cand.text, cand.font_size);
            (path, cand.text.clone())
        } else {
            (tracker.current_path(), tracker.direct_header())
        };

        blocks.push(Block {
            page: cand.page,
            text: cand.text,
            dominant_font_size: cand.font_size,
            dominant_color: cand.color,
            is_header,
            section_path,
            direct_header,
            coverage_flags: coverage.flags,
            primary_classification: coverage.primary_classification,
            max_priority: coverage.max_priority,
        });
    }

    let headers = blocks.iter().filter(|b| b.is_header).count();
    let flagged = blocks.iter().filter(|b| !b.coverage_flags.is_empty()).count();
    debug!(
        document = %doc.name,
        blocks = blocks.len(),
        headers,
        flagged,
        "parsed document"
    );

    ParsedDocument {
        name: doc.name.clone(),
        stats: doc_stats,
        blocks,
    }
}

/// Parse many documents in parallel. Each document gets its own statistics
/// and hierarchy tracker; there is no cross-document state.
pub fn parse_documents(docs: &[SpanDocument]) -> Vec<ParsedDocument> {
    docs.par_iter().map(parse_document).collect()
}
