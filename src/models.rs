//! Core data models used throughout Clause Harness.
//!
//! These types represent the spans, blocks, and ranked chunks that flow
//! through the parsing and retrieval pipeline. Everything here is
//! serde-serializable so a parsed corpus round-trips through storage
//! without losing any field.

use serde::{Deserialize, Serialize};

/// One atomic run of text sharing font attributes, as emitted by a
/// layout-aware PDF extractor. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// 1-based page number.
    pub page: u32,
    pub text: String,
    pub font_size: f32,
    pub font_name: String,
    /// Packed RGB color as the extractor reports it.
    pub color: u32,
    /// (x0, y0, x1, y1) in page coordinates.
    pub bbox: (f32, f32, f32, f32),
    pub bold: bool,
}

/// Extractor output for one document: spans grouped by source block,
/// blocks in document order. The core never re-derives this grouping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpanDocument {
    pub name: String,
    pub blocks: Vec<Vec<Span>>,
}

/// Domain classification attached to a block by pattern matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    General,
    Inclusion,
    Exclusion,
    Exception,
    Limitation,
    Condition,
    PreExisting,
    SuicideRelated,
    WarRelated,
    Maternity,
    Emergency,
    Claims,
}

impl Classification {
    /// Short marker used when rendering flagged text for downstream
    /// consumers (`[EXCLUDES] ...`).
    pub fn marker(&self) -> &'static str {
        match self {
            Classification::General => "GENERAL",
            Classification::Inclusion => "COVERS",
            Classification::Exclusion => "EXCLUDES",
            Classification::Exception => "EXCEPTION",
            Classification::Limitation => "LIMITATION",
            Classification::Condition => "CONDITION",
            Classification::PreExisting => "PRE-EXISTING",
            Classification::SuicideRelated => "SUICIDE",
            Classification::WarRelated => "WAR/TERRORISM",
            Classification::Maternity => "MATERNITY",
            Classification::Emergency => "EMERGENCY",
            Classification::Claims => "CLAIMS",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.marker())
    }
}

/// A (label, priority, matched terms) tuple recorded for every coverage
/// pattern that matched a block's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageFlag {
    pub label: Classification,
    pub priority: u8,
    pub matched_terms: Vec<String>,
}

/// One classified logical unit of document text with computed metadata.
///
/// Built by the parser, which is the sole mutator of `is_header`,
/// `section_path`, and `coverage_flags`. The ranking engine only reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub page: u32,
    /// Normalized text.
    pub text: String,
    pub dominant_font_size: f32,
    pub dominant_color: u32,
    pub is_header: bool,
    /// Breadcrumb of enclosing header strings, outer to inner. A header
    /// block's own path ends with its own text.
    pub section_path: Vec<String>,
    /// The innermost enclosing header (or the block's own text when it is
    /// a header). `"Document Start"` before any header is seen.
    pub direct_header: String,
    pub coverage_flags: Vec<CoverageFlag>,
    pub primary_classification: Classification,
    pub max_priority: u8,
}

impl Block {
    /// `"Definitions > Pre-existing Conditions"` style breadcrumb.
    pub fn breadcrumb(&self) -> String {
        self.section_path.join(" > ")
    }

    /// Text prefixed with the coverage marker the original pipeline
    /// attached for downstream consumers. Blocks with no coverage match
    /// render unchanged.
    pub fn flagged_text(&self) -> String {
        if self.coverage_flags.is_empty() {
            return self.text.clone();
        }
        let priority = if self.max_priority >= 9 {
            "HIGH PRIORITY"
        } else if self.max_priority >= 7 {
            "MEDIUM PRIORITY"
        } else {
            "LOW PRIORITY"
        };
        format!(
            "[{}] [{}]\n{}",
            self.primary_classification.marker(),
            priority,
            self.text
        )
    }
}

/// Document-wide font statistics, computed once per document and consumed
/// read-only by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStats {
    pub mode_font_size: f32,
    pub mode_color: u32,
    pub header_size_threshold: f32,
}

/// A fully parsed, classified document corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub name: String,
    pub stats: DocumentStats,
    pub blocks: Vec<Block>,
}

/// Flattened corpus row returned by a store scan. Mirrors the per-chunk
/// shape the original persisted (text, document name, page, header, index).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRow {
    pub document: String,
    pub page: u32,
    pub chunk_index: usize,
    pub text: String,
    /// Section breadcrumb of the source block.
    pub header: String,
}

/// A scored, trimmed snippet returned to the caller at query time.
/// Created fresh per query and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedChunk {
    pub document: String,
    pub page: u32,
    pub header: String,
    pub score: i64,
    pub snippet: String,
}

impl RankedChunk {
    /// Citation-ready context line handed to the answer service.
    pub fn context_line(&self) -> String {
        format!("[{}, Page {}] {}", self.document, self.page, self.snippet)
    }
}
