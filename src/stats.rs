//! Document-wide font and color statistics.
//!
//! One batch pass over every span of a document yields the mode font size,
//! mode color, and the header size threshold the block classifier scores
//! against. Statistics are immutable after computation.

use std::collections::HashMap;

use crate::models::{DocumentStats, Span};

/// Fallbacks for a document with no spans.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;
pub const DEFAULT_COLOR: u32 = 0;
pub const DEFAULT_HEADER_THRESHOLD: f32 = 14.0;

/// Font sizes are counted in tenth-point buckets so that 11.98 and 12.02
/// from the same face land together.
fn size_bucket(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

fn bucket_size(bucket: i32) -> f32 {
    bucket as f32 / 10.0
}

/// Most frequent key; ties break toward the smaller key so repeated runs
/// over the same document agree.
fn mode<K: Ord + Copy>(counts: &HashMap<K, usize>) -> Option<K> {
    counts
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        .map(|(k, _)| *k)
}

/// Compute [`DocumentStats`] from the full span population.
///
/// An empty span set yields the fixed defaults (size 12, color 0,
/// threshold 14) rather than an error; callers treat an empty document as
/// valid input that produces no blocks.
pub fn analyze(spans: &[Span]) -> DocumentStats {
    if spans.is_empty() {
        return DocumentStats {
            mode_font_size: DEFAULT_FONT_SIZE,
            mode_color: DEFAULT_COLOR,
            header_size_threshold: DEFAULT_HEADER_THRESHOLD,
        };
    }

    let mut size_counts: HashMap<i32, usize> = HashMap::new();
    let mut color_counts: HashMap<u32, usize> = HashMap::new();
    for span in spans {
        *size_counts.entry(size_bucket(span.font_size)).or_insert(0) += 1;
        *color_counts.entry(span.color).or_insert(0) += 1;
    }

    let mode_bucket = mode(&size_counts).unwrap_or(size_bucket(DEFAULT_FONT_SIZE));
    let mode_font_size = bucket_size(mode_bucket);
    let mode_color = mode(&color_counts).unwrap_or(DEFAULT_COLOR);

    let any_larger = size_counts.keys().any(|b| *b > mode_bucket);
    let header_size_threshold = if any_larger {
        mode_font_size + 1.0
    } else {
        mode_font_size
    };

    DocumentStats {
        mode_font_size,
        mode_color,
        header_size_threshold,
    }
}
