//! End-to-end pipeline tests: spans through parsing, storage, and ranking.

use clause_harness::json_store::JsonFileStore;
use clause_harness::models::{
    Block, Classification, DocumentStats, ParsedDocument, Span, SpanDocument,
};
use clause_harness::parse;
use clause_harness::rank::{self, RankParams};
use clause_harness::store::{CorpusStore, MemoryStore};
use tempfile::TempDir;

fn span(page: u32, text: &str, size: f32, font: &str, bold: bool) -> Span {
    Span {
        page,
        text: text.to_string(),
        font_size: size,
        font_name: font.to_string(),
        color: 0,
        bbox: (0.0, 0.0, 100.0, 12.0),
        bold,
    }
}

/// A small policy document with a nested Definitions > Grace Period
/// section, one on-topic paragraph, and one decoy.
fn policy_spans() -> SpanDocument {
    SpanDocument {
        name: "HealthPolicy".to_string(),
        blocks: vec![
            vec![span(1, "Definitions", 16.0, "Helvetica-Bold", true)],
            vec![span(2, "Grace Period", 13.0, "Helvetica-Bold", true)],
            vec![span(
                2,
                "The grace period is thirty days from the premium due date. \
                 Payment received within the grace period keeps the policy in force.",
                11.0,
                "Helvetica",
                false,
            )],
            vec![span(
                3,
                "Premium payment instructions are printed on the renewal notice.",
                11.0,
                "Helvetica",
                false,
            )],
        ],
    }
}

fn plain_block(page: u32, index_hint: usize, text: &str) -> Block {
    Block {
        page,
        text: text.to_string(),
        dominant_font_size: 11.0,
        dominant_color: 0,
        is_header: false,
        section_path: vec![],
        direct_header: format!("Section {}", index_hint),
        coverage_flags: vec![],
        primary_classification: Classification::General,
        max_priority: 0,
    }
}

fn corpus(name: &str, blocks: Vec<Block>) -> ParsedDocument {
    ParsedDocument {
        name: name.to_string(),
        stats: DocumentStats {
            mode_font_size: 11.0,
            mode_color: 0,
            header_size_threshold: 12.0,
        },
        blocks,
    }
}

#[tokio::test]
async fn test_parse_store_query_round_trip() {
    let tmp = TempDir::new().unwrap();
    let store = JsonFileStore::open(tmp.path()).await.unwrap();

    let parsed = parse::parse_document(&policy_spans());
    assert_eq!(parsed.blocks.len(), 4);
    assert!(parsed.blocks[0].is_header);
    assert!(parsed.blocks[1].is_header);
    assert_eq!(
        parsed.blocks[2].breadcrumb(),
        "Definitions > Grace Period"
    );

    store.put_corpus(parsed.clone()).await.unwrap();
    let reloaded = store.get_corpus("HealthPolicy").await.unwrap().unwrap();
    assert_eq!(parsed, reloaded);

    let results = rank::search_corpus(
        &store,
        "What is the grace period for premium payment?",
        &["grace period".to_string()],
        &RankParams::default(),
    )
    .await
    .unwrap();

    assert!(!results.is_empty());
    let top = &results[0];
    assert!(top.snippet.to_lowercase().contains("thirty days"));
    assert_eq!(top.document, "HealthPolicy");
    assert_eq!(top.page, 2);
    assert_eq!(top.header, "Definitions > Grace Period");
    assert!(top.score >= 150);
    assert!(top
        .context_line()
        .starts_with("[HealthPolicy, Page 2]"));
    // Scores come back sorted.
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_exclusion_section_classification() {
    let doc = SpanDocument {
        name: "Exclusions".to_string(),
        blocks: vec![
            vec![span(5, "SECTION 3 EXCLUSIONS", 16.0, "Helvetica-Bold", true)],
            vec![span(
                5,
                "War and terrorism related claims are not covered under this policy.",
                11.0,
                "Helvetica",
                false,
            )],
        ],
    };
    let parsed = parse::parse_document(&doc);

    let head = &parsed.blocks[0];
    assert!(head.is_header);
    assert_eq!(head.primary_classification, Classification::Exclusion);

    let body = &parsed.blocks[1];
    assert_eq!(body.primary_classification, Classification::Exclusion);
    assert!(body
        .coverage_flags
        .iter()
        .any(|f| f.label == Classification::WarRelated));
    assert!(body
        .flagged_text()
        .starts_with("[EXCLUDES] [HIGH PRIORITY]\n"));
}

#[tokio::test]
async fn test_zero_span_document_round_trips() {
    let tmp = TempDir::new().unwrap();
    let store = JsonFileStore::open(tmp.path()).await.unwrap();

    let parsed = parse::parse_document(&SpanDocument {
        name: "Empty".to_string(),
        blocks: vec![],
    });
    assert!(parsed.blocks.is_empty());

    store.put_corpus(parsed.clone()).await.unwrap();
    assert_eq!(store.get_corpus("Empty").await.unwrap(), Some(parsed));
    assert_eq!(store.list_corpora().await.unwrap(), vec!["Empty"]);
}

#[tokio::test]
async fn test_stopword_query_is_empty_without_scanning() {
    let store = MemoryStore::new();
    store
        .put_corpus(corpus(
            "Policy",
            vec![plain_block(1, 1, "the grace period is thirty days")],
        ))
        .await
        .unwrap();

    let results = rank::search_corpus(&store, "what is the of", &[], &RankParams::default())
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_below_threshold_returns_empty() {
    let store = MemoryStore::new();
    store
        .put_corpus(corpus(
            "Policy",
            vec![plain_block(
                1,
                1,
                "the annual premium notice is mailed in advance",
            )],
        ))
        .await
        .unwrap();

    // One weak keyword hit cannot reach the relevance floor.
    let results = rank::search_corpus(&store, "premium refund rules", &[], &RankParams::default())
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_near_duplicate_chunks_collapse() {
    let shared = "The grace period is thirty days from the due date and applies \
                  to every renewal of this insurance policy without exception";
    let store = MemoryStore::new();
    store
        .put_corpus(corpus(
            "Policy",
            vec![
                plain_block(1, 1, &format!("{} as stated here.", shared)),
                plain_block(6, 2, &format!("{} as repeated later.", shared)),
            ],
        ))
        .await
        .unwrap();

    let results = rank::search_corpus(
        &store,
        "grace period",
        &["grace period".to_string()],
        &RankParams::default(),
    )
    .await
    .unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn test_page_diversity_cap() {
    let blocks: Vec<Block> = (0..6)
        .map(|i| {
            plain_block(
                9,
                i,
                &format!(
                    "Clause {}: the grace period is thirty days from the due date \
                     and renewal remains effective during it.",
                    i
                ),
            )
        })
        .collect();
    let store = MemoryStore::new();
    store.put_corpus(corpus("Policy", blocks)).await.unwrap();

    let params = RankParams {
        top_k: 10,
        ..RankParams::default()
    };
    let results = rank::search_corpus(
        &store,
        "grace period",
        &["grace period".to_string()],
        &params,
    )
    .await
    .unwrap();
    // All six chunks qualify but only three may come from the same page.
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|r| r.page == 9));
}

#[tokio::test]
async fn test_results_respect_top_k() {
    let blocks: Vec<Block> = (0..8)
        .map(|i| {
            plain_block(
                i as u32 + 1,
                i,
                &format!(
                    "Clause {}: the grace period is thirty days from the due date \
                     and renewal remains effective during it.",
                    i
                ),
            )
        })
        .collect();
    let store = MemoryStore::new();
    store.put_corpus(corpus("Policy", blocks)).await.unwrap();

    let params = RankParams {
        top_k: 2,
        ..RankParams::default()
    };
    let results = rank::search_corpus(
        &store,
        "grace period",
        &["grace period".to_string()],
        &params,
    )
    .await
    .unwrap();
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_snippets_fit_context_budget() {
    let long_body = format!(
        "{} The grace period is thirty days from the premium due date. {}",
        "Unrelated filler sentence about nothing in particular. ".repeat(15),
        "More filler trailing the relevant sentence afterwards. ".repeat(15)
    );
    let store = MemoryStore::new();
    store
        .put_corpus(corpus("Policy", vec![plain_block(2, 1, &long_body)]))
        .await
        .unwrap();

    let results = rank::search_corpus(
        &store,
        "grace period",
        &["grace period".to_string()],
        &RankParams::default(),
    )
    .await
    .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].snippet.len() <= 600 + 3);
    assert!(results[0].snippet.to_lowercase().contains("grace period"));
}
