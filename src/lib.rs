//! # Clause Harness
//!
//! A structural parsing and lexical retrieval core for policy and
//! clinical reference documents.
//!
//! Clause Harness turns layout-aware extractor output (text spans with
//! font metadata) into classified, hierarchy-tagged blocks, stores them
//! as corpora, and answers queries with scored, citation-ready context
//! snippets. Answer generation and PDF extraction live outside this
//! crate; it consumes spans and produces context lines.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌───────────┐
//! │ Span input  │──▶│   Parser     │──▶│  Corpus   │
//! │ (extractor) │   │ stats+class  │   │  store    │
//! └─────────────┘   └──────────────┘   └────┬──────┘
//!                                           │
//!                  ┌────────────────────────┤
//!                  ▼                        ▼
//!            ┌──────────┐            ┌──────────┐
//!            │ Enhancer │───────────▶│  Ranker  │
//!            │ (query)  │            │ +snippet │
//!            └──────────┘            └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`normalize`] | Unicode folding and whitespace cleanup |
//! | [`stats`] | Per-document font statistics |
//! | [`classify`] | Header scoring and coverage classification |
//! | [`hierarchy`] | Section breadcrumb tracking |
//! | [`parse`] | Span-to-block parsing pipeline |
//! | [`enhance`] | Query expansion and intent detection |
//! | [`rank`] | Multi-factor chunk ranking |
//! | [`snippet`] | Context snippet extraction |
//! | [`store`] | Corpus storage trait + in-memory store |
//! | [`json_store`] | File-backed JSON corpus store |

pub mod classify;
pub mod config;
pub mod enhance;
pub mod hierarchy;
pub mod json_store;
pub mod models;
pub mod normalize;
pub mod parse;
pub mod rank;
pub mod snippet;
pub mod stats;
pub mod store;
