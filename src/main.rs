//! # Clause Harness CLI (`clh`)
//!
//! The `clh` binary drives the parsing and retrieval pipeline from the
//! command line: ingest extractor span dumps into a corpus store, then
//! query the store for ranked context chunks.
//!
//! ## Usage
//!
//! ```bash
//! clh --config ./config/clh.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `clh parse <spans.json>` | Parse span dumps and store the corpora |
//! | `clh list` | List stored corpora |
//! | `clh stats <name>` | Show one corpus's font statistics and block counts |
//! | `clh query "<query>"` | Rank stored chunks against a query |
//!
//! ## Examples
//!
//! ```bash
//! # Parse one or more span dumps into the store
//! clh parse ./dumps/health-policy.json
//!
//! # Query with extra tagger keywords
//! clh query "grace period for premium payment" --keyword "grace period"
//!
//! # Show full context lines instead of the summary table
//! clh query "maternity waiting period" --top-k 3 --context
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use clause_harness::config;
use clause_harness::json_store::JsonFileStore;
use clause_harness::models::SpanDocument;
use clause_harness::parse;
use clause_harness::rank;
use clause_harness::store::CorpusStore;

/// Clause Harness CLI — structural parsing and lexical retrieval for
/// policy and clinical reference documents.
#[derive(Parser)]
#[command(
    name = "clh",
    about = "Clause Harness — structural parsing and lexical retrieval for policy documents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/clh.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Parse extractor span dumps and store the resulting corpora.
    ///
    /// Each input file holds either one span document or an array of
    /// them. Documents are parsed in parallel and written to the store
    /// keyed by document name; re-parsing a name replaces it.
    Parse {
        /// Span dump files (JSON).
        inputs: Vec<PathBuf>,
    },

    /// List stored corpora.
    List,

    /// Show one corpus's statistics and block counts.
    Stats {
        /// Document name as stored.
        name: String,
    },

    /// Rank stored chunks against a query.
    ///
    /// Prints one result per line with score, source, and section. An
    /// empty result means nothing scored above the relevance threshold.
    Query {
        /// The query string.
        query: String,

        /// Extra keyword or phrase from an external tagger (repeatable).
        #[arg(long = "keyword")]
        keywords: Vec<String>,

        /// Maximum number of results to return.
        #[arg(long)]
        top_k: Option<usize>,

        /// Print citation-ready context lines instead of the summary.
        #[arg(long)]
        context: bool,
    },
}

fn read_span_documents(path: &PathBuf) -> Result<Vec<SpanDocument>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    // Accept a single document or an array of them.
    if let Ok(doc) = serde_json::from_str::<SpanDocument>(&raw) {
        return Ok(vec![doc]);
    }
    serde_json::from_str::<Vec<SpanDocument>>(&raw)
        .with_context(|| format!("{} is not a span document or array of them", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli.config)?;
    let store = JsonFileStore::open(&config.store.dir).await?;

    match cli.command {
        Commands::Parse { inputs } => {
            if inputs.is_empty() {
                anyhow::bail!("no input files given");
            }
            let mut docs: Vec<SpanDocument> = Vec::new();
            for path in &inputs {
                docs.extend(read_span_documents(path)?);
            }
            let parsed = parse::parse_documents(&docs);
            for doc in parsed {
                let headers = doc.blocks.iter().filter(|b| b.is_header).count();
                let flagged = doc
                    .blocks
                    .iter()
                    .filter(|b| !b.coverage_flags.is_empty())
                    .count();
                println!(
                    "{}: {} blocks, {} headers, {} flagged",
                    doc.name,
                    doc.blocks.len(),
                    headers,
                    flagged
                );
                store.put_corpus(doc).await?;
            }
        }

        Commands::List => {
            for name in store.list_corpora().await? {
                println!("{}", name);
            }
        }

        Commands::Stats { name } => {
            let doc = store
                .get_corpus(&name)
                .await?
                .with_context(|| format!("no corpus named '{}'", name))?;
            let headers = doc.blocks.iter().filter(|b| b.is_header).count();
            let flagged = doc
                .blocks
                .iter()
                .filter(|b| !b.coverage_flags.is_empty())
                .count();
            println!("corpus:                {}", doc.name);
            println!("blocks:                {}", doc.blocks.len());
            println!("headers:               {}", headers);
            println!("flagged:               {}", flagged);
            println!("mode font size:        {}", doc.stats.mode_font_size);
            println!("mode color:            {}", doc.stats.mode_color);
            println!("header size threshold: {}", doc.stats.header_size_threshold);
        }

        Commands::Query {
            query,
            keywords,
            top_k,
            context,
        } => {
            let mut params = config.retrieval.rank_params();
            if let Some(k) = top_k {
                params.top_k = k;
            }
            let results = rank::search_corpus(&store, &query, &keywords, &params).await?;
            if results.is_empty() {
                println!("no results above the relevance threshold");
                return Ok(());
            }
            for chunk in &results {
                if context {
                    println!("{}", chunk.context_line());
                } else {
                    println!(
                        "[{:>5}] {} p.{}  {}",
                        chunk.score,
                        chunk.document,
                        chunk.page,
                        if chunk.header.is_empty() {
                            "(no section)"
                        } else {
                            &chunk.header
                        }
                    );
                    println!("        {}", chunk.snippet);
                }
            }
        }
    }

    Ok(())
}
