use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::rank::RankParams;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_scan_limit")]
    pub scan_limit: usize,
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: usize,
    #[serde(default = "default_min_relevance")]
    pub min_relevance: i64,
}

fn default_top_k() -> usize {
    5
}
fn default_scan_limit() -> usize {
    800
}
fn default_candidate_multiplier() -> usize {
    4
}
fn default_min_relevance() -> i64 {
    150
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            scan_limit: default_scan_limit(),
            candidate_multiplier: default_candidate_multiplier(),
            min_relevance: default_min_relevance(),
        }
    }
}

impl RetrievalConfig {
    pub fn rank_params(&self) -> RankParams {
        RankParams {
            top_k: self.top_k,
            scan_limit: self.scan_limit,
            candidate_multiplier: self.candidate_multiplier,
            min_relevance: self.min_relevance,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }
    if config.retrieval.scan_limit < 1 {
        anyhow::bail!("retrieval.scan_limit must be >= 1");
    }
    if config.retrieval.candidate_multiplier < 1 {
        anyhow::bail!("retrieval.candidate_multiplier must be >= 1");
    }
    if config.retrieval.min_relevance < 0 {
        anyhow::bail!("retrieval.min_relevance must be >= 0");
    }

    Ok(config)
}
