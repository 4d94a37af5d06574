// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for csearch
//!
//! Loads configuration from .csearchrc.toml in current directory or
//! ~/.config/csearch/config.toml

use serde::Deserialize;
use std::path::PathBuf;

use crate::query::search::RankingParams;

/// Configuration loaded from .csearchrc.toml or ~/.config/csearch/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of results to return
    pub max_results: Option<usize>,
    /// Maximum admitted file size in bytes (default 1 MiB)
    pub max_file_size: Option<u64>,
    /// Patterns to exclude from scanning
    pub exclude_patterns: Vec<String>,
    /// Multiplier applied when a document contains a literal query word
    pub exact_match_boost: Option<f32>,
    /// Multiplier applied when every query term occurs in a document
    pub phrase_match_boost: Option<f32>,
    /// Leading-byte window sampled when sniffing for NUL bytes
    pub binary_sample_bytes: Option<usize>,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .csearchrc.toml in current directory
    /// 2. ~/.config/csearch/config.toml
    pub fn load() -> Self {
        if let Some(config) = Self::load_from_path(&PathBuf::from(".csearchrc.toml")) {
            return config;
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("csearch").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    fn load_from_path(path: &PathBuf) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Ranking boosts with config overrides applied.
    pub fn ranking_params(&self) -> RankingParams {
        let defaults = RankingParams::default();
        RankingParams {
            exact_match_boost: self.exact_match_boost.unwrap_or(defaults.exact_match_boost),
            phrase_match_boost: self
                .phrase_match_boost
                .unwrap_or(defaults.phrase_match_boost),
        }
    }

    /// Merge CLI options with config (CLI wins)
    pub fn merge_max_results(&self, cli_value: Option<usize>) -> usize {
        cli_value
            .or(self.max_results)
            .unwrap_or(crate::query::search::DEFAULT_LIMIT)
    }
}
