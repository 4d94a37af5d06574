// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cosine-similarity ranking over the built TF-IDF index, with
//! exact-substring and full-phrase boosts.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::debug;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::indexer::service::{BuiltIndex, IndexOptions, SearchService};
use crate::indexer::tfidf::{normalize, tokenize};
use crate::output::print_json;
use crate::query::snippet;

/// Default number of results returned when no limit is given.
pub const DEFAULT_LIMIT: usize = 10;

/// Multiplicative ranking boosts. Tunable via config rather than
/// hard-coded; the defaults reward literal hits over loosely-topical ones.
#[derive(Debug, Clone, Copy)]
pub struct RankingParams {
    /// Applied when the document contains a literal query word.
    pub exact_match_boost: f32,
    /// Applied when every query term occurs in the document.
    pub phrase_match_boost: f32,
}

impl Default for RankingParams {
    fn default() -> Self {
        Self {
            exact_match_boost: 1.5,
            phrase_match_boost: 2.0,
        }
    }
}

/// Search options shared by the CLI flags and the MCP tool arguments.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Maximum results to return (default 10).
    pub limit: Option<usize>,
    /// Attach line snippets to results.
    pub include_content: bool,
    /// Keep only these file extensions (no dot, case-insensitive).
    pub file_extensions: Vec<String>,
    /// Keep only paths containing this substring.
    pub path_filter: Option<String>,
    /// Drop paths containing any of these substrings.
    pub exclude_paths: Vec<String>,
}

/// One ranked hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub path: String,
    pub uri: String,
    pub score: f32,
    /// Query terms found in this document's vocabulary, sorted.
    pub matched_terms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub size: u64,
}

/// Rank every document in the built index against the query.
///
/// Zero-score documents are never returned; post-filters run over the full
/// ranked candidate list (every document is scored, so filtering cannot
/// starve the limit while qualifying documents exist) before truncation.
pub fn execute(
    built: &BuiltIndex,
    params: &RankingParams,
    query: &str,
    options: &SearchOptions,
) -> Vec<SearchResult> {
    let query_terms = tokenize(query);
    if query_terms.is_empty() {
        // "No useful terms" is a valid outcome, not a fault.
        return Vec::new();
    }

    let mut unique_terms: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for term in &query_terms {
        if seen.insert(term.clone()) {
            unique_terms.push(term.clone());
        }
    }

    let mut query_vector: HashMap<String, f32> = HashMap::new();
    for term in &query_terms {
        *query_vector.entry(term.clone()).or_insert(0.0) += 1.0;
    }
    for (term, weight) in query_vector.iter_mut() {
        let tf = 1.0 + f32::ln(*weight);
        *weight = tf * built.index.idf(term);
    }
    normalize(&mut query_vector);

    // Literal (unstemmed) query words drive the exact-substring boost.
    let literal_words: Vec<String> = query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.len() >= 2)
        .map(str::to_string)
        .collect();

    let mut candidates: Vec<(usize, f32, Vec<String>)> = Vec::new();
    for (pos, vector) in built.index.document_vectors.iter().enumerate() {
        let mut score: f32 = query_vector
            .iter()
            .map(|(term, qw)| qw * vector.weights.get(term).copied().unwrap_or(0.0))
            .sum();
        if score <= 0.0 {
            continue;
        }

        let mut matched: Vec<String> = unique_terms
            .iter()
            .filter(|term| vector.contains_term(term))
            .cloned()
            .collect();
        matched.sort();

        let text_lower = &built.text_lower[pos];
        if literal_words.iter().any(|w| text_lower.contains(w.as_str())) {
            score *= params.exact_match_boost;
        }
        if matched.len() == unique_terms.len() {
            score *= params.phrase_match_boost;
        }

        candidates.push((pos, score, matched));
    }

    // Stable sort: equal scores keep corpus order, so results are
    // deterministic for identical inputs.
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let limit = options.limit.unwrap_or(DEFAULT_LIMIT);
    let files = built.store.files();
    candidates
        .into_iter()
        .filter(|(pos, _, _)| passes_filters(&files[*pos].path, options))
        .take(limit)
        .map(|(pos, score, matched_terms)| {
            let file = &files[pos];
            let snippet = options.include_content.then(|| {
                snippet::render(&snippet::extract(&file.content, &matched_terms))
            });
            SearchResult {
                path: file.path.display().to_string(),
                uri: file.uri(),
                score,
                matched_terms,
                snippet,
                language: file.language.clone(),
                size: file.size,
            }
        })
        .collect()
}

fn passes_filters(path: &Path, options: &SearchOptions) -> bool {
    if !options.file_extensions.is_empty() {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if !options
            .file_extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        {
            return false;
        }
    }

    let path_str = path.to_string_lossy();
    if let Some(filter) = &options.path_filter {
        if !path_str.contains(filter.as_str()) {
            return false;
        }
    }
    if options
        .exclude_paths
        .iter()
        .any(|pattern| path_str.contains(pattern.as_str()))
    {
        return false;
    }
    true
}

/// CLI entry point: scan + index + search in one run.
#[allow(clippy::too_many_arguments)]
pub fn run(
    query: &str,
    root: Option<&str>,
    limit: Option<usize>,
    extensions: Vec<String>,
    path_filter: Option<String>,
    excludes: Vec<String>,
    no_snippet: bool,
    max_file_size: Option<u64>,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let config = Config::load();
    let root = root.unwrap_or(".");
    let service = SearchService::new(config.ranking_params());

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner} indexing {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    let on_progress = |current: usize, total: usize, path: &Path| {
        bar.set_length(total as u64);
        bar.set_position(current as u64);
        bar.set_message(path.display().to_string());
    };

    let start = Instant::now();
    let summary = service.index(
        Path::new(root),
        IndexOptions {
            max_file_size: max_file_size.or(config.max_file_size),
            exclude_patterns: merge_excludes(&config, excludes),
            binary_sample_bytes: config.binary_sample_bytes,
            on_progress: Some(&on_progress),
        },
    )?;
    bar.finish_and_clear();
    debug!(
        files = summary.files_indexed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "index phase done"
    );

    let options = SearchOptions {
        limit: Some(config.merge_max_results(limit)),
        include_content: !no_snippet,
        file_extensions: extensions,
        path_filter,
        exclude_paths: Vec::new(),
    };
    let results = service.search(query, &options)?;

    match format {
        OutputFormat::Json => print_json(&results, compact)?,
        OutputFormat::Text => print_text(query, &results),
    }
    Ok(())
}

fn merge_excludes(config: &Config, cli: Vec<String>) -> Vec<String> {
    let mut patterns = config.exclude_patterns.clone();
    patterns.extend(cli);
    patterns
}

fn print_text(query: &str, results: &[SearchResult]) {
    if results.is_empty() {
        println!("No results for '{query}'");
        return;
    }
    for result in results {
        println!(
            "{}  {}  [{}]",
            result.path.blue().bold(),
            format!("score={:.4}", result.score).dimmed(),
            result.matched_terms.join(", ")
        );
        if let Some(snippet) = &result.snippet {
            for line in snippet.lines() {
                match line.split_once(": ") {
                    Some((num, text)) => println!("  {}: {}", num.green(), text),
                    None => println!("  {line}"),
                }
            }
        }
        println!();
    }
}
