// SPDX-License-Identifier: MIT OR Apache-2.0

//! The owned index service: one atomic scan -> store -> build batch, with
//! the result held behind a swappable reference.
//!
//! There is no global singleton; callers construct a [`SearchService`] and
//! pass it where needed. A rebuild assembles a complete [`BuiltIndex`]
//! before swapping it in, so concurrent searches see fully-old or
//! fully-new, never a half-built corpus.

use std::path::Path;
use std::sync::{Arc, RwLock};

use rayon::prelude::*;
use tracing::debug;

use crate::errors::SearchError;
use crate::indexer::scanner::FileScanner;
use crate::indexer::store::DocumentStore;
use crate::indexer::tfidf::SearchIndex;
use crate::query::search::{RankingParams, SearchOptions, SearchResult};

/// Options for one indexing pass.
#[derive(Default)]
pub struct IndexOptions<'a> {
    /// Maximum admitted file size in bytes (default 1 MiB).
    pub max_file_size: Option<u64>,
    /// Substring exclude patterns, additive on the default ignore set.
    pub exclude_patterns: Vec<String>,
    /// NUL-sniffing sample window override.
    pub binary_sample_bytes: Option<usize>,
    /// Per-file progress callback `(current, total, path)`.
    pub on_progress: Option<&'a dyn Fn(usize, usize, &Path)>,
}

/// Summary of a completed indexing pass.
#[derive(Debug, Clone)]
pub struct IndexSummary {
    pub files_indexed: usize,
    pub distinct_terms: usize,
}

/// Everything one search needs, built in a single batch: the corpus, its
/// TF-IDF index, and lowercased text for literal-match boosting.
pub struct BuiltIndex {
    pub store: DocumentStore,
    pub index: SearchIndex,
    /// Lowercased content aligned with `store.files()`, precomputed so the
    /// exact-substring boost costs nothing at query time.
    pub text_lower: Vec<String>,
}

/// Search service holding the current immutable index behind a swappable
/// reference.
pub struct SearchService {
    current: RwLock<Option<Arc<BuiltIndex>>>,
    ranking: RankingParams,
}

impl SearchService {
    pub fn new(ranking: RankingParams) -> Self {
        Self {
            current: RwLock::new(None),
            ranking,
        }
    }

    /// Scan `root` and build a fresh index, atomically replacing any
    /// previous one. Fails on unrecoverable errors (missing root); skips
    /// individual unreadable files.
    pub fn index(&self, root: &Path, options: IndexOptions) -> Result<IndexSummary, SearchError> {
        let mut scanner = FileScanner::new(root).with_excludes(options.exclude_patterns);
        if let Some(bytes) = options.max_file_size {
            scanner = scanner.with_max_file_size(bytes);
        }
        if let Some(bytes) = options.binary_sample_bytes {
            scanner = scanner.with_binary_sample_bytes(bytes);
        }

        let files = match options.on_progress {
            Some(cb) => scanner.scan_with_progress(cb)?,
            None => scanner.scan()?,
        };

        let store = DocumentStore::from_scan(files);
        let index = SearchIndex::build(&store);
        let text_lower = store
            .files()
            .par_iter()
            .map(|file| file.content.to_lowercase())
            .collect();

        let summary = IndexSummary {
            files_indexed: index.total_documents,
            distinct_terms: index.document_frequency.len(),
        };
        debug!(
            files = summary.files_indexed,
            terms = summary.distinct_terms,
            root = %root.display(),
            "index built"
        );

        let built = Arc::new(BuiltIndex {
            store,
            index,
            text_lower,
        });
        *self.current.write().expect("index lock poisoned") = Some(built);
        Ok(summary)
    }

    /// Rank the indexed corpus against a query. Errors with
    /// [`SearchError::IndexNotBuilt`] before the first successful
    /// [`index`](Self::index) call.
    pub fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let built = self.snapshot().ok_or(SearchError::IndexNotBuilt)?;
        Ok(crate::query::search::execute(
            &built,
            &self.ranking,
            query,
            options,
        ))
    }

    /// The current built index, if any. Searches in flight keep their Arc
    /// alive across rebuilds.
    pub fn snapshot(&self) -> Option<Arc<BuiltIndex>> {
        self.current.read().expect("index lock poisoned").clone()
    }

    pub fn is_indexed(&self) -> bool {
        self.current.read().expect("index lock poisoned").is_some()
    }
}

impl Default for SearchService {
    fn default() -> Self {
        Self::new(RankingParams::default())
    }
}
