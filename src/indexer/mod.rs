// SPDX-License-Identifier: MIT OR Apache-2.0

//! Indexer module - file scanning, document storage, and TF-IDF indexing

pub mod scanner;
pub mod service;
pub mod store;
pub mod tfidf;

pub use scanner::{FileScanner, ScannedFile};
pub use service::{BuiltIndex, IndexOptions, IndexSummary, SearchService};
pub use store::DocumentStore;
pub use tfidf::{tokenize, SearchIndex};
