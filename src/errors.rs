// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types with helpful suggestions
//!
//! Provides user-friendly error messages with actionable suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the search core.
#[derive(Debug, Error)]
pub enum SearchError {
    /// `search` was called before any successful `index` run.
    #[error(
        "No index has been built yet\n\n\
         Suggestion: index a directory first.\n\
         CLI: csearch search runs the index step automatically\n\
         MCP: call the csearch_index tool before csearch_search"
    )]
    IndexNotBuilt,

    /// The root path handed to `index` does not exist or is not a directory.
    #[error(
        "Root path not found: '{}'\n\n\
         Suggestion: check the path and try again.\n\
         Example: csearch search \"query\" --path /path/to/project",
        .path.display()
    )]
    RootNotFound { path: PathBuf },
}
