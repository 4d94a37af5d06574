// SPDX-License-Identifier: MIT OR Apache-2.0

//! csearch - Local TF-IDF codebase search library
//!
//! Scanner -> document store -> TF-IDF index -> cosine-similarity query
//! engine -> snippet extraction, exposed to the CLI and the MCP server.

pub mod cli;
pub mod config;
pub mod errors;
pub mod indexer;
pub mod mcp;
pub mod output;
pub mod query;

pub use errors::SearchError;
pub use indexer::{IndexOptions, SearchService};
pub use query::search::{SearchOptions, SearchResult};
