// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// csearch - Local TF-IDF codebase search
///
/// Scans a directory tree, builds an in-memory TF-IDF index, and ranks
/// files by cosine similarity with exact/phrase-match boosts.
#[derive(Parser, Debug)]
#[command(name = "csearch")]
#[command(
    author,
    version,
    about,
    long_about = None,
    override_usage = "csearch [OPTIONS] <COMMAND>",
    after_help = "Search quickstart:\n  csearch s \"token refresh\" --path src/\n  csearch search --ext rs --limit 5 \"parse config\"\n\nMCP server:\n  csearch mcp serve"
)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Compact JSON output (no pretty formatting)
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan, index, and search a directory in one run
    #[command(visible_aliases = ["s"])]
    Search {
        /// Search query (identifiers or free text)
        query: String,

        /// Directory to index (defaults to current directory)
        #[arg(short, long)]
        path: Option<String>,

        /// Maximum number of results to return
        #[arg(short = 'm', long = "limit")]
        limit: Option<usize>,

        /// Keep only these file extensions (repeatable, no dot)
        #[arg(long = "ext")]
        extensions: Vec<String>,

        /// Keep only result paths containing this substring
        #[arg(long = "filter")]
        path_filter: Option<String>,

        /// Exclude paths containing this substring (repeatable)
        #[arg(long = "exclude")]
        exclude: Vec<String>,

        /// Omit line snippets from results
        #[arg(long)]
        no_snippet: bool,

        /// Maximum file size in bytes admitted into the index
        #[arg(long)]
        max_file_size: Option<u64>,
    },

    /// List the files the scanner would admit into the corpus
    Scan {
        /// Directory to scan (defaults to current directory)
        #[arg(short, long)]
        path: Option<String>,

        /// Exclude paths containing this substring (repeatable)
        #[arg(long = "exclude")]
        exclude: Vec<String>,

        /// Maximum file size in bytes
        #[arg(long)]
        max_file_size: Option<u64>,
    },

    /// Model Context Protocol server
    Mcp {
        #[command(subcommand)]
        command: McpCommands,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum McpCommands {
    /// Run the stdio MCP server (index held in-process across calls)
    Serve,
}
