// SPDX-License-Identifier: MIT OR Apache-2.0

//! csearch - Local TF-IDF codebase search tool
//!
//! Scans a directory, builds an in-memory TF-IDF index, and ranks files by
//! cosine similarity. Also runs as a stdio MCP server for AI agents.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use csearch::cli::{Cli, Commands, McpCommands};
use csearch::query;

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-parseable (JSON, MCP).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CSEARCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();
    let compact = cli.compact;

    match cli.command {
        Commands::Search {
            query,
            path,
            limit,
            extensions,
            path_filter,
            exclude,
            no_snippet,
            max_file_size,
        } => {
            query::search::run(
                &query,
                path.as_deref(),
                limit,
                extensions,
                path_filter,
                exclude,
                no_snippet,
                max_file_size,
                format,
                compact,
            )?;
        }
        Commands::Scan {
            path,
            exclude,
            max_file_size,
        } => {
            query::scan::run(path.as_deref(), exclude, max_file_size, format, compact)?;
        }
        Commands::Mcp { command } => match command {
            McpCommands::Serve => csearch::mcp::run()?,
        },
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "csearch", &mut std::io::stdout());
        }
    }

    Ok(())
}
