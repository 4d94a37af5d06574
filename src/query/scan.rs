// SPDX-License-Identifier: MIT OR Apache-2.0

//! `csearch scan` - list the eligible corpus without building the index.

use std::path::Path;
use std::time::UNIX_EPOCH;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::indexer::scanner::{FileScanner, ScannedFile};
use crate::output::print_json;

/// Corpus entry as reported by `csearch scan` and the MCP scan tool.
#[derive(Debug, Serialize)]
pub struct FileInfo {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub size: u64,
    /// First 12 hex chars of the blake3 content hash.
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<u64>,
}

impl FileInfo {
    pub fn from_scanned(file: &ScannedFile) -> Self {
        Self {
            path: file.path.display().to_string(),
            language: file.language.clone(),
            size: file.size,
            hash: file.content_hash.chars().take(12).collect(),
            modified: file
                .modified_time
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs()),
        }
    }
}

/// List eligible files under `root` using the exact scanner policy the
/// indexer applies. `excludes` is the final pattern list; callers merge
/// config patterns with their own before calling.
pub fn list(
    root: &Path,
    excludes: Vec<String>,
    max_file_size: Option<u64>,
    config: &Config,
) -> Result<Vec<FileInfo>> {
    let mut scanner = FileScanner::new(root).with_excludes(excludes);
    if let Some(bytes) = max_file_size.or(config.max_file_size) {
        scanner = scanner.with_max_file_size(bytes);
    }
    if let Some(bytes) = config.binary_sample_bytes {
        scanner = scanner.with_binary_sample_bytes(bytes);
    }
    let files = scanner.scan()?;
    Ok(files.iter().map(FileInfo::from_scanned).collect())
}

pub fn run(
    root: Option<&str>,
    excludes: Vec<String>,
    max_file_size: Option<u64>,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let config = Config::load();
    let mut patterns = config.exclude_patterns.clone();
    patterns.extend(excludes);
    let files = list(
        Path::new(root.unwrap_or(".")),
        patterns,
        max_file_size,
        &config,
    )?;

    match format {
        OutputFormat::Json => print_json(&files, compact)?,
        OutputFormat::Text => {
            for file in &files {
                println!(
                    "{}  {}  {}  {}",
                    file.path.blue(),
                    file.language.as_deref().unwrap_or("-"),
                    format!("{}B", file.size).dimmed(),
                    file.hash.dimmed()
                );
            }
            println!("{} files", files.len());
        }
    }
    Ok(())
}
