// SPDX-License-Identifier: MIT OR Apache-2.0

//! File scanner using the ignore crate (same as ripgrep)
//!
//! Walks a root directory, applies `.gitignore` rules plus a fixed default
//! ignore set, filters out binaries and oversized files, and reads the
//! survivors into an in-memory corpus.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::SystemTime;

use ignore::WalkBuilder;
use tracing::warn;

use crate::errors::SearchError;

/// Extensions admitted into the corpus: source code, config/data,
/// documentation, scripts. Anything else is treated as binary.
const INDEXABLE_EXTENSIONS: &[&str] = &[
    "rs", "ts", "tsx", "js", "jsx", "mjs", "cjs", "py", "go", "java", "c", "cpp", "cc", "h",
    "hpp", "cs", "rb", "php", "swift", "kt", "kts", "scala", "lua", "sh", "bash", "zsh", "sql",
    "html", "css", "scss", "vue", "svelte", "md", "txt", "rst", "json", "yaml", "yml", "toml",
    "ini", "cfg", "conf", "env", "xml", "csv", "graphql", "proto",
];

/// Directory and file names always excluded, regardless of `.gitignore`.
/// User ignore rules are additive on top of this set, never subtractive.
const DEFAULT_IGNORED_NAMES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    "coverage",
    "vendor",
    "__pycache__",
    ".cache",
    ".next",
    ".nuxt",
    ".idea",
    ".vscode",
    ".DS_Store",
];

/// Default maximum file size admitted into the corpus (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Default number of leading bytes sampled when sniffing for NUL bytes.
pub const DEFAULT_BINARY_SAMPLE_BYTES: usize = 8000;

/// Scanned file with content and metadata.
#[derive(Debug, Clone)]
pub struct ScannedFile {
    /// Path relative to the scan root.
    pub path: PathBuf,
    /// Full UTF-8 text content.
    pub content: String,
    /// Byte length of the content.
    pub size: u64,
    /// Last-modified timestamp (informational only).
    pub modified_time: Option<SystemTime>,
    /// Language inferred from the extension.
    pub language: Option<String>,
    /// blake3 hash of the content, hex-encoded. Non-cryptographic fitness:
    /// identical-content detection and display.
    pub content_hash: String,
}

impl ScannedFile {
    /// Stable identifier for this file within the corpus.
    pub fn uri(&self) -> String {
        format!("file://{}", self.path.display())
    }
}

/// File scanner that respects .gitignore and custom excludes.
pub struct FileScanner {
    root: PathBuf,
    exclude_patterns: Vec<String>,
    max_file_size: u64,
    binary_sample_bytes: usize,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            exclude_patterns: Vec::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            binary_sample_bytes: DEFAULT_BINARY_SAMPLE_BYTES,
        }
    }

    /// Add substring exclude patterns on top of the default ignore set.
    pub fn with_excludes(mut self, excludes: Vec<String>) -> Self {
        self.exclude_patterns = excludes;
        self
    }

    /// Override the maximum admitted file size in bytes.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Override the NUL-sniffing sample window.
    pub fn with_binary_sample_bytes(mut self, bytes: usize) -> Self {
        self.binary_sample_bytes = bytes.max(1);
        self
    }

    /// Scan all eligible files under the root.
    ///
    /// The walk is parallel; the result is sorted by path so corpus order
    /// (and search tie-breaking) is deterministic across runs.
    pub fn scan(&self) -> Result<Vec<ScannedFile>, SearchError> {
        self.scan_with_progress(|_, _, _| {})
    }

    /// Scan, reporting `(current, total, path)` as each file is read.
    pub fn scan_with_progress(
        &self,
        on_progress: impl Fn(usize, usize, &Path),
    ) -> Result<Vec<ScannedFile>, SearchError> {
        if !self.root.is_dir() {
            return Err(SearchError::RootNotFound {
                path: self.root.clone(),
            });
        }

        let paths = self.list_files();
        let total = paths.len();

        let mut files = Vec::with_capacity(total);
        for (i, path) in paths.iter().enumerate() {
            on_progress(i + 1, total, path);
            if let Some(file) = self.read_file(path) {
                files.push(file);
            }
        }
        Ok(files)
    }

    /// Get the sorted list of eligible file paths (no content reads).
    pub fn list_files(&self) -> Vec<PathBuf> {
        let (tx, rx) = mpsc::channel();

        let walker = self
            .make_builder()
            .filter_entry(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| !is_default_ignored(name))
                    .unwrap_or(true)
            })
            .build_parallel();

        let exclude_patterns = self.exclude_patterns.clone();

        walker.run(|| {
            let tx = tx.clone();
            let exclude_patterns = exclude_patterns.clone();

            Box::new(move |entry| {
                if let Ok(entry) = entry {
                    let path = entry.path();

                    if !exclude_patterns.is_empty() {
                        let path_str = path.to_string_lossy();
                        for pattern in &exclude_patterns {
                            if path_str.contains(pattern.as_str()) {
                                return ignore::WalkState::Continue;
                            }
                        }
                    }

                    if path.is_file() {
                        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                            if is_indexable_extension(ext) {
                                let _ = tx.send(path.to_path_buf());
                            }
                        }
                    }
                }
                ignore::WalkState::Continue
            })
        });

        drop(tx);
        let mut paths: Vec<PathBuf> = rx.into_iter().collect();
        paths.sort();
        paths
    }

    fn make_builder(&self) -> WalkBuilder {
        let mut builder = WalkBuilder::new(&self.root);
        builder.hidden(false);
        builder.git_ignore(true).git_exclude(true).git_global(false);
        // Honor .gitignore files even outside a git checkout; MCP hosts
        // point this at arbitrary directories.
        builder.require_git(false);
        builder
    }

    /// Read one file into a ScannedFile. Returns None (with a logged
    /// warning where appropriate) for files that are oversized, binary,
    /// invalid UTF-8, or unreadable; no single file fails the scan.
    fn read_file(&self, path: &Path) -> Option<ScannedFile> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable file");
                return None;
            }
        };
        if metadata.len() > self.max_file_size {
            return None;
        }

        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable file");
                return None;
            }
        };

        let sample = &bytes[..bytes.len().min(self.binary_sample_bytes)];
        if sample.contains(&0) {
            return None;
        }

        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                warn!(path = %path.display(), "skipping file with invalid UTF-8");
                return None;
            }
        };

        let content_hash = blake3::hash(content.as_bytes()).to_hex().to_string();
        let language = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(detect_language);
        let rel = path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();

        Some(ScannedFile {
            size: content.len() as u64,
            modified_time: metadata.modified().ok(),
            path: rel,
            content,
            language,
            content_hash,
        })
    }
}

/// True when a name belongs to the built-in ignore set.
pub fn is_default_ignored(name: &str) -> bool {
    DEFAULT_IGNORED_NAMES.iter().any(|n| *n == name) || name.ends_with(".log")
}

/// True when a file extension is included in indexing/scanning.
pub fn is_indexable_extension(ext: &str) -> bool {
    let lower = ext.to_ascii_lowercase();
    INDEXABLE_EXTENSIONS
        .iter()
        .any(|candidate| *candidate == lower.as_str())
}

/// Detect language from file extension
pub fn detect_language(ext: &str) -> Option<String> {
    match ext.to_lowercase().as_str() {
        "rs" => Some("rust".into()),
        "ts" | "tsx" => Some("typescript".into()),
        "js" | "jsx" | "mjs" | "cjs" => Some("javascript".into()),
        "py" => Some("python".into()),
        "go" => Some("go".into()),
        "java" => Some("java".into()),
        "c" | "h" => Some("c".into()),
        "cpp" | "cc" | "hpp" => Some("cpp".into()),
        "cs" => Some("csharp".into()),
        "rb" => Some("ruby".into()),
        "php" => Some("php".into()),
        "swift" => Some("swift".into()),
        "kt" | "kts" => Some("kotlin".into()),
        "scala" => Some("scala".into()),
        "lua" => Some("lua".into()),
        "sh" | "bash" | "zsh" => Some("shell".into()),
        "sql" => Some("sql".into()),
        "html" => Some("html".into()),
        "css" | "scss" => Some("css".into()),
        "md" => Some("markdown".into()),
        "json" => Some("json".into()),
        "yaml" | "yml" => Some("yaml".into()),
        "toml" => Some("toml".into()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &[u8]) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(path, content).expect("write file");
    }

    #[test]
    fn scan_is_sorted_and_relative() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "b.rs", b"fn b() {}");
        write(dir.path(), "a.rs", b"fn a() {}");
        write(dir.path(), "sub/c.rs", b"fn c() {}");

        let files = FileScanner::new(dir.path()).scan().expect("scan");
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.rs"),
                PathBuf::from("b.rs"),
                PathBuf::from("sub/c.rs")
            ]
        );
    }

    #[test]
    fn binary_file_with_nul_is_excluded() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "a.ts", b"const x = 1;");
        write(dir.path(), "b.ts", b"before\x00after");

        let files = FileScanner::new(dir.path()).scan().expect("scan");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("a.ts"));
    }

    #[test]
    fn unsupported_extension_is_excluded() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "a.ts", b"const x = 1;");
        write(dir.path(), "b.bin", b"plain text, wrong extension");

        let files = FileScanner::new(dir.path()).scan().expect("scan");
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn oversized_file_is_skipped_not_truncated() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "big.rs", &vec![b'x'; 500]);
        write(dir.path(), "small.rs", b"fn ok() {}");

        let files = FileScanner::new(dir.path())
            .with_max_file_size(100)
            .scan()
            .expect("scan");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("small.rs"));
    }

    #[test]
    fn gitignore_is_honored_without_git_metadata() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), ".gitignore", b"generated/\n");
        write(dir.path(), "kept.rs", b"fn kept() {}");
        write(dir.path(), "generated/out.rs", b"fn dropped() {}");

        let files = FileScanner::new(dir.path()).scan().expect("scan");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("kept.rs"));
    }

    #[test]
    fn default_ignore_set_beats_everything() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "src/main.rs", b"fn main() {}");
        write(dir.path(), "node_modules/pkg/index.js", b"module.exports = 1;");
        write(dir.path(), "dist/bundle.js", b"var x = 1;");

        let files = FileScanner::new(dir.path()).scan().expect("scan");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("src/main.rs"));
    }

    #[test]
    fn invalid_utf8_is_skipped() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "bad.rs", &[0xff, 0xfe, b'f', b'n']);
        write(dir.path(), "good.rs", b"fn ok() {}");

        let files = FileScanner::new(dir.path()).scan().expect("scan");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("good.rs"));
    }

    #[test]
    fn missing_root_errors() {
        let err = FileScanner::new("/definitely/not/here").scan().unwrap_err();
        assert!(err.to_string().contains("Root path not found"));
    }

    #[test]
    fn content_hash_is_stable() {
        let dir = TempDir::new().expect("tempdir");
        write(dir.path(), "a.rs", b"same content");
        write(dir.path(), "b.rs", b"same content");

        let files = FileScanner::new(dir.path()).scan().expect("scan");
        assert_eq!(files[0].content_hash, files[1].content_hash);
    }
}
