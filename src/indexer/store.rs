// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory document store for the scanned corpus.
//!
//! Holds ScannedFiles in scan order (the order is what search tie-breaking
//! keys off) with path lookup on top. A re-scan replaces the corpus
//! wholesale; there is no merging.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::indexer::scanner::ScannedFile;

#[derive(Debug, Default)]
pub struct DocumentStore {
    files: Vec<ScannedFile>,
    by_path: HashMap<PathBuf, usize>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a full scan pass, preserving scan order.
    pub fn from_scan(files: Vec<ScannedFile>) -> Self {
        let mut store = Self::new();
        for file in files {
            store.store_file(file);
        }
        store
    }

    /// Upsert a file keyed by path. An existing entry keeps its corpus
    /// position; only the payload is replaced.
    pub fn store_file(&mut self, file: ScannedFile) {
        match self.by_path.get(&file.path) {
            Some(&pos) => self.files[pos] = file,
            None => {
                self.by_path.insert(file.path.clone(), self.files.len());
                self.files.push(file);
            }
        }
    }

    pub fn get_file(&self, path: &Path) -> Option<&ScannedFile> {
        self.by_path.get(path).map(|&pos| &self.files[pos])
    }

    pub fn count(&self) -> usize {
        self.files.len()
    }

    /// Files in corpus order.
    pub fn files(&self) -> &[ScannedFile] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> ScannedFile {
        ScannedFile {
            path: PathBuf::from(path),
            content: content.to_string(),
            size: content.len() as u64,
            modified_time: None,
            language: None,
            content_hash: blake3::hash(content.as_bytes()).to_hex().to_string(),
        }
    }

    #[test]
    fn get_missing_returns_none() {
        let store = DocumentStore::new();
        assert!(store.get_file(Path::new("nope.rs")).is_none());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn upsert_replaces_payload_in_place() {
        let mut store = DocumentStore::new();
        store.store_file(file("a.rs", "one"));
        store.store_file(file("b.rs", "two"));
        store.store_file(file("a.rs", "updated"));

        assert_eq!(store.count(), 2);
        assert_eq!(store.get_file(Path::new("a.rs")).unwrap().content, "updated");
        // Corpus position is stable across upserts.
        assert_eq!(store.files()[0].path, PathBuf::from("a.rs"));
    }
}
