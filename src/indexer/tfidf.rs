// SPDX-License-Identifier: MIT OR Apache-2.0

//! TF-IDF index builder and the code-aware tokenizer.
//!
//! The tokenizer is shared between indexing and querying; divergence
//! between the two silently degrades recall, so both sides call the same
//! [`tokenize`] function.

use std::collections::HashMap;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use rayon::prelude::*;

use crate::indexer::store::DocumentStore;

/// Tokens shorter than this are discarded as noise.
const MIN_TOKEN_LEN: usize = 2;

/// Natural-language filler dropped from both documents and queries.
static STOPWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "the", "a", "an", "and", "or", "of", "to", "in", "is", "it", "for", "on", "with", "as",
        "this", "that", "be", "are", "was", "at", "from", "not", "but", "if",
    ]
});

/// Tokenize text into lowercase terms.
///
/// Splits on non-alphanumeric boundaries, then splits identifiers on case
/// transitions (`camelCase` -> `camel`, `case`) and underscores
/// (`snake_case` -> `snake`, `case`).
pub fn tokenize(text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    for word in text.split(|c: char| !c.is_alphanumeric()) {
        if word.is_empty() {
            continue;
        }
        for part in split_camel_case(word) {
            let term = part.to_lowercase();
            if term.len() >= MIN_TOKEN_LEN && !STOPWORDS.contains(&term.as_str()) {
                terms.push(term);
            }
        }
    }
    terms
}

/// Split one identifier on case transitions: `parseHTTPResponse` ->
/// `parse`, `HTTP`, `Response`.
fn split_camel_case(word: &str) -> Vec<&str> {
    let chars: Vec<char> = word.chars().collect();
    let mut parts = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        let prev = chars[i - 1];
        let cur = chars[i];
        // lower/digit -> upper starts a new hump; an upper before a lower
        // inside an acronym run closes the acronym (HTTPServer -> HTTP, Server).
        let boundary = (cur.is_uppercase() && !prev.is_uppercase())
            || (cur.is_lowercase()
                && prev.is_uppercase()
                && i >= 2
                && chars[i - 2].is_uppercase());
        if boundary {
            let split_at = if cur.is_lowercase() { i - 1 } else { i };
            if split_at > start {
                parts.push(byte_slice(word, &chars, start, split_at));
                start = split_at;
            }
        }
    }
    parts.push(byte_slice(word, &chars, start, chars.len()));
    parts
}

fn byte_slice<'a>(word: &'a str, chars: &[char], start: usize, end: usize) -> &'a str {
    let byte_start: usize = chars[..start].iter().map(|c| c.len_utf8()).sum();
    let byte_len: usize = chars[start..end].iter().map(|c| c.len_utf8()).sum();
    &word[byte_start..byte_start + byte_len]
}

/// One document's entry in the built index.
#[derive(Debug, Clone)]
pub struct DocumentVector {
    /// Stable identifier (`file://<path>`).
    pub uri: String,
    pub path: PathBuf,
    /// Term -> L2-normalized TF-IDF weight. Keys are the document's full
    /// vocabulary, which doubles as the lookup set for matched-term
    /// reporting and phrase detection.
    pub weights: HashMap<String, f32>,
}

impl DocumentVector {
    pub fn contains_term(&self, term: &str) -> bool {
        self.weights.contains_key(term)
    }
}

/// Immutable built artifact of one indexing pass. A new corpus requires a
/// full rebuild; nothing here is patched incrementally.
#[derive(Debug)]
pub struct SearchIndex {
    /// Per-document vectors in corpus order (the tie-break order).
    pub document_vectors: Vec<DocumentVector>,
    /// Term -> count of documents containing it.
    pub document_frequency: HashMap<String, usize>,
    pub total_documents: usize,
}

impl SearchIndex {
    /// Build the index from a scanned corpus in one atomic batch.
    pub fn build(store: &DocumentStore) -> Self {
        // Tokenization dominates build cost and is per-document
        // independent; DF merging stays sequential in corpus order.
        let term_counts: Vec<HashMap<String, u32>> = store
            .files()
            .par_iter()
            .map(|file| {
                let mut counts: HashMap<String, u32> = HashMap::new();
                for term in tokenize(&file.content) {
                    *counts.entry(term).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        let total_documents = term_counts.len();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for counts in &term_counts {
            for term in counts.keys() {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let document_vectors = store
            .files()
            .iter()
            .zip(term_counts)
            .map(|(file, counts)| {
                let mut weights: HashMap<String, f32> = counts
                    .into_iter()
                    .map(|(term, count)| {
                        let tf = 1.0 + f32::ln(count as f32);
                        let idf = idf_for(&document_frequency, total_documents, &term);
                        (term, tf * idf)
                    })
                    .collect();
                normalize(&mut weights);
                DocumentVector {
                    uri: file.uri(),
                    path: file.path.clone(),
                    weights,
                }
            })
            .collect();

        Self {
            document_vectors,
            document_frequency,
            total_documents,
        }
    }

    /// Inverse document frequency for a term; zero for terms absent from
    /// the corpus.
    pub fn idf(&self, term: &str) -> f32 {
        if !self.document_frequency.contains_key(term) {
            return 0.0;
        }
        idf_for(&self.document_frequency, self.total_documents, term)
    }
}

/// Smoothed IDF: `ln(total/df) + 1`, df floored at 1. The `+1` keeps terms
/// present in every document at a small positive weight, so a corpus whose
/// vocabulary is universal (including any single-file corpus) is still
/// searchable; rarer terms still weigh strictly more.
fn idf_for(document_frequency: &HashMap<String, usize>, total: usize, term: &str) -> f32 {
    let df = document_frequency.get(term).copied().unwrap_or(0).max(1);
    f32::ln(total as f32 / df as f32) + 1.0
}

/// L2-normalize a sparse vector in place. A zero vector is left untouched.
pub fn normalize(weights: &mut HashMap<String, f32>) {
    let norm = weights.values().map(|w| w * w).sum::<f32>().sqrt();
    if norm > 0.0 {
        for weight in weights.values_mut() {
            *weight /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::scanner::ScannedFile;

    fn corpus(docs: &[(&str, &str)]) -> DocumentStore {
        DocumentStore::from_scan(
            docs.iter()
                .map(|(path, content)| ScannedFile {
                    path: PathBuf::from(path),
                    content: content.to_string(),
                    size: content.len() as u64,
                    modified_time: None,
                    language: None,
                    content_hash: blake3::hash(content.as_bytes()).to_hex().to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn tokenize_splits_camel_case() {
        assert_eq!(tokenize("camelCase"), vec!["camel", "case"]);
        assert_eq!(tokenize("parseHTTPResponse"), vec!["parse", "http", "response"]);
    }

    #[test]
    fn tokenize_splits_snake_case_and_boundaries() {
        assert_eq!(tokenize("snake_case"), vec!["snake", "case"]);
        assert_eq!(
            tokenize("fn handle_request(req: Request)"),
            vec!["fn", "handle", "request", "req", "request"]
        );
    }

    #[test]
    fn tokenize_drops_short_tokens_and_stopwords() {
        assert_eq!(tokenize("a b the x query"), vec!["query"]);
        assert_eq!(tokenize("go_x"), vec!["go"]);
    }

    #[test]
    fn tokenize_lowercases_everything() {
        assert_eq!(tokenize("AUTHENTICATE User"), vec!["authenticate", "user"]);
    }

    #[test]
    fn tokenizer_is_shared_between_docs_and_queries() {
        // Same function on both sides, but pin the behavior anyway.
        let text = "fetchUserById(user_id)";
        assert_eq!(tokenize(text), tokenize(text));
        assert_eq!(tokenize(text), vec!["fetch", "user", "by", "id", "user", "id"]);
    }

    #[test]
    fn df_counts_documents_not_occurrences() {
        let store = corpus(&[
            ("a.rs", "alpha alpha alpha beta"),
            ("b.rs", "alpha gamma"),
        ]);
        let index = SearchIndex::build(&store);
        assert_eq!(index.total_documents, 2);
        assert_eq!(index.document_frequency["alpha"], 2);
        assert_eq!(index.document_frequency["beta"], 1);
        assert_eq!(index.document_frequency["gamma"], 1);
    }

    #[test]
    fn idf_is_monotonic_in_rarity() {
        let store = corpus(&[
            ("a.rs", "common rare"),
            ("b.rs", "common"),
            ("c.rs", "common"),
        ]);
        let index = SearchIndex::build(&store);
        assert!(index.idf("rare") > index.idf("common"));
        assert_eq!(index.idf("unseen"), 0.0);
    }

    #[test]
    fn universal_terms_keep_positive_weight() {
        let store = corpus(&[("a.rs", "shared alpha"), ("b.rs", "shared beta")]);
        let index = SearchIndex::build(&store);
        // Smoothing floors an everywhere-term at +1 rather than zeroing it
        // out; the corpus-unique terms still outweigh it.
        assert!((index.idf("shared") - 1.0).abs() < 1e-6);
        assert!(index.idf("alpha") > index.idf("shared"));
        assert!(index.document_vectors[0].contains_term("shared"));
    }

    #[test]
    fn single_document_corpus_has_searchable_weights() {
        let store = corpus(&[("auth.rs", "fn authenticate_user() {}")]);
        let index = SearchIndex::build(&store);
        let weights = &index.document_vectors[0].weights;
        assert!(weights["authenticate"] > 0.0);
        assert!(weights["user"] > 0.0);
    }

    #[test]
    fn vectors_are_unit_length() {
        let store = corpus(&[
            ("a.rs", "alpha beta gamma delta"),
            ("b.rs", "epsilon zeta eta"),
            ("c.rs", "alpha epsilon theta"),
        ]);
        let index = SearchIndex::build(&store);
        for vector in &index.document_vectors {
            let norm = vector.weights.values().map(|w| w * w).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
        }
    }

    #[test]
    fn vectors_follow_corpus_order() {
        let store = corpus(&[("b.rs", "beta"), ("a.rs", "alpha")]);
        let index = SearchIndex::build(&store);
        assert_eq!(index.document_vectors[0].path, PathBuf::from("b.rs"));
        assert_eq!(index.document_vectors[1].path, PathBuf::from("a.rs"));
    }

    #[test]
    fn log_damped_tf_limits_repetition() {
        let spam_content = "needle ".repeat(1000);
        let store = corpus(&[
            ("spam.rs", spam_content.as_str()),
            ("plain.rs", "needle haystack filler words everywhere"),
            ("other.rs", "unrelated vocabulary entirely"),
        ]);
        let index = SearchIndex::build(&store);
        let spam = &index.document_vectors[0].weights["needle"];
        // Normalized single-term vector caps at 1.0 no matter the count.
        assert!(*spam <= 1.0 + 1e-6);
    }
}
