//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides canonical implementations of test helpers to avoid duplication.

#![doc(hidden)]

use crate::config::{partition, PostingConfig};
use crate::document::{Document, DocumentId};

/// A deterministic, reasonably long filler sentence: enough unicode runes to clear any
/// `window_size` used in the test suites without being a single repeated rune (which would
/// degenerate every hash to the same value).
pub const FILLER_TEXT: &str =
    "the quick brown fox jumps over the lazy dog while the cat watches quietly nearby today";

/// Build a document with `n` repetitions of a short word, useful for exercising hash-count and
/// sparse-table growth formulas against a predictable rune count.
pub fn doc_with_runes(doctype: u32, docid: u32, n: usize) -> Document {
    let text: String = std::iter::repeat("ab ").take(n).collect();
    Document::build(DocumentId::new(doctype, docid), "t", text).unwrap()
}

/// The canonical test document: fixed id, fixed title, `FILLER_TEXT` body.
pub fn make_document(doctype: u32, docid: u32) -> Document {
    Document::build(DocumentId::new(doctype, docid), format!("Doc {docid}"), FILLER_TEXT).unwrap()
}

/// A small fixed corpus of documents that share overlapping substrings with each other, for
/// exercising search/association end-to-end.
pub fn small_corpus() -> Vec<Document> {
    vec![
        Document::build(
            DocumentId::new(1, 1),
            "Alpha",
            "the quick brown fox jumps over the lazy dog again and again and again",
        )
        .unwrap(),
        Document::build(
            DocumentId::new(1, 2),
            "Beta",
            "a quick brown fox once jumped over a lazy dog nearby too and then left",
        )
        .unwrap(),
        Document::build(
            DocumentId::new(1, 3),
            "Gamma",
            "completely unrelated content about gardening soil and composting techniques",
        )
        .unwrap(),
    ]
}

/// A single in-process shard configuration suitable for unit tests: small enough to exercise
/// sparse-table growth quickly, wide enough to avoid spurious collisions.
pub fn test_configs(n_shards: u64) -> Vec<PostingConfig> {
    partition(16, 8, 16, n_shards)
}
