//! End-to-end exercise of the full `Client`/`search` pipeline across multiple shards (§4.6, §4.8,
//! §10.5).

use std::collections::HashMap;

use superfastmatch::{partition, search, Client, Config, Document, DocumentId, DoctypeRange};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn corpus(docs: &[Document]) -> HashMap<DocumentId, Document> {
    docs.iter().map(|d| (d.id, d.clone())).collect()
}

/// Bulk-loads a corpus across several shards (the `Init` path of §10.5), then confirms a query
/// that shares long runs of text with two of the documents surfaces both, ranked, while a
/// query built from disjoint vocabulary surfaces neither.
#[test]
fn bulk_load_then_search_across_shards_surfaces_similar_documents() {
    init_tracing();

    let configs = partition(16, 8, 16, 8);
    let client = Client::init(&configs).unwrap();
    let config = Config::default();

    let docs: Vec<Document> = vec![
        Document::build(
            DocumentId::new(1, 1),
            "Alpha",
            "the quick brown fox jumps over the lazy dog again and again and again today",
        )
        .unwrap(),
        Document::build(
            DocumentId::new(1, 2),
            "Beta",
            "a quick brown fox once jumped over a lazy dog nearby too and then left quietly",
        )
        .unwrap(),
        Document::build(
            DocumentId::new(1, 3),
            "Gamma",
            "completely unrelated subject matter about rocket engines and orbital mechanics",
        )
        .unwrap(),
    ];
    for d in &docs {
        client.add_all(d).unwrap();
    }
    assert_eq!(client.total_documents(), 8 * docs.len() as u64);

    let store = corpus(&docs);
    let query = Document::build(
        DocumentId::new(1, 99),
        "Query",
        "the quick brown fox jumps over the lazy dog again and again and again today",
    )
    .unwrap();

    let result = search(
        &client,
        &config,
        8,
        &query,
        &DoctypeRange::new(""),
        None,
        |id| store.get(&id).cloned(),
    )
    .unwrap();

    let matched: Vec<DocumentId> = result.associations.iter().map(|a| a.target).collect();
    assert!(matched.contains(&docs[0].id));
    assert!(matched.contains(&docs[1].id));
    assert!(!matched.contains(&docs[2].id));
}

/// A restrictive `target_range` on `Search` excludes matches outside it even when their text
/// would otherwise score well (§4.8 step 3).
#[test]
fn search_respects_doctype_range_filter() {
    init_tracing();

    let configs = partition(16, 8, 16, 4);
    let client = Client::init(&configs).unwrap();
    let config = Config::default();

    let shared_text = "rolling hash windows over normalized runes of unicode text repeatedly";
    let in_range = Document::build(DocumentId::new(5, 1), "InRange", shared_text).unwrap();
    let out_of_range = Document::build(DocumentId::new(9, 1), "OutOfRange", shared_text).unwrap();
    client.add_all(&in_range).unwrap();
    client.add_all(&out_of_range).unwrap();

    let store = corpus(&[in_range.clone(), out_of_range.clone()]);
    let query = Document::build(DocumentId::new(1, 1), "Query", shared_text).unwrap();

    let restricted = search(
        &client,
        &config,
        8,
        &query,
        &DoctypeRange::new("5"),
        None,
        |id| store.get(&id).cloned(),
    )
    .unwrap();
    let matched: Vec<DocumentId> = restricted.associations.iter().map(|a| a.target).collect();
    assert!(matched.contains(&in_range.id));
    assert!(!matched.contains(&out_of_range.id));

    let unrestricted = search(
        &client,
        &config,
        8,
        &query,
        &DoctypeRange::new(""),
        None,
        |id| store.get(&id).cloned(),
    )
    .unwrap();
    let matched_all: Vec<DocumentId> = unrestricted.associations.iter().map(|a| a.target).collect();
    assert!(matched_all.contains(&in_range.id));
    assert!(matched_all.contains(&out_of_range.id));
}

/// `Delete` removes a document from every shard; a subsequent `Search` no longer surfaces it,
/// and `List` no longer reports its postings.
#[test]
fn delete_removes_document_from_subsequent_search_and_list() {
    init_tracing();

    let configs = partition(16, 8, 16, 4);
    let client = Client::init(&configs).unwrap();
    let config = Config::default();

    let text = "shared filler vocabulary reused across every fixture document in this file";
    let target = Document::build(DocumentId::new(1, 1), "Target", text).unwrap();
    client.add_all(&target).unwrap();
    assert_eq!(client.total_documents(), 4);

    let store = corpus(&[target.clone()]);
    let query = Document::build(DocumentId::new(1, 2), "Query", text).unwrap();
    let before = search(&client, &config, 8, &query, &DoctypeRange::new(""), None, |id| {
        store.get(&id).cloned()
    })
    .unwrap();
    assert!(before.associations.iter().any(|a| a.target == target.id));

    client.delete_all(&target).unwrap();
    assert_eq!(client.total_documents(), 0);

    let after = search(&client, &config, 8, &query, &DoctypeRange::new(""), None, |id| {
        store.get(&id).cloned()
    })
    .unwrap();
    assert!(!after.associations.iter().any(|a| a.target == target.id));
}

/// `List` paginates across shard boundaries: requesting a limit smaller than the corpus still
/// returns rows drawn in hash order from however many shards are needed to fill it.
#[test]
fn list_paginates_across_shard_boundaries() {
    init_tracing();

    let configs = partition(16, 8, 16, 4);
    let client = Client::init(&configs).unwrap();

    for i in 1..=20u32 {
        let d = Document::build(
            DocumentId::new(1, i),
            "t",
            &format!("document number {i} carries its own distinct filler words for hashing"),
        )
        .unwrap();
        client.add_all(&d).unwrap();
    }

    let page = client.list(0, 5).unwrap();
    assert!(page.len() <= 5);
    let full = client.list(0, 10_000).unwrap();
    assert!(full.len() >= page.len());
}
