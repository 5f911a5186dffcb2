//! Property tests for the posting-line codec (§4.4, §8 properties 3-5).

use proptest::prelude::*;
use superfastmatch::posting_line::PostingLine;

fn distinct_pairs_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((1u32..6, 1u32..2000), 1..15).prop_map(|mut v| {
        v.sort_unstable();
        v.dedup();
        v
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// §8 property 5: inserting a set of distinct `(doctype, docid)` pairs and then removing
    /// them all, in any order, returns the line to empty with its original encoded length.
    #[test]
    fn insert_then_remove_in_any_order_returns_to_empty(
        pairs in distinct_pairs_strategy(),
        shuffle_keys in prop::collection::vec(any::<u32>(), 0..15),
    ) {
        let mut line = PostingLine::new();
        let base_len = line.length();
        for &(dt, id) in &pairs {
            line.insert_docid(dt, id).unwrap();
        }

        // Sort by independently-generated random keys to get a removal order decoupled from
        // insertion order.
        let mut keys = shuffle_keys;
        keys.resize(pairs.len(), 0);
        let mut keyed: Vec<((u32, u32), u32)> = pairs.iter().copied().zip(keys).collect();
        keyed.sort_by_key(|(_, k)| *k);
        let shuffled: Vec<(u32, u32)> = keyed.into_iter().map(|(pair, _)| pair).collect();

        for &(dt, id) in &shuffled {
            prop_assert!(line.remove_docid(dt, id).unwrap());
        }

        prop_assert_eq!(line.header_count(), 0);
        prop_assert_eq!(line.length(), base_len);
    }

    /// §8 property 4: inserting the same `(doctype, docid)` pair twice changes the line exactly
    /// once; a third, fourth, ... insert is a no-op.
    #[test]
    fn repeated_insert_is_idempotent_after_the_first(
        doctype in 1u32..10, docid in 1u32..10_000, repeats in 2usize..8,
    ) {
        let mut line = PostingLine::new();
        prop_assert!(line.insert_docid(doctype, docid).unwrap());
        let len_after_first = line.length();
        for _ in 1..repeats {
            prop_assert!(!line.insert_docid(doctype, docid).unwrap());
            prop_assert_eq!(line.length(), len_after_first);
        }
    }

    /// §8 property 3: serializing then deserializing a line recovers the same sorted
    /// `(doctype, docids)` content and re-serializes to identical bytes.
    #[test]
    fn write_then_read_round_trips(pairs in distinct_pairs_strategy()) {
        let mut line = PostingLine::new();
        for &(dt, id) in &pairs {
            line.insert_docid(dt, id).unwrap();
        }
        let mut buf = Vec::new();
        line.write(&mut buf);

        let mut decoded = PostingLine::new();
        decoded.read(&buf).unwrap();

        let original: Vec<(u32, Vec<u32>)> =
            line.doctypes().map(|(dt, ids)| (dt, ids.to_vec())).collect();
        let round_tripped: Vec<(u32, Vec<u32>)> =
            decoded.doctypes().map(|(dt, ids)| (dt, ids.to_vec())).collect();
        prop_assert_eq!(original, round_tripped);

        let mut buf2 = Vec::new();
        decoded.write(&mut buf2);
        prop_assert_eq!(buf, buf2);
    }
}

/// An untouched sparse-table slot (empty byte slice) decodes as the empty line, matching what
/// `SparseTable::init` actually hands the codec on first touch.
#[test]
fn empty_bytes_decode_as_empty_line() {
    let mut line = PostingLine::new();
    line.read(&[]).unwrap();
    assert_eq!(line.header_count(), 0);
}
