//! Property tests for association building (§4.7, §8 properties 6-7).

use std::collections::HashSet;

use proptest::prelude::*;
use superfastmatch::association::build_association;
use superfastmatch::config::Config;
use superfastmatch::document::{Document, DocumentId};

const WORDS: &[&str] = &[
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "again", "and", "then",
    "once", "more", "nearby", "today", "because", "although", "rolling", "hash", "window",
];

fn text_strategy(min_words: usize, max_words: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), min_words..max_words)
        .prop_map(|words| words.join(" "))
}

const WINDOW: u64 = 6;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// §8 property 7: `associate(A,B)` and `associate(B,A)` produce the same number of
    /// fragments and the same number of themes.
    #[test]
    fn association_is_bidirectional(
        left_text in text_strategy(10, 40),
        right_text in text_strategy(10, 40),
    ) {
        let config = Config::default();
        let left = Document::build(DocumentId::new(1, 1), "left", &left_text).unwrap();
        let right = Document::build(DocumentId::new(1, 2), "right", &right_text).unwrap();
        prop_assume!(left.length as u64 >= WINDOW && right.length as u64 >= WINDOW);

        let (forward, forward_themes) = build_association(&config, WINDOW, &left, &right);
        let (backward, backward_themes) = build_association(&config, WINDOW, &right, &left);

        prop_assert_eq!(forward.fragments.len(), backward.fragments.len());
        prop_assert_eq!(forward_themes.len(), backward_themes.len());
    }

    /// §8 property 6: `associate(A,A)`'s fragment set is closed under the swap
    /// `(left,right) -> (right,left)`.
    #[test]
    fn self_association_is_symmetric(text in text_strategy(15, 50)) {
        let config = Config::default();
        let doc = Document::build(DocumentId::new(1, 1), "t", &text).unwrap();
        prop_assume!(doc.length as u64 >= WINDOW);

        let (assoc, _themes) = build_association(&config, WINDOW, &doc, &doc);
        let set: HashSet<(u32, u32, u64)> =
            assoc.fragments.iter().map(|f| (f.left, f.right, f.length)).collect();
        for f in &assoc.fragments {
            prop_assert!(
                set.contains(&(f.right, f.left, f.length)),
                "fragment {:?} has no swapped counterpart",
                f
            );
        }
    }
}
