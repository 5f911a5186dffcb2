//! Property tests for the rolling hasher and normalizer (§4.1, §8 property 1: "Hasher
//! stability").

use proptest::prelude::*;
use superfastmatch::hash::{hashes, HashKey};
use superfastmatch::normalize::normalize;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// `hash(T, K) == hash(T, K)` for any text and `HashKey`.
    #[test]
    fn hashing_is_deterministic(text in "[ -~]{0,200}", window in 1u64..20, width in 12u64..64) {
        let key = HashKey::new(window, width);
        let normalized = normalize(&text);
        let a = hashes(&normalized, key);
        let b = hashes(&normalized, key);
        prop_assert_eq!(a, b);
    }

    /// Swapping normalizable equivalents (here: which punctuation character separates two
    /// alphanumeric runs) yields identical hashes, since both normalize to the same run of
    /// spaces.
    #[test]
    fn punctuation_substitution_preserves_hashes(text in "[A-Za-z0-9 ]{1,150}", window in 2u64..20) {
        let variant: String = text.chars().map(|c| if c == ' ' { ',' } else { c }).collect();
        let key = HashKey::new(window, 32);
        let a = hashes(&normalize(&text), key);
        let b = hashes(&normalize(&variant), key);
        prop_assert_eq!(a, b);
    }

    /// The hash stream is exactly `rune_count - window_size + 1` long whenever the text meets
    /// the window, and empty otherwise.
    #[test]
    fn hash_count_matches_formula(text in "[ -~]{0,300}", window in 1u64..40) {
        let key = HashKey::new(window, 32);
        let normalized = normalize(&text);
        let runes = normalized.chars().count();
        let out = hashes(&normalized, key);
        if (runes as u64) < window {
            prop_assert!(out.is_empty());
        } else {
            prop_assert_eq!(out.len() as u64, runes as u64 - window + 1);
        }
    }
}
