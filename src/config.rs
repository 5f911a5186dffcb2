//! Shard wire configuration and process-wide tunables.
//!
//! `PostingConfig` is what the external collaborator (§6) hands a shard at `Init`. `Config`
//! holds the constants §9 calls out as implementer-exposed (noise floor, association window
//! shrink, association hash width, default search limit, bloom false-positive rate) rather
//! than burying them as magic numbers in `search.rs`/`association.rs`.

use crate::document::DoctypeRange;
use crate::error::{Error, Result};

/// Configuration shipped to one shard at `Init`.
#[derive(Debug, Clone)]
pub struct PostingConfig {
    pub hash_width: u64,
    pub window_size: u64,
    pub offset: u64,
    pub size: u64,
    pub group_size: u64,
    pub initial_doctype_range: DoctypeRange,
}

impl PostingConfig {
    /// Validate the constraints from §6: `hash_width in [12,64]`, `window_size in [8,256]`,
    /// `group_size in [16,256]` and divisible by 8.
    pub fn validate(&self) -> Result<()> {
        if !(12..=64).contains(&self.hash_width) {
            return Err(Error::BadInput(format!(
                "hash_width {} out of range [12,64]",
                self.hash_width
            )));
        }
        if !(8..=256).contains(&self.window_size) {
            return Err(Error::BadInput(format!(
                "window_size {} out of range [8,256]",
                self.window_size
            )));
        }
        if !(16..=256).contains(&self.group_size) || self.group_size % 8 != 0 {
            return Err(Error::BadInput(format!(
                "group_size {} must be in [16,256] and divisible by 8",
                self.group_size
            )));
        }
        if !self.initial_doctype_range.as_str().is_empty()
            && !self.initial_doctype_range.is_valid()
        {
            return Err(Error::BadInput(format!(
                "invalid doctype range: {}",
                self.initial_doctype_range.as_str()
            )));
        }
        Ok(())
    }
}

/// Build the `N_shards` power-of-two partition of the hash space for a set of shard addresses.
///
/// Mirrors `registry.Registry.Open`'s `size = (1 << hash_width) / len(posting_addresses)` split,
/// assigning shard `i` the sub-range `[i*size, (i+1)*size)`.
pub fn partition(hash_width: u64, window_size: u64, group_size: u64, n_shards: u64) -> Vec<PostingConfig> {
    assert!(n_shards.is_power_of_two(), "N_shards must be a power of two");
    let total = 1u64 << hash_width;
    let size = total / n_shards;
    (0..n_shards)
        .map(|i| PostingConfig {
            hash_width,
            window_size,
            offset: size * i,
            size,
            group_size,
            initial_doctype_range: DoctypeRange::new(String::new()),
        })
        .collect()
}

/// Process-wide tunables. Defaults match §9's recorded defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tallies below this count are treated as noise and dropped during merge (§4.8 step 3).
    pub noise_floor: u64,
    /// How much narrower the inner association hash-key window is than the outer `window_size`
    /// (§4.7 step 1); §9's recorded default is 3.
    pub association_window_shrink: u64,
    /// Hash width used for association-local blooms/inverted slices (§4.7 step 1).
    pub association_hash_width: u64,
    /// Default `limit` for `Search` when the caller doesn't specify one (§4.8 step 5).
    pub default_search_limit: usize,
    /// False-positive rate used to size association-local Bloom filters (§4.2).
    pub bloom_false_positive_rate: f64,
    /// The ranking strategy `merge_tallies` sorts matches by (§4.8 step 4, §9 "pluggable
    /// strategy"). Defaults to [`crate::search::score`]; swap in any other [`crate::search::ScoreFn`]
    /// to rank matches differently without touching the merge/sort plumbing.
    pub score_fn: crate::search::ScoreFn,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            noise_floor: 8,
            association_window_shrink: 3,
            association_hash_width: 32,
            default_search_limit: 10,
            bloom_false_positive_rate: 0.1,
            score_fn: crate::search::score,
        }
    }
}

impl Config {
    /// The `HashKey` used internally by association building for a given outer window size.
    pub fn association_hash_key(&self, window_size: u64) -> crate::hash::HashKey {
        crate::hash::HashKey {
            window_size: window_size.saturating_sub(self.association_window_shrink),
            hash_width: self.association_hash_width,
        }
    }
}
