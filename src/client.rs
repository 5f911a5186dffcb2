//! In-process fan-out over a fixed set of `PostingShard`s (§4.6).
//!
//! The source's `Client` dials out to remote posting-server processes over a transport; this
//! crate runs every shard in the same process, so `Client` here is the in-process stand-in: it
//! owns the shards directly and fans calls out across them with `rayon` instead of RPC.

use rayon::prelude::*;

use crate::config::PostingConfig;
use crate::document::Document;
use crate::error::Result;
use crate::search::ShardTallyMap;
use crate::shard::{ListRow, PostingShard};

/// Owns every shard and fans `add`/`delete`/`search`/`list` calls across them in parallel (§4.6).
pub struct Client {
    shards: Vec<PostingShard>,
}

impl Client {
    /// `Init` (§6): build one shard per entry in `configs`.
    pub fn init(configs: &[PostingConfig]) -> Result<Self> {
        let shards = configs
            .iter()
            .map(PostingShard::init)
            .collect::<Result<Vec<_>>>()?;
        Ok(Client { shards })
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn total_documents(&self) -> u64 {
        self.shards.iter().map(PostingShard::document_count).sum()
    }

    /// `Add` (§4.6, §6): route to every shard; each shard no-ops on hashes outside its range.
    pub fn add_all(&self, doc: &Document) -> Result<()> {
        self.shards.par_iter().try_for_each(|shard| shard.add(doc))
    }

    /// `Delete` (§4.6, §6): mirror of `add_all`.
    pub fn delete_all(&self, doc: &Document) -> Result<()> {
        self.shards.par_iter().try_for_each(|shard| shard.delete(doc))
    }

    /// `Search` (§4.6, §4.8 step 2): collect one tally map per shard for `merge_tallies`.
    pub fn search_all(&self, query: &Document) -> Result<Vec<ShardTallyMap>> {
        self.shards.par_iter().map(|shard| shard.search(query)).collect()
    }

    /// `List` (§4.6/§11): concatenate each shard's rows for the requested window, in shard
    /// order (shards are disjoint and ordered by `offset`, so this is already hash-sorted).
    pub fn list(&self, start: u64, limit: usize) -> Result<Vec<ListRow>> {
        let mut rows = Vec::new();
        for shard in &self.shards {
            if rows.len() >= limit {
                break;
            }
            let mut shard_rows = shard.list(start, limit - rows.len())?;
            rows.append(&mut shard_rows);
        }
        Ok(rows)
    }
}
