//! Per-document tallies, match scoring, and the top-level search pipeline (§4.8).
//!
//! Grounded on the source's `document/search.go` (`Tally`, `Match`, `SearchGroup.Merge`,
//! `MatchSlice.Fill`): noise floor `count < 8` and the `stddev(deltas)/count` score are exact.

use std::collections::HashMap;

use crate::association::{build_association, Association, Theme, ThemeId};
use crate::client::Client;
use crate::config::Config;
use crate::document::{Document, DocumentId, DoctypeRange};
use crate::error::{Error, Result};

/// Per-`(target_doc, shard)` co-occurrence accumulator (§3 "Tally").
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct Tally {
    pub count: u64,
    pub sum_deltas: u64,
    pub sum_sq_deltas: u64,
    pub last: u32,
}

impl Tally {
    /// Fold in one more occurrence at query-stream position `pos` (§4.4 `fill_tally`).
    pub fn accumulate(&mut self, pos: u32) {
        let delta = u64::from(pos.saturating_sub(self.last));
        self.sum_deltas += delta;
        self.sum_sq_deltas += delta * delta;
        self.count += 1;
        self.last = pos;
    }

    pub fn mean(&self) -> f64 {
        self.sum_deltas as f64 / self.count as f64
    }

    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        ((self.sum_sq_deltas as f64 / self.count as f64) - mean * mean)
            .max(0.0)
            .sqrt()
    }

    /// Convenience wrapper around the default [`score`] strategy; lower is better. `merge_tallies`
    /// takes its scoring function as a parameter rather than calling this method directly, so a
    /// caller can swap in a different [`ScoreFn`] (§9 "pluggable strategy") without this method
    /// changing meaning out from under it.
    pub fn score(&self) -> f64 {
        score(self)
    }
}

/// The default ranking strategy (§4.8 step 4): `stddev(deltas)/count`, lower is better. A free
/// function rather than a method so it has the same shape as any other [`ScoreFn`] a caller
/// might substitute via `Config::score_fn`.
pub fn score(tally: &Tally) -> f64 {
    tally.std_dev() / tally.count as f64
}

/// A pluggable ranking strategy: given a merged `Tally`, produce a score where lower ranks
/// higher (§9: "implementers should expose the score function as a pluggable strategy rather
/// than guess"). `Config::score_fn` defaults to [`score`].
pub type ScoreFn = fn(&Tally) -> f64;

/// One shard's tally map, keyed by target document (§4.5 `search`).
pub type ShardTallyMap = HashMap<DocumentId, Tally>;

/// A target document's merged tally after combining every shard's contribution (§3 "Match").
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Match {
    pub id: DocumentId,
    pub tally: Tally,
}

/// Merge per-shard tallies into document-level matches (§4.8 step 3): drop entries below the
/// noise floor or with no accumulated delta, filter by doctype range, accumulate across shards,
/// then sort ascending by `score_fn` (lower is better). `score_fn` is the actual plug point for
/// §9's "pluggable strategy" note — pass [`score`] for the default `stddev/count` ranking, or
/// any other `ScoreFn`.
pub fn merge_tallies(
    shard_maps: &[ShardTallyMap],
    target_range: &DoctypeRange,
    noise_floor: u64,
    score_fn: ScoreFn,
) -> Vec<Match> {
    let mut merged: HashMap<DocumentId, Tally> = HashMap::new();
    for map in shard_maps {
        for (&id, tally) in map {
            if !target_range.as_str().is_empty() && !target_range.contains(u64::from(id.doctype)) {
                continue;
            }
            if tally.count < noise_floor || tally.sum_deltas == 0 {
                continue;
            }
            let entry = merged.entry(id).or_default();
            entry.count += tally.count;
            entry.sum_deltas += tally.sum_deltas;
            entry.sum_sq_deltas += tally.sum_sq_deltas;
        }
    }
    let mut matches: Vec<Match> = merged.into_iter().map(|(id, tally)| Match { id, tally }).collect();
    matches.sort_by(|a, b| score_fn(&a.tally).partial_cmp(&score_fn(&b.tally)).unwrap());
    matches
}

/// A fully-filled search result: ranked matches, each carrying its association with the query
/// document (§4.8 step 5).
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub associations: Vec<Association>,
    pub themes: HashMap<ThemeId, Theme>,
}

/// Run the full search pipeline (§4.8): validate the query, fan out to every shard, merge
/// tallies, then build associations for the top `limit` matches.
pub fn search(
    client: &Client,
    config: &Config,
    window_size: u64,
    query: &Document,
    target_range: &DoctypeRange,
    limit: Option<usize>,
    fetch: impl Fn(DocumentId) -> Option<Document>,
) -> Result<SearchResult> {
    if query.length < window_size as usize {
        return Err(Error::BadInput(format!(
            "text field less than {window_size} unicode characters"
        )));
    }
    let limit = limit.unwrap_or(config.default_search_limit);
    let shard_maps = client.search_all(query)?;
    let mut matches = merge_tallies(&shard_maps, target_range, config.noise_floor, config.score_fn);
    matches.truncate(limit);

    let mut themes = HashMap::new();
    let mut associations = Vec::with_capacity(matches.len());
    for m in matches {
        let Some(target) = fetch(m.id) else { continue };
        let (association, theme_map) = build_association(config, window_size, query, &target);
        themes.extend(theme_map);
        associations.push(association);
    }
    Ok(SearchResult { associations, themes })
}
