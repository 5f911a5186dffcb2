//! Posting shard: owns one hash sub-range's `SparseTable`, applies add/delete/search/list
//! through the hasher and posting-line codec (§4.5).

use parking_lot::RwLock;
use tracing::{info, info_span, warn};

use crate::config::PostingConfig;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::hash::HashKey;
use crate::posting_line::PostingLine;
use crate::search::ShardTallyMap;
use crate::sparse_table::SparseTable;

/// Per-call accounting (§4.5 "Shard statistics", §11): hashes considered vs. routed to this
/// shard, duplicate docids, saturated writes, elapsed time. Logged as one structured event at
/// the end of each call rather than the source's formatted summary line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stats {
    pub length: u64,
    pub routed: u64,
    pub dupes: u64,
    pub ops: u64,
    pub saturated: u64,
}

impl Stats {
    fn with_length(length: u64) -> Self {
        Stats {
            length,
            ..Default::default()
        }
    }
}

struct ShardState {
    table: SparseTable,
    hash_key: HashKey,
    documents: u64,
}

/// One shard: a contiguous `[offset, offset+size)` sub-range of the full hash space (§3
/// "PostingShard").
pub struct PostingShard {
    offset: u64,
    size: u64,
    state: RwLock<ShardState>,
}

enum Operation {
    Add,
    Delete,
}

impl PostingShard {
    /// `Init` (§6): build the sparse table for this shard's configured range. Bulk document
    /// loading from the doctype range is the caller's responsibility (§6: "stream them and call
    /// Add"); this constructor only prepares the empty table.
    pub fn init(config: &PostingConfig) -> Result<Self> {
        config.validate()?;
        Ok(PostingShard {
            offset: config.offset,
            size: config.size,
            state: RwLock::new(ShardState {
                table: SparseTable::init(config.size, config.group_size),
                hash_key: HashKey::new(config.window_size, config.hash_width),
                documents: 0,
            }),
        })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// `true` iff `hash` falls within `[offset, offset+size)` (§8 property 8 "Sharding
    /// partition").
    pub fn owns(&self, hash: u64) -> bool {
        hash >= self.offset && hash < self.offset + self.size
    }

    pub fn document_count(&self) -> u64 {
        self.state.read().documents
    }

    fn alter(&self, operation: Operation, doc: &Document) -> Result<()> {
        let span = info_span!("shard", offset = self.offset, size = self.size);
        let _enter = span.enter();
        let started = std::time::Instant::now();
        let mut state = self.state.write();
        let hash_key = state.hash_key;
        let hashes = doc.hashes(hash_key);
        let mut stats = Stats::with_length(hashes.len() as u64);
        let mut line = PostingLine::new();

        for &hash in hashes.iter() {
            if !self.owns(hash) {
                continue;
            }
            stats.routed += 1;
            let pos = hash - self.offset;
            let bytes = state.table.get_bytes(pos)?;
            line.read(&bytes)?;
            let changed = match operation {
                Operation::Add => line.insert_docid(doc.id.doctype, doc.id.docid),
                Operation::Delete => line.remove_docid(doc.id.doctype, doc.id.docid),
            };
            match changed {
                Ok(true) => {
                    stats.ops += 1;
                    let mut buf = Vec::new();
                    line.write(&mut buf);
                    match state.table.set_bytes(pos, &buf) {
                        Ok(()) => {}
                        Err(Error::ShortRead { .. }) => {
                            warn!(pos, "short read while writing posting line, continuing");
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(false) => stats.dupes += 1,
                Err(Error::Full { .. }) => stats.saturated += 1,
                Err(e) => return Err(e),
            }
        }
        match operation {
            Operation::Add => state.documents += 1,
            Operation::Delete => state.documents = state.documents.saturating_sub(1),
        }
        info!(
            documents = state.documents,
            hashes = stats.length,
            routed = stats.routed,
            ops = stats.ops,
            dupes = stats.dupes,
            saturated = stats.saturated,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "shard alter complete"
        );
        Ok(())
    }

    /// `Add` (§4.5 step 1-2, §6): route each of `doc`'s hashes that fall in this shard's range
    /// to the posting line at that slot, inserting `doc.id`.
    pub fn add(&self, doc: &Document) -> Result<()> {
        self.alter(Operation::Add, doc)
    }

    /// `Delete` (§4.5, §6): mirror of `add` using `remove_docid`.
    pub fn delete(&self, doc: &Document) -> Result<()> {
        self.alter(Operation::Delete, doc)
    }

    /// `Search` (§4.5, §6): for each hash at query-stream position `i` that falls in this
    /// shard's range, read the slot and fold its docids into the tally map at position `i`.
    pub fn search(&self, doc: &Document) -> Result<ShardTallyMap> {
        let span = info_span!("shard", offset = self.offset, size = self.size);
        let _enter = span.enter();
        let started = std::time::Instant::now();
        let state = self.state.read();
        let hashes = doc.hashes(state.hash_key);
        let mut stats = Stats::with_length(hashes.len() as u64);
        let mut tallies = ShardTallyMap::new();
        let mut line = PostingLine::new();

        for (i, &hash) in hashes.iter().enumerate() {
            if !self.owns(hash) {
                continue;
            }
            stats.routed += 1;
            let pos = hash - self.offset;
            let bytes = state.table.get_bytes(pos)?;
            line.read(&bytes)?;
            line.fill_tally(&mut tallies, i as u32);
            stats.ops += 1;
        }
        info!(
            hashes = stats.length,
            routed = stats.routed,
            ops = stats.ops,
            matches = tallies.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "shard search complete"
        );
        Ok(tallies)
    }

    /// `List` (§4.5/§11): enumerate populated slots from `max(start, offset)`, decoding each
    /// posting line into `(hash, per-doctype docids)` rows, up to `limit` rows or the end of
    /// this shard's range.
    pub fn list(&self, start: u64, limit: usize) -> Result<Vec<ListRow>> {
        let state = self.state.read();
        let mut pos = start.max(self.offset);
        let end = self.offset + self.size;
        let mut rows = Vec::new();
        let mut line = PostingLine::new();
        while pos < end && rows.len() < limit {
            let bytes = state.table.get_bytes(pos - self.offset)?;
            if bytes.len() > 1 || (!bytes.is_empty() && line_is_populated(&bytes)) {
                line.read(&bytes)?;
                if line.header_count() > 0 {
                    let doctypes = line
                        .doctypes()
                        .map(|(doctype, docids)| (doctype, docids.to_vec()))
                        .collect();
                    rows.push(ListRow {
                        hash: pos,
                        bytes: bytes.len(),
                        doctypes,
                    });
                }
            }
            pos += 1;
        }
        Ok(rows)
    }
}

fn line_is_populated(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes[0] != 0
}

/// One row of `List` output: a populated hash slot's doctype -> docid contents (§6).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ListRow {
    pub hash: u64,
    pub bytes: usize,
    pub doctypes: Vec<(u32, Vec<u32>)>,
}
