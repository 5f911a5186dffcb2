//! Document identity, normalized-text/hash/bloom caching, and doctype-range parsing (§3, §6, §11).
//!
//! A `Document` is transient within a request: its normalized text, hash vector and bloom filter
//! are computed lazily and cached on the instance (§3 "Lifecycles"). The source's per-document
//! caches are bare unsynchronized fields (§5 "Shared resources" calls this out explicitly); this
//! crate's fan-out (`client::Client`) and association building (`association::common`) share one
//! `Document` across worker threads by design, so the cache here is a `Mutex`-guarded memo table
//! instead — same "compute once, reuse" behavior, safe under real concurrent readers.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::bloom::FixedBloom;
use crate::error::{Error, Result};
use crate::hash::{hashes, HashKey};
use crate::normalize::normalize;

/// `(doctype, docid)`, both required to be non-zero by §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct DocumentId {
    pub doctype: u32,
    pub docid: u32,
}

impl DocumentId {
    pub fn new(doctype: u32, docid: u32) -> Self {
        DocumentId { doctype, docid }
    }

    /// `true` iff both components satisfy §3's `> 0` requirement.
    pub fn is_valid(&self) -> bool {
        self.doctype > 0 && self.docid > 0
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.doctype, self.docid)
    }
}

#[derive(Default)]
struct Cache {
    normalized: Option<Arc<String>>,
    hashes: HashMap<HashKey, Arc<Vec<u64>>>,
    blooms: HashMap<(HashKey, u64), Arc<FixedBloom>>,
}

/// A document: immutable `id`/`title`/`text`/`metadata` once constructed, with lazily computed
/// and cached derived data (§3).
///
/// `cache` is excluded from the wire form: it's purely a local memo table, recomputed lazily
/// from `text` on first use after a round-trip.
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub text: String,
    pub length: usize,
    pub metadata: BTreeMap<String, String>,
    #[serde(skip)]
    cache: Mutex<Cache>,
}

impl Clone for Document {
    fn clone(&self) -> Self {
        Document::with_metadata(self.id, self.title.clone(), self.text.clone(), self.metadata.clone())
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Build a document, validating the §7 `BadInput` conditions (missing title/text).
    pub fn build(id: DocumentId, title: impl Into<String>, text: impl Into<String>) -> Result<Self> {
        Self::build_with_metadata(id, title, text, BTreeMap::new())
    }

    pub fn build_with_metadata(
        id: DocumentId,
        title: impl Into<String>,
        text: impl Into<String>,
        metadata: BTreeMap<String, String>,
    ) -> Result<Self> {
        let title = title.into();
        let text = text.into();
        if title.is_empty() || text.is_empty() {
            return Err(Error::BadInput("missing title or text".into()));
        }
        Ok(Self::with_metadata(id, title, text, metadata))
    }

    /// Construct without the `BadInput` validation — used by callers that already know the
    /// fields are well-formed (tests, the association's owned copy of a target document).
    fn with_metadata(id: DocumentId, title: String, text: String, metadata: BTreeMap<String, String>) -> Self {
        let length = text.chars().count();
        Document {
            id,
            title,
            text,
            length,
            metadata,
            cache: Mutex::new(Cache::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Cache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Normalized text (§4.1), computed once and cached.
    pub fn normalized_text(&self) -> Arc<String> {
        let mut cache = self.lock();
        if cache.normalized.is_none() {
            cache.normalized = Some(Arc::new(normalize(&self.text)));
        }
        cache.normalized.clone().unwrap()
    }

    /// Rolling hashes of the normalized text under `key` (§4.1), cached per `HashKey`.
    pub fn hashes(&self, key: HashKey) -> Arc<Vec<u64>> {
        if let Some(existing) = self.lock().hashes.get(&key) {
            return existing.clone();
        }
        let normalized = self.normalized_text();
        let h = Arc::new(hashes(&normalized, key));
        self.lock().hashes.entry(key).or_insert(h).clone()
    }

    /// Number of hashes `hashes(key)` would produce, without materializing them.
    pub fn hash_length(&self, key: HashKey) -> usize {
        crate::hash::hash_count(self.length, key.window_size)
    }

    /// Bloom filter over every hash produced under `key`, sized for `size` expected elements
    /// (§4.2/§4.7 step 2), cached per `(key, size)`.
    pub fn bloom(&self, key: HashKey, size: u64, false_positive_rate: f64) -> Arc<FixedBloom> {
        if let Some(existing) = self.lock().blooms.get(&(key, size)) {
            return existing.clone();
        }
        let hashes = self.hashes(key);
        let mut b = FixedBloom::new(size.max(1), false_positive_rate);
        for &h in hashes.iter() {
            b.set(h);
        }
        let b = Arc::new(b);
        self.lock().blooms.entry((key, size)).or_insert(b).clone()
    }

    /// `(hash, position)` pairs for this document's hashes under `key`, restricted to those
    /// whose hash passes `bloom` (§4.7 step 3).
    pub fn inverted_slice(&self, key: HashKey, bloom: &FixedBloom) -> Vec<crate::association::Inverted> {
        self.hashes(key)
            .iter()
            .enumerate()
            .filter(|(_, &h)| bloom.test(h))
            .map(|(pos, &h)| crate::association::Inverted {
                hash: h,
                position: pos as u32,
            })
            .collect()
    }
}

/// A single `N` or `A-B` interval, normalized so `start <= end` (§6, §11).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Interval {
    start: u64,
    end: u64,
}

/// A colon-separated list of doctype intervals (§6): `1`, `1-10`, `1:3-5:7`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctypeRange {
    raw: String,
}

impl DoctypeRange {
    pub fn new(raw: impl Into<String>) -> Self {
        DoctypeRange { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the raw string matches `^(\d+(-\d+)?(:\d+(-\d+)?)*)*$` (§11, ported from the
    /// source's `docTypeRangeRegex`).
    pub fn is_valid(&self) -> bool {
        if self.raw.is_empty() {
            return true;
        }
        self.raw.split(':').all(|section| {
            let mut parts = section.splitn(2, '-');
            let Some(first) = parts.next() else {
                return false;
            };
            if first.is_empty() || !first.bytes().all(|b| b.is_ascii_digit()) {
                return false;
            }
            match parts.next() {
                None => true,
                Some(second) => !second.is_empty() && second.bytes().all(|b| b.is_ascii_digit()),
            }
        })
    }

    /// Parsed, sorted, `A > B`-normalized intervals (§11).
    fn intervals(&self) -> Vec<Interval> {
        if self.raw.is_empty() || !self.is_valid() {
            return Vec::new();
        }
        let mut intervals: Vec<Interval> = self
            .raw
            .split(':')
            .map(|section| {
                let mut parts = section.splitn(2, '-');
                let start: u64 = parts.next().unwrap().parse().unwrap_or(0);
                match parts.next() {
                    Some(end_str) => {
                        let end: u64 = end_str.parse().unwrap_or(0);
                        if start > end {
                            Interval { start: end, end: start }
                        } else {
                            Interval { start, end }
                        }
                    }
                    None => Interval { start, end: start },
                }
            })
            .collect();
        intervals.sort_by_key(|i| i.start);
        intervals
    }

    /// `true` if `value` falls within any parsed interval. Binary search over the sorted
    /// interval list by `end`, matching the source's `sort.Search` lookup (§11).
    pub fn contains(&self, value: u64) -> bool {
        let intervals = self.intervals();
        if intervals.is_empty() {
            return self.raw.is_empty();
        }
        let idx = intervals.partition_point(|i| i.end < value);
        intervals
            .get(idx)
            .is_some_and(|i| i.start <= value && i.end >= value)
    }
}

impl Default for DoctypeRange {
    fn default() -> Self {
        DoctypeRange::new(String::new())
    }
}
