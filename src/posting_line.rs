//! Posting-line codec: the value stored at one sparse-table slot (§4.4).
//!
//! On the wire: `count(varint) [doctype(varint) len(varint) delta_1..delta_len(varint)] x count`,
//! doctypes strictly increasing, docids within a header strictly increasing and stored as
//! successive deltas. In memory, headers live in a fixed-capacity array of 255 reusable slots;
//! the active headers are always `headers[0..count]`, kept sorted by doctype by swapping slots
//! in place rather than reallocating — a slot that becomes empty is shifted to the tail, ready
//! for the next doctype that needs one.

use std::collections::HashMap;

use crate::document::DocumentId;
use crate::error::{Error, Result};
use crate::search::Tally;

const MAX_HEADERS: usize = 255;
const MAX_LINE_LEN: usize = 255;

mod varint {
    /// Encode a LEB128 unsigned varint.
    pub fn encode(mut value: u64, buf: &mut Vec<u8>) {
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                buf.push(byte);
                break;
            }
            buf.push(byte | 0x80);
        }
    }

    /// Decode a LEB128 unsigned varint, returning (value, bytes_consumed).
    pub fn decode(bytes: &[u8]) -> Option<(u64, usize)> {
        let mut result: u64 = 0;
        let mut shift = 0u32;
        for (i, &byte) in bytes.iter().enumerate() {
            result |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Some((result, i + 1));
            }
            shift += 7;
        }
        None
    }

    /// Number of bytes `encode(value, _)` would produce.
    pub fn len(mut value: u64) -> usize {
        let mut n = 1;
        while value >= 0x80 {
            value >>= 7;
            n += 1;
        }
        n
    }
}

#[derive(Debug, Clone, Default)]
struct Header {
    doctype: u32,
    docids: Vec<u32>,
}

impl Header {
    fn byte_len(&self) -> usize {
        let mut prev = 0u32;
        let mut sum = varint::len(u64::from(self.doctype)) + varint::len(self.docids.len() as u64);
        for &docid in &self.docids {
            sum += varint::len(u64::from(docid - prev));
            prev = docid;
        }
        sum
    }
}

/// The value of one sparse-table slot: a sorted-by-doctype list of per-doctype docid headers.
#[derive(Debug, Clone)]
pub struct PostingLine {
    headers: Vec<Header>,
    count: usize,
    /// Running total byte length of the encoded line, including the leading count varint.
    length: usize,
}

impl Default for PostingLine {
    fn default() -> Self {
        Self::new()
    }
}

impl PostingLine {
    pub fn new() -> Self {
        PostingLine {
            headers: vec![Header::default(); MAX_HEADERS],
            count: 0,
            length: varint::len(0),
        }
    }

    /// Total encoded byte length of the line (what a sparse-table `set` would be called with).
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of active doctype headers.
    pub fn header_count(&self) -> usize {
        self.count
    }

    fn active(&self) -> &[Header] {
        &self.headers[..self.count]
    }

    fn find(&self, doctype: u32) -> std::result::Result<usize, usize> {
        self.active().binary_search_by_key(&doctype, |h| h.doctype)
    }

    /// Insert `(doctype, docid)`. Returns `Ok(true)` if the line changed, `Ok(false)` if the
    /// docid was already present (idempotent no-op), or `Err(Error::Full)` if accepting it
    /// would push the encoded line past 255 bytes — in which case the line is left untouched.
    pub fn insert_docid(&mut self, doctype: u32, docid: u32) -> Result<bool> {
        match self.find(doctype) {
            Ok(idx) => {
                let docids = &self.headers[idx].docids;
                if let Err(at) = docids.binary_search(&docid) {
                    let old_len = self.headers[idx].byte_len();
                    self.headers[idx].docids.insert(at, docid);
                    let new_len = self.headers[idx].byte_len();
                    let new_total = self.length - old_len + new_len;
                    if new_total > MAX_LINE_LEN {
                        self.headers[idx].docids.remove(at);
                        return Err(Error::Full { pos: u64::from(doctype) });
                    }
                    self.length = new_total;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Err(insert_at) => {
                if self.count >= MAX_HEADERS {
                    return Err(Error::Full { pos: u64::from(doctype) });
                }
                let added = varint::len(u64::from(doctype)) + varint::len(1) + varint::len(u64::from(docid));
                if self.length + added > MAX_LINE_LEN {
                    return Err(Error::Full { pos: u64::from(doctype) });
                }
                let slot = self.count;
                self.headers[slot].doctype = doctype;
                self.headers[slot].docids.clear();
                self.headers[slot].docids.push(docid);
                self.count += 1;
                let mut i = slot;
                while i > insert_at {
                    self.headers.swap(i - 1, i);
                    i -= 1;
                }
                self.length += added;
                Ok(true)
            }
        }
    }

    /// Remove `(doctype, docid)`. Returns `Ok(true)` if the line changed, `Ok(false)` if it
    /// was already absent. A header that becomes empty is retired: its slot is rotated to the
    /// tail of the active range (becoming the next free slot) rather than dropped.
    pub fn remove_docid(&mut self, doctype: u32, docid: u32) -> Result<bool> {
        let Ok(idx) = self.find(doctype) else {
            return Ok(false);
        };
        let Ok(at) = self.headers[idx].docids.binary_search(&docid) else {
            return Ok(false);
        };
        let old_len = self.headers[idx].byte_len();
        self.headers[idx].docids.remove(at);
        if self.headers[idx].docids.is_empty() {
            self.length -= old_len;
            self.retire(idx);
        } else {
            let new_len = self.headers[idx].byte_len();
            self.length = self.length - old_len + new_len;
        }
        Ok(true)
    }

    /// Drop the now-empty header at `idx`, shifting everything after it left by one so the
    /// active range stays contiguous and sorted.
    fn retire(&mut self, idx: usize) {
        let mut i = idx;
        while i + 1 < self.count {
            self.headers.swap(i, i + 1);
            i += 1;
        }
        self.count -= 1;
    }

    /// Serialize into `buf`, appending the encoded bytes.
    pub fn write(&self, buf: &mut Vec<u8>) {
        varint::encode(self.count as u64, buf);
        for header in self.active() {
            varint::encode(u64::from(header.doctype), buf);
            varint::encode(header.docids.len() as u64, buf);
            let mut prev = 0u32;
            for &docid in &header.docids {
                varint::encode(u64::from(docid - prev), buf);
                prev = docid;
            }
        }
    }

    /// Deserialize from `bytes`, reusing this line's header slots. An empty slice (an untouched
    /// sparse-table slot, which starts at zero stored bytes rather than the one-byte encoding of
    /// an explicitly-written empty line) decodes as the empty line, `count = 0`.
    pub fn read(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            self.count = 0;
            self.length = varint::len(0);
            return Ok(());
        }
        let bad = |_| Error::Fatal("corrupt posting line".into());
        let mut cursor = 0usize;
        let (count, n) = varint::decode(&bytes[cursor..]).ok_or_else(|| bad(()))?;
        cursor += n;
        let count = count as usize;
        if count > MAX_HEADERS {
            return Err(Error::Fatal("posting line header count overflow".into()));
        }
        for slot in 0..count {
            let (doctype, n) = varint::decode(&bytes[cursor..]).ok_or_else(|| bad(()))?;
            cursor += n;
            let (len, n) = varint::decode(&bytes[cursor..]).ok_or_else(|| bad(()))?;
            cursor += n;
            self.headers[slot].doctype = doctype as u32;
            self.headers[slot].docids.clear();
            let mut prev = 0u32;
            for _ in 0..len {
                let (delta, n) = varint::decode(&bytes[cursor..]).ok_or_else(|| bad(()))?;
                cursor += n;
                let docid = prev + delta as u32;
                self.headers[slot].docids.push(docid);
                prev = docid;
            }
        }
        self.count = count;
        self.length = bytes.len().min(cursor);
        Ok(())
    }

    /// Accumulate co-occurrence statistics for every docid in this line against `stream_pos`
    /// (§4.4 `fill_tally`).
    pub fn fill_tally(&self, tallies: &mut HashMap<DocumentId, Tally>, stream_pos: u32) {
        for header in self.active() {
            for &docid in &header.docids {
                let id = DocumentId::new(header.doctype, docid);
                let tally = tallies.entry(id).or_default();
                tally.accumulate(stream_pos);
            }
        }
    }

    /// Iterate `(doctype, sorted docids)` pairs, for introspection (`List`, §4.5).
    pub fn doctypes(&self) -> impl Iterator<Item = (u32, &[u32])> {
        self.active().iter().map(|h| (h.doctype, h.docids.as_slice()))
    }
}
