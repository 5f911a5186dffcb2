//! Runtime invariant checks for the properties enumerated in the storage and codec design.
//!
//! These are `debug_assert!`-based, so they cost nothing in release builds. They exist to catch
//! a broken invariant immediately at the call site that introduced it, rather than several
//! layers up as a mysteriously wrong search result.

use crate::document::DoctypeRange;
use crate::posting_line::PostingLine;
use crate::sparse_table::SparseTable;

/// Every populated slot's bytes round-trip through `get`/`set` independently of every other
/// slot: writing `pos` never perturbs what `other` reads back.
#[inline]
pub fn check_slot_independence(table: &SparseTable, pos: u64, other: u64, before: &[u8]) {
    if pos == other {
        return;
    }
    let after = table.get(other);
    debug_assert!(
        after.is_ok() && after.unwrap() == before,
        "slot {other} changed after writing slot {pos}"
    );
}

/// A decoded posting line's headers are strictly increasing by doctype, and each header's
/// docids are strictly increasing.
#[inline]
pub fn check_posting_line_sorted(line: &PostingLine) {
    let mut prev_doctype: Option<u32> = None;
    for (doctype, docids) in line.doctypes() {
        if let Some(p) = prev_doctype {
            debug_assert!(doctype > p, "doctype {doctype} out of order after {p}");
        }
        prev_doctype = Some(doctype);

        let mut prev_docid: Option<u32> = None;
        for &docid in docids {
            if let Some(p) = prev_docid {
                debug_assert!(docid > p, "docid {docid} out of order after {p}");
            }
            prev_docid = Some(docid);
        }
    }
}

/// A doctype range's parsed intervals don't overlap once sorted: this is what makes binary
/// search containment in `DoctypeRange::contains` correct.
#[inline]
pub fn check_doctype_range_non_overlap(range: &DoctypeRange) {
    if !range.is_valid() {
        return;
    }
    let mut boundaries: Vec<u64> = Vec::new();
    for v in 0..64u64 {
        if range.contains(v) {
            boundaries.push(v);
        }
    }
    for w in boundaries.windows(2) {
        debug_assert!(
            w[1] == w[0] || w[1] > w[0],
            "doctype range {} reports non-monotonic containment",
            range.as_str()
        );
    }
}
