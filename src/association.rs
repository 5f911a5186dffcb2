//! Association building: common-hash inverted slices, greedy fragment growth, themes (§4.7).
//!
//! Ported from the source's `document.Common`/`InvertedSlice.Merge`/`Pairs.BuildFragments`/
//! `newFragment`/`newTheme`. The source mutates `Pairs.right` in place with a `-1` sentinel to
//! mark a consumed position during fragment growth (§9 design note); this crate does the same
//! with an `i64` backing vector instead of threading a separate "consumed" bit array through.

use std::collections::HashMap;

use crate::config::Config;
use crate::document::{Document, DocumentId};
use crate::hash::HashKey;

/// A single `(hash, position)` pair produced while scanning one document's hash stream (§4.7
/// step 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inverted {
    pub hash: u64,
    pub position: u32,
}

/// One `left_position`'s run of matching right positions within `Pairs::right` (§4.7 step 4).
#[derive(Debug, Clone, Copy)]
struct Step {
    left: u32,
    start: usize,
    length: usize,
}

/// Compact `{left_position -> sorted right_positions}` map produced by the merge-join of two
/// sorted inverted slices (§3 "Pairs").
#[derive(Debug, Clone, Default)]
pub struct Pairs {
    steps: Vec<Step>,
    right: Vec<i64>,
}

impl Pairs {
    fn new(estimate: usize) -> Self {
        Pairs {
            steps: Vec::with_capacity(estimate),
            right: Vec::with_capacity(estimate),
        }
    }

    fn append(&mut self, left: u32, right: &[u32]) {
        self.steps.push(Step {
            left,
            start: self.right.len(),
            length: right.len(),
        });
        self.right.extend(right.iter().map(|&p| i64::from(p)));
    }

    fn sort_by_left(&mut self) {
        self.steps.sort_by_key(|s| s.left);
    }

    /// Greedy fragment growth (§4.7 steps 6-8): for each `(left, right)` pair, extend forward by
    /// looking for `right+1` in the next step; consumed right positions are marked `-1` so they
    /// are not re-emitted as the start of their own fragment.
    fn build_fragments(
        &mut self,
        left_doc: &Document,
        inner_window: u64,
        min_length: u64,
    ) -> (Vec<Fragment>, HashMap<ThemeId, Theme>) {
        let mut fragments = Vec::with_capacity(self.steps.len());
        let mut themes = HashMap::new();
        let text = left_doc.normalized_text().to_string();

        for i in 0..self.steps.len() {
            let step = self.steps[i];
            for j in 0..step.length {
                let r = self.right[step.start + j];
                if r < 0 {
                    continue;
                }
                let mut length = r;
                'gobble: for next in &self.steps[i + 1..] {
                    let mut found = false;
                    for k in 0..next.length {
                        let right = self.right[next.start + k];
                        match right.cmp(&(length + 1)) {
                            std::cmp::Ordering::Equal => {
                                self.right[next.start + k] = -1;
                                length += 1;
                                found = true;
                                break;
                            }
                            std::cmp::Ordering::Greater => break,
                            std::cmp::Ordering::Less => {}
                        }
                    }
                    if !found {
                        break 'gobble;
                    }
                }
                let fragment_length = length - r + inner_window as i64;
                if fragment_length >= min_length as i64 {
                    if let Some((fragment, theme)) =
                        build_fragment(&text, step.left as i64, r, fragment_length)
                    {
                        if fragment.length >= min_length {
                            themes.insert(theme.id, theme.clone());
                            fragments.push(Fragment {
                                id: theme.id,
                                ..fragment
                            });
                        }
                    }
                }
            }
        }
        fragments.sort_by(|a, b| {
            b.length
                .cmp(&a.length)
                .then(a.left.cmp(&b.left))
                .then(a.right.cmp(&b.right))
        });
        (fragments, themes)
    }
}

/// Sort + merge-join two `(hash, position)` slices by hash (§4.7 step 4), producing a `Pairs`
/// keyed by the left document's positions.
fn merge(mut left: Vec<Inverted>, mut right: Vec<Inverted>) -> Pairs {
    left.sort_by_key(|i| (i.hash, i.position));
    right.sort_by_key(|i| (i.hash, i.position));

    let mut pairs = Pairs::new(left.len());
    let mut cursor = 0usize;
    let mut buf = Vec::new();
    for l in &left {
        buf.clear();
        let mut c = cursor;
        while c < right.len() {
            let r = right[c];
            match r.hash.cmp(&l.hash) {
                std::cmp::Ordering::Equal => {
                    buf.push(r.position);
                    c += 1;
                }
                std::cmp::Ordering::Less => {
                    c += 1;
                    cursor = c;
                }
                std::cmp::Ordering::Greater => break,
            }
        }
        if !buf.is_empty() {
            pairs.append(l.position, &buf);
        }
    }
    pairs.sort_by_left();
    pairs
}

/// Bloom-pruned common-hash computation between two documents (§4.7 steps 1-4): build fixed
/// blooms over each side, intersect, restrict each side's inverted slice to hashes the
/// intersection passes, then merge-join.
fn common(doc: &Document, other: &Document, key: HashKey, false_positive_rate: f64) -> Pairs {
    let size = doc.length as u64;
    let (left_bloom, right_bloom) = rayon::join(
        || doc.bloom(key, size, false_positive_rate),
        || other.bloom(key, size, false_positive_rate),
    );
    let intersection = left_bloom.intersection(right_bloom.as_ref());
    let (left, right) = rayon::join(
        || doc.inverted_slice(key, &intersection),
        || other.inverted_slice(key, &intersection),
    );
    merge(left, right)
}

/// A contiguous matched substring region between two documents (§3 "Fragment").
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fragment {
    pub left: u32,
    pub right: u32,
    pub length: u64,
    pub id: ThemeId,
}

/// `fnv32a(text) | (len(text) << 32)` (§3 "Theme").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ThemeId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Theme {
    pub id: ThemeId,
    pub text: String,
}

fn fnv32a(bytes: &[u8]) -> u32 {
    const OFFSET: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    let mut hash = OFFSET;
    for &b in bytes {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Ported from the original's `notWhitespace`: `unicode.IsLetter(r) || unicode.IsDigit(r)`, not
/// Rust's broader `is_alphanumeric()` (which also admits Nl/No runes Go's `IsDigit` rejects).
fn is_not_whitespace(c: char) -> bool {
    c.is_alphabetic() || c.is_ascii_digit()
}

/// Trim leading/trailing non-letter/non-digit runes from the matched text, adjusting
/// `left`/`right`/`length` to match, and compute the theme (§4.7 step 7-8). Returns `None` if
/// the candidate window is empty.
fn build_fragment(text: &str, left: i64, right: i64, length: i64) -> Option<(Fragment, Theme)> {
    if length <= 0 || left < 0 || right < 0 {
        return None;
    }
    let runes: Vec<char> = text.chars().skip(left as usize).take(length as usize).collect();
    let mut start = 0usize;
    while start < runes.len() && !is_not_whitespace(runes[start]) {
        start += 1;
    }
    let mut end = runes.len();
    while end > start && !is_not_whitespace(runes[end - 1]) {
        end -= 1;
    }
    if start >= end {
        return None;
    }
    let trimmed: String = runes[start..end].iter().collect();
    let new_left = left + start as i64;
    let new_right = right + start as i64;
    let new_length = (end - start) as u64;
    // `newTheme`'s `len(text)` is Go's UTF-8 byte length, not a rune count.
    let theme_id = ThemeId(u64::from(fnv32a(trimmed.as_bytes())) | ((trimmed.len() as u64) << 32));
    Some((
        Fragment {
            left: new_left as u32,
            right: new_right as u32,
            length: new_length,
            id: theme_id,
        },
        Theme {
            id: theme_id,
            text: trimmed,
        },
    ))
}

/// The (query, target) pair's matches: every fragment plus all derived themes (§3 "Association").
///
/// Owns a copy of the target document with its own association list stripped (§9): breaks the
/// doc<->association<->doc cycle of the source rather than reproducing it.
#[derive(Debug, Clone)]
pub struct Association {
    pub target: DocumentId,
    pub target_title: String,
    pub fragments: Vec<Fragment>,
    pub fragment_count: usize,
}

/// Build the association between `left` and `right` under the outer `window_size`, using the
/// narrower inner hash key `(window_size - association_window_shrink, association_hash_width)`
/// (§4.7 step 1).
pub fn build_association(
    config: &Config,
    window_size: u64,
    left: &Document,
    right: &Document,
) -> (Association, HashMap<ThemeId, Theme>) {
    let key = config.association_hash_key(window_size);
    let mut pairs = common(left, right, key, config.bloom_false_positive_rate);
    let (fragments, themes) = pairs.build_fragments(left, key.window_size, window_size);
    (
        Association {
            target: right.id,
            target_title: right.title.clone(),
            fragment_count: fragments.len(),
            fragments,
        },
        themes,
    )
}
