//! Rolling Rabin–Karp hasher over normalized Unicode text (§4.1).
//!
//! Base=37 polynomial rolling hash over a ring buffer of the last `window_size` runes, folded
//! down to `hash_width` bits via `((H>>hw) XOR H) & mask`. All arithmetic is unsigned 64-bit
//! with wraparound (`wrapping_*`), matching the source's `uint64` overflow semantics.

const BASE: u64 = 37;

/// Identifies a hashing regime: window length in runes and output width in bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub window_size: u64,
    pub hash_width: u64,
}

impl HashKey {
    pub fn new(window_size: u64, hash_width: u64) -> Self {
        HashKey {
            window_size,
            hash_width,
        }
    }
}

fn pow_base(exp: u64) -> u64 {
    let mut result = 1u64;
    for _ in 0..exp {
        result = result.wrapping_mul(BASE);
    }
    result
}

#[inline]
fn fold(h: u64, hash_width: u64) -> u64 {
    if hash_width >= 64 {
        return h;
    }
    let mask = (1u64 << hash_width) - 1;
    ((h >> hash_width) ^ h) & mask
}

/// How many hashes `hashes()` would produce for a rune count, without materializing them.
pub fn hash_count(rune_count: usize, window_size: u64) -> usize {
    let w = window_size as usize;
    if w == 0 || rune_count < w {
        0
    } else {
        rune_count - w + 1
    }
}

/// Rolling-hash a rune sequence (already normalized by the caller) under `key`.
///
/// Yields `rune_count - window_size + 1` hashes, or none if the text is shorter than the window.
pub fn hashes(text: &str, key: HashKey) -> Vec<u64> {
    let runes: Vec<u32> = text.chars().map(|c| c as u32).collect();
    hashes_runes(&runes, key)
}

fn hashes_runes(runes: &[u32], key: HashKey) -> Vec<u64> {
    let w = key.window_size as usize;
    if w == 0 || runes.len() < w {
        return Vec::new();
    }
    let count = runes.len() - w + 1;
    let mut out = Vec::with_capacity(count);

    let high = pow_base((w - 1) as u64);
    let mut bases = vec![0u64; w];
    for (i, base) in bases.iter_mut().enumerate() {
        *base = pow_base((w - 1 - i) as u64);
    }

    let mut h: u64 = 0;
    for i in 0..w {
        h = h.wrapping_add((runes[i] as u64).wrapping_mul(bases[i]));
    }
    out.push(fold(h, key.hash_width));

    // Ring buffer of the current window's runes; `marker` points at the oldest entry, i.e.
    // the one about to be evicted on the next transition.
    let mut ring = runes[0..w].to_vec();
    let mut marker = 0usize;
    for k in 0..count - 1 {
        let evicted = ring[marker];
        let incoming = runes[k + w];
        h = h
            .wrapping_sub((evicted as u64).wrapping_mul(high))
            .wrapping_mul(BASE)
            .wrapping_add(incoming as u64);
        ring[marker] = incoming;
        marker = (marker + 1) % w;
        out.push(fold(h, key.hash_width));
    }
    out
}

/// The hash of a window entirely made of spaces (U+0020) — callers may use this to exclude
/// padded/whitespace regions from matching.
pub fn whitespace_hash(key: HashKey) -> u64 {
    let runes = vec![' ' as u32; key.window_size as usize];
    hashes_runes(&runes, key).first().copied().unwrap_or(0)
}
